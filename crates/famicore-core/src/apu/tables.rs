//! Fixed lookup tables shared by the audio channels (NTSC rates).

/// Length counter load values indexed by the 5-bit field of the length
/// registers.
#[rustfmt::skip]
pub(crate) const LENGTH_TABLE: [u8; 32] = [
    10, 254, 20,  2, 40,  4, 80,  6, 160,  8, 60, 10, 14, 12, 26, 14,
    12,  16, 24, 18, 48, 20, 96, 22, 192, 24, 72, 26, 16, 28, 32, 30,
];

/// The four pulse duty sequences, one bit per sequencer step.
#[rustfmt::skip]
pub(crate) const DUTY_SEQUENCES: [[u8; 8]; 4] = [
    [0, 1, 0, 0, 0, 0, 0, 0], // 12.5%
    [0, 1, 1, 0, 0, 0, 0, 0], // 25%
    [0, 1, 1, 1, 1, 0, 0, 0], // 50%
    [1, 0, 0, 1, 1, 1, 1, 1], // 25% negated
];

/// The 32-step triangle output sequence (15 down to 0, then 0 up to 15).
#[rustfmt::skip]
pub(crate) const TRIANGLE_SEQUENCE: [u8; 32] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0,
     0,  1,  2,  3,  4,  5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
];

/// Noise channel timer periods indexed by `$400E` bits 0-3.
#[rustfmt::skip]
pub(crate) const NOISE_PERIODS: [u16; 16] = [
    4, 8, 16, 32, 64, 96, 128, 160, 202, 254, 380, 508, 762, 1016, 2034, 4068,
];

/// DMC timer periods (CPU cycles per output bit) indexed by `$4010` bits 0-3.
#[rustfmt::skip]
pub(crate) const DMC_RATES: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];

/// Non-linear mix of the two pulse channels.
pub(crate) fn mix_pulses(pulse1: u8, pulse2: u8) -> f32 {
    let sum = (pulse1 + pulse2) as f32;
    if sum == 0.0 {
        0.0
    } else {
        95.88 / (8128.0 / sum + 100.0)
    }
}

/// Non-linear mix of triangle, noise, and DMC.
pub(crate) fn mix_tnd(triangle: u8, noise: u8, dmc: u8) -> f32 {
    let sum =
        triangle as f32 / 8227.0 + noise as f32 / 12241.0 + dmc as f32 / 22638.0;
    if sum == 0.0 {
        0.0
    } else {
        159.79 / (1.0 / sum + 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_mixes_to_zero() {
        assert_eq!(mix_pulses(0, 0), 0.0);
        assert_eq!(mix_tnd(0, 0, 0), 0.0);
    }

    #[test]
    fn full_scale_output_stays_below_one() {
        let peak = mix_pulses(15, 15) + mix_tnd(15, 15, 127);
        assert!(peak < 1.0);
    }
}
