//! Pulse (square) channel with sweep unit.

use serde::{Deserialize, Serialize};

use crate::apu::{envelope::Envelope, length_counter::LengthCounter, tables::DUTY_SEQUENCES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
struct Sweep {
    enabled: bool,
    period: u8,
    negate: bool,
    shift: u8,
    divider: u8,
    reload: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Pulse {
    duty: u8,
    sequence_step: u8,
    timer_period: u16,
    timer: u16,
    sweep: Sweep,
    /// Channel 2 uses two's-complement negation in the sweep; channel 1
    /// subtracts one extra.
    second_channel: bool,
    pub(crate) envelope: Envelope,
    pub(crate) length: LengthCounter,
}

impl Pulse {
    pub(crate) fn new(second_channel: bool) -> Self {
        Self {
            duty: 0,
            sequence_step: 0,
            timer_period: 0,
            timer: 0,
            sweep: Sweep::default(),
            second_channel,
            envelope: Envelope::default(),
            length: LengthCounter::default(),
        }
    }

    /// `$4000`/`$4004`: duty, halt, envelope.
    pub(crate) fn write_control(&mut self, data: u8) {
        self.duty = data >> 6;
        self.length.set_halt(data & 0x20 != 0);
        self.envelope.write_control(data);
    }

    /// `$4001`/`$4005`: sweep setup.
    pub(crate) fn write_sweep(&mut self, data: u8) {
        self.sweep.enabled = data & 0x80 != 0;
        self.sweep.period = (data >> 4) & 0x07;
        self.sweep.negate = data & 0x08 != 0;
        self.sweep.shift = data & 0x07;
        self.sweep.reload = true;
    }

    /// `$4002`/`$4006`: timer low byte.
    pub(crate) fn write_timer_low(&mut self, data: u8) {
        self.timer_period = (self.timer_period & 0x0700) | data as u16;
    }

    /// `$4003`/`$4007`: timer high bits, length load, phase reset.
    pub(crate) fn write_timer_high(&mut self, data: u8) {
        self.timer_period = (self.timer_period & 0x00FF) | (((data & 0x07) as u16) << 8);
        self.length.load(data >> 3);
        self.sequence_step = 0;
        self.envelope.restart();
    }

    /// Timer clock, once per APU cycle (every other CPU cycle).
    pub(crate) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.timer_period;
            self.sequence_step = (self.sequence_step + 1) % 8;
        } else {
            self.timer -= 1;
        }
    }

    fn sweep_target(&self) -> u16 {
        let change = self.timer_period >> self.sweep.shift;
        if self.sweep.negate {
            let delta = change + u16::from(!self.second_channel);
            self.timer_period.saturating_sub(delta)
        } else {
            self.timer_period + change
        }
    }

    fn sweep_mutes(&self) -> bool {
        self.timer_period < 8 || self.sweep_target() > 0x07FF
    }

    /// Half-frame clock for the sweep unit.
    pub(crate) fn clock_sweep(&mut self) {
        if self.sweep.divider == 0 && self.sweep.enabled && self.sweep.shift > 0 && !self.sweep_mutes()
        {
            self.timer_period = self.sweep_target();
        }
        if self.sweep.divider == 0 || self.sweep.reload {
            self.sweep.divider = self.sweep.period;
            self.sweep.reload = false;
        } else {
            self.sweep.divider -= 1;
        }
    }

    pub(crate) fn output(&self) -> u8 {
        if !self.length.active() || self.sweep_mutes() {
            return 0;
        }
        if DUTY_SEQUENCES[self.duty as usize][self.sequence_step as usize] == 0 {
            return 0;
        }
        self.envelope.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audible_pulse() -> Pulse {
        let mut pulse = Pulse::new(false);
        pulse.length.set_enabled(true);
        pulse.write_control(0x7F); // 25% duty, halt, constant volume 15
        pulse.write_timer_low(0x40);
        pulse.write_timer_high(0x08);
        pulse
    }

    #[test]
    fn low_periods_are_muted() {
        let mut pulse = audible_pulse();
        pulse.write_timer_low(0x07);
        pulse.write_timer_high(0x00);
        assert_eq!(pulse.output(), 0);
    }

    #[test]
    fn duty_sequence_gates_the_envelope() {
        let mut pulse = audible_pulse();
        // Step 0 of the 25% sequence is low.
        assert_eq!(pulse.output(), 0);
        for _ in 0..=pulse.timer_period {
            pulse.clock_timer();
        }
        assert_eq!(pulse.output(), 15);
    }

    #[test]
    fn sweep_can_silence_the_channel() {
        let mut pulse = audible_pulse();
        pulse.write_timer_low(0xFF);
        pulse.write_timer_high(0x07); // period 0x7FF
        pulse.write_sweep(0x81); // enabled, shift 1, add mode
        assert_eq!(pulse.output(), 0); // target overflows 0x7FF
    }
}
