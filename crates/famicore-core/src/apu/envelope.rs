//! Volume envelope shared by the pulse and noise channels.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) struct Envelope {
    start: bool,
    divider: u8,
    decay: u8,
    /// Constant volume, or the divider period in decay mode.
    volume: u8,
    constant: bool,
    loop_flag: bool,
}

impl Envelope {
    /// Applies the channel control byte (`$4000`/`$4004`/`$400C` low bits).
    pub(crate) fn write_control(&mut self, data: u8) {
        self.volume = data & 0x0F;
        self.constant = data & 0x10 != 0;
        self.loop_flag = data & 0x20 != 0;
    }

    /// Restarts the envelope; raised by length register writes.
    pub(crate) fn restart(&mut self) {
        self.start = true;
    }

    /// Quarter-frame clock.
    pub(crate) fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.decay = 15;
            self.divider = self.volume;
            return;
        }
        if self.divider > 0 {
            self.divider -= 1;
            return;
        }
        self.divider = self.volume;
        if self.decay > 0 {
            self.decay -= 1;
        } else if self.loop_flag {
            self.decay = 15;
        }
    }

    pub(crate) fn output(&self) -> u8 {
        if self.constant { self.volume } else { self.decay }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_mode_reports_the_register_volume() {
        let mut env = Envelope::default();
        env.write_control(0x1A);
        assert_eq!(env.output(), 10);
    }

    #[test]
    fn decay_counts_down_from_fifteen() {
        let mut env = Envelope::default();
        env.write_control(0x00); // period 0, decay mode
        env.restart();
        env.clock();
        assert_eq!(env.output(), 15);
        env.clock();
        assert_eq!(env.output(), 14);
    }

    #[test]
    fn looping_envelope_wraps_to_fifteen() {
        let mut env = Envelope::default();
        env.write_control(0x20);
        env.restart();
        for _ in 0..17 {
            env.clock();
        }
        assert_eq!(env.output(), 15);
    }
}
