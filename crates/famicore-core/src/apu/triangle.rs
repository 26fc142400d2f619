//! Triangle channel with its linear counter.

use serde::{Deserialize, Serialize};

use crate::apu::{length_counter::LengthCounter, tables::TRIANGLE_SEQUENCE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) struct Triangle {
    timer_period: u16,
    timer: u16,
    sequence_step: u8,
    linear_counter: u8,
    linear_reload_value: u8,
    linear_reload: bool,
    control: bool,
    pub(crate) length: LengthCounter,
}

impl Triangle {
    /// `$4008`: control flag and linear counter reload value.
    pub(crate) fn write_control(&mut self, data: u8) {
        self.control = data & 0x80 != 0;
        self.length.set_halt(self.control);
        self.linear_reload_value = data & 0x7F;
    }

    /// `$400A`: timer low byte.
    pub(crate) fn write_timer_low(&mut self, data: u8) {
        self.timer_period = (self.timer_period & 0x0700) | data as u16;
    }

    /// `$400B`: timer high bits, length load, linear counter reload.
    pub(crate) fn write_timer_high(&mut self, data: u8) {
        self.timer_period = (self.timer_period & 0x00FF) | (((data & 0x07) as u16) << 8);
        self.length.load(data >> 3);
        self.linear_reload = true;
    }

    /// Timer clock, once per CPU cycle. The sequencer only advances while
    /// both counters are non-zero.
    pub(crate) fn clock_timer(&mut self) {
        if self.timer == 0 {
            self.timer = self.timer_period;
            if self.length.active() && self.linear_counter > 0 {
                self.sequence_step = (self.sequence_step + 1) % 32;
            }
        } else {
            self.timer -= 1;
        }
    }

    /// Quarter-frame clock.
    pub(crate) fn clock_linear(&mut self) {
        if self.linear_reload {
            self.linear_counter = self.linear_reload_value;
        } else if self.linear_counter > 0 {
            self.linear_counter -= 1;
        }
        if !self.control {
            self.linear_reload = false;
        }
    }

    pub(crate) fn output(&self) -> u8 {
        // The sequencer holds its last value when gated, so the channel
        // keeps emitting it rather than snapping to zero.
        TRIANGLE_SEQUENCE[self.sequence_step as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running_triangle() -> Triangle {
        let mut tri = Triangle::default();
        tri.length.set_enabled(true);
        tri.write_control(0x7F);
        tri.write_timer_low(0x00);
        tri.write_timer_high(0x01);
        tri.clock_linear(); // load the linear counter
        tri
    }

    #[test]
    fn sequencer_descends_from_fifteen() {
        let mut tri = running_triangle();
        assert_eq!(tri.output(), 15);
        for _ in 0..=tri.timer_period {
            tri.clock_timer();
        }
        assert_eq!(tri.output(), 14);
    }

    #[test]
    fn zero_linear_counter_freezes_the_sequencer() {
        let mut tri = Triangle::default();
        tri.length.set_enabled(true);
        tri.write_timer_high(0x09);
        let before = tri.output();
        for _ in 0..64 {
            tri.clock_timer();
        }
        assert_eq!(tri.output(), before);
    }
}
