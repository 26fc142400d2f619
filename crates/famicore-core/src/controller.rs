//! Standard 8-button pad readable through `$4016/$4017`.

use serde::{Deserialize, Serialize};

/// Button ordering follows the pad shift register bit layout (A first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

/// Serially-readable controller state with latch/strobe behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controller {
    strobe: bool,
    latched: u8,
    state: u8,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the full 8-button state with a host-supplied mask (bit 0 = A).
    pub fn set_state(&mut self, mask: u8) {
        self.state = mask;
        if self.strobe {
            self.latched = self.state;
        }
    }

    /// Updates the pressed state of a single button.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let bit = 1u8 << (button as u8);
        if pressed {
            self.state |= bit;
        } else {
            self.state &= !bit;
        }
        if self.strobe {
            self.latched = self.state;
        }
    }

    /// Writes the `$4016` strobe bit (shared by both ports).
    pub fn write_strobe(&mut self, data: u8) {
        let strobe = (data & 0x01) != 0;
        self.strobe = strobe;
        if strobe {
            self.latched = self.state;
        }
    }

    /// Reads the next bit from the latched shift register.
    ///
    /// Bit 0 holds the current button; subsequent reads shift unless strobe
    /// is held high.
    pub fn read(&mut self) -> u8 {
        let bit = self.latched & 0x01;
        if !self.strobe {
            // After 8 reads hardware keeps returning 1s; shift ones in.
            self.latched = (self.latched >> 1) | 0x80;
        }
        bit | 0x40 // Upper bits float high on hardware.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_buttons_in_shift_order() {
        let mut pad = Controller::new();
        pad.set_state(0b0001_0011); // A, B, Up
        pad.write_strobe(1);
        pad.write_strobe(0);
        let bits: Vec<u8> = (0..8).map(|_| pad.read() & 1).collect();
        assert_eq!(bits, vec![1, 1, 0, 0, 1, 0, 0, 0]);
    }

    #[test]
    fn returns_ones_after_eight_reads() {
        let mut pad = Controller::new();
        pad.write_strobe(1);
        pad.write_strobe(0);
        for _ in 0..8 {
            pad.read();
        }
        assert_eq!(pad.read() & 1, 1);
    }

    #[test]
    fn strobe_high_keeps_reporting_first_button() {
        let mut pad = Controller::new();
        pad.set_button(Button::A, true);
        pad.write_strobe(1);
        assert_eq!(pad.read() & 1, 1);
        assert_eq!(pad.read() & 1, 1);
    }
}
