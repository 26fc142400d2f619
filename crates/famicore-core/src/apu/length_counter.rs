//! Length counter gating a channel's output.

use serde::{Deserialize, Serialize};

use crate::apu::tables::LENGTH_TABLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) struct LengthCounter {
    counter: u8,
    halt: bool,
    enabled: bool,
}

impl LengthCounter {
    /// `$4015` channel enable bit; disabling zeroes the counter immediately.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.counter = 0;
        }
    }

    pub(crate) fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }

    /// Loads from the 5-bit length index; ignored while the channel is
    /// disabled.
    pub(crate) fn load(&mut self, index: u8) {
        if self.enabled {
            self.counter = LENGTH_TABLE[(index & 0x1F) as usize];
        }
    }

    /// Half-frame clock.
    pub(crate) fn clock(&mut self) {
        if !self.halt && self.counter > 0 {
            self.counter -= 1;
        }
    }

    pub(crate) fn active(&self) -> bool {
        self.counter > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_is_ignored_while_disabled() {
        let mut length = LengthCounter::default();
        length.load(0x01);
        assert!(!length.active());
        length.set_enabled(true);
        length.load(0x01);
        assert!(length.active());
    }

    #[test]
    fn halt_freezes_the_counter() {
        let mut length = LengthCounter::default();
        length.set_enabled(true);
        length.load(0x03); // loads 2
        length.set_halt(true);
        length.clock();
        length.set_halt(false);
        length.clock();
        length.clock();
        assert!(!length.active());
    }

    #[test]
    fn disabling_clears_the_counter() {
        let mut length = LengthCounter::default();
        length.set_enabled(true);
        length.load(0x00);
        length.set_enabled(false);
        assert!(!length.active());
    }
}
