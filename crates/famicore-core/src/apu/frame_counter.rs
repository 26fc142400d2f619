//! Frame sequencer driving envelope, length, and sweep clocks.
//!
//! Step positions are expressed in whole CPU cycles. The 4-step sequence
//! raises the frame IRQ at its final step unless inhibited; the 5-step
//! sequence never does.

use serde::{Deserialize, Serialize};

/// 4-step mode quarter-frame positions; the last is also the IRQ point.
const FOUR_STEP: [u32; 4] = [7457, 14913, 22371, 29829];
const FOUR_STEP_LEN: u32 = 29830;

/// 5-step mode adds a fifth position and stretches the sequence.
const FIVE_STEP_LAST: u32 = 37281;
const FIVE_STEP_LEN: u32 = 37282;

/// Clocks emitted by one frame counter step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct FrameClocks {
    pub(crate) quarter: bool,
    pub(crate) half: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) struct FrameCounter {
    five_step: bool,
    irq_inhibit: bool,
    cycle: u32,
    irq_flag: bool,
}

impl FrameCounter {
    /// `$4017` write. Resets the sequence; 5-step mode clocks everything
    /// immediately.
    pub(crate) fn write(&mut self, data: u8) -> FrameClocks {
        self.five_step = data & 0x80 != 0;
        self.irq_inhibit = data & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_flag = false;
        }
        self.cycle = 0;
        if self.five_step {
            FrameClocks {
                quarter: true,
                half: true,
            }
        } else {
            FrameClocks::default()
        }
    }

    /// Advances one CPU cycle.
    pub(crate) fn clock(&mut self) -> FrameClocks {
        self.cycle += 1;
        let mut clocks = FrameClocks::default();
        if self.five_step {
            match self.cycle {
                7457 | 22371 => clocks.quarter = true,
                14913 => {
                    clocks.quarter = true;
                    clocks.half = true;
                }
                FIVE_STEP_LAST => {
                    clocks.quarter = true;
                    clocks.half = true;
                }
                _ => {}
            }
            if self.cycle >= FIVE_STEP_LEN {
                self.cycle = 0;
            }
        } else {
            match self.cycle {
                c if c == FOUR_STEP[0] || c == FOUR_STEP[2] => clocks.quarter = true,
                c if c == FOUR_STEP[1] => {
                    clocks.quarter = true;
                    clocks.half = true;
                }
                c if c == FOUR_STEP[3] => {
                    clocks.quarter = true;
                    clocks.half = true;
                    if !self.irq_inhibit {
                        self.irq_flag = true;
                    }
                }
                _ => {}
            }
            if self.cycle >= FOUR_STEP_LEN {
                self.cycle = 0;
            }
        }
        clocks
    }

    pub(crate) fn irq_flag(&self) -> bool {
        self.irq_flag
    }

    pub(crate) fn clear_irq(&mut self) {
        self.irq_flag = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clocks_until(fc: &mut FrameCounter, cycles: u32) -> (u32, u32) {
        let mut quarters = 0;
        let mut halves = 0;
        for _ in 0..cycles {
            let clocks = fc.clock();
            quarters += clocks.quarter as u32;
            halves += clocks.half as u32;
        }
        (quarters, halves)
    }

    #[test]
    fn four_step_sequence_produces_four_quarters_two_halves() {
        let mut fc = FrameCounter::default();
        let (quarters, halves) = clocks_until(&mut fc, FOUR_STEP_LEN);
        assert_eq!(quarters, 4);
        assert_eq!(halves, 2);
        assert!(fc.irq_flag());
    }

    #[test]
    fn five_step_sequence_never_raises_irq() {
        let mut fc = FrameCounter::default();
        fc.write(0x80);
        let (quarters, halves) = clocks_until(&mut fc, FIVE_STEP_LEN);
        assert_eq!(quarters, 4);
        assert_eq!(halves, 2);
        assert!(!fc.irq_flag());
    }

    #[test]
    fn inhibit_clears_a_raised_irq() {
        let mut fc = FrameCounter::default();
        clocks_until(&mut fc, FOUR_STEP_LEN);
        assert!(fc.irq_flag());
        fc.write(0x40);
        assert!(!fc.irq_flag());
    }
}
