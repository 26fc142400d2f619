//! OAM entry decoding and the per-scanline sprite latch.

use serde::{Deserialize, Serialize};

/// A raw 4-byte OAM entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OamEntry {
    pub(crate) y: u8,
    pub(crate) tile: u8,
    pub(crate) attributes: u8,
    pub(crate) x: u8,
}

impl OamEntry {
    pub(crate) fn from_oam(oam: &[u8], index: usize) -> Self {
        let base = index * 4;
        Self {
            y: oam[base],
            tile: oam[base + 1],
            attributes: oam[base + 2],
            x: oam[base + 3],
        }
    }

    pub(crate) fn palette(self) -> u8 {
        // Sprite palettes occupy entries 4..=7.
        (self.attributes & 0x03) + 4
    }

    pub(crate) fn behind_background(self) -> bool {
        self.attributes & 0x20 != 0
    }

    pub(crate) fn flip_horizontal(self) -> bool {
        self.attributes & 0x40 != 0
    }

    pub(crate) fn flip_vertical(self) -> bool {
        self.attributes & 0x80 != 0
    }
}

/// One evaluated sprite, latched with its pattern row for the coming
/// scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ScanlineSprite {
    pub(crate) x: u8,
    pub(crate) palette: u8,
    pub(crate) behind_background: bool,
    pub(crate) pattern_low: u8,
    pub(crate) pattern_high: u8,
    pub(crate) is_sprite_zero: bool,
}

impl ScanlineSprite {
    /// Two-bit pixel for screen column `column`, 0 when the sprite does not
    /// cover it.
    pub(crate) fn pixel_at(&self, column: u16) -> u8 {
        let offset = column.wrapping_sub(self.x as u16);
        if offset >= 8 {
            return 0;
        }
        let shift = 7 - offset;
        let low = (self.pattern_low >> shift) & 1;
        let high = (self.pattern_high >> shift) & 1;
        (high << 1) | low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_attribute_bits() {
        let entry = OamEntry {
            y: 10,
            tile: 0x42,
            attributes: 0b1110_0001,
            x: 20,
        };
        assert_eq!(entry.palette(), 5);
        assert!(entry.behind_background());
        assert!(entry.flip_horizontal());
        assert!(entry.flip_vertical());
    }

    #[test]
    fn pixel_at_reads_pattern_bits_left_to_right() {
        let sprite = ScanlineSprite {
            x: 100,
            palette: 4,
            behind_background: false,
            pattern_low: 0b1000_0001,
            pattern_high: 0b0000_0001,
            is_sprite_zero: false,
        };
        assert_eq!(sprite.pixel_at(100), 0b01);
        assert_eq!(sprite.pixel_at(107), 0b11);
        assert_eq!(sprite.pixel_at(108), 0);
        assert_eq!(sprite.pixel_at(99), 0);
    }
}
