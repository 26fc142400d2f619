//! Palette RAM and the fixed 64-entry master palette.

use crate::memory::ppu as ppu_mem;

/// The 2C02 master palette as RGB888 triples.
///
/// Values follow the widely used measured set; entries `$0E/$0F` and their
/// mirrors are blacks, `$20` is peak white.
#[rustfmt::skip]
pub const SYSTEM_PALETTE: [(u8, u8, u8); 64] = [
    (0x62, 0x62, 0x62), (0x00, 0x1F, 0xB2), (0x24, 0x04, 0xC8), (0x52, 0x00, 0xB2),
    (0x73, 0x00, 0x76), (0x80, 0x00, 0x24), (0x73, 0x0B, 0x00), (0x52, 0x28, 0x00),
    (0x24, 0x44, 0x00), (0x00, 0x57, 0x00), (0x00, 0x5C, 0x00), (0x00, 0x53, 0x24),
    (0x00, 0x3C, 0x76), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00),
    (0xAB, 0xAB, 0xAB), (0x0D, 0x57, 0xFF), (0x4B, 0x30, 0xFF), (0x8A, 0x13, 0xFF),
    (0xBC, 0x08, 0xD6), (0xD2, 0x12, 0x69), (0xC7, 0x2E, 0x00), (0x9D, 0x54, 0x00),
    (0x60, 0x7B, 0x00), (0x20, 0x98, 0x00), (0x00, 0xA3, 0x00), (0x00, 0x99, 0x42),
    (0x00, 0x7D, 0xB4), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00),
    (0xFF, 0xFF, 0xFF), (0x53, 0xAE, 0xFF), (0x90, 0x85, 0xFF), (0xD3, 0x65, 0xFF),
    (0xFF, 0x57, 0xFF), (0xFF, 0x5D, 0xCF), (0xFF, 0x77, 0x57), (0xFA, 0x9E, 0x00),
    (0xBD, 0xC7, 0x00), (0x7A, 0xE7, 0x00), (0x43, 0xF6, 0x11), (0x26, 0xEF, 0x7E),
    (0x2C, 0xD5, 0xF6), (0x4E, 0x4E, 0x4E), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00),
    (0xFF, 0xFF, 0xFF), (0xB6, 0xE1, 0xFF), (0xCE, 0xD1, 0xFF), (0xE9, 0xC3, 0xFF),
    (0xFF, 0xBC, 0xFF), (0xFF, 0xBD, 0xF4), (0xFF, 0xC6, 0xC3), (0xFF, 0xD5, 0x9A),
    (0xE9, 0xE6, 0x81), (0xCE, 0xF4, 0x81), (0xB6, 0xFB, 0x9A), (0xA9, 0xFA, 0xC3),
    (0xA9, 0xF0, 0xF4), (0xB8, 0xB8, 0xB8), (0x00, 0x00, 0x00), (0x00, 0x00, 0x00),
];

/// The 32 bytes of palette RAM at `$3F00-$3F1F`, with the hardware's
/// sprite-backdrop mirroring applied on access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PaletteRam {
    bytes: [u8; ppu_mem::PALETTE_RAM_SIZE],
}

impl PaletteRam {
    pub(crate) fn new() -> Self {
        Self {
            bytes: [0; ppu_mem::PALETTE_RAM_SIZE],
        }
    }

    /// `$3F10/$3F14/$3F18/$3F1C` alias the background mirrors.
    fn index(addr: u16) -> usize {
        let mut index = (addr as usize) % ppu_mem::PALETTE_RAM_SIZE;
        if index >= 0x10 && index % 4 == 0 {
            index -= 0x10;
        }
        index
    }

    pub(crate) fn read(&self, addr: u16) -> u8 {
        self.bytes[Self::index(addr)]
    }

    pub(crate) fn write(&mut self, addr: u16, data: u8) {
        self.bytes[Self::index(addr)] = data & 0x3F;
    }

    /// Palette index for a (palette, two-bit pixel) pair; pixel 0 always
    /// resolves to the shared backdrop color.
    pub(crate) fn color_index(&self, palette: u8, pixel: u8) -> u8 {
        if pixel == 0 {
            self.bytes[0]
        } else {
            self.bytes[Self::index((palette as u16) * 4 + pixel as u16)]
        }
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn load(&mut self, image: &[u8]) {
        if image.len() == self.bytes.len() {
            self.bytes.copy_from_slice(image);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_backdrop_entries_mirror_background() {
        let mut palette = PaletteRam::new();
        palette.write(0x3F10, 0x2A);
        assert_eq!(palette.read(0x3F00), 0x2A);
        palette.write(0x3F04, 0x11);
        assert_eq!(palette.read(0x3F14), 0x11);
    }

    #[test]
    fn writes_mask_to_six_bits() {
        let mut palette = PaletteRam::new();
        palette.write(0x3F01, 0xFF);
        assert_eq!(palette.read(0x3F01), 0x3F);
    }

    #[test]
    fn transparent_pixels_use_the_backdrop() {
        let mut palette = PaletteRam::new();
        palette.write(0x3F00, 0x21);
        palette.write(0x3F05, 0x16);
        assert_eq!(palette.color_index(1, 0), 0x21);
        assert_eq!(palette.color_index(1, 1), 0x16);
    }
}
