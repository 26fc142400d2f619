//! iNES container header parsing.

use crate::error::CartridgeError;

/// iNES header length in bytes.
pub const INES_HEADER_LEN: usize = 16;

/// "NES" followed by an MS-DOS EOF.
pub const INES_MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

/// Trainer section length when flag 6 bit 2 is set.
pub const TRAINER_LEN: usize = 512;

/// Nametable mirroring arrangement selected by the cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Mirroring {
    Horizontal,
    Vertical,
}

/// Decoded iNES header fields this core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InesHeader {
    /// PRG ROM size in 16 KiB units (header byte 4).
    pub prg_rom_banks: u8,
    /// CHR ROM size in 8 KiB units (header byte 5); 0 means CHR RAM.
    pub chr_rom_banks: u8,
    /// Mapper number assembled from flags 6 and 7 high nibbles.
    pub mapper_id: u16,
    pub mirroring: Mirroring,
    /// Battery-backed PRG RAM present (flag 6 bit 1).
    pub has_battery: bool,
    /// 512-byte trainer precedes PRG ROM (flag 6 bit 2).
    pub has_trainer: bool,
}

impl InesHeader {
    /// Parses the leading 16 bytes of an iNES image.
    pub fn parse(image: &[u8]) -> Result<Self, CartridgeError> {
        if image.len() < INES_HEADER_LEN {
            return Err(CartridgeError::TooShort {
                actual: image.len(),
            });
        }
        if image[0..4] != INES_MAGIC {
            return Err(CartridgeError::InvalidMagic);
        }
        let flags6 = image[6];
        let flags7 = image[7];
        let mirroring = if flags6 & 0x01 != 0 {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        };
        Ok(Self {
            prg_rom_banks: image[4],
            chr_rom_banks: image[5],
            mapper_id: ((flags7 & 0xF0) as u16) | ((flags6 >> 4) as u16),
            mirroring,
            has_battery: flags6 & 0x02 != 0,
            has_trainer: flags6 & 0x04 != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(prg: u8, chr: u8, flags6: u8, flags7: u8) -> [u8; INES_HEADER_LEN] {
        let mut bytes = [0u8; INES_HEADER_LEN];
        bytes[0..4].copy_from_slice(&INES_MAGIC);
        bytes[4] = prg;
        bytes[5] = chr;
        bytes[6] = flags6;
        bytes[7] = flags7;
        bytes
    }

    #[test]
    fn parses_mapper_id_from_both_nibbles() {
        let parsed = InesHeader::parse(&header(2, 1, 0x40, 0x20)).unwrap();
        assert_eq!(parsed.mapper_id, 0x24);
    }

    #[test]
    fn parses_mirroring_and_battery_flags() {
        let parsed = InesHeader::parse(&header(1, 1, 0x03, 0x00)).unwrap();
        assert_eq!(parsed.mirroring, Mirroring::Vertical);
        assert!(parsed.has_battery);
        assert!(!parsed.has_trainer);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = header(1, 1, 0, 0);
        bytes[3] = 0x00;
        assert!(matches!(
            InesHeader::parse(&bytes),
            Err(CartridgeError::InvalidMagic)
        ));
    }

    #[test]
    fn rejects_short_buffer() {
        assert!(matches!(
            InesHeader::parse(&[0x4E, 0x45]),
            Err(CartridgeError::TooShort { actual: 2 })
        ));
    }
}
