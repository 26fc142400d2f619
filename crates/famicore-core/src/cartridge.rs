//! Cartridge loading and access.
//!
//! A [`Cartridge`] pairs a parsed ROM image with the mapper circuit that
//! decodes it. The bus forwards every CPU access in `$4020-$FFFF` and every
//! PPU access in `$0000-$1FFF` here.

use tracing::info;

use crate::{
    cartridge::{
        header::{INES_HEADER_LEN, InesHeader, Mirroring, TRAINER_LEN},
        mapper::{Mapper, MapperSnapshot, build_mapper},
    },
    error::CartridgeError,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
};

pub mod header;
pub mod mapper;

#[derive(Debug, Clone)]
pub struct Cartridge {
    mapper_id: u16,
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Builds a cartridge from raw PRG/CHR images, bypassing the container
    /// format. An empty `chr` provisions CHR RAM.
    pub fn from_parts(
        prg: Vec<u8>,
        chr: Vec<u8>,
        mapper_id: u16,
        mirroring: Mirroring,
    ) -> Result<Self, CartridgeError> {
        let mapper = build_mapper(mapper_id, prg, chr, mirroring)?;
        Ok(Self { mapper_id, mapper })
    }

    /// Parses a full iNES image (header, optional trainer, PRG, CHR).
    pub fn from_ines(image: &[u8]) -> Result<Self, CartridgeError> {
        let header = InesHeader::parse(image)?;
        let mut offset = INES_HEADER_LEN;
        if header.has_trainer {
            offset += TRAINER_LEN;
        }

        let prg_len = header.prg_rom_banks as usize * cpu_mem::PRG_BANK_SIZE;
        let prg_end = offset + prg_len;
        if image.len() < prg_end {
            return Err(CartridgeError::SectionTooShort {
                section: "PRG ROM",
                expected: prg_len,
                actual: image.len().saturating_sub(offset),
            });
        }
        let prg = image[offset..prg_end].to_vec();

        let chr_len = header.chr_rom_banks as usize * ppu_mem::CHR_BANK_SIZE;
        let chr_end = prg_end + chr_len;
        if image.len() < chr_end {
            return Err(CartridgeError::SectionTooShort {
                section: "CHR ROM",
                expected: chr_len,
                actual: image.len() - prg_end,
            });
        }
        let chr = image[prg_end..chr_end].to_vec();

        info!(
            mapper = header.mapper_id,
            prg_banks = header.prg_rom_banks,
            chr_banks = header.chr_rom_banks,
            mirroring = ?header.mirroring,
            "cartridge loaded"
        );
        Self::from_parts(prg, chr, header.mapper_id, header.mirroring)
    }

    pub fn mapper_id(&self) -> u16 {
        self.mapper_id
    }

    pub(crate) fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        self.mapper.cpu_read(addr)
    }

    pub(crate) fn cpu_write(&mut self, addr: u16, data: u8) {
        self.mapper.cpu_write(addr, data);
    }

    pub(crate) fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        self.mapper.ppu_read(addr)
    }

    pub(crate) fn ppu_write(&mut self, addr: u16, data: u8) {
        self.mapper.ppu_write(addr, data);
    }

    pub(crate) fn mirroring(&self) -> Mirroring {
        self.mapper.mirroring()
    }

    pub(crate) fn on_scanline_end(&mut self) {
        self.mapper.on_scanline_end();
    }

    pub(crate) fn snapshot(&self) -> MapperSnapshot {
        self.mapper.snapshot()
    }

    pub(crate) fn restore(&mut self, snapshot: &MapperSnapshot) -> bool {
        self.mapper.restore(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ines_image(prg_banks: u8, chr_banks: u8, flags6: u8) -> Vec<u8> {
        let mut image = vec![0u8; INES_HEADER_LEN];
        image[0..4].copy_from_slice(&header::INES_MAGIC);
        image[4] = prg_banks;
        image[5] = chr_banks;
        image[6] = flags6;
        image.extend(vec![0u8; prg_banks as usize * cpu_mem::PRG_BANK_SIZE]);
        image.extend(vec![0u8; chr_banks as usize * ppu_mem::CHR_BANK_SIZE]);
        image
    }

    #[test]
    fn loads_minimal_nrom_image() {
        let cart = Cartridge::from_ines(&ines_image(1, 1, 0)).unwrap();
        assert_eq!(cart.mapper_id(), 0);
    }

    #[test]
    fn rejects_truncated_prg_section() {
        let mut image = ines_image(2, 0, 0);
        image.truncate(INES_HEADER_LEN + cpu_mem::PRG_BANK_SIZE);
        assert!(matches!(
            Cartridge::from_ines(&image),
            Err(CartridgeError::SectionTooShort { section: "PRG ROM", .. })
        ));
    }

    #[test]
    fn skips_trainer_before_prg() {
        let mut image = vec![0u8; INES_HEADER_LEN];
        image[0..4].copy_from_slice(&header::INES_MAGIC);
        image[4] = 1;
        image[6] = 0x04; // trainer present
        image.extend(vec![0xEE; TRAINER_LEN]);
        let mut prg = vec![0u8; cpu_mem::PRG_BANK_SIZE];
        prg[0] = 0x55;
        image.extend(prg);
        let mut cart = Cartridge::from_ines(&image).unwrap();
        assert_eq!(cart.cpu_read(0x8000), Some(0x55));
    }

    #[test]
    fn unknown_mapper_is_reported() {
        let mut image = ines_image(1, 1, 0);
        image[6] = 0x40; // mapper 4
        assert!(matches!(
            Cartridge::from_ines(&image),
            Err(CartridgeError::UnsupportedMapper { mapper_id: 4 })
        ));
    }
}
