//! Mapper 0 (NROM): no banking at all.
//!
//! 16 KiB PRG images are mirrored into both halves of `$8000-$FFFF`;
//! 32 KiB images fill the window directly. 8 KiB of PRG RAM answers
//! `$6000-$7FFF`.

use crate::{
    cartridge::{
        header::Mirroring,
        mapper::{ChrStore, Mapper, MapperSnapshot},
    },
    memory::cpu as cpu_mem,
};

const PRG_RAM_SIZE: usize = 0x2000;

#[derive(Debug, Clone)]
pub(crate) struct Nrom {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr: ChrStore,
    mirroring: Mirroring,
}

impl Nrom {
    pub(crate) fn new(prg: Vec<u8>, chr: Vec<u8>, mirroring: Mirroring) -> Self {
        Self {
            prg_rom: prg,
            prg_ram: vec![0; PRG_RAM_SIZE],
            chr: ChrStore::new(chr),
            mirroring,
        }
    }
}

impl Mapper for Nrom {
    fn id(&self) -> u16 {
        0
    }

    fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        match addr {
            cpu_mem::PRG_RAM_START..=cpu_mem::PRG_RAM_END => {
                Some(self.prg_ram[(addr - cpu_mem::PRG_RAM_START) as usize])
            }
            cpu_mem::PRG_ROM_START..=cpu_mem::CPU_ADDR_END => {
                let offset = (addr - cpu_mem::PRG_ROM_START) as usize;
                Some(self.prg_rom[offset % self.prg_rom.len()])
            }
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, data: u8) {
        if let cpu_mem::PRG_RAM_START..=cpu_mem::PRG_RAM_END = addr {
            self.prg_ram[(addr - cpu_mem::PRG_RAM_START) as usize] = data;
        }
    }

    fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        Some(self.chr.read(addr as usize))
    }

    fn ppu_write(&mut self, addr: u16, data: u8) {
        self.chr.write(addr as usize, data);
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn snapshot(&self) -> MapperSnapshot {
        MapperSnapshot::Nrom {
            prg_ram: self.prg_ram.clone(),
            chr_ram: self.chr.ram_image(),
        }
    }

    fn restore(&mut self, snapshot: &MapperSnapshot) -> bool {
        let MapperSnapshot::Nrom { prg_ram, chr_ram } = snapshot else {
            return false;
        };
        if prg_ram.len() != self.prg_ram.len() {
            return false;
        }
        self.prg_ram.copy_from_slice(prg_ram);
        self.chr.load_ram_image(chr_ram);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prg_16k_with_marker() -> Vec<u8> {
        let mut prg = vec![0; cpu_mem::PRG_BANK_SIZE];
        prg[0] = 0xAB;
        prg[cpu_mem::PRG_BANK_SIZE - 1] = 0xCD;
        prg
    }

    #[test]
    fn mirrors_16k_prg_into_both_halves() {
        let mut mapper = Nrom::new(prg_16k_with_marker(), Vec::new(), Mirroring::Horizontal);
        assert_eq!(mapper.cpu_read(0x8000), Some(0xAB));
        assert_eq!(mapper.cpu_read(0xC000), Some(0xAB));
        assert_eq!(mapper.cpu_read(0xBFFF), Some(0xCD));
        assert_eq!(mapper.cpu_read(0xFFFF), Some(0xCD));
    }

    #[test]
    fn prg_ram_is_readable_and_writable() {
        let mut mapper = Nrom::new(prg_16k_with_marker(), Vec::new(), Mirroring::Horizontal);
        mapper.cpu_write(0x6123, 0x42);
        assert_eq!(mapper.cpu_read(0x6123), Some(0x42));
    }

    #[test]
    fn chr_rom_ignores_writes() {
        let chr = vec![0x11; 0x2000];
        let mut mapper = Nrom::new(prg_16k_with_marker(), chr, Mirroring::Vertical);
        mapper.ppu_write(0x0000, 0x99);
        assert_eq!(mapper.ppu_read(0x0000), Some(0x11));
    }

    #[test]
    fn chr_ram_accepts_writes_when_no_chr_rom() {
        let mut mapper = Nrom::new(prg_16k_with_marker(), Vec::new(), Mirroring::Vertical);
        mapper.ppu_write(0x1FFF, 0x77);
        assert_eq!(mapper.ppu_read(0x1FFF), Some(0x77));
    }

    #[test]
    fn unmapped_expansion_reads_return_none() {
        let mut mapper = Nrom::new(prg_16k_with_marker(), Vec::new(), Mirroring::Horizontal);
        assert_eq!(mapper.cpu_read(0x4020), None);
        assert_eq!(mapper.cpu_read(0x5FFF), None);
    }
}
