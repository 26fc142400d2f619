//! Mapper 3 (CNROM): fixed PRG, 8 KiB switchable CHR ROM banks.

use tracing::trace;

use crate::{
    cartridge::{
        header::Mirroring,
        mapper::{ChrStore, Mapper, MapperSnapshot},
    },
    memory::{cpu as cpu_mem, ppu as ppu_mem},
};

#[derive(Debug, Clone)]
pub(crate) struct Cnrom {
    prg_rom: Vec<u8>,
    chr: ChrStore,
    chr_bank: u8,
    mirroring: Mirroring,
}

impl Cnrom {
    pub(crate) fn new(prg: Vec<u8>, chr: Vec<u8>, mirroring: Mirroring) -> Self {
        Self {
            prg_rom: prg,
            chr: ChrStore::new(chr),
            chr_bank: 0,
            mirroring,
        }
    }
}

impl Mapper for Cnrom {
    fn id(&self) -> u16 {
        3
    }

    fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        if addr >= cpu_mem::PRG_ROM_START {
            let offset = (addr - cpu_mem::PRG_ROM_START) as usize;
            Some(self.prg_rom[offset % self.prg_rom.len()])
        } else {
            None
        }
    }

    fn cpu_write(&mut self, addr: u16, data: u8) {
        if addr >= cpu_mem::PRG_ROM_START {
            self.chr_bank = (data & 0x03) % self.chr.bank_count() as u8;
            trace!(bank = self.chr_bank, "chr bank select");
        }
    }

    fn ppu_read(&mut self, addr: u16) -> Option<u8> {
        let base = self.chr_bank as usize * ppu_mem::CHR_BANK_SIZE;
        Some(self.chr.read(base + addr as usize))
    }

    fn ppu_write(&mut self, addr: u16, data: u8) {
        let base = self.chr_bank as usize * ppu_mem::CHR_BANK_SIZE;
        self.chr.write(base + addr as usize, data);
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn snapshot(&self) -> MapperSnapshot {
        MapperSnapshot::Cnrom {
            chr_bank: self.chr_bank,
        }
    }

    fn restore(&mut self, snapshot: &MapperSnapshot) -> bool {
        let MapperSnapshot::Cnrom { chr_bank } = snapshot else {
            return false;
        };
        self.chr_bank = chr_bank % self.chr.bank_count() as u8;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bank_chr() -> Vec<u8> {
        let mut chr = vec![0; 2 * ppu_mem::CHR_BANK_SIZE];
        chr[0] = 0x10;
        chr[ppu_mem::CHR_BANK_SIZE] = 0x20;
        chr
    }

    #[test]
    fn switches_chr_banks() {
        let prg = vec![0; cpu_mem::PRG_BANK_SIZE];
        let mut mapper = Cnrom::new(prg, two_bank_chr(), Mirroring::Horizontal);
        assert_eq!(mapper.ppu_read(0x0000), Some(0x10));
        mapper.cpu_write(0x8000, 1);
        assert_eq!(mapper.ppu_read(0x0000), Some(0x20));
    }

    #[test]
    fn bank_select_wraps_to_available_banks() {
        let prg = vec![0; cpu_mem::PRG_BANK_SIZE];
        let mut mapper = Cnrom::new(prg, two_bank_chr(), Mirroring::Horizontal);
        mapper.cpu_write(0x8000, 3);
        assert_eq!(mapper.ppu_read(0x0000), Some(0x20));
    }
}
