//! Mapper 2 (UxROM): 16 KiB switchable PRG window at `$8000`, last bank
//! fixed at `$C000`, CHR is almost always RAM.

use tracing::trace;

use crate::{
    cartridge::{
        header::Mirroring,
        mapper::{ChrStore, Mapper, MapperSnapshot},
    },
    memory::cpu as cpu_mem,
};

const FIXED_BANK_START: u16 = 0xC000;

#[derive(Debug, Clone)]
pub(crate) struct Uxrom {
    prg_rom: Vec<u8>,
    prg_banks: u8,
    prg_bank: u8,
    chr: ChrStore,
    mirroring: Mirroring,
}

impl Uxrom {
    pub(crate) fn new(prg: Vec<u8>, chr: Vec<u8>, mirroring: Mirroring) -> Self {
        let prg_banks = (prg.len() / cpu_mem::PRG_BANK_SIZE) as u8;
        Self {
            prg_rom: prg,
            prg_banks,
            prg_bank: 0,
            chr: ChrStore::new(chr),
            mirroring,
        }
    }

    fn bank_base(&self, bank: u8) -> usize {
        (bank as usize % self.prg_banks as usize) * cpu_mem::PRG_BANK_SIZE
    }
}

impl Mapper for Uxrom {
    fn id(&self) -> u16 {
        2
    }

    fn cpu_read(&mut self, addr: u16) -> Option<u8> {
        match addr {
            cpu_mem::PRG_ROM_START..FIXED_BANK_START => {
                let base = self.bank_base(self.prg_bank);
                Some(self.prg_rom[base + (addr - cpu_mem::PRG_ROM_START) as usize])
            }
            FIXED_BANK_START..=cpu_mem::CPU_ADDR_END => {
                let base = self.bank_base(self.prg_banks - 1);
                Some(self.prg_rom[base + (addr - FIXED_BANK_START) as usize])
            }
            _ => None,
        }
    }

    fn cpu_write(&mut self, addr: u16, data: u8) {
        if addr >= cpu_mem::PRG_ROM_START {
            self.prg_bank = (data & 0x0F) % self.prg_banks;
            trace!(bank = self.prg_bank, "prg bank select");
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
        MapperSnapshot::Uxrom {
            prg_bank: self.prg_bank,
            chr_ram: self.chr.ram_image(),
        }
    }

    fn restore(&mut self, snapshot: &MapperSnapshot) -> bool {
        let MapperSnapshot::Uxrom { prg_bank, chr_ram } = snapshot else {
            return false;
        };
        self.prg_bank = prg_bank % self.prg_banks;
        self.chr.load_ram_image(chr_ram);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_bank_prg() -> Vec<u8> {
        let mut prg = vec![0; 4 * cpu_mem::PRG_BANK_SIZE];
        for bank in 0..4 {
            prg[bank * cpu_mem::PRG_BANK_SIZE] = bank as u8 + 1;
        }
        prg
    }

    #[test]
    fn switches_low_window_and_fixes_high_window() {
        let mut mapper = Uxrom::new(four_bank_prg(), Vec::new(), Mirroring::Vertical);
        assert_eq!(mapper.cpu_read(0x8000), Some(1));
        assert_eq!(mapper.cpu_read(0xC000), Some(4));
        mapper.cpu_write(0x8000, 2);
        assert_eq!(mapper.cpu_read(0x8000), Some(3));
        assert_eq!(mapper.cpu_read(0xC000), Some(4));
    }

    #[test]
    fn bank_select_wraps_to_available_banks() {
        let mut mapper = Uxrom::new(four_bank_prg(), Vec::new(), Mirroring::Vertical);
        mapper.cpu_write(0xFFFF, 5);
        assert_eq!(mapper.cpu_read(0x8000), Some(2));
    }

    #[test]
    fn snapshot_roundtrip_restores_bank() {
        let mut mapper = Uxrom::new(four_bank_prg(), Vec::new(), Mirroring::Vertical);
        mapper.cpu_write(0x8000, 3);
        let snapshot = mapper.snapshot();
        mapper.cpu_write(0x8000, 0);
        assert!(mapper.restore(&snapshot));
        assert_eq!(mapper.cpu_read(0x8000), Some(4));
    }
}
