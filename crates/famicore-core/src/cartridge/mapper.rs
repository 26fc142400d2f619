//! Cartridge mapper abstraction.
//!
//! A mapper owns the PRG/CHR storage of the inserted cartridge and decodes
//! every access the CPU and PPU make into cartridge space. Reads return
//! `None` for unmapped addresses so the bus can substitute open-bus data.

use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};

use crate::{
    cartridge::header::Mirroring,
    error::CartridgeError,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
};

mod cnrom;
mod nrom;
mod uxrom;

pub(crate) use cnrom::Cnrom;
pub(crate) use nrom::Nrom;
pub(crate) use uxrom::Uxrom;

/// Serializable image of a mapper's mutable state.
///
/// ROM contents are intentionally absent: snapshots are only restored into
/// a console holding the same cartridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapperSnapshot {
    Nrom {
        prg_ram: Vec<u8>,
        chr_ram: Vec<u8>,
    },
    Uxrom {
        prg_bank: u8,
        chr_ram: Vec<u8>,
    },
    Cnrom {
        chr_bank: u8,
    },
}

/// Interface every mapper implements.
///
/// `cpu_read`/`ppu_read` return `None` when the address is not mapped by
/// this cartridge. Writes to unmapped or read-only regions are ignored.
pub trait Mapper: DynClone + std::fmt::Debug + Send {
    /// Mapper number this implementation services.
    fn id(&self) -> u16;

    /// CPU access in `$4020-$FFFF`.
    fn cpu_read(&mut self, addr: u16) -> Option<u8>;
    fn cpu_write(&mut self, addr: u16, data: u8);

    /// PPU access in `$0000-$1FFF`.
    fn ppu_read(&mut self, addr: u16) -> Option<u8>;
    fn ppu_write(&mut self, addr: u16, data: u8);

    /// Current nametable arrangement.
    fn mirroring(&self) -> Mirroring;

    /// Hook raised once per rendered scanline for mappers with counters.
    fn on_scanline_end(&mut self) {}

    fn snapshot(&self) -> MapperSnapshot;

    /// Applies a snapshot; returns `false` when the variant does not match
    /// this mapper.
    fn restore(&mut self, snapshot: &MapperSnapshot) -> bool;
}

dyn_clone::clone_trait_object!(Mapper);

/// Constructs the mapper registered for `mapper_id`.
///
/// `prg` must be a non-empty multiple of 16 KiB. `chr` must be a multiple
/// of 8 KiB; an empty `chr` provisions 8 KiB of CHR RAM instead.
pub(crate) fn build_mapper(
    mapper_id: u16,
    prg: Vec<u8>,
    chr: Vec<u8>,
    mirroring: Mirroring,
) -> Result<Box<dyn Mapper>, CartridgeError> {
    if prg.is_empty() || !prg.len().is_multiple_of(cpu_mem::PRG_BANK_SIZE) {
        return Err(CartridgeError::BadBankSize {
            section: "PRG ROM",
            bank_size: cpu_mem::PRG_BANK_SIZE,
            actual: prg.len(),
        });
    }
    if !chr.len().is_multiple_of(ppu_mem::CHR_BANK_SIZE) {
        return Err(CartridgeError::BadBankSize {
            section: "CHR ROM",
            bank_size: ppu_mem::CHR_BANK_SIZE,
            actual: chr.len(),
        });
    }
    match mapper_id {
        0 => Ok(Box::new(Nrom::new(prg, chr, mirroring))),
        2 => Ok(Box::new(Uxrom::new(prg, chr, mirroring))),
        3 => Ok(Box::new(Cnrom::new(prg, chr, mirroring))),
        _ => Err(CartridgeError::UnsupportedMapper { mapper_id }),
    }
}

/// CHR storage that is ROM when the image provides data and RAM otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChrStore {
    data: Vec<u8>,
    writable: bool,
}

impl ChrStore {
    pub(crate) fn new(chr: Vec<u8>) -> Self {
        if chr.is_empty() {
            Self {
                data: vec![0; ppu_mem::CHR_BANK_SIZE],
                writable: true,
            }
        } else {
            Self {
                data: chr,
                writable: false,
            }
        }
    }

    pub(crate) fn read(&self, index: usize) -> u8 {
        self.data[index % self.data.len()]
    }

    pub(crate) fn write(&mut self, index: usize, data: u8) {
        if self.writable {
            let len = self.data.len();
            self.data[index % len] = data;
        }
    }

    pub(crate) fn bank_count(&self) -> usize {
        self.data.len() / ppu_mem::CHR_BANK_SIZE
    }

    pub(crate) fn ram_image(&self) -> Vec<u8> {
        if self.writable {
            self.data.clone()
        } else {
            Vec::new()
        }
    }

    pub(crate) fn load_ram_image(&mut self, image: &[u8]) {
        if self.writable && image.len() == self.data.len() {
            self.data.copy_from_slice(image);
        }
    }
}
