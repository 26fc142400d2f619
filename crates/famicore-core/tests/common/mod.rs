#![allow(dead_code)]

use anyhow::{Context, Result};
use famicore_core::{Console, Mirroring, PpuSnapshot};

pub const PRG_BANK: usize = 0x4000;
pub const RESET_TARGET: u16 = 0x8000;

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
}

/// Builds a 16 KiB PRG bank with `program` at `$8000` and all vectors
/// pointing at sensible defaults: reset to the program, NMI and IRQ to an
/// RTI placed just below the vector table.
pub fn prg_with_program(program: &[u8]) -> Vec<u8> {
    let mut prg = vec![0xEA; PRG_BANK]; // NOP filler
    prg[..program.len()].copy_from_slice(program);
    // RTI for both interrupt handlers.
    prg[0x3FF0] = 0x40;
    set_vectors(&mut prg, 0xFFF0, RESET_TARGET, 0xFFF0);
    prg
}

/// Writes the NMI/reset/IRQ vectors into the last bank of a PRG image.
pub fn set_vectors(prg: &mut [u8], nmi: u16, reset: u16, irq: u16) {
    let len = prg.len();
    prg[len - 6] = nmi as u8;
    prg[len - 5] = (nmi >> 8) as u8;
    prg[len - 4] = reset as u8;
    prg[len - 3] = (reset >> 8) as u8;
    prg[len - 2] = irq as u8;
    prg[len - 1] = (irq >> 8) as u8;
}

/// Console with an NROM cartridge running `program` from the reset vector.
pub fn console_with_program(program: &[u8]) -> Result<Console> {
    let mut console = Console::new();
    console
        .load_cartridge(prg_with_program(program), Vec::new(), 0, Mirroring::Horizontal)
        .context("loading test cartridge")?;
    Ok(console)
}

/// Overrides the NMI vector of a fresh program image.
pub fn console_with_program_and_nmi(program: &[u8], nmi: u16) -> Result<Console> {
    let mut prg = prg_with_program(program);
    set_vectors(&mut prg, nmi, RESET_TARGET, 0xFFF0);
    let mut console = Console::new();
    console
        .load_cartridge(prg, Vec::new(), 0, Mirroring::Horizontal)
        .context("loading test cartridge")?;
    Ok(console)
}

/// Absolute dot index of a beam position, valid within a single frame.
pub fn beam_dots(snapshot: &PpuSnapshot) -> u64 {
    snapshot.scanline as u64 * 341 + snapshot.dot as u64
}

/// CPU cycles elapsed between two beam positions on the same frame.
pub fn cpu_cycles_between(before: &PpuSnapshot, after: &PpuSnapshot) -> u64 {
    (beam_dots(after) - beam_dots(before)) / 3
}
