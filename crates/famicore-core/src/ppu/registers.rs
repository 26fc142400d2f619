//! CPU-visible PPU register images and the internal scroll registers.

pub(crate) mod control;
pub(crate) mod mask;
pub(crate) mod status;
pub(crate) mod vram_addr;

pub(crate) use control::Control;
pub(crate) use mask::Mask;
pub(crate) use status::PpuStatus;
pub(crate) use vram_addr::VramAddr;
