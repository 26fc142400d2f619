//! Cycle-accurate core for the classic 8-bit console: 6502 CPU, picture
//! processor, audio processor, and pluggable cartridge mappers, driven in
//! lock step by a frame scheduler.
//!
//! The CPU steps one instruction at a time; after each instruction the PPU
//! catches up three dots per CPU cycle and the APU one step per cycle, so
//! register reads and writes land on the exact dot the hardware would see
//! them. [`Console::run_frame`] runs the loop until the PPU reports a frame
//! boundary and hands back the framebuffer, the audio samples, and any
//! faults hit along the way.
//!
//! ```no_run
//! use famicore_core::Console;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rom = std::fs::read("game.nes")?;
//! let mut console = Console::new();
//! console.load_ines(&rom)?;
//! loop {
//!     let frame = console.run_frame();
//!     // hand frame.framebuffer / frame.audio_samples to the host
//! #   break;
//! }
//! # Ok(())
//! # }
//! ```

use tracing::{info, warn};

use crate::{
    apu::Apu,
    bus::CpuBus,
    cartridge::Cartridge,
    cpu::Cpu,
    memory::{cpu as cpu_mem, ppu as ppu_mem},
    ppu::Ppu,
    state::{CartridgeState, ConsoleState},
};

pub mod apu;
mod bus;
pub mod cartridge;
pub mod controller;
pub mod cpu;
pub mod error;
pub mod memory;
pub mod ppu;
pub(crate) mod state;

pub use cartridge::header::Mirroring;
pub use controller::{Button, Controller};
pub use cpu::{CpuSnapshot, OpcodeFault};
pub use error::{CartridgeError, StateError};
pub use ppu::PpuSnapshot;

/// What the scheduler does when the CPU fetches a JAM or unstable opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Record the fault, treat the opcode as a one-cycle no-op, keep going.
    #[default]
    Continue,
    /// Record the fault and freeze the CPU; video and audio keep running.
    Halt,
}

/// Everything produced by one emulated frame.
#[derive(Debug, Clone)]
pub struct FrameResult {
    /// Master-palette indices, row-major 256x240.
    pub framebuffer: Vec<u8>,
    /// One mixed sample per CPU cycle, in `[0.0, 1.0)`.
    pub audio_samples: Vec<f32>,
    pub cpu: CpuSnapshot,
    pub ppu: PpuSnapshot,
    /// JAM/unstable opcode fetches seen this frame.
    pub faults: Vec<OpcodeFault>,
}

/// The assembled console.
#[derive(Debug, Clone)]
pub struct Console {
    cpu: Cpu,
    ppu: Ppu,
    apu: Apu,
    ram: [u8; cpu_mem::INTERNAL_RAM_SIZE],
    cartridge: Option<Cartridge>,
    controllers: [Controller; 2],
    oam_dma_request: Option<u8>,
    open_bus: u8,
    cycles: u64,
    fault_policy: FaultPolicy,
    frame_faults: Vec<OpcodeFault>,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            ppu: Ppu::new(),
            apu: Apu::new(),
            ram: [0; cpu_mem::INTERNAL_RAM_SIZE],
            cartridge: None,
            controllers: [Controller::new(), Controller::new()],
            oam_dma_request: None,
            open_bus: 0,
            cycles: 0,
            fault_policy: FaultPolicy::default(),
            frame_faults: Vec::new(),
        }
    }

    pub fn set_fault_policy(&mut self, policy: FaultPolicy) {
        self.fault_policy = policy;
    }

    /// Inserts a cartridge built from raw PRG/CHR images and powers on.
    pub fn load_cartridge(
        &mut self,
        prg: Vec<u8>,
        chr: Vec<u8>,
        mapper_id: u16,
        mirroring: Mirroring,
    ) -> Result<(), CartridgeError> {
        let cartridge = Cartridge::from_parts(prg, chr, mapper_id, mirroring)?;
        self.cartridge = Some(cartridge);
        self.power_on();
        Ok(())
    }

    /// Inserts a cartridge from an iNES image and powers on.
    pub fn load_ines(&mut self, image: &[u8]) -> Result<(), CartridgeError> {
        let cartridge = Cartridge::from_ines(image)?;
        self.cartridge = Some(cartridge);
        self.power_on();
        Ok(())
    }

    /// Cold boot: clears RAM and all chip state, then fetches the reset
    /// vector.
    pub fn power_on(&mut self) {
        self.ram = [0; cpu_mem::INTERNAL_RAM_SIZE];
        self.ppu.power_on();
        self.apu.power_on();
        self.oam_dma_request = None;
        self.open_bus = 0;
        self.cycles = 0;
        self.frame_faults.clear();
        let Self {
            cpu,
            ppu,
            apu,
            ram,
            cartridge,
            controllers,
            oam_dma_request,
            open_bus,
            ..
        } = self;
        let mut bus = CpuBus {
            ram,
            ppu,
            apu,
            cartridge,
            controllers,
            oam_dma_request,
            open_bus,
        };
        cpu.power_on(&mut bus);
        info!(pc = format_args!("{:#06X}", self.cpu.snapshot().pc), "power on");
    }

    /// Warm reset: RAM and VRAM keep their contents.
    pub fn reset(&mut self) {
        self.ppu.reset();
        self.apu.reset();
        self.oam_dma_request = None;
        self.frame_faults.clear();
        let Self {
            cpu,
            ppu,
            apu,
            ram,
            cartridge,
            controllers,
            oam_dma_request,
            open_bus,
            ..
        } = self;
        let mut bus = CpuBus {
            ram,
            ppu,
            apu,
            cartridge,
            controllers,
            oam_dma_request,
            open_bus,
        };
        cpu.reset(&mut bus);
        info!(pc = format_args!("{:#06X}", self.cpu.snapshot().pc), "reset");
    }

    /// Replaces the full button state of one controller (bit 0 = A).
    pub fn set_controller_state(&mut self, port: usize, mask: u8) {
        if let Some(pad) = self.controllers.get_mut(port) {
            pad.set_state(mask);
        }
    }

    pub fn set_button(&mut self, port: usize, button: Button, pressed: bool) {
        if let Some(pad) = self.controllers.get_mut(port) {
            pad.set_button(button, pressed);
        }
    }

    pub fn cpu_snapshot(&self) -> CpuSnapshot {
        self.cpu.snapshot()
    }

    pub fn ppu_snapshot(&self) -> PpuSnapshot {
        self.ppu.snapshot()
    }

    /// Framebuffer expanded to RGB888, three bytes per pixel.
    pub fn framebuffer_rgb(&self) -> Vec<u8> {
        self.ppu.render_rgb()
    }

    /// Reads a CPU address without side effects on the mapped hardware
    /// beyond normal bus behavior. Intended for tests and debuggers.
    pub fn peek_ram(&self, addr: u16) -> u8 {
        self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize]
    }

    /// Runs the console until the PPU signals the next frame boundary.
    pub fn run_frame(&mut self) -> FrameResult {
        if self.cartridge.is_none() {
            warn!("run_frame called with no cartridge inserted");
            return self.frame_result();
        }
        loop {
            if self.cpu.halted() {
                self.advance_devices(1);
            } else {
                self.step_internal();
            }
            if self.ppu.take_frame_complete() {
                break;
            }
        }
        self.frame_result()
    }

    /// Executes a single CPU instruction (with device catch-up) and reports
    /// any fault it raised.
    pub fn step_instruction(&mut self) -> Option<OpcodeFault> {
        if self.cpu.halted() {
            self.advance_devices(1);
            return None;
        }
        self.step_internal()
    }

    fn frame_result(&mut self) -> FrameResult {
        FrameResult {
            framebuffer: self.ppu.framebuffer().to_vec(),
            audio_samples: self.apu.take_samples(),
            cpu: self.cpu.snapshot(),
            ppu: self.ppu.snapshot(),
            faults: std::mem::take(&mut self.frame_faults),
        }
    }

    fn step_internal(&mut self) -> Option<OpcodeFault> {
        let step = {
            let Self {
                cpu,
                ppu,
                apu,
                ram,
                cartridge,
                controllers,
                oam_dma_request,
                open_bus,
                ..
            } = self;
            let mut bus = CpuBus {
                ram,
                ppu,
                apu,
                cartridge,
                controllers,
                oam_dma_request,
                open_bus,
            };
            cpu.step(&mut bus)
        };

        if let Some(fault) = step.fault {
            warn!(
                pc = format_args!("{:#06X}", fault.pc),
                opcode = format_args!("{:#04X}", fault.opcode),
                "jam opcode fetched"
            );
            self.frame_faults.push(fault);
            if self.fault_policy == FaultPolicy::Halt {
                self.cpu.halt();
            }
        }

        let mut cycles = step.cycles as u64;
        if let Some(page) = self.oam_dma_request.take() {
            // Parity is judged on the cycle the $4014 write lands.
            cycles += self.run_oam_dma(page, self.cycles + cycles);
        }
        self.advance_devices(cycles);
        step.fault
    }

    /// Copies one 256-byte page into OAM; costs 513 cycles, 514 when the
    /// write lands on an odd CPU cycle.
    fn run_oam_dma(&mut self, page: u8, start_cycle: u64) -> u64 {
        let stall = 513 + (start_cycle & 1);
        let base = (page as u16) << 8;
        for offset in 0..256u16 {
            let data = {
                let Self {
                    cpu: _,
                    ppu,
                    apu,
                    ram,
                    cartridge,
                    controllers,
                    oam_dma_request,
                    open_bus,
                    ..
                } = self;
                let mut bus = CpuBus {
                    ram,
                    ppu,
                    apu,
                    cartridge,
                    controllers,
                    oam_dma_request,
                    open_bus,
                };
                bus.read(base + offset)
            };
            self.ppu.oam_dma_write(data);
        }
        stall
    }

    /// Runs the PPU and APU for `cycles` CPU cycles and resamples the
    /// interrupt lines.
    fn advance_devices(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.cycles += 1;
            self.apu.tick();
            if let Some(cart) = &mut self.cartridge {
                for _ in 0..3 {
                    self.ppu.tick(cart);
                }
            }
            self.cpu.set_nmi_line(self.ppu.nmi_line());
            self.cpu.set_irq_line(self.apu.irq_line());
        }
        self.service_dmc();
    }

    /// Feeds the DMC sample reader between instructions instead of
    /// modelling its RDY-line stalls.
    fn service_dmc(&mut self) {
        if let Some(addr) = self.apu.dmc_pending_fetch() {
            let data = {
                let Self {
                    cpu: _,
                    ppu,
                    apu,
                    ram,
                    cartridge,
                    controllers,
                    oam_dma_request,
                    open_bus,
                    ..
                } = self;
                let mut bus = CpuBus {
                    ram,
                    ppu,
                    apu,
                    cartridge,
                    controllers,
                    oam_dma_request,
                    open_bus,
                };
                bus.read(addr)
            };
            self.apu.dmc_supply_sample(data);
        }
    }

    /// Captures the complete console state as a versioned byte blob.
    pub fn serialize_state(&self) -> Result<Vec<u8>, StateError> {
        let snapshot = ConsoleState {
            ram: self.ram.to_vec(),
            cpu: self.cpu.state(),
            ppu: self.ppu.state(),
            apu: self.apu.clone(),
            controllers: self.controllers,
            open_bus: self.open_bus,
            oam_dma_request: self.oam_dma_request,
            cycles: self.cycles,
            cartridge: self.cartridge.as_ref().map(|cart| CartridgeState {
                mapper_id: cart.mapper_id(),
                mapper: cart.snapshot(),
            }),
        };
        state::encode(&snapshot)
    }

    /// Restores a snapshot taken with the same cartridge. All validation
    /// happens before any mutation, so a failed restore leaves the console
    /// untouched.
    pub fn deserialize_state(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        let snapshot = state::decode(bytes)?;
        let sections = [
            ("RAM", snapshot.ram.len(), self.ram.len()),
            ("OAM", snapshot.ppu.oam.len(), ppu_mem::OAM_SIZE),
            ("CIRAM", snapshot.ppu.ciram.len(), ppu_mem::CIRAM_SIZE),
            ("palette RAM", snapshot.ppu.palette.len(), ppu_mem::PALETTE_RAM_SIZE),
            ("framebuffer", snapshot.ppu.framebuffer.len(), ppu_mem::FRAME_PIXELS),
        ];
        for (section, actual, expected) in sections {
            if actual != expected {
                return Err(StateError::BadLength { section });
            }
        }

        let restored_cartridge = match (&self.cartridge, &snapshot.cartridge) {
            (None, None) => None,
            (Some(cart), Some(cart_state)) => {
                if cart.mapper_id() != cart_state.mapper_id {
                    return Err(StateError::MapperMismatch {
                        expected: cart.mapper_id(),
                        actual: cart_state.mapper_id,
                    });
                }
                let mut trial = cart.clone();
                if !trial.restore(&cart_state.mapper) {
                    return Err(StateError::MapperMismatch {
                        expected: cart.mapper_id(),
                        actual: cart_state.mapper_id,
                    });
                }
                Some(trial)
            }
            _ => return Err(StateError::CartridgeMismatch),
        };

        self.ram.copy_from_slice(&snapshot.ram);
        self.cpu.apply_state(&snapshot.cpu);
        self.ppu.apply_state(&snapshot.ppu);
        self.apu = snapshot.apu;
        self.controllers = snapshot.controllers;
        self.open_bus = snapshot.open_bus;
        self.oam_dma_request = snapshot.oam_dma_request;
        self.cycles = snapshot.cycles;
        self.cartridge = restored_cartridge;
        self.frame_faults.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_rejects_truncated_memory_sections() {
        let mut console = Console::new();
        let saved = console.serialize_state().unwrap();
        let before = console.cpu_snapshot();

        let mut snapshot = state::decode(&saved).unwrap();
        snapshot.ppu.oam.truncate(10);
        let tampered = state::encode(&snapshot).unwrap();
        assert!(matches!(
            console.deserialize_state(&tampered),
            Err(StateError::BadLength { section: "OAM" })
        ));

        let mut snapshot = state::decode(&saved).unwrap();
        snapshot.ppu.ciram.truncate(3);
        let tampered = state::encode(&snapshot).unwrap();
        assert!(matches!(
            console.deserialize_state(&tampered),
            Err(StateError::BadLength { section: "CIRAM" })
        ));

        // Rejected restores leave the console untouched.
        assert_eq!(console.cpu_snapshot(), before);
    }
}
