//! CPU address space dispatch.
//!
//! `CpuBus` borrows the console's components for the duration of one CPU
//! instruction, routing every read and write to internal RAM, the PPU and
//! APU registers, the controller ports, or the cartridge. Unmapped reads
//! return the last value seen on the data bus.

use crate::{
    apu::Apu,
    cartridge::Cartridge,
    controller::Controller,
    memory::{apu as apu_mem, cpu as cpu_mem},
    ppu::Ppu,
};

pub(crate) struct CpuBus<'a> {
    pub(crate) ram: &'a mut [u8; cpu_mem::INTERNAL_RAM_SIZE],
    pub(crate) ppu: &'a mut Ppu,
    pub(crate) apu: &'a mut Apu,
    pub(crate) cartridge: &'a mut Option<Cartridge>,
    pub(crate) controllers: &'a mut [Controller; 2],
    /// Page written to `$4014`; the scheduler runs the DMA transfer.
    pub(crate) oam_dma_request: &'a mut Option<u8>,
    pub(crate) open_bus: &'a mut u8,
}

impl CpuBus<'_> {
    pub(crate) fn read(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize]
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => match self.cartridge {
                Some(cart) => self.ppu.read_register(cart, addr),
                None => *self.open_bus,
            },
            cpu_mem::APU_STATUS => self.apu.read_status(),
            cpu_mem::CONTROLLER_PORT_1 => self.controllers[0].read(),
            cpu_mem::CONTROLLER_PORT_2 => self.controllers[1].read(),
            // Write-only I/O and the disabled test-mode window.
            cpu_mem::APU_REGISTER_BASE..=cpu_mem::APU_REGISTER_END
            | cpu_mem::OAM_DMA
            | cpu_mem::TEST_MODE_BASE..=cpu_mem::TEST_MODE_END => *self.open_bus,
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => self
                .cartridge
                .as_mut()
                .and_then(|cart| cart.cpu_read(addr))
                .unwrap_or(*self.open_bus),
        };
        *self.open_bus = value;
        value
    }

    pub(crate) fn write(&mut self, addr: u16, data: u8) {
        *self.open_bus = data;
        match addr {
            0x0000..=cpu_mem::INTERNAL_RAM_MIRROR_END => {
                self.ram[(addr & cpu_mem::INTERNAL_RAM_MASK) as usize] = data;
            }
            cpu_mem::PPU_REGISTER_BASE..=cpu_mem::PPU_REGISTER_END => {
                if let Some(cart) = self.cartridge {
                    self.ppu.write_register(cart, addr, data);
                }
            }
            cpu_mem::OAM_DMA => *self.oam_dma_request = Some(data),
            cpu_mem::CONTROLLER_PORT_1 => {
                // The strobe line is wired to both ports.
                self.controllers[0].write_strobe(data);
                self.controllers[1].write_strobe(data);
            }
            cpu_mem::APU_REGISTER_BASE..=cpu_mem::APU_REGISTER_END
            | cpu_mem::APU_STATUS
            | cpu_mem::CONTROLLER_PORT_2 => {
                if let Some(register) = apu_mem::Register::from_cpu_addr(addr) {
                    self.apu.write_register(register, data);
                }
            }
            cpu_mem::TEST_MODE_BASE..=cpu_mem::TEST_MODE_END => {}
            cpu_mem::CARTRIDGE_SPACE_BASE..=cpu_mem::CPU_ADDR_END => {
                if let Some(cart) = self.cartridge {
                    cart.cpu_write(addr, data);
                }
            }
        }
    }

    /// Little-endian 16-bit read, used for interrupt vectors.
    pub(crate) fn read_u16(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }
}
