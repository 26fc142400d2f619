//! Delta modulation channel.
//!
//! Sample bytes come from CPU memory; the channel raises a fetch request
//! that the scheduler services between instructions, so playback does not
//! model the hardware's RDY-line stalls.

use serde::{Deserialize, Serialize};

use crate::apu::tables::DMC_RATES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Dmc {
    irq_enable: bool,
    loop_flag: bool,
    timer_period: u16,
    timer: u16,
    output_level: u8,
    sample_address: u16,
    sample_length: u16,
    current_address: u16,
    bytes_remaining: u16,
    shift_register: u8,
    bits_remaining: u8,
    silence: bool,
    sample_buffer: Option<u8>,
    irq_flag: bool,
}

impl Default for Dmc {
    fn default() -> Self {
        Self {
            irq_enable: false,
            loop_flag: false,
            timer_period: DMC_RATES[0],
            timer: 0,
            output_level: 0,
            sample_address: 0xC000,
            sample_length: 1,
            current_address: 0xC000,
            bytes_remaining: 0,
            shift_register: 0,
            bits_remaining: 8,
            silence: true,
            sample_buffer: None,
            irq_flag: false,
        }
    }
}

impl Dmc {
    /// `$4010`: IRQ enable, loop, rate index.
    pub(crate) fn write_control(&mut self, data: u8) {
        self.irq_enable = data & 0x80 != 0;
        self.loop_flag = data & 0x40 != 0;
        self.timer_period = DMC_RATES[(data & 0x0F) as usize];
        if !self.irq_enable {
            self.irq_flag = false;
        }
    }

    /// `$4011`: direct 7-bit DAC load.
    pub(crate) fn write_direct_load(&mut self, data: u8) {
        self.output_level = data & 0x7F;
    }

    /// `$4012`: sample start = `$C000 + data * 64`.
    pub(crate) fn write_sample_address(&mut self, data: u8) {
        self.sample_address = 0xC000 + (data as u16) * 64;
    }

    /// `$4013`: sample length = `data * 16 + 1` bytes.
    pub(crate) fn write_sample_length(&mut self, data: u8) {
        self.sample_length = (data as u16) * 16 + 1;
    }

    /// `$4015` bit 4.
    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.restart_sample();
        }
    }

    fn restart_sample(&mut self) {
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    /// Address of the next sample byte the channel is waiting for.
    pub(crate) fn pending_fetch(&self) -> Option<u16> {
        if self.sample_buffer.is_none() && self.bytes_remaining > 0 {
            Some(self.current_address)
        } else {
            None
        }
    }

    /// Delivers the fetched sample byte and advances the reader.
    pub(crate) fn supply_sample(&mut self, data: u8) {
        if self.bytes_remaining == 0 {
            return;
        }
        self.sample_buffer = Some(data);
        self.current_address = if self.current_address == 0xFFFF {
            0x8000
        } else {
            self.current_address + 1
        };
        self.bytes_remaining -= 1;
        if self.bytes_remaining == 0 {
            if self.loop_flag {
                self.restart_sample();
            } else if self.irq_enable {
                self.irq_flag = true;
            }
        }
    }

    /// Timer clock, once per CPU cycle.
    pub(crate) fn clock_timer(&mut self) {
        if self.timer > 0 {
            self.timer -= 1;
            return;
        }
        self.timer = self.timer_period.saturating_sub(1);
        if !self.silence {
            if self.shift_register & 0x01 != 0 {
                if self.output_level <= 125 {
                    self.output_level += 2;
                }
            } else if self.output_level >= 2 {
                self.output_level -= 2;
            }
        }
        self.shift_register >>= 1;
        self.bits_remaining -= 1;
        if self.bits_remaining == 0 {
            self.bits_remaining = 8;
            match self.sample_buffer.take() {
                Some(byte) => {
                    self.silence = false;
                    self.shift_register = byte;
                }
                None => self.silence = true,
            }
        }
    }

    pub(crate) fn active(&self) -> bool {
        self.bytes_remaining > 0
    }

    pub(crate) fn irq_flag(&self) -> bool {
        self.irq_flag
    }

    pub(crate) fn clear_irq(&mut self) {
        self.irq_flag = false;
    }

    pub(crate) fn output(&self) -> u8 {
        self.output_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_load_clamps_to_seven_bits() {
        let mut dmc = Dmc::default();
        dmc.write_direct_load(0xFF);
        assert_eq!(dmc.output(), 0x7F);
    }

    #[test]
    fn enabling_with_empty_sample_restarts_the_reader() {
        let mut dmc = Dmc::default();
        dmc.write_sample_address(0x02);
        dmc.write_sample_length(0x01);
        dmc.set_enabled(true);
        assert_eq!(dmc.pending_fetch(), Some(0xC080));
        assert!(dmc.active());
    }

    #[test]
    fn finishing_a_sample_raises_irq_when_enabled() {
        let mut dmc = Dmc::default();
        dmc.write_control(0x8F);
        dmc.write_sample_length(0x00); // one byte
        dmc.set_enabled(true);
        dmc.supply_sample(0xAA);
        assert!(dmc.irq_flag());
        assert!(!dmc.active());
    }
}
