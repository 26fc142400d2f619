//! Audio processor: two pulses, triangle, noise, DMC, and the frame
//! sequencer, mixed through the console's non-linear DAC curves.
//!
//! `tick` runs once per CPU cycle and pushes one mixed `f32` sample into
//! the frame's audio buffer; the host resamples to its output rate.

use serde::{Deserialize, Serialize};

use crate::{
    apu::{
        dmc::Dmc,
        frame_counter::{FrameClocks, FrameCounter},
        noise::Noise,
        pulse::Pulse,
        tables::{mix_pulses, mix_tnd},
        triangle::Triangle,
    },
    memory::apu::Register,
};

pub(crate) mod dmc;
pub(crate) mod envelope;
pub(crate) mod frame_counter;
pub(crate) mod length_counter;
pub(crate) mod noise;
pub(crate) mod pulse;
pub(crate) mod tables;
pub(crate) mod triangle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Apu {
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,
    frame_counter: FrameCounter,
    /// Pulse and noise timers run at half the CPU clock.
    odd_cycle: bool,
    #[serde(skip)]
    samples: Vec<f32>,
}

impl Apu {
    pub(crate) fn new() -> Self {
        Self {
            pulse1: Pulse::new(false),
            pulse2: Pulse::new(true),
            triangle: Triangle::default(),
            noise: Noise::default(),
            dmc: Dmc::default(),
            frame_counter: FrameCounter::default(),
            odd_cycle: false,
            samples: Vec::new(),
        }
    }

    pub(crate) fn power_on(&mut self) {
        *self = Self::new();
    }

    /// Warm reset: channels silenced, frame counter mode preserved by
    /// hardware but the sequence restarts.
    pub(crate) fn reset(&mut self) {
        self.write_status(0);
        self.odd_cycle = false;
        self.samples.clear();
    }

    /// Advances one CPU cycle.
    pub(crate) fn tick(&mut self) {
        let clocks = self.frame_counter.clock();
        self.apply_frame_clocks(clocks);

        self.triangle.clock_timer();
        self.dmc.clock_timer();
        self.odd_cycle = !self.odd_cycle;
        if self.odd_cycle {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
            self.noise.clock_timer();
        }

        let sample = mix_pulses(self.pulse1.output(), self.pulse2.output())
            + mix_tnd(self.triangle.output(), self.noise.output(), self.dmc.output());
        self.samples.push(sample);
    }

    fn apply_frame_clocks(&mut self, clocks: FrameClocks) {
        if clocks.quarter {
            self.pulse1.envelope.clock();
            self.pulse2.envelope.clock();
            self.noise.envelope.clock();
            self.triangle.clock_linear();
        }
        if clocks.half {
            self.pulse1.length.clock();
            self.pulse2.length.clock();
            self.triangle.length.clock();
            self.noise.length.clock();
            self.pulse1.clock_sweep();
            self.pulse2.clock_sweep();
        }
    }

    /// Drains the samples accumulated since the last call.
    pub(crate) fn take_samples(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.samples)
    }

    /// IRQ request level: frame sequencer or DMC completion.
    pub(crate) fn irq_line(&self) -> bool {
        self.frame_counter.irq_flag() || self.dmc.irq_flag()
    }

    /// CPU address the DMC is waiting to fetch, if any.
    pub(crate) fn dmc_pending_fetch(&self) -> Option<u16> {
        self.dmc.pending_fetch()
    }

    pub(crate) fn dmc_supply_sample(&mut self, data: u8) {
        self.dmc.supply_sample(data);
    }

    /// `$4015` read: channel activity and IRQ flags. Clears the frame IRQ.
    pub(crate) fn read_status(&mut self) -> u8 {
        let mut status = 0u8;
        status |= self.pulse1.length.active() as u8;
        status |= (self.pulse2.length.active() as u8) << 1;
        status |= (self.triangle.length.active() as u8) << 2;
        status |= (self.noise.length.active() as u8) << 3;
        status |= (self.dmc.active() as u8) << 4;
        status |= (self.frame_counter.irq_flag() as u8) << 6;
        status |= (self.dmc.irq_flag() as u8) << 7;
        self.frame_counter.clear_irq();
        status
    }

    fn write_status(&mut self, data: u8) {
        self.pulse1.length.set_enabled(data & 0x01 != 0);
        self.pulse2.length.set_enabled(data & 0x02 != 0);
        self.triangle.length.set_enabled(data & 0x04 != 0);
        self.noise.length.set_enabled(data & 0x08 != 0);
        self.dmc.set_enabled(data & 0x10 != 0);
        self.dmc.clear_irq();
    }

    /// Dispatches a CPU write to `$4000-$4017` (minus `$4014`/`$4016`).
    pub(crate) fn write_register(&mut self, register: Register, data: u8) {
        match register {
            Register::Pulse1Control => self.pulse1.write_control(data),
            Register::Pulse1Sweep => self.pulse1.write_sweep(data),
            Register::Pulse1TimerLow => self.pulse1.write_timer_low(data),
            Register::Pulse1TimerHigh => self.pulse1.write_timer_high(data),
            Register::Pulse2Control => self.pulse2.write_control(data),
            Register::Pulse2Sweep => self.pulse2.write_sweep(data),
            Register::Pulse2TimerLow => self.pulse2.write_timer_low(data),
            Register::Pulse2TimerHigh => self.pulse2.write_timer_high(data),
            Register::TriangleControl => self.triangle.write_control(data),
            Register::TriangleTimerLow => self.triangle.write_timer_low(data),
            Register::TriangleTimerHigh => self.triangle.write_timer_high(data),
            Register::NoiseControl => self.noise.write_control(data),
            Register::NoiseModeAndPeriod => self.noise.write_mode(data),
            Register::NoiseLength => self.noise.write_length(data),
            Register::DmcControl => self.dmc.write_control(data),
            Register::DmcDirectLoad => self.dmc.write_direct_load(data),
            Register::DmcSampleAddress => self.dmc.write_sample_address(data),
            Register::DmcSampleLength => self.dmc.write_sample_length(data),
            Register::Status => self.write_status(data),
            Register::FrameCounter => {
                let clocks = self.frame_counter.write(data);
                self.apply_frame_clocks(clocks);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reflects_length_counters() {
        let mut apu = Apu::new();
        apu.write_register(Register::Status, 0x01);
        apu.write_register(Register::Pulse1TimerHigh, 0x08);
        assert_eq!(apu.read_status() & 0x0F, 0x01);
    }

    #[test]
    fn disabling_a_channel_clears_its_status_bit() {
        let mut apu = Apu::new();
        apu.write_register(Register::Status, 0x04);
        apu.write_register(Register::TriangleTimerHigh, 0x08);
        assert_eq!(apu.read_status() & 0x04, 0x04);
        apu.write_register(Register::Status, 0x00);
        assert_eq!(apu.read_status() & 0x04, 0x00);
    }

    #[test]
    fn status_read_clears_the_frame_irq() {
        let mut apu = Apu::new();
        for _ in 0..29830 {
            apu.tick();
        }
        assert!(apu.irq_line());
        let status = apu.read_status();
        assert_eq!(status & 0x40, 0x40);
        assert!(!apu.irq_line());
    }

    #[test]
    fn produces_one_sample_per_cpu_cycle() {
        let mut apu = Apu::new();
        for _ in 0..100 {
            apu.tick();
        }
        assert_eq!(apu.take_samples().len(), 100);
        assert!(apu.take_samples().is_empty());
    }
}
