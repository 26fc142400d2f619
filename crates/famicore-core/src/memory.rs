//! Shared definitions for the console memory map.
//!
//! Keeping every hardware address in one place prevents magic numbers from
//! leaking into the dispatch logic and makes the bus decoding auditable
//! against the original console documentation.

/// CPU memory map details.
pub mod cpu {
    /// First address of the hardware stack page.
    pub const STACK_PAGE: u16 = 0x0100;

    /// NMI vector (`$FFFA-$FFFB`).
    pub const NMI_VECTOR: u16 = 0xFFFA;
    /// Reset vector (`$FFFC-$FFFD`).
    pub const RESET_VECTOR: u16 = 0xFFFC;
    /// IRQ/BRK vector (`$FFFE-$FFFF`).
    pub const IRQ_VECTOR: u16 = 0xFFFE;

    /// Size of the CPU internal RAM block (2 KiB mirrored through `$1FFF`).
    pub const INTERNAL_RAM_SIZE: usize = 0x0800;
    /// Mask applied to mirror CPU RAM accesses within `$0000-$1FFF`.
    pub const INTERNAL_RAM_MASK: u16 = (INTERNAL_RAM_SIZE as u16) - 1;
    /// Last mirrored internal RAM address visible to the CPU.
    pub const INTERNAL_RAM_MIRROR_END: u16 = 0x1FFF;

    /// First CPU address mapped to the PPU register mirror.
    pub const PPU_REGISTER_BASE: u16 = 0x2000;
    /// Last CPU address mirrored to the PPU register set.
    pub const PPU_REGISTER_END: u16 = 0x3FFF;

    /// First CPU-visible APU channel register.
    pub const APU_REGISTER_BASE: u16 = 0x4000;
    /// Final APU channel register before the DMA/controller bridge.
    pub const APU_REGISTER_END: u16 = 0x4013;
    /// OAM DMA trigger register (`$4014`).
    pub const OAM_DMA: u16 = 0x4014;
    /// APU status register (`$4015`).
    pub const APU_STATUS: u16 = 0x4015;
    /// Controller port 1 strobe/read address (`$4016`).
    pub const CONTROLLER_PORT_1: u16 = 0x4016;
    /// Controller port 2 read / frame counter write address (`$4017`).
    pub const CONTROLLER_PORT_2: u16 = 0x4017;

    /// Diagnostics window reserved by the console manufacturer, unused here.
    pub const TEST_MODE_BASE: u16 = 0x4018;
    /// End of the test mode I/O window.
    pub const TEST_MODE_END: u16 = 0x401F;

    /// First address handled by the cartridge / expansion window.
    pub const CARTRIDGE_SPACE_BASE: u16 = 0x4020;
    /// PRG RAM window start address (`$6000`).
    pub const PRG_RAM_START: u16 = 0x6000;
    /// PRG RAM window end address (inclusive).
    pub const PRG_RAM_END: u16 = 0x7FFF;
    /// PRG ROM window start address (`$8000`).
    pub const PRG_ROM_START: u16 = 0x8000;
    /// Final CPU-visible address.
    pub const CPU_ADDR_END: u16 = 0xFFFF;

    /// PRG bank granularity enforced when loading cartridges (16 KiB).
    pub const PRG_BANK_SIZE: usize = 0x4000;
}

/// PPU register layout and VRAM mirror rules.
pub mod ppu {
    /// Mask for decoding register mirrors (`addr & 0x0007`).
    pub const REGISTER_SELECT_MASK: u16 = 0x0007;

    /// Size of the internal nametable RAM (CIRAM): 2 KiB, mirrored into the
    /// `$2000-$2FFF` window according to the cartridge's mirroring mode.
    pub const CIRAM_SIZE: usize = 0x0800;

    /// Address mask applied after each PPU VRAM access to wrap to 16 KiB.
    pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

    /// Palette RAM base address (`$3F00`).
    pub const PALETTE_BASE: u16 = 0x3F00;
    /// Palette RAM byte count (32 bytes mirrored every 32 bytes).
    pub const PALETTE_RAM_SIZE: usize = 0x20;

    /// First pattern-table-space address not owned by the cartridge.
    pub const NAMETABLE_BASE: u16 = 0x2000;
    /// Size of a single nametable in bytes.
    pub const NAMETABLE_SIZE: u16 = 0x0400;

    /// Pattern table base address for table 0.
    pub const PATTERN_TABLE_0: u16 = 0x0000;
    /// Pattern table base address for table 1.
    pub const PATTERN_TABLE_1: u16 = 0x1000;
    /// Total pattern table space (`$0000-$1FFF` = 8 KiB).
    pub const CHR_SIZE: usize = 0x2000;

    /// CHR bank granularity enforced when loading cartridges (8 KiB).
    pub const CHR_BANK_SIZE: usize = CHR_SIZE;

    /// Primary Object Attribute Memory byte count (64 sprites x 4 bytes).
    pub const OAM_SIZE: usize = 0x100;
    /// Secondary OAM byte count used during sprite evaluation (8 sprites).
    pub const SECONDARY_OAM_SIZE: usize = 0x20;

    /// Visible framebuffer width in pixels.
    pub const FRAME_WIDTH: usize = 256;
    /// Visible framebuffer height in pixels.
    pub const FRAME_HEIGHT: usize = 240;
    /// Total visible pixels per frame.
    pub const FRAME_PIXELS: usize = FRAME_WIDTH * FRAME_HEIGHT;

    /// Dots per scanline (0..=340).
    pub const DOTS_PER_LINE: u16 = 341;
    /// First vblank scanline.
    pub const VBLANK_LINE: u16 = 241;
    /// Pre-render scanline.
    pub const PRE_RENDER_LINE: u16 = 261;

    /// CPU-visible PPU register identifiers.
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$2000` - PPUCTRL
        Control = 0x2000,
        /// `$2001` - PPUMASK
        Mask = 0x2001,
        /// `$2002` - PPUSTATUS
        Status = 0x2002,
        /// `$2003` - OAMADDR
        OamAddr = 0x2003,
        /// `$2004` - OAMDATA
        OamData = 0x2004,
        /// `$2005` - PPUSCROLL
        Scroll = 0x2005,
        /// `$2006` - PPUADDR
        Addr = 0x2006,
        /// `$2007` - PPUDATA
        Data = 0x2007,
    }

    impl Register {
        /// Resolves the canonical register for a CPU address in `$2000-$3FFF`.
        pub const fn from_cpu_addr(addr: u16) -> Self {
            match addr & REGISTER_SELECT_MASK {
                0 => Self::Control,
                1 => Self::Mask,
                2 => Self::Status,
                3 => Self::OamAddr,
                4 => Self::OamData,
                5 => Self::Scroll,
                6 => Self::Addr,
                _ => Self::Data,
            }
        }
    }
}

/// APU register layout.
pub mod apu {
    /// CPU-visible APU register identifiers.
    ///
    /// Most of these configure individual channels; `$4015` and `$4017`
    /// manage global status and the frame sequencer. `$4009`, `$400D`,
    /// `$4014`, and `$4016` belong to other subsystems and are absent.
    #[repr(u16)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Register {
        /// `$4000` - Pulse 1: duty, envelope, length counter halt.
        Pulse1Control = 0x4000,
        /// `$4001` - Pulse 1: sweep unit configuration.
        Pulse1Sweep = 0x4001,
        /// `$4002` - Pulse 1: timer low byte.
        Pulse1TimerLow = 0x4002,
        /// `$4003` - Pulse 1: timer high 3 bits + length counter load.
        Pulse1TimerHigh = 0x4003,
        /// `$4004` - Pulse 2: duty, envelope, length counter halt.
        Pulse2Control = 0x4004,
        /// `$4005` - Pulse 2: sweep unit configuration.
        Pulse2Sweep = 0x4005,
        /// `$4006` - Pulse 2: timer low byte.
        Pulse2TimerLow = 0x4006,
        /// `$4007` - Pulse 2: timer high 3 bits + length counter load.
        Pulse2TimerHigh = 0x4007,
        /// `$4008` - Triangle: length counter halt + linear counter reload.
        TriangleControl = 0x4008,
        /// `$400A` - Triangle: timer low byte.
        TriangleTimerLow = 0x400A,
        /// `$400B` - Triangle: timer high 3 bits + length counter load.
        TriangleTimerHigh = 0x400B,
        /// `$400C` - Noise: envelope and length counter halt.
        NoiseControl = 0x400C,
        /// `$400E` - Noise: mode flag and period index.
        NoiseModeAndPeriod = 0x400E,
        /// `$400F` - Noise: length counter load.
        NoiseLength = 0x400F,
        /// `$4010` - DMC: IRQ enable, loop flag, and rate index.
        DmcControl = 0x4010,
        /// `$4011` - DMC: direct load value for the output DAC.
        DmcDirectLoad = 0x4011,
        /// `$4012` - DMC: sample address (high bits of the CPU address).
        DmcSampleAddress = 0x4012,
        /// `$4013` - DMC: sample length in bytes.
        DmcSampleLength = 0x4013,
        /// `$4015` - APU status: channel enables and IRQ flags.
        Status = 0x4015,
        /// `$4017` - Frame counter: mode select and IRQ inhibit.
        FrameCounter = 0x4017,
    }

    impl Register {
        /// Resolves a CPU address to an APU register, if it is one of the
        /// documented APU-visible locations.
        pub const fn from_cpu_addr(addr: u16) -> Option<Self> {
            match addr {
                0x4000 => Some(Self::Pulse1Control),
                0x4001 => Some(Self::Pulse1Sweep),
                0x4002 => Some(Self::Pulse1TimerLow),
                0x4003 => Some(Self::Pulse1TimerHigh),
                0x4004 => Some(Self::Pulse2Control),
                0x4005 => Some(Self::Pulse2Sweep),
                0x4006 => Some(Self::Pulse2TimerLow),
                0x4007 => Some(Self::Pulse2TimerHigh),
                0x4008 => Some(Self::TriangleControl),
                0x400A => Some(Self::TriangleTimerLow),
                0x400B => Some(Self::TriangleTimerHigh),
                0x400C => Some(Self::NoiseControl),
                0x400E => Some(Self::NoiseModeAndPeriod),
                0x400F => Some(Self::NoiseLength),
                0x4010 => Some(Self::DmcControl),
                0x4011 => Some(Self::DmcDirectLoad),
                0x4012 => Some(Self::DmcSampleAddress),
                0x4013 => Some(Self::DmcSampleLength),
                0x4015 => Some(Self::Status),
                0x4017 => Some(Self::FrameCounter),
                _ => None,
            }
        }
    }
}
