use bitflags::bitflags;

bitflags! {
    /// `$2002` PPUSTATUS.
    ///
    /// Only the top three bits exist in hardware; the low five return stale
    /// open-bus data on reads.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub(crate) struct PpuStatus: u8 {
        /// More than eight sprites were found on a scanline.
        const SPRITE_OVERFLOW = 0b0010_0000;
        /// An opaque sprite-0 pixel overlapped an opaque background pixel.
        const SPRITE_ZERO_HIT = 0b0100_0000;
        /// Vertical blank is in progress.
        const VBLANK          = 0b1000_0000;
    }
}

impl PpuStatus {
    /// Composes the CPU-visible byte from the flag bits and the decayed
    /// open-bus value.
    pub(crate) fn to_read_byte(self, open_bus: u8) -> u8 {
        self.bits() | (open_bus & 0x1F)
    }
}
