use bitflags::bitflags;

bitflags! {
    /// `$2000` PPUCTRL.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct Control: u8 {
        /// Base nametable address, X component.
        const NAMETABLE_X      = 0b0000_0001;
        /// Base nametable address, Y component.
        const NAMETABLE_Y      = 0b0000_0010;
        /// VRAM address increment per `$2007` access: 0 adds 1, 1 adds 32.
        const VRAM_INCREMENT   = 0b0000_0100;
        /// Pattern table for 8x8 sprites.
        const SPRITE_TABLE     = 0b0000_1000;
        /// Pattern table for the background.
        const BACKGROUND_TABLE = 0b0001_0000;
        /// 0: 8x8 sprites, 1: 8x16 sprites.
        const SPRITE_SIZE      = 0b0010_0000;
        /// EXT pin direction; no effect in this core.
        const MASTER_SLAVE     = 0b0100_0000;
        /// Raise NMI at vblank start.
        const NMI_ENABLE       = 0b1000_0000;
    }
}

impl Control {
    pub(crate) fn vram_increment(self) -> u16 {
        if self.contains(Control::VRAM_INCREMENT) {
            32
        } else {
            1
        }
    }

    pub(crate) fn sprite_table_base(self) -> u16 {
        if self.contains(Control::SPRITE_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    pub(crate) fn background_table_base(self) -> u16 {
        if self.contains(Control::BACKGROUND_TABLE) {
            0x1000
        } else {
            0x0000
        }
    }

    pub(crate) fn sprite_height(self) -> u16 {
        if self.contains(Control::SPRITE_SIZE) { 16 } else { 8 }
    }

    /// The two nametable select bits as they appear in the loopy t register.
    pub(crate) fn nametable_select(self) -> u16 {
        (self.bits() & 0x03) as u16
    }
}
