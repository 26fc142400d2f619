use bitflags::bitflags;

bitflags! {
    /// `$2001` PPUMASK.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct Mask: u8 {
        const GREYSCALE            = 0b0000_0001;
        /// Show background in the leftmost 8 pixels.
        const BACKGROUND_LEFT      = 0b0000_0010;
        /// Show sprites in the leftmost 8 pixels.
        const SPRITES_LEFT         = 0b0000_0100;
        const SHOW_BACKGROUND      = 0b0000_1000;
        const SHOW_SPRITES         = 0b0001_0000;
        const EMPHASIZE_RED        = 0b0010_0000;
        const EMPHASIZE_GREEN      = 0b0100_0000;
        const EMPHASIZE_BLUE       = 0b1000_0000;
    }
}

impl Mask {
    /// Rendering is on when either layer is enabled; this gates scroll
    /// updates, the odd-frame dot skip, and sprite evaluation.
    pub(crate) fn rendering_enabled(self) -> bool {
        self.intersects(Mask::SHOW_BACKGROUND | Mask::SHOW_SPRITES)
    }
}
