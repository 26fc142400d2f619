//! The 15-bit internal VRAM address ("loopy") register.
//!
//! Bit layout:
//! ```text
//! yyy NN YYYYY XXXXX
//! ||| || ||||| +++++-- coarse X scroll
//! ||| || +++++-------- coarse Y scroll
//! ||| ++-------------- nametable select
//! +++----------------- fine Y scroll
//! ```

const COARSE_X_MASK: u16 = 0b000_00_00000_11111;
const COARSE_Y_MASK: u16 = 0b000_00_11111_00000;
const NAMETABLE_MASK: u16 = 0b000_11_00000_00000;
const FINE_Y_MASK: u16 = 0b111_00_00000_00000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct VramAddr(pub(crate) u16);

impl VramAddr {
    pub(crate) fn raw(self) -> u16 {
        self.0
    }

    /// Address placed on the bus for `$2007` accesses (14 bits).
    pub(crate) fn bus_addr(self) -> u16 {
        self.0 & 0x3FFF
    }

    pub(crate) fn coarse_x(self) -> u16 {
        self.0 & COARSE_X_MASK
    }

    pub(crate) fn set_coarse_x(&mut self, value: u16) {
        self.0 = (self.0 & !COARSE_X_MASK) | (value & 0x1F);
    }

    pub(crate) fn coarse_y(self) -> u16 {
        (self.0 & COARSE_Y_MASK) >> 5
    }

    pub(crate) fn set_coarse_y(&mut self, value: u16) {
        self.0 = (self.0 & !COARSE_Y_MASK) | ((value & 0x1F) << 5);
    }

    pub(crate) fn nametable(self) -> u16 {
        (self.0 & NAMETABLE_MASK) >> 10
    }

    pub(crate) fn set_nametable(&mut self, value: u16) {
        self.0 = (self.0 & !NAMETABLE_MASK) | ((value & 0x03) << 10);
    }

    pub(crate) fn fine_y(self) -> u16 {
        (self.0 & FINE_Y_MASK) >> 12
    }

    pub(crate) fn set_fine_y(&mut self, value: u16) {
        self.0 = (self.0 & !FINE_Y_MASK) | ((value & 0x07) << 12);
    }

    /// Nametable byte address for the current tile.
    pub(crate) fn tile_addr(self) -> u16 {
        0x2000 | (self.0 & 0x0FFF)
    }

    /// Attribute table byte address covering the current tile.
    pub(crate) fn attribute_addr(self) -> u16 {
        0x23C0 | (self.0 & 0x0C00) | ((self.coarse_y() >> 2) << 3) | (self.coarse_x() >> 2)
    }

    /// Advances coarse X, wrapping into the horizontal neighbor nametable.
    pub(crate) fn increment_coarse_x(&mut self) {
        if self.coarse_x() == 31 {
            self.set_coarse_x(0);
            self.0 ^= 0x0400;
        } else {
            self.0 += 1;
        }
    }

    /// Advances fine Y, cascading into coarse Y and the vertical nametable.
    pub(crate) fn increment_y(&mut self) {
        if self.fine_y() < 7 {
            self.0 += 0x1000;
            return;
        }
        self.set_fine_y(0);
        match self.coarse_y() {
            29 => {
                self.set_coarse_y(0);
                self.0 ^= 0x0800;
            }
            // Rows 30/31 hold attribute data; wrap without switching tables.
            31 => self.set_coarse_y(0),
            y => self.set_coarse_y(y + 1),
        }
    }

    /// Copies the horizontal bits (coarse X + nametable X) from `t`.
    pub(crate) fn copy_horizontal(&mut self, t: VramAddr) {
        const HORIZONTAL: u16 = COARSE_X_MASK | 0x0400;
        self.0 = (self.0 & !HORIZONTAL) | (t.0 & HORIZONTAL);
    }

    /// Copies the vertical bits (coarse Y + fine Y + nametable Y) from `t`.
    pub(crate) fn copy_vertical(&mut self, t: VramAddr) {
        const VERTICAL: u16 = COARSE_Y_MASK | FINE_Y_MASK | 0x0800;
        self.0 = (self.0 & !VERTICAL) | (t.0 & VERTICAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarse_x_wraps_into_neighbor_nametable() {
        let mut v = VramAddr::default();
        v.set_coarse_x(31);
        v.increment_coarse_x();
        assert_eq!(v.coarse_x(), 0);
        assert_eq!(v.nametable(), 0b01);
    }

    #[test]
    fn fine_y_cascades_into_coarse_y() {
        let mut v = VramAddr::default();
        v.set_fine_y(7);
        v.set_coarse_y(29);
        v.increment_y();
        assert_eq!(v.fine_y(), 0);
        assert_eq!(v.coarse_y(), 0);
        assert_eq!(v.nametable(), 0b10);
    }

    #[test]
    fn coarse_y_31_wraps_without_table_switch() {
        let mut v = VramAddr::default();
        v.set_fine_y(7);
        v.set_coarse_y(31);
        v.increment_y();
        assert_eq!(v.coarse_y(), 0);
        assert_eq!(v.nametable(), 0);
    }

    #[test]
    fn attribute_addr_covers_four_by_four_tiles() {
        let mut v = VramAddr::default();
        v.set_coarse_x(5);
        v.set_coarse_y(9);
        assert_eq!(v.attribute_addr(), 0x23C0 | (2 << 3) | 1);
    }
}
