use bitflags::bitflags;

bitflags! {
    /// The 8-bit processor status register (P).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N V _ B D I Z C
    /// ```
    /// Bit 5 always reads as 1; bit 4 (break) only carries meaning in the
    /// copy pushed to the stack.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct Status: u8 {
        /// Carry flag (C): set on carry out of bit 7 or absence of borrow.
        const CARRY     = 0b0000_0001;
        /// Zero flag (Z): set when the result of an operation is zero.
        const ZERO      = 0b0000_0010;
        /// Interrupt Disable flag (I): masks IRQ when set.
        const INTERRUPT = 0b0000_0100;
        /// Decimal Mode flag (D): storable but has no effect on this CPU.
        const DECIMAL   = 0b0000_1000;
        /// Break flag (B): distinguishes BRK/PHP pushes from interrupt pushes.
        const BREAK     = 0b0001_0000;
        /// Unused bit, hardwired to 1.
        const UNUSED    = 0b0010_0000;
        /// Overflow flag (V): set when signed arithmetic overflows.
        const OVERFLOW  = 0b0100_0000;
        /// Negative flag (N): mirrors bit 7 of the last result.
        const NEGATIVE  = 0b1000_0000;
    }
}

impl Status {
    /// Documented power-on state (`$24`: unused + interrupt disable).
    pub(crate) fn power_on() -> Self {
        Status::UNUSED | Status::INTERRUPT
    }

    /// Set or clear the Zero flag based on a value.
    pub(crate) fn update_zero(&mut self, value: u8) {
        self.set(Status::ZERO, value == 0);
    }

    /// Set or clear the Negative flag based on bit 7 of a value.
    pub(crate) fn update_negative(&mut self, value: u8) {
        self.set(Status::NEGATIVE, value & 0x80 != 0);
    }

    /// Convenience for the load/transfer flag pattern.
    pub(crate) fn update_zero_negative(&mut self, value: u8) {
        self.update_zero(value);
        self.update_negative(value);
    }

    /// Byte image as pushed by an interrupt entry (B clear, bit 5 set).
    pub(crate) fn to_interrupt_byte(self) -> u8 {
        (self | Status::UNUSED).difference(Status::BREAK).bits()
    }

    /// Byte image as pushed by BRK/PHP (B and bit 5 set).
    pub(crate) fn to_pushed_byte(self) -> u8 {
        (self | Status::UNUSED | Status::BREAK).bits()
    }

    /// Restores flags from a stack byte; B is discarded and bit 5 forced.
    pub(crate) fn from_pulled_byte(byte: u8) -> Self {
        (Status::from_bits_truncate(byte) | Status::UNUSED).difference(Status::BREAK)
    }
}
