//! Table-driven opcode decode.
//!
//! One entry per opcode byte: mnemonic, addressing mode, base cycle cost,
//! and whether the instruction pays an extra cycle when indexed addressing
//! crosses a page boundary. Branch instructions carry their untaken cost;
//! the interpreter adds the taken/page-cross penalties.

use super::addressing::Mode;

/// Instruction mnemonics, official and stable-unofficial.
///
/// `Jam` marks the halting opcodes; `Unstable` marks the encodings whose
/// behavior depends on analog chip state (SHA/SHX/SHY/TAS/ANE/LXA). Both
/// are surfaced to the host as faults instead of being guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx,
    Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp,
    Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay,
    Tsx, Txa, Txs, Tya,
    // Stable unofficial opcodes.
    Anc, Alr, Arr, Dcp, Isb, Las, Lax, Rla, Rra, Sax, Sbx, Slo, Sre,
    // Fault-surfacing groups.
    Jam, Unstable,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Opcode {
    pub mnemonic: Mnemonic,
    pub mode: Mode,
    pub cycles: u8,
    /// Extra cycle when the indexed effective address crosses a page.
    pub page_penalty: bool,
}

const fn op(mnemonic: Mnemonic, mode: Mode, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        mode,
        cycles,
        page_penalty: false,
    }
}

/// Same as [`op`] but with the page-cross penalty applied.
const fn opp(mnemonic: Mnemonic, mode: Mode, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        mode,
        cycles,
        page_penalty: true,
    }
}

use Mnemonic::*;
use Mode::*;

#[rustfmt::skip]
pub(crate) const OPCODES: [Opcode; 256] = [
    /* 0x00 */ op(Brk, Implied, 7),      op(Ora, IndirectX, 6),  op(Jam, Implied, 1),     op(Slo, IndirectX, 8),
    /* 0x04 */ op(Nop, ZeroPage, 3),     op(Ora, ZeroPage, 3),   op(Asl, ZeroPage, 5),    op(Slo, ZeroPage, 5),
    /* 0x08 */ op(Php, Implied, 3),      op(Ora, Immediate, 2),  op(Asl, Accumulator, 2), op(Anc, Immediate, 2),
    /* 0x0C */ op(Nop, Absolute, 4),     op(Ora, Absolute, 4),   op(Asl, Absolute, 6),    op(Slo, Absolute, 6),
    /* 0x10 */ op(Bpl, Relative, 2),     opp(Ora, IndirectY, 5), op(Jam, Implied, 1),     op(Slo, IndirectY, 8),
    /* 0x14 */ op(Nop, ZeroPageX, 4),    op(Ora, ZeroPageX, 4),  op(Asl, ZeroPageX, 6),   op(Slo, ZeroPageX, 6),
    /* 0x18 */ op(Clc, Implied, 2),      opp(Ora, AbsoluteY, 4), op(Nop, Implied, 2),     op(Slo, AbsoluteY, 7),
    /* 0x1C */ opp(Nop, AbsoluteX, 4),   opp(Ora, AbsoluteX, 4), op(Asl, AbsoluteX, 7),   op(Slo, AbsoluteX, 7),
    /* 0x20 */ op(Jsr, Absolute, 6),     op(And, IndirectX, 6),  op(Jam, Implied, 1),     op(Rla, IndirectX, 8),
    /* 0x24 */ op(Bit, ZeroPage, 3),     op(And, ZeroPage, 3),   op(Rol, ZeroPage, 5),    op(Rla, ZeroPage, 5),
    /* 0x28 */ op(Plp, Implied, 4),      op(And, Immediate, 2),  op(Rol, Accumulator, 2), op(Anc, Immediate, 2),
    /* 0x2C */ op(Bit, Absolute, 4),     op(And, Absolute, 4),   op(Rol, Absolute, 6),    op(Rla, Absolute, 6),
    /* 0x30 */ op(Bmi, Relative, 2),     opp(And, IndirectY, 5), op(Jam, Implied, 1),     op(Rla, IndirectY, 8),
    /* 0x34 */ op(Nop, ZeroPageX, 4),    op(And, ZeroPageX, 4),  op(Rol, ZeroPageX, 6),   op(Rla, ZeroPageX, 6),
    /* 0x38 */ op(Sec, Implied, 2),      opp(And, AbsoluteY, 4), op(Nop, Implied, 2),     op(Rla, AbsoluteY, 7),
    /* 0x3C */ opp(Nop, AbsoluteX, 4),   opp(And, AbsoluteX, 4), op(Rol, AbsoluteX, 7),   op(Rla, AbsoluteX, 7),
    /* 0x40 */ op(Rti, Implied, 6),      op(Eor, IndirectX, 6),  op(Jam, Implied, 1),     op(Sre, IndirectX, 8),
    /* 0x44 */ op(Nop, ZeroPage, 3),     op(Eor, ZeroPage, 3),   op(Lsr, ZeroPage, 5),    op(Sre, ZeroPage, 5),
    /* 0x48 */ op(Pha, Implied, 3),      op(Eor, Immediate, 2),  op(Lsr, Accumulator, 2), op(Alr, Immediate, 2),
    /* 0x4C */ op(Jmp, Absolute, 3),     op(Eor, Absolute, 4),   op(Lsr, Absolute, 6),    op(Sre, Absolute, 6),
    /* 0x50 */ op(Bvc, Relative, 2),     opp(Eor, IndirectY, 5), op(Jam, Implied, 1),     op(Sre, IndirectY, 8),
    /* 0x54 */ op(Nop, ZeroPageX, 4),    op(Eor, ZeroPageX, 4),  op(Lsr, ZeroPageX, 6),   op(Sre, ZeroPageX, 6),
    /* 0x58 */ op(Cli, Implied, 2),      opp(Eor, AbsoluteY, 4), op(Nop, Implied, 2),     op(Sre, AbsoluteY, 7),
    /* 0x5C */ opp(Nop, AbsoluteX, 4),   opp(Eor, AbsoluteX, 4), op(Lsr, AbsoluteX, 7),   op(Sre, AbsoluteX, 7),
    /* 0x60 */ op(Rts, Implied, 6),      op(Adc, IndirectX, 6),  op(Jam, Implied, 1),     op(Rra, IndirectX, 8),
    /* 0x64 */ op(Nop, ZeroPage, 3),     op(Adc, ZeroPage, 3),   op(Ror, ZeroPage, 5),    op(Rra, ZeroPage, 5),
    /* 0x68 */ op(Pla, Implied, 4),      op(Adc, Immediate, 2),  op(Ror, Accumulator, 2), op(Arr, Immediate, 2),
    /* 0x6C */ op(Jmp, Indirect, 5),     op(Adc, Absolute, 4),   op(Ror, Absolute, 6),    op(Rra, Absolute, 6),
    /* 0x70 */ op(Bvs, Relative, 2),     opp(Adc, IndirectY, 5), op(Jam, Implied, 1),     op(Rra, IndirectY, 8),
    /* 0x74 */ op(Nop, ZeroPageX, 4),    op(Adc, ZeroPageX, 4),  op(Ror, ZeroPageX, 6),   op(Rra, ZeroPageX, 6),
    /* 0x78 */ op(Sei, Implied, 2),      opp(Adc, AbsoluteY, 4), op(Nop, Implied, 2),     op(Rra, AbsoluteY, 7),
    /* 0x7C */ opp(Nop, AbsoluteX, 4),   opp(Adc, AbsoluteX, 4), op(Ror, AbsoluteX, 7),   op(Rra, AbsoluteX, 7),
    /* 0x80 */ op(Nop, Immediate, 2),    op(Sta, IndirectX, 6),  op(Nop, Immediate, 2),   op(Sax, IndirectX, 6),
    /* 0x84 */ op(Sty, ZeroPage, 3),     op(Sta, ZeroPage, 3),   op(Stx, ZeroPage, 3),    op(Sax, ZeroPage, 3),
    /* 0x88 */ op(Dey, Implied, 2),      op(Nop, Immediate, 2),  op(Txa, Implied, 2),     op(Unstable, Immediate, 2),
    /* 0x8C */ op(Sty, Absolute, 4),     op(Sta, Absolute, 4),   op(Stx, Absolute, 4),    op(Sax, Absolute, 4),
    /* 0x90 */ op(Bcc, Relative, 2),     op(Sta, IndirectY, 6),  op(Jam, Implied, 1),     op(Unstable, IndirectY, 6),
    /* 0x94 */ op(Sty, ZeroPageX, 4),    op(Sta, ZeroPageX, 4),  op(Stx, ZeroPageY, 4),   op(Sax, ZeroPageY, 4),
    /* 0x98 */ op(Tya, Implied, 2),      op(Sta, AbsoluteY, 5),  op(Txs, Implied, 2),     op(Unstable, AbsoluteY, 5),
    /* 0x9C */ op(Unstable, AbsoluteX, 5), op(Sta, AbsoluteX, 5), op(Unstable, AbsoluteY, 5), op(Unstable, AbsoluteY, 5),
    /* 0xA0 */ op(Ldy, Immediate, 2),    op(Lda, IndirectX, 6),  op(Ldx, Immediate, 2),   op(Lax, IndirectX, 6),
    /* 0xA4 */ op(Ldy, ZeroPage, 3),     op(Lda, ZeroPage, 3),   op(Ldx, ZeroPage, 3),    op(Lax, ZeroPage, 3),
    /* 0xA8 */ op(Tay, Implied, 2),      op(Lda, Immediate, 2),  op(Tax, Implied, 2),     op(Unstable, Immediate, 2),
    /* 0xAC */ op(Ldy, Absolute, 4),     op(Lda, Absolute, 4),   op(Ldx, Absolute, 4),    op(Lax, Absolute, 4),
    /* 0xB0 */ op(Bcs, Relative, 2),     opp(Lda, IndirectY, 5), op(Jam, Implied, 1),     opp(Lax, IndirectY, 5),
    /* 0xB4 */ op(Ldy, ZeroPageX, 4),    op(Lda, ZeroPageX, 4),  op(Ldx, ZeroPageY, 4),   op(Lax, ZeroPageY, 4),
    /* 0xB8 */ op(Clv, Implied, 2),      opp(Lda, AbsoluteY, 4), op(Tsx, Implied, 2),     opp(Las, AbsoluteY, 4),
    /* 0xBC */ opp(Ldy, AbsoluteX, 4),   opp(Lda, AbsoluteX, 4), opp(Ldx, AbsoluteY, 4),  opp(Lax, AbsoluteY, 4),
    /* 0xC0 */ op(Cpy, Immediate, 2),    op(Cmp, IndirectX, 6),  op(Nop, Immediate, 2),   op(Dcp, IndirectX, 8),
    /* 0xC4 */ op(Cpy, ZeroPage, 3),     op(Cmp, ZeroPage, 3),   op(Dec, ZeroPage, 5),    op(Dcp, ZeroPage, 5),
    /* 0xC8 */ op(Iny, Implied, 2),      op(Cmp, Immediate, 2),  op(Dex, Implied, 2),     op(Sbx, Immediate, 2),
    /* 0xCC */ op(Cpy, Absolute, 4),     op(Cmp, Absolute, 4),   op(Dec, Absolute, 6),    op(Dcp, Absolute, 6),
    /* 0xD0 */ op(Bne, Relative, 2),     opp(Cmp, IndirectY, 5), op(Jam, Implied, 1),     op(Dcp, IndirectY, 8),
    /* 0xD4 */ op(Nop, ZeroPageX, 4),    op(Cmp, ZeroPageX, 4),  op(Dec, ZeroPageX, 6),   op(Dcp, ZeroPageX, 6),
    /* 0xD8 */ op(Cld, Implied, 2),      opp(Cmp, AbsoluteY, 4), op(Nop, Implied, 2),     op(Dcp, AbsoluteY, 7),
    /* 0xDC */ opp(Nop, AbsoluteX, 4),   opp(Cmp, AbsoluteX, 4), op(Dec, AbsoluteX, 7),   op(Dcp, AbsoluteX, 7),
    /* 0xE0 */ op(Cpx, Immediate, 2),    op(Sbc, IndirectX, 6),  op(Nop, Immediate, 2),   op(Isb, IndirectX, 8),
    /* 0xE4 */ op(Cpx, ZeroPage, 3),     op(Sbc, ZeroPage, 3),   op(Inc, ZeroPage, 5),    op(Isb, ZeroPage, 5),
    /* 0xE8 */ op(Inx, Implied, 2),      op(Sbc, Immediate, 2),  op(Nop, Implied, 2),     op(Sbc, Immediate, 2),
    /* 0xEC */ op(Cpx, Absolute, 4),     op(Sbc, Absolute, 4),   op(Inc, Absolute, 6),    op(Isb, Absolute, 6),
    /* 0xF0 */ op(Beq, Relative, 2),     opp(Sbc, IndirectY, 5), op(Jam, Implied, 1),     op(Isb, IndirectY, 8),
    /* 0xF4 */ op(Nop, ZeroPageX, 4),    op(Sbc, ZeroPageX, 4),  op(Inc, ZeroPageX, 6),   op(Isb, ZeroPageX, 6),
    /* 0xF8 */ op(Sed, Implied, 2),      opp(Sbc, AbsoluteY, 4), op(Nop, Implied, 2),     op(Isb, AbsoluteY, 7),
    /* 0xFC */ opp(Nop, AbsoluteX, 4),   opp(Sbc, AbsoluteX, 4), op(Inc, AbsoluteX, 7),   op(Isb, AbsoluteX, 7),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn official_entries_match_reference_table() {
        // Spot-check a representative row of documented opcodes.
        assert!(matches!(OPCODES[0xA9].mnemonic, Mnemonic::Lda));
        assert_eq!(OPCODES[0xA9].cycles, 2);
        assert!(matches!(OPCODES[0x6C].mode, Mode::Indirect));
        assert_eq!(OPCODES[0x6C].cycles, 5);
        assert!(OPCODES[0xBD].page_penalty); // LDA abs,X
        assert!(!OPCODES[0x9D].page_penalty); // STA abs,X always 5
        assert_eq!(OPCODES[0x00].cycles, 7); // BRK
    }

    #[test]
    fn jam_opcodes_are_flagged() {
        for opcode in [0x02, 0x12, 0x22, 0x32, 0x42, 0x52, 0x62, 0x72, 0x92, 0xB2, 0xD2, 0xF2] {
            assert!(matches!(OPCODES[opcode].mnemonic, Mnemonic::Jam));
        }
    }

    #[test]
    fn unstable_opcodes_are_flagged() {
        for opcode in [0x8B, 0x93, 0x9B, 0x9C, 0x9E, 0x9F, 0xAB] {
            assert!(matches!(OPCODES[opcode].mnemonic, Mnemonic::Unstable));
        }
    }
}
