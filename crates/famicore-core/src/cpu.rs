//! Instruction-stepped 6502 core (the console's 2A03, sans decimal mode).
//!
//! `step` executes exactly one instruction against the CPU bus and returns
//! the clock cycles it consumed, including page-cross and branch penalties.
//! Interrupt lines are sampled between instructions: NMI is edge-triggered
//! and always serviced at the next boundary, IRQ is level-triggered and
//! honored only while the I flag is clear.

pub(crate) mod addressing;
pub(crate) mod opcode;
pub(crate) mod status;

use serde::{Deserialize, Serialize};

use crate::{
    bus::CpuBus,
    cpu::{
        addressing::{Mode, page_crossed},
        opcode::{Mnemonic, OPCODES},
        status::Status,
    },
    memory::cpu as cpu_mem,
    state::CpuState,
};

/// Cycles consumed by an NMI/IRQ entry sequence.
const INTERRUPT_CYCLES: u8 = 7;

/// Structured report of a JAM/unstable opcode fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpcodeFault {
    /// Address the opcode was fetched from.
    pub pc: u16,
    /// The offending opcode byte.
    pub opcode: u8,
}

/// Outcome of executing one instruction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Step {
    pub(crate) cycles: u8,
    pub(crate) fault: Option<OpcodeFault>,
}

/// Register-file snapshot for tracing, debugging, and frame results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuSnapshot {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub s: u8,
    /// Raw status bits (NV-BDIZC); bit 5 always reads 1.
    pub p: u8,
    pub pc: u16,
}

#[derive(Debug, Clone)]
pub struct Cpu {
    a: u8,
    x: u8,
    y: u8,
    s: u8,
    pc: u16,
    p: Status,
    nmi_pending: bool,
    prev_nmi_line: bool,
    irq_line: bool,
    halted: bool,
}

impl Cpu {
    pub(crate) fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFD,
            pc: 0,
            p: Status::power_on(),
            nmi_pending: false,
            prev_nmi_line: false,
            irq_line: false,
            halted: false,
        }
    }

    /// Cold boot: documented power-on register values, PC via `$FFFC`.
    pub(crate) fn power_on(&mut self, bus: &mut CpuBus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.s = 0xFD;
        self.p = Status::power_on();
        self.nmi_pending = false;
        self.prev_nmi_line = false;
        self.irq_line = false;
        self.halted = false;
        self.pc = bus.read_u16(cpu_mem::RESET_VECTOR);
    }

    /// Warm reset: S drops by 3 (hardware suppresses the stack writes),
    /// I is set, everything else survives.
    pub(crate) fn reset(&mut self, bus: &mut CpuBus) {
        self.s = self.s.wrapping_sub(3);
        self.p.insert(Status::INTERRUPT);
        self.nmi_pending = false;
        self.halted = false;
        self.pc = bus.read_u16(cpu_mem::RESET_VECTOR);
    }

    /// Drives the NMI line; the falling-to-rising edge latches a pending NMI.
    pub(crate) fn set_nmi_line(&mut self, level: bool) {
        if level && !self.prev_nmi_line {
            self.nmi_pending = true;
        }
        self.prev_nmi_line = level;
    }

    /// Drives the level-sensitive IRQ line.
    pub(crate) fn set_irq_line(&mut self, level: bool) {
        self.irq_line = level;
    }

    pub(crate) fn halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn halt(&mut self) {
        self.halted = true;
    }

    pub(crate) fn snapshot(&self) -> CpuSnapshot {
        CpuSnapshot {
            a: self.a,
            x: self.x,
            y: self.y,
            s: self.s,
            p: self.p.bits() | Status::UNUSED.bits(),
            pc: self.pc,
        }
    }

    pub(crate) fn state(&self) -> CpuState {
        CpuState {
            a: self.a,
            x: self.x,
            y: self.y,
            s: self.s,
            pc: self.pc,
            p: self.p.bits(),
            nmi_pending: self.nmi_pending,
            prev_nmi_line: self.prev_nmi_line,
            irq_line: self.irq_line,
            halted: self.halted,
        }
    }

    pub(crate) fn apply_state(&mut self, state: &CpuState) {
        self.a = state.a;
        self.x = state.x;
        self.y = state.y;
        self.s = state.s;
        self.pc = state.pc;
        self.p = Status::from_bits_truncate(state.p) | Status::UNUSED;
        self.nmi_pending = state.nmi_pending;
        self.prev_nmi_line = state.prev_nmi_line;
        self.irq_line = state.irq_line;
        self.halted = state.halted;
    }

    /// Executes one instruction (or services a pending interrupt) and
    /// returns the consumed cycles.
    pub(crate) fn step(&mut self, bus: &mut CpuBus) -> Step {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.interrupt(bus, cpu_mem::NMI_VECTOR);
            return Step {
                cycles: INTERRUPT_CYCLES,
                fault: None,
            };
        }
        if self.irq_line && !self.p.contains(Status::INTERRUPT) {
            self.interrupt(bus, cpu_mem::IRQ_VECTOR);
            return Step {
                cycles: INTERRUPT_CYCLES,
                fault: None,
            };
        }

        let fetch_pc = self.pc;
        let opcode = bus.read(fetch_pc);
        self.pc = self.pc.wrapping_add(1);
        let entry = OPCODES[opcode as usize];

        if matches!(entry.mnemonic, Mnemonic::Jam | Mnemonic::Unstable) {
            // Surfaced to the host; the scheduler decides whether to
            // continue (single-cycle no-op) or halt.
            return Step {
                cycles: 1,
                fault: Some(OpcodeFault {
                    pc: fetch_pc,
                    opcode,
                }),
            };
        }

        let cycles = entry.cycles + self.execute(bus, entry.mnemonic, entry.mode, entry.page_penalty);
        Step {
            cycles,
            fault: None,
        }
    }

    fn interrupt(&mut self, bus: &mut CpuBus, vector: u16) {
        self.push_u16(bus, self.pc);
        self.push(bus, self.p.to_interrupt_byte());
        self.p.insert(Status::INTERRUPT);
        self.pc = bus.read_u16(vector);
    }

    // --- operand plumbing -------------------------------------------------

    fn fetch(&mut self, bus: &mut CpuBus) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    fn fetch_u16(&mut self, bus: &mut CpuBus) -> u16 {
        let lo = self.fetch(bus) as u16;
        let hi = self.fetch(bus) as u16;
        (hi << 8) | lo
    }

    /// Resolves the effective address for a memory-operand mode, reporting
    /// whether an indexed access crossed a page.
    fn operand_addr(&mut self, bus: &mut CpuBus, mode: Mode) -> (u16, bool) {
        match mode {
            Mode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                (addr, false)
            }
            Mode::ZeroPage => (self.fetch(bus) as u16, false),
            Mode::ZeroPageX => (self.fetch(bus).wrapping_add(self.x) as u16, false),
            Mode::ZeroPageY => (self.fetch(bus).wrapping_add(self.y) as u16, false),
            Mode::Absolute => (self.fetch_u16(bus), false),
            Mode::AbsoluteX => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(self.x as u16);
                (addr, page_crossed(base, addr))
            }
            Mode::AbsoluteY => {
                let base = self.fetch_u16(bus);
                let addr = base.wrapping_add(self.y as u16);
                (addr, page_crossed(base, addr))
            }
            Mode::Indirect => {
                // JMP ($xxFF) wraps inside the page: the hardware bug.
                let ptr = self.fetch_u16(bus);
                let lo = bus.read(ptr) as u16;
                let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let hi = bus.read(hi_addr) as u16;
                ((hi << 8) | lo, false)
            }
            Mode::IndirectX => {
                let ptr = self.fetch(bus).wrapping_add(self.x);
                let lo = bus.read(ptr as u16) as u16;
                let hi = bus.read(ptr.wrapping_add(1) as u16) as u16;
                ((hi << 8) | lo, false)
            }
            Mode::IndirectY => {
                let ptr = self.fetch(bus);
                let lo = bus.read(ptr as u16) as u16;
                let hi = bus.read(ptr.wrapping_add(1) as u16) as u16;
                let base = (hi << 8) | lo;
                let addr = base.wrapping_add(self.y as u16);
                (addr, page_crossed(base, addr))
            }
            Mode::Implied | Mode::Accumulator | Mode::Relative => unreachable!(),
        }
    }

    // --- stack ------------------------------------------------------------

    fn push(&mut self, bus: &mut CpuBus, value: u8) {
        bus.write(cpu_mem::STACK_PAGE + self.s as u16, value);
        self.s = self.s.wrapping_sub(1);
    }

    fn push_u16(&mut self, bus: &mut CpuBus, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    fn pull(&mut self, bus: &mut CpuBus) -> u8 {
        self.s = self.s.wrapping_add(1);
        bus.read(cpu_mem::STACK_PAGE + self.s as u16)
    }

    fn pull_u16(&mut self, bus: &mut CpuBus) -> u16 {
        let lo = self.pull(bus) as u16;
        let hi = self.pull(bus) as u16;
        (hi << 8) | lo
    }

    // --- arithmetic helpers -----------------------------------------------

    fn adc(&mut self, value: u8) {
        let carry = self.p.contains(Status::CARRY) as u16;
        let sum = self.a as u16 + value as u16 + carry;
        let result = sum as u8;
        self.p.set(Status::CARRY, sum > 0xFF);
        self.p.set(
            Status::OVERFLOW,
            (self.a ^ result) & (value ^ result) & 0x80 != 0,
        );
        self.a = result;
        self.p.update_zero_negative(self.a);
    }

    fn sbc(&mut self, value: u8) {
        self.adc(value ^ 0xFF);
    }

    fn compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.p.set(Status::CARRY, register >= value);
        self.p.update_zero_negative(result);
    }

    fn asl(&mut self, value: u8) -> u8 {
        self.p.set(Status::CARRY, value & 0x80 != 0);
        let result = value << 1;
        self.p.update_zero_negative(result);
        result
    }

    fn lsr(&mut self, value: u8) -> u8 {
        self.p.set(Status::CARRY, value & 0x01 != 0);
        let result = value >> 1;
        self.p.update_zero_negative(result);
        result
    }

    fn rol(&mut self, value: u8) -> u8 {
        let carry_in = self.p.contains(Status::CARRY) as u8;
        self.p.set(Status::CARRY, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.p.update_zero_negative(result);
        result
    }

    fn ror(&mut self, value: u8) -> u8 {
        let carry_in = (self.p.contains(Status::CARRY) as u8) << 7;
        self.p.set(Status::CARRY, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.p.update_zero_negative(result);
        result
    }

    /// Branch on `condition`; returns the extra cycles (1 taken, 2 if the
    /// target lands on a different page).
    fn branch(&mut self, bus: &mut CpuBus, condition: bool) -> u8 {
        let offset = self.fetch(bus) as i8;
        if !condition {
            return 0;
        }
        let target = self.pc.wrapping_add(offset as u16);
        let penalty = if page_crossed(self.pc, target) { 2 } else { 1 };
        self.pc = target;
        penalty
    }

    /// Read-modify-write pattern shared by shifts, INC/DEC, and the
    /// unofficial combined opcodes. Handles the accumulator variant.
    fn rmw(
        &mut self,
        bus: &mut CpuBus,
        mode: Mode,
        op: impl Fn(&mut Self, u8) -> u8,
    ) -> Option<(u16, u8)> {
        if matches!(mode, Mode::Accumulator) {
            let value = self.a;
            self.a = op(self, value);
            return None;
        }
        let (addr, _) = self.operand_addr(bus, mode);
        let value = bus.read(addr);
        let result = op(self, value);
        bus.write(addr, result);
        Some((addr, result))
    }

    // --- dispatch ---------------------------------------------------------

    /// Executes the decoded instruction; returns extra cycles beyond the
    /// table's base cost.
    fn execute(&mut self, bus: &mut CpuBus, mnemonic: Mnemonic, mode: Mode, penalty: bool) -> u8 {
        use Mnemonic::*;

        // Read-operand helper honoring the page-cross penalty.
        macro_rules! load {
            () => {{
                let (addr, crossed) = self.operand_addr(bus, mode);
                (bus.read(addr), (crossed && penalty) as u8)
            }};
        }

        match mnemonic {
            Lda => {
                let (value, extra) = load!();
                self.a = value;
                self.p.update_zero_negative(self.a);
                extra
            }
            Ldx => {
                let (value, extra) = load!();
                self.x = value;
                self.p.update_zero_negative(self.x);
                extra
            }
            Ldy => {
                let (value, extra) = load!();
                self.y = value;
                self.p.update_zero_negative(self.y);
                extra
            }
            Sta => {
                let (addr, _) = self.operand_addr(bus, mode);
                bus.write(addr, self.a);
                0
            }
            Stx => {
                let (addr, _) = self.operand_addr(bus, mode);
                bus.write(addr, self.x);
                0
            }
            Sty => {
                let (addr, _) = self.operand_addr(bus, mode);
                bus.write(addr, self.y);
                0
            }
            Adc => {
                let (value, extra) = load!();
                self.adc(value);
                extra
            }
            Sbc => {
                let (value, extra) = load!();
                self.sbc(value);
                extra
            }
            And => {
                let (value, extra) = load!();
                self.a &= value;
                self.p.update_zero_negative(self.a);
                extra
            }
            Ora => {
                let (value, extra) = load!();
                self.a |= value;
                self.p.update_zero_negative(self.a);
                extra
            }
            Eor => {
                let (value, extra) = load!();
                self.a ^= value;
                self.p.update_zero_negative(self.a);
                extra
            }
            Cmp => {
                let (value, extra) = load!();
                self.compare(self.a, value);
                extra
            }
            Cpx => {
                let (value, extra) = load!();
                self.compare(self.x, value);
                extra
            }
            Cpy => {
                let (value, extra) = load!();
                self.compare(self.y, value);
                extra
            }
            Bit => {
                let (value, _) = load!();
                self.p.update_zero(self.a & value);
                self.p.set(Status::NEGATIVE, value & 0x80 != 0);
                self.p.set(Status::OVERFLOW, value & 0x40 != 0);
                0
            }
            Asl => {
                self.rmw(bus, mode, Self::asl);
                0
            }
            Lsr => {
                self.rmw(bus, mode, Self::lsr);
                0
            }
            Rol => {
                self.rmw(bus, mode, Self::rol);
                0
            }
            Ror => {
                self.rmw(bus, mode, Self::ror);
                0
            }
            Inc => {
                self.rmw(bus, mode, |cpu, v| {
                    let r = v.wrapping_add(1);
                    cpu.p.update_zero_negative(r);
                    r
                });
                0
            }
            Dec => {
                self.rmw(bus, mode, |cpu, v| {
                    let r = v.wrapping_sub(1);
                    cpu.p.update_zero_negative(r);
                    r
                });
                0
            }
            Inx => {
                self.x = self.x.wrapping_add(1);
                self.p.update_zero_negative(self.x);
                0
            }
            Iny => {
                self.y = self.y.wrapping_add(1);
                self.p.update_zero_negative(self.y);
                0
            }
            Dex => {
                self.x = self.x.wrapping_sub(1);
                self.p.update_zero_negative(self.x);
                0
            }
            Dey => {
                self.y = self.y.wrapping_sub(1);
                self.p.update_zero_negative(self.y);
                0
            }
            Tax => {
                self.x = self.a;
                self.p.update_zero_negative(self.x);
                0
            }
            Tay => {
                self.y = self.a;
                self.p.update_zero_negative(self.y);
                0
            }
            Txa => {
                self.a = self.x;
                self.p.update_zero_negative(self.a);
                0
            }
            Tya => {
                self.a = self.y;
                self.p.update_zero_negative(self.a);
                0
            }
            Tsx => {
                self.x = self.s;
                self.p.update_zero_negative(self.x);
                0
            }
            Txs => {
                self.s = self.x;
                0
            }
            Pha => {
                self.push(bus, self.a);
                0
            }
            Php => {
                let byte = self.p.to_pushed_byte();
                self.push(bus, byte);
                0
            }
            Pla => {
                self.a = self.pull(bus);
                self.p.update_zero_negative(self.a);
                0
            }
            Plp => {
                let byte = self.pull(bus);
                self.p = Status::from_pulled_byte(byte);
                0
            }
            Jmp => {
                let (addr, _) = self.operand_addr(bus, mode);
                self.pc = addr;
                0
            }
            Jsr => {
                let target = self.fetch_u16(bus);
                self.push_u16(bus, self.pc.wrapping_sub(1));
                self.pc = target;
                0
            }
            Rts => {
                self.pc = self.pull_u16(bus).wrapping_add(1);
                0
            }
            Brk => {
                // The byte after BRK is padding; the pushed PC skips it.
                self.pc = self.pc.wrapping_add(1);
                self.push_u16(bus, self.pc);
                let byte = self.p.to_pushed_byte();
                self.push(bus, byte);
                self.p.insert(Status::INTERRUPT);
                self.pc = bus.read_u16(cpu_mem::IRQ_VECTOR);
                0
            }
            Rti => {
                let byte = self.pull(bus);
                self.p = Status::from_pulled_byte(byte);
                self.pc = self.pull_u16(bus);
                0
            }
            Bcc => self.branch(bus, !self.p.contains(Status::CARRY)),
            Bcs => self.branch(bus, self.p.contains(Status::CARRY)),
            Beq => self.branch(bus, self.p.contains(Status::ZERO)),
            Bne => self.branch(bus, !self.p.contains(Status::ZERO)),
            Bmi => self.branch(bus, self.p.contains(Status::NEGATIVE)),
            Bpl => self.branch(bus, !self.p.contains(Status::NEGATIVE)),
            Bvs => self.branch(bus, self.p.contains(Status::OVERFLOW)),
            Bvc => self.branch(bus, !self.p.contains(Status::OVERFLOW)),
            Clc => {
                self.p.remove(Status::CARRY);
                0
            }
            Sec => {
                self.p.insert(Status::CARRY);
                0
            }
            Cli => {
                self.p.remove(Status::INTERRUPT);
                0
            }
            Sei => {
                self.p.insert(Status::INTERRUPT);
                0
            }
            Cld => {
                self.p.remove(Status::DECIMAL);
                0
            }
            Sed => {
                self.p.insert(Status::DECIMAL);
                0
            }
            Clv => {
                self.p.remove(Status::OVERFLOW);
                0
            }
            Nop => {
                if !matches!(mode, Mode::Implied) {
                    // Multi-byte NOPs still perform the operand read.
                    let (addr, crossed) = self.operand_addr(bus, mode);
                    bus.read(addr);
                    return (crossed && penalty) as u8;
                }
                0
            }
            // --- stable unofficial opcodes ------------------------------
            Lax => {
                let (value, extra) = load!();
                self.a = value;
                self.x = value;
                self.p.update_zero_negative(value);
                extra
            }
            Sax => {
                let (addr, _) = self.operand_addr(bus, mode);
                bus.write(addr, self.a & self.x);
                0
            }
            Slo => {
                if let Some((_, shifted)) = self.rmw(bus, mode, Self::asl) {
                    self.a |= shifted;
                    self.p.update_zero_negative(self.a);
                }
                0
            }
            Rla => {
                if let Some((_, rolled)) = self.rmw(bus, mode, Self::rol) {
                    self.a &= rolled;
                    self.p.update_zero_negative(self.a);
                }
                0
            }
            Sre => {
                if let Some((_, shifted)) = self.rmw(bus, mode, Self::lsr) {
                    self.a ^= shifted;
                    self.p.update_zero_negative(self.a);
                }
                0
            }
            Rra => {
                if let Some((_, rolled)) = self.rmw(bus, mode, Self::ror) {
                    self.adc(rolled);
                }
                0
            }
            Dcp => {
                if let Some((_, decremented)) = self.rmw(bus, mode, |_, v| v.wrapping_sub(1)) {
                    self.compare(self.a, decremented);
                }
                0
            }
            Isb => {
                if let Some((_, incremented)) = self.rmw(bus, mode, |_, v| v.wrapping_add(1)) {
                    self.sbc(incremented);
                }
                0
            }
            Anc => {
                let (value, _) = load!();
                self.a &= value;
                self.p.update_zero_negative(self.a);
                self.p.set(Status::CARRY, self.a & 0x80 != 0);
                0
            }
            Alr => {
                let (value, _) = load!();
                self.a &= value;
                self.a = self.lsr(self.a);
                0
            }
            Arr => {
                let (value, _) = load!();
                self.a &= value;
                let carry_in = (self.p.contains(Status::CARRY) as u8) << 7;
                self.a = (self.a >> 1) | carry_in;
                self.p.update_zero_negative(self.a);
                self.p.set(Status::CARRY, self.a & 0x40 != 0);
                self.p
                    .set(Status::OVERFLOW, ((self.a >> 6) ^ (self.a >> 5)) & 1 != 0);
                0
            }
            Sbx => {
                let (value, _) = load!();
                let base = self.a & self.x;
                self.p.set(Status::CARRY, base >= value);
                self.x = base.wrapping_sub(value);
                self.p.update_zero_negative(self.x);
                0
            }
            Las => {
                let (value, extra) = load!();
                let result = value & self.s;
                self.a = result;
                self.x = result;
                self.s = result;
                self.p.update_zero_negative(result);
                extra
            }
            Jam | Unstable => unreachable!("faulted before dispatch"),
        }
    }
}
