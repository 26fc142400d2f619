mod common;

use anyhow::Result;
use famicore_core::FaultPolicy;

use crate::common::{console_with_program, cpu_cycles_between};

#[test]
fn load_store_brk_roundtrip() -> Result<()> {
    // LDA #$05; STA $00; BRK
    let mut console = console_with_program(&[0xA9, 0x05, 0x85, 0x00, 0x00])?;

    assert!(console.step_instruction().is_none());
    assert_eq!(console.cpu_snapshot().a, 0x05);
    assert!(console.step_instruction().is_none());
    assert_eq!(console.peek_ram(0x0000), 0x05);

    console.step_instruction();
    let cpu = console.cpu_snapshot();
    // BRK vectors through $FFFE and pushes PC+2 plus status with B set.
    assert_eq!(cpu.pc, 0xFFF0);
    assert_eq!(cpu.s, 0xFA);
    assert_eq!(console.peek_ram(0x01FD), 0x80);
    assert_eq!(console.peek_ram(0x01FC), 0x06);
    assert_eq!(console.peek_ram(0x01FB), 0x34);
    assert_eq!(cpu.p & 0x04, 0x04);
    Ok(())
}

#[test]
fn absolute_indexed_pays_for_page_crossings() -> Result<()> {
    // LDX #$01; LDA $80FF,X; LDA $8000,X
    let mut console = console_with_program(&[0xA2, 0x01, 0xBD, 0xFF, 0x80, 0xBD, 0x00, 0x80])?;
    console.step_instruction();

    let before = console.ppu_snapshot();
    console.step_instruction();
    let crossed = console.ppu_snapshot();
    console.step_instruction();
    let within = console.ppu_snapshot();

    assert_eq!(cpu_cycles_between(&before, &crossed), 5);
    assert_eq!(cpu_cycles_between(&crossed, &within), 4);
    Ok(())
}

#[test]
fn taken_branch_costs_an_extra_cycle() -> Result<()> {
    // LDA #$00; BEQ +0 (taken, same page); BNE +0 (not taken)
    let mut console = console_with_program(&[0xA9, 0x00, 0xF0, 0x00, 0xD0, 0x00])?;
    console.step_instruction();

    let before = console.ppu_snapshot();
    console.step_instruction();
    let taken = console.ppu_snapshot();
    console.step_instruction();
    let skipped = console.ppu_snapshot();

    assert_eq!(cpu_cycles_between(&before, &taken), 3);
    assert_eq!(cpu_cycles_between(&taken, &skipped), 2);
    Ok(())
}

#[test]
fn jmp_indirect_wraps_inside_the_page() -> Result<()> {
    // Pointer $02FF/$0200 = $1234; the high byte must come from $0200.
    let program = [
        0xA9, 0x34, // LDA #$34
        0x8D, 0xFF, 0x02, // STA $02FF
        0xA9, 0x12, // LDA #$12
        0x8D, 0x00, 0x02, // STA $0200
        0x6C, 0xFF, 0x02, // JMP ($02FF)
    ];
    let mut console = console_with_program(&program)?;
    for _ in 0..5 {
        console.step_instruction();
    }
    assert_eq!(console.cpu_snapshot().pc, 0x1234);
    Ok(())
}

#[test]
fn adc_sets_overflow_on_signed_wrap() -> Result<()> {
    // LDA #$7F; ADC #$01
    let mut console = console_with_program(&[0xA9, 0x7F, 0x69, 0x01])?;
    console.step_instruction();
    console.step_instruction();
    let cpu = console.cpu_snapshot();
    assert_eq!(cpu.a, 0x80);
    assert_eq!(cpu.p & 0xC0, 0xC0); // N and V
    assert_eq!(cpu.p & 0x01, 0x00); // no carry
    Ok(())
}

#[test]
fn sbc_clears_carry_on_borrow() -> Result<()> {
    // LDA #$00; SEC; SBC #$01
    let mut console = console_with_program(&[0xA9, 0x00, 0x38, 0xE9, 0x01])?;
    for _ in 0..3 {
        console.step_instruction();
    }
    let cpu = console.cpu_snapshot();
    assert_eq!(cpu.a, 0xFF);
    assert_eq!(cpu.p & 0x01, 0x00);
    assert_eq!(cpu.p & 0x80, 0x80);
    Ok(())
}

#[test]
fn lax_loads_both_registers() -> Result<()> {
    // LDA #$5A; STA $10; LDA #$00; LAX $10
    let mut console = console_with_program(&[0xA9, 0x5A, 0x85, 0x10, 0xA9, 0x00, 0xA7, 0x10])?;
    for _ in 0..4 {
        console.step_instruction();
    }
    let cpu = console.cpu_snapshot();
    assert_eq!(cpu.a, 0x5A);
    assert_eq!(cpu.x, 0x5A);
    Ok(())
}

#[test]
fn jam_opcode_reports_a_fault_and_continues() -> Result<()> {
    let mut console = console_with_program(&[0x02])?;
    let fault = console.step_instruction().expect("jam should fault");
    assert_eq!(fault.pc, 0x8000);
    assert_eq!(fault.opcode, 0x02);
    // Default policy skips the byte and keeps executing.
    assert_eq!(console.cpu_snapshot().pc, 0x8001);
    assert!(console.step_instruction().is_none());
    Ok(())
}

#[test]
fn halt_policy_freezes_the_cpu() -> Result<()> {
    let mut console = console_with_program(&[0x02])?;
    console.set_fault_policy(FaultPolicy::Halt);
    assert!(console.step_instruction().is_some());
    let stalled_pc = console.cpu_snapshot().pc;
    for _ in 0..10 {
        assert!(console.step_instruction().is_none());
    }
    assert_eq!(console.cpu_snapshot().pc, stalled_pc);
    Ok(())
}
