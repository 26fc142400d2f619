mod common;

use anyhow::Result;
use famicore_core::{Console, Mirroring};

use crate::common::{RESET_TARGET, console_with_program, prg_with_program, set_vectors};

#[test]
fn frame_counter_increments_once_per_run() -> Result<()> {
    let mut console = console_with_program(&[0x4C, 0x00, 0x80])?; // JMP $8000
    assert_eq!(console.run_frame().ppu.frame, 1);
    assert_eq!(console.run_frame().ppu.frame, 2);
    assert_eq!(console.run_frame().ppu.frame, 3);
    Ok(())
}

#[test]
fn vblank_flag_is_visible_to_polling_code() -> Result<()> {
    // Poll $2002 until bit 7 rises, then set a marker.
    let program = [
        0xAD, 0x02, 0x20, // LDA $2002
        0x10, 0xFB, //       BPL $8000
        0xA9, 0x01, //       LDA #$01
        0x85, 0x00, //       STA $00
        0x4C, 0x09, 0x80, // JMP $8009
    ];
    let mut console = console_with_program(&program)?;
    console.run_frame();
    assert_eq!(console.peek_ram(0x0000), 0x01);
    Ok(())
}

#[test]
fn nmi_fires_once_per_frame_when_enabled() -> Result<()> {
    // Main: enable NMI, spin. Handler at $9000: INC $10; RTI.
    let mut prg = prg_with_program(&[
        0xA9, 0x80, //       LDA #$80
        0x8D, 0x00, 0x20, // STA $2000
        0x4C, 0x05, 0x80, // JMP $8005
    ]);
    prg[0x1000..0x1003].copy_from_slice(&[0xE6, 0x10, 0x40]);
    set_vectors(&mut prg, 0x9000, RESET_TARGET, 0xFFF0);

    let mut console = Console::new();
    console.load_cartridge(prg, Vec::new(), 0, Mirroring::Horizontal)?;
    for _ in 0..4 {
        console.run_frame();
    }
    let count = console.peek_ram(0x0010);
    assert!((3..=4).contains(&count), "nmi count was {count}");
    Ok(())
}

#[test]
fn ppudata_reads_are_buffered_one_behind() -> Result<()> {
    // Write $AA/$BB to $2000/$2001 of VRAM, reset the address, and read
    // back three times: the first read returns the stale buffer.
    let program = [
        0xA9, 0x20, //       LDA #$20
        0x8D, 0x06, 0x20, // STA $2006
        0xA9, 0x00, //       LDA #$00
        0x8D, 0x06, 0x20, // STA $2006 (addr = $2000)
        0xA9, 0xAA, //       LDA #$AA
        0x8D, 0x07, 0x20, // STA $2007
        0xA9, 0xBB, //       LDA #$BB
        0x8D, 0x07, 0x20, // STA $2007
        0xA9, 0x20, //       LDA #$20
        0x8D, 0x06, 0x20, // STA $2006
        0xA9, 0x00, //       LDA #$00
        0x8D, 0x06, 0x20, // STA $2006 (addr = $2000 again)
        0xAD, 0x07, 0x20, // LDA $2007
        0x85, 0x10, //       STA $10
        0xAD, 0x07, 0x20, // LDA $2007
        0x85, 0x11, //       STA $11
        0xAD, 0x07, 0x20, // LDA $2007
        0x85, 0x12, //       STA $12
    ];
    let mut console = console_with_program(&program)?;
    for _ in 0..18 {
        console.step_instruction();
    }
    assert_eq!(console.peek_ram(0x0010), 0x00); // stale power-on buffer
    assert_eq!(console.peek_ram(0x0011), 0xAA);
    assert_eq!(console.peek_ram(0x0012), 0xBB);
    Ok(())
}

#[test]
fn toggling_nmi_enable_mid_vblank_retriggers_the_interrupt() -> Result<()> {
    // The NMI line is VBLANK && enable; dropping and raising the enable
    // bit while the flag is still set produces a fresh edge each time.
    let mut prg = prg_with_program(&[
        0xA9, 0x80, //       LDA #$80
        0x8D, 0x00, 0x20, // STA $2000
        0xA9, 0x00, //       LDA #$00
        0x8D, 0x00, 0x20, // STA $2000 ($8005)
        0xA9, 0x80, //       LDA #$80
        0x8D, 0x00, 0x20, // STA $2000
        0x4C, 0x05, 0x80, // JMP $8005
    ]);
    prg[0x1000..0x1003].copy_from_slice(&[0xE6, 0x10, 0x40]); // INC $10; RTI
    set_vectors(&mut prg, 0x9000, RESET_TARGET, 0xFFF0);

    let mut console = Console::new();
    console.load_cartridge(prg, Vec::new(), 0, Mirroring::Horizontal)?;
    for _ in 0..2 {
        console.run_frame();
    }
    let count = console.peek_ram(0x0010);
    assert!(count >= 10, "only {count} interrupts over two frames");
    Ok(())
}

/// Parks every sprite off-screen via OAM DMA, then drops `sprites` of them
/// onto one scanline and polls `$2002` bit 5 into `$00`.
fn oam_overflow_program(sprites: u8) -> Vec<u8> {
    vec![
        0xA2, 0x00, //       LDX #$00
        0xA9, 0xF0, //       LDA #$F0
        0x9D, 0x00, 0x02, // STA $0200,X ($8004)
        0xE8, //             INX
        0xD0, 0xFA, //       BNE $8004
        0xA9, 0x10, //       LDA #$10
        0xA2, 0x00, //       LDX #$00
        0x9D, 0x00, 0x02, // STA $0200,X ($800E, sprite y)
        0xE8, 0xE8, 0xE8, 0xE8,
        0xE0, sprites * 4, // CPX #(sprites * 4)
        0xD0, 0xF5, //       BNE $800E
        0xA9, 0x00, //       LDA #$00
        0x8D, 0x03, 0x20, // STA $2003
        0xA9, 0x02, //       LDA #$02
        0x8D, 0x14, 0x40, // STA $4014
        0xA9, 0x18, //       LDA #$18
        0x8D, 0x01, 0x20, // STA $2001 (rendering on)
        0xAD, 0x02, 0x20, // LDA $2002 ($8028)
        0x29, 0x20, //       AND #$20
        0xF0, 0xF9, //       BEQ $8028
        0xA9, 0x01, //       LDA #$01
        0x85, 0x00, //       STA $00
        0x4C, 0x33, 0x80, // JMP $8033
    ]
}

#[test]
fn ninth_sprite_on_a_scanline_raises_the_overflow_flag() -> Result<()> {
    let mut console = console_with_program(&oam_overflow_program(9))?;
    for _ in 0..3 {
        console.run_frame();
    }
    assert_eq!(console.peek_ram(0x0000), 0x01, "overflow flag never rose");
    Ok(())
}

#[test]
fn eight_sprites_on_a_scanline_do_not_overflow() -> Result<()> {
    let mut console = console_with_program(&oam_overflow_program(8))?;
    for _ in 0..3 {
        console.run_frame();
    }
    assert_eq!(console.peek_ram(0x0000), 0x00);
    Ok(())
}

#[test]
fn disabled_rendering_fills_the_frame_with_the_backdrop() -> Result<()> {
    // Set $3F00 = $21 through $2006/$2007 and leave rendering off.
    let program = [
        0xA9, 0x3F, //       LDA #$3F
        0x8D, 0x06, 0x20, // STA $2006
        0xA9, 0x00, //       LDA #$00
        0x8D, 0x06, 0x20, // STA $2006
        0xA9, 0x21, //       LDA #$21
        0x8D, 0x07, 0x20, // STA $2007
        0x4C, 0x0F, 0x80, // JMP $800F
    ];
    let mut console = console_with_program(&program)?;
    console.run_frame();
    let frame = console.run_frame();
    assert!(frame.framebuffer.iter().all(|&pixel| pixel == 0x21));
    Ok(())
}

#[test]
fn sprite_zero_hit_rises_over_an_opaque_background() -> Result<()> {
    // Fill CHR RAM tiles 0 and 1 with a solid low plane, place sprite 0
    // over the background, enable rendering, and poll $2002 bit 6.
    let program = [
        0xA9, 0x00, //       LDA #$00
        0x8D, 0x06, 0x20, // STA $2006
        0x8D, 0x06, 0x20, // STA $2006 (addr = $0000)
        0xA2, 0x08, //       LDX #$08
        0xA9, 0xFF, //       LDA #$FF
        0x8D, 0x07, 0x20, // STA $2007
        0xCA, //             DEX
        0xD0, 0xF8, //       BNE $800A
        0xA9, 0x00, //       LDA #$00
        0x8D, 0x06, 0x20, // STA $2006
        0xA9, 0x10, //       LDA #$10
        0x8D, 0x06, 0x20, // STA $2006 (addr = $0010)
        0xA2, 0x08, //       LDX #$08
        0xA9, 0xFF, //       LDA #$FF
        0x8D, 0x07, 0x20, // STA $2007
        0xCA, //             DEX
        0xD0, 0xF8, //       BNE $801E
        0xA9, 0x00, //       LDA #$00
        0x8D, 0x03, 0x20, // STA $2003 (OAMADDR = 0)
        0xA9, 0x10, //       LDA #$10
        0x8D, 0x04, 0x20, // STA $2004 (sprite 0 y)
        0xA9, 0x01, //       LDA #$01
        0x8D, 0x04, 0x20, // STA $2004 (tile 1)
        0xA9, 0x00, //       LDA #$00
        0x8D, 0x04, 0x20, // STA $2004 (attributes)
        0xA9, 0x30, //       LDA #$30
        0x8D, 0x04, 0x20, // STA $2004 (x = 48)
        0xA9, 0x1E, //       LDA #$1E
        0x8D, 0x01, 0x20, // STA $2001 (rendering on)
        0xAD, 0x02, 0x20, // LDA $2002
        0x29, 0x40, //       AND #$40
        0xF0, 0xF9, //       BEQ $8044
        0xA9, 0x01, //       LDA #$01
        0x85, 0x00, //       STA $00
        0x4C, 0x4F, 0x80, // JMP $804F
    ];
    let mut console = console_with_program(&program)?;
    for _ in 0..3 {
        console.run_frame();
    }
    assert_eq!(console.peek_ram(0x0000), 0x01, "sprite zero hit never rose");
    Ok(())
}

#[test]
fn audio_buffer_holds_one_sample_per_cpu_cycle() -> Result<()> {
    let mut console = console_with_program(&[0x4C, 0x00, 0x80])?;
    console.run_frame();
    let frame = console.run_frame();
    // 341 * 262 dots / 3 dots per CPU cycle, +- instruction granularity.
    let samples = frame.audio_samples.len();
    assert!(
        (29_000..31_000).contains(&samples),
        "sample count was {samples}"
    );
    Ok(())
}
