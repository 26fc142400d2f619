//! Dot-accurate picture processor.
//!
//! `tick` advances exactly one PPU dot (341 per scanline, 262 scanlines per
//! frame). Background tiles flow through the hardware's 16-bit shift
//! registers, sprites are evaluated one scanline ahead of display, and the
//! vblank/NMI handshake follows the 2C02 timing: the vblank flag rises at
//! scanline 241 dot 1 and clears at pre-render dot 1.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    cartridge::{Cartridge, header::Mirroring},
    memory::ppu as ppu_mem,
    ppu::{
        palette::{PaletteRam, SYSTEM_PALETTE},
        registers::{Control, Mask, PpuStatus, VramAddr},
        sprite::{OamEntry, ScanlineSprite},
    },
    state::PpuState,
};

pub mod palette;
pub(crate) mod registers;
pub(crate) mod sprite;

const VISIBLE_LINES: u16 = ppu_mem::FRAME_HEIGHT as u16;
const LAST_VISIBLE_LINE: u16 = VISIBLE_LINES - 1;

/// Beam position and frame counter, reported with every completed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PpuSnapshot {
    pub scanline: u16,
    pub dot: u16,
    pub frame: u64,
}

#[derive(Debug, Clone)]
pub struct Ppu {
    control: Control,
    mask: Mask,
    status: PpuStatus,
    oam_addr: u8,
    oam: [u8; ppu_mem::OAM_SIZE],
    ciram: [u8; ppu_mem::CIRAM_SIZE],
    palette: PaletteRam,

    // Loopy scroll state.
    v: VramAddr,
    t: VramAddr,
    fine_x: u8,
    write_latch: bool,
    data_buffer: u8,
    open_bus: u8,

    scanline: u16,
    dot: u16,
    frame: u64,
    odd_frame: bool,
    frame_complete: bool,

    // Background fetch pipeline.
    next_tile_id: u8,
    next_attribute: u8,
    next_pattern_low: u8,
    next_pattern_high: u8,
    shifter_pattern_low: u16,
    shifter_pattern_high: u16,
    shifter_attribute_low: u16,
    shifter_attribute_high: u16,

    // Sprites selected at dot 65, latched with patterns at dot 257.
    pending_sprites: Vec<(u8, u8)>,
    scanline_sprites: Vec<ScanlineSprite>,

    /// Palette indices, one byte per visible pixel.
    framebuffer: Vec<u8>,
}

impl Ppu {
    pub(crate) fn new() -> Self {
        Self {
            control: Control::empty(),
            mask: Mask::empty(),
            status: PpuStatus::empty(),
            oam_addr: 0,
            oam: [0; ppu_mem::OAM_SIZE],
            ciram: [0; ppu_mem::CIRAM_SIZE],
            palette: PaletteRam::new(),
            v: VramAddr::default(),
            t: VramAddr::default(),
            fine_x: 0,
            write_latch: false,
            data_buffer: 0,
            open_bus: 0,
            scanline: 0,
            dot: 0,
            frame: 0,
            odd_frame: false,
            frame_complete: false,
            next_tile_id: 0,
            next_attribute: 0,
            next_pattern_low: 0,
            next_pattern_high: 0,
            shifter_pattern_low: 0,
            shifter_pattern_high: 0,
            shifter_attribute_low: 0,
            shifter_attribute_high: 0,
            pending_sprites: Vec::with_capacity(8),
            scanline_sprites: Vec::with_capacity(8),
            framebuffer: vec![0; ppu_mem::FRAME_PIXELS],
        }
    }

    /// Cold boot: everything cleared, including VRAM and OAM.
    pub(crate) fn power_on(&mut self) {
        *self = Self::new();
    }

    /// Warm reset: registers and latches clear, memories survive.
    pub(crate) fn reset(&mut self) {
        self.control = Control::empty();
        self.mask = Mask::empty();
        self.write_latch = false;
        self.data_buffer = 0;
        self.fine_x = 0;
        self.t = VramAddr::default();
        self.scanline = 0;
        self.dot = 0;
        self.odd_frame = false;
        self.frame_complete = false;
    }

    /// NMI request level: high while vblank is flagged and enabled. The CPU
    /// latches the rising edge, so toggling enable mid-vblank re-arms it.
    pub(crate) fn nmi_line(&self) -> bool {
        self.status.contains(PpuStatus::VBLANK) && self.control.contains(Control::NMI_ENABLE)
    }

    pub(crate) fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    pub(crate) fn snapshot(&self) -> PpuSnapshot {
        PpuSnapshot {
            scanline: self.scanline,
            dot: self.dot,
            frame: self.frame,
        }
    }

    /// Framebuffer of master-palette indices, row-major 256x240.
    pub fn framebuffer(&self) -> &[u8] {
        &self.framebuffer
    }

    /// Expands the framebuffer to RGB888, three bytes per pixel.
    pub fn render_rgb(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ppu_mem::FRAME_PIXELS * 3);
        for &index in &self.framebuffer {
            let (r, g, b) = SYSTEM_PALETTE[(index & 0x3F) as usize];
            out.extend_from_slice(&[r, g, b]);
        }
        out
    }

    // --- CPU-visible registers --------------------------------------------

    pub(crate) fn read_register(&mut self, cart: &mut Cartridge, addr: u16) -> u8 {
        use ppu_mem::Register;
        let value = match Register::from_cpu_addr(addr) {
            Register::Status => {
                let byte = self.status.to_read_byte(self.open_bus);
                self.status.remove(PpuStatus::VBLANK);
                self.write_latch = false;
                byte
            }
            Register::OamData => {
                let byte = self.oam[self.oam_addr as usize];
                // Attribute bytes have three unimplemented bits.
                if self.oam_addr % 4 == 2 { byte & 0xE3 } else { byte }
            }
            Register::Data => {
                let bus_addr = self.v.bus_addr();
                let value = if bus_addr >= ppu_mem::PALETTE_BASE {
                    // Palette reads are immediate; the buffer still loads
                    // the nametable byte underneath.
                    self.data_buffer = self.vram_read(cart, bus_addr & 0x2FFF);
                    self.palette.read(bus_addr)
                } else {
                    let buffered = self.data_buffer;
                    self.data_buffer = self.vram_read(cart, bus_addr);
                    buffered
                };
                self.v.0 = self.v.0.wrapping_add(self.control.vram_increment());
                value
            }
            // Write-only registers return the decayed bus value.
            _ => self.open_bus,
        };
        self.open_bus = value;
        value
    }

    pub(crate) fn write_register(&mut self, cart: &mut Cartridge, addr: u16, data: u8) {
        use ppu_mem::Register;
        self.open_bus = data;
        match Register::from_cpu_addr(addr) {
            Register::Control => {
                self.control = Control::from_bits_truncate(data);
                self.t.set_nametable(self.control.nametable_select());
            }
            Register::Mask => {
                self.mask = Mask::from_bits_truncate(data);
            }
            Register::Status => {} // read-only
            Register::OamAddr => {
                self.oam_addr = data;
            }
            Register::OamData => {
                self.oam[self.oam_addr as usize] = data;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            Register::Scroll => {
                if self.write_latch {
                    self.t.set_fine_y((data & 0x07) as u16);
                    self.t.set_coarse_y((data >> 3) as u16);
                } else {
                    self.fine_x = data & 0x07;
                    self.t.set_coarse_x((data >> 3) as u16);
                }
                self.write_latch = !self.write_latch;
            }
            Register::Addr => {
                if self.write_latch {
                    self.t.0 = (self.t.0 & 0xFF00) | data as u16;
                    self.v = self.t;
                } else {
                    // High write clears bit 14.
                    self.t.0 = (self.t.0 & 0x00FF) | (((data & 0x3F) as u16) << 8);
                }
                self.write_latch = !self.write_latch;
            }
            Register::Data => {
                let bus_addr = self.v.bus_addr();
                self.vram_write(cart, bus_addr, data);
                self.v.0 = self.v.0.wrapping_add(self.control.vram_increment());
            }
        }
    }

    /// Direct OAM write used by the `$4014` DMA engine.
    pub(crate) fn oam_dma_write(&mut self, data: u8) {
        self.oam[self.oam_addr as usize] = data;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    // --- VRAM access ------------------------------------------------------

    fn ciram_index(mirroring: Mirroring, addr: u16) -> usize {
        let index = (addr & 0x0FFF) as usize;
        let table = index >> 10;
        let offset = index & 0x03FF;
        let bank = match mirroring {
            Mirroring::Vertical => table & 1,
            Mirroring::Horizontal => table >> 1,
        };
        (bank << 10) | offset
    }

    fn vram_read(&mut self, cart: &mut Cartridge, addr: u16) -> u8 {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        match addr {
            0x0000..ppu_mem::NAMETABLE_BASE => cart.ppu_read(addr).unwrap_or(self.open_bus),
            ppu_mem::NAMETABLE_BASE..ppu_mem::PALETTE_BASE => {
                self.ciram[Self::ciram_index(cart.mirroring(), addr)]
            }
            _ => self.palette.read(addr),
        }
    }

    fn vram_write(&mut self, cart: &mut Cartridge, addr: u16, data: u8) {
        let addr = addr & ppu_mem::VRAM_MIRROR_MASK;
        match addr {
            0x0000..ppu_mem::NAMETABLE_BASE => cart.ppu_write(addr, data),
            ppu_mem::NAMETABLE_BASE..ppu_mem::PALETTE_BASE => {
                self.ciram[Self::ciram_index(cart.mirroring(), addr)] = data;
            }
            _ => self.palette.write(addr, data),
        }
    }

    // --- dot scheduler ----------------------------------------------------

    /// Advances the PPU by one dot.
    pub(crate) fn tick(&mut self, cart: &mut Cartridge) {
        let rendering = self.mask.rendering_enabled();
        let on_fetch_line = self.scanline <= LAST_VISIBLE_LINE
            || self.scanline == ppu_mem::PRE_RENDER_LINE;

        if self.scanline == ppu_mem::PRE_RENDER_LINE && self.dot == 1 {
            self.status.remove(
                PpuStatus::VBLANK | PpuStatus::SPRITE_ZERO_HIT | PpuStatus::SPRITE_OVERFLOW,
            );
            self.scanline_sprites.clear();
            self.pending_sprites.clear();
            self.frame += 1;
            self.frame_complete = true;
            trace!(frame = self.frame, "frame boundary");
        }

        if on_fetch_line {
            if rendering
                && ((2..258).contains(&self.dot) || (321..338).contains(&self.dot))
            {
                self.shift_background();
            }
            if rendering
                && ((1..257).contains(&self.dot) || (321..337).contains(&self.dot))
            {
                self.background_fetch_cycle(cart);
            }
            if rendering && self.dot == 256 {
                self.v.increment_y();
            }
            if self.dot == 257 {
                if rendering {
                    self.reload_background_shifters();
                    self.v.copy_horizontal(self.t);
                    self.latch_sprites(cart);
                }
                // OAMADDR is zeroed during sprite tile loading.
                self.oam_addr = 0;
            }
            if rendering && self.dot == 260 {
                cart.on_scanline_end();
            }
            if self.scanline == ppu_mem::PRE_RENDER_LINE
                && (280..305).contains(&self.dot)
                && rendering
            {
                self.v.copy_vertical(self.t);
            }
        }

        // Sprite evaluation for the next scanline, one pass at dot 65.
        if rendering && self.dot == 65 && self.scanline < LAST_VISIBLE_LINE {
            self.evaluate_sprites();
        }

        if self.scanline <= LAST_VISIBLE_LINE && (1..257).contains(&self.dot) {
            self.emit_pixel();
        }

        if self.scanline == ppu_mem::VBLANK_LINE && self.dot == 1 {
            self.status.insert(PpuStatus::VBLANK);
        }

        self.advance_beam(rendering);
    }

    fn advance_beam(&mut self, rendering: bool) {
        self.dot += 1;
        // Odd frames drop the last pre-render dot while rendering.
        let line_len = if self.scanline == ppu_mem::PRE_RENDER_LINE && self.odd_frame && rendering
        {
            ppu_mem::DOTS_PER_LINE - 1
        } else {
            ppu_mem::DOTS_PER_LINE
        };
        if self.dot >= line_len {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline > ppu_mem::PRE_RENDER_LINE {
                self.scanline = 0;
                self.odd_frame = !self.odd_frame;
            }
        }
    }

    // --- background pipeline ----------------------------------------------

    fn shift_background(&mut self) {
        self.shifter_pattern_low <<= 1;
        self.shifter_pattern_high <<= 1;
        self.shifter_attribute_low <<= 1;
        self.shifter_attribute_high <<= 1;
    }

    fn reload_background_shifters(&mut self) {
        self.shifter_pattern_low =
            (self.shifter_pattern_low & 0xFF00) | self.next_pattern_low as u16;
        self.shifter_pattern_high =
            (self.shifter_pattern_high & 0xFF00) | self.next_pattern_high as u16;
        let low = if self.next_attribute & 0x01 != 0 { 0xFF } else { 0x00 };
        let high = if self.next_attribute & 0x02 != 0 { 0xFF } else { 0x00 };
        self.shifter_attribute_low = (self.shifter_attribute_low & 0xFF00) | low;
        self.shifter_attribute_high = (self.shifter_attribute_high & 0xFF00) | high;
    }

    fn background_fetch_cycle(&mut self, cart: &mut Cartridge) {
        match (self.dot - 1) % 8 {
            0 => {
                self.reload_background_shifters();
                self.next_tile_id = self.vram_read(cart, self.v.tile_addr());
            }
            2 => {
                let attribute = self.vram_read(cart, self.v.attribute_addr());
                let shift = ((self.v.coarse_y() & 0x02) << 1) | (self.v.coarse_x() & 0x02);
                self.next_attribute = (attribute >> shift) & 0x03;
            }
            4 => {
                let addr = self.pattern_row_addr();
                self.next_pattern_low = self.vram_read(cart, addr);
            }
            6 => {
                let addr = self.pattern_row_addr() + 8;
                self.next_pattern_high = self.vram_read(cart, addr);
            }
            7 => self.v.increment_coarse_x(),
            _ => {}
        }
    }

    fn pattern_row_addr(&self) -> u16 {
        self.control.background_table_base() + self.next_tile_id as u16 * 16 + self.v.fine_y()
    }

    // --- sprites ----------------------------------------------------------

    /// Selects up to eight OAM entries in range of the next scanline and
    /// raises the overflow flag when a ninth exists.
    fn evaluate_sprites(&mut self) {
        self.pending_sprites.clear();
        let height = self.control.sprite_height();
        for index in 0..64 {
            let y = self.oam[index * 4] as u16;
            let row = self.scanline.wrapping_sub(y);
            if row >= height {
                continue;
            }
            if self.pending_sprites.len() == 8 {
                self.status.insert(PpuStatus::SPRITE_OVERFLOW);
                break;
            }
            self.pending_sprites.push((index as u8, row as u8));
        }
    }

    /// Fetches pattern rows for the sprites evaluated at dot 65.
    fn latch_sprites(&mut self, cart: &mut Cartridge) {
        self.scanline_sprites.clear();
        if self.scanline >= LAST_VISIBLE_LINE {
            return;
        }
        let height = self.control.sprite_height();
        let pending = std::mem::take(&mut self.pending_sprites);
        for &(index, row) in &pending {
            let entry = OamEntry::from_oam(&self.oam, index as usize);
            let mut row = row as u16;
            if entry.flip_vertical() {
                row = height - 1 - row;
            }
            let addr = if height == 16 {
                let table = ((entry.tile & 0x01) as u16) << 12;
                let mut tile = (entry.tile & 0xFE) as u16;
                if row >= 8 {
                    tile += 1;
                    row -= 8;
                }
                table + tile * 16 + row
            } else {
                self.control.sprite_table_base() + entry.tile as u16 * 16 + row
            };
            let mut low = self.vram_read(cart, addr);
            let mut high = self.vram_read(cart, addr + 8);
            if entry.flip_horizontal() {
                low = low.reverse_bits();
                high = high.reverse_bits();
            }
            self.scanline_sprites.push(ScanlineSprite {
                x: entry.x,
                palette: entry.palette(),
                behind_background: entry.behind_background(),
                pattern_low: low,
                pattern_high: high,
                is_sprite_zero: index == 0,
            });
        }
    }

    // --- pixel mux --------------------------------------------------------

    fn emit_pixel(&mut self) {
        let column = self.dot - 1;

        let mut bg_pixel = 0u8;
        let mut bg_palette = 0u8;
        let bg_visible = self.mask.contains(Mask::SHOW_BACKGROUND)
            && (column >= 8 || self.mask.contains(Mask::BACKGROUND_LEFT));
        if bg_visible {
            let select = 0x8000u16 >> self.fine_x;
            let low = (self.shifter_pattern_low & select != 0) as u8;
            let high = (self.shifter_pattern_high & select != 0) as u8;
            bg_pixel = (high << 1) | low;
            let pal_low = (self.shifter_attribute_low & select != 0) as u8;
            let pal_high = (self.shifter_attribute_high & select != 0) as u8;
            bg_palette = (pal_high << 1) | pal_low;
        }

        let mut sprite_pixel = 0u8;
        let mut sprite_palette = 0u8;
        let mut sprite_behind = false;
        let mut sprite_zero = false;
        let sprites_visible = self.mask.contains(Mask::SHOW_SPRITES)
            && (column >= 8 || self.mask.contains(Mask::SPRITES_LEFT));
        if sprites_visible {
            // First opaque sprite in OAM order wins regardless of priority.
            for sprite in &self.scanline_sprites {
                let pixel = sprite.pixel_at(column);
                if pixel != 0 {
                    sprite_pixel = pixel;
                    sprite_palette = sprite.palette;
                    sprite_behind = sprite.behind_background;
                    sprite_zero = sprite.is_sprite_zero;
                    break;
                }
            }
        }

        let (pixel, palette) = match (bg_pixel, sprite_pixel) {
            (0, 0) => (0, 0),
            (0, _) => (sprite_pixel, sprite_palette),
            (_, 0) => (bg_pixel, bg_palette),
            _ => {
                if sprite_zero && column != 255 {
                    self.status.insert(PpuStatus::SPRITE_ZERO_HIT);
                }
                if sprite_behind {
                    (bg_pixel, bg_palette)
                } else {
                    (sprite_pixel, sprite_palette)
                }
            }
        };

        let mut color = self.palette.color_index(palette, pixel);
        if self.mask.contains(Mask::GREYSCALE) {
            color &= 0x30;
        }
        self.framebuffer[self.scanline as usize * ppu_mem::FRAME_WIDTH + column as usize] = color;
    }

    // --- savestate --------------------------------------------------------

    pub(crate) fn state(&self) -> PpuState {
        PpuState {
            control: self.control.bits(),
            mask: self.mask.bits(),
            status: self.status.bits(),
            oam_addr: self.oam_addr,
            oam: self.oam.to_vec(),
            ciram: self.ciram.to_vec(),
            palette: self.palette.as_bytes().to_vec(),
            v: self.v.raw(),
            t: self.t.raw(),
            fine_x: self.fine_x,
            write_latch: self.write_latch,
            data_buffer: self.data_buffer,
            open_bus: self.open_bus,
            scanline: self.scanline,
            dot: self.dot,
            frame: self.frame,
            odd_frame: self.odd_frame,
            next_tile_id: self.next_tile_id,
            next_attribute: self.next_attribute,
            next_pattern_low: self.next_pattern_low,
            next_pattern_high: self.next_pattern_high,
            shifter_pattern_low: self.shifter_pattern_low,
            shifter_pattern_high: self.shifter_pattern_high,
            shifter_attribute_low: self.shifter_attribute_low,
            shifter_attribute_high: self.shifter_attribute_high,
            pending_sprites: self.pending_sprites.clone(),
            scanline_sprites: self.scanline_sprites.clone(),
            framebuffer: self.framebuffer.clone(),
        }
    }

    /// Applies a snapshot whose section lengths the caller has already
    /// validated.
    pub(crate) fn apply_state(&mut self, state: &PpuState) {
        self.control = Control::from_bits_truncate(state.control);
        self.mask = Mask::from_bits_truncate(state.mask);
        self.status = PpuStatus::from_bits_truncate(state.status);
        self.oam_addr = state.oam_addr;
        self.oam.copy_from_slice(&state.oam);
        self.ciram.copy_from_slice(&state.ciram);
        self.palette.load(&state.palette);
        self.v = VramAddr(state.v);
        self.t = VramAddr(state.t);
        self.fine_x = state.fine_x;
        self.write_latch = state.write_latch;
        self.data_buffer = state.data_buffer;
        self.open_bus = state.open_bus;
        self.scanline = state.scanline;
        self.dot = state.dot;
        self.frame = state.frame;
        self.odd_frame = state.odd_frame;
        self.next_tile_id = state.next_tile_id;
        self.next_attribute = state.next_attribute;
        self.next_pattern_low = state.next_pattern_low;
        self.next_pattern_high = state.next_pattern_high;
        self.shifter_pattern_low = state.shifter_pattern_low;
        self.shifter_pattern_high = state.shifter_pattern_high;
        self.shifter_attribute_low = state.shifter_attribute_low;
        self.shifter_attribute_high = state.shifter_attribute_high;
        self.pending_sprites = state.pending_sprites.clone();
        self.scanline_sprites = state.scanline_sprites.clone();
        self.framebuffer.copy_from_slice(&state.framebuffer);
        self.frame_complete = false;
    }
}
