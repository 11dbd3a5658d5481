//! PPU (Picture Processing Unit) implementation
//!
//! Dot-accurate 2C02 model. Key timing:
//! - 341 dots per scanline, 262 scanlines per frame (0-239 visible, 241 vblank start,
//!   261 pre-render)
//! - On odd frames with rendering enabled the last dot of the pre-render line is skipped
//! - Background uses the loopy `v`/`t`/`x`/`w` scroll registers and 16-bit shifters
//! - Up to 8 sprites per line, evaluated one line ahead
//!
//! Pixels are stored as 6-bit palette indices; conversion to RGB happens in the system.

use crate::cpu::Bus;
use crate::interrupt::InterruptSink;
use crate::ppu_bus::PpuBus;

/// Visible screen width
pub const SCREEN_WIDTH: usize = 256;
/// Visible screen height
pub const SCREEN_HEIGHT: usize = 240;
/// Object Attribute Memory size
pub const OAM_SIZE: usize = 256;

/// Dots per scanline
pub const DOTS_PER_SCANLINE: u16 = 341;
/// Scanlines per frame
pub const SCANLINES_PER_FRAME: u16 = 262;
/// First vblank scanline
pub const VBLANK_SCANLINE: u16 = 241;
/// Pre-render scanline
pub const PRE_RENDER_SCANLINE: u16 = 261;

/// Dots between the vblank flag rising and the NMI reaching the CPU
const NMI_DELAY: u8 = 15;
/// Sprites per scanline
const SECONDARY_OAM_SLOTS: usize = 8;

/// PPU registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpuRegister {
    /// $2000 - PPUCTRL (Control)
    PpuCtrl,
    /// $2001 - PPUMASK (Mask)
    PpuMask,
    /// $2002 - PPUSTATUS (Status)
    PpuStatus,
    /// $2003 - OAMADDR (Sprite Address)
    OamAddr,
    /// $2004 - OAMDATA (Sprite Data)
    OamData,
    /// $2005 - PPUSCROLL (Scroll)
    PpuScroll,
    /// $2006 - PPUADDR (Address)
    PpuAddr,
    /// $2007 - PPUDATA (Data)
    PpuData,
}

impl PpuRegister {
    /// Decode a CPU address; registers repeat every 8 bytes
    pub fn from_address(address: u16) -> Self {
        match address & 0x0007 {
            0 => PpuRegister::PpuCtrl,
            1 => PpuRegister::PpuMask,
            2 => PpuRegister::PpuStatus,
            3 => PpuRegister::OamAddr,
            4 => PpuRegister::OamData,
            5 => PpuRegister::PpuScroll,
            6 => PpuRegister::PpuAddr,
            _ => PpuRegister::PpuData,
        }
    }
}

/// PPU control flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PpuCtrl(u8);

impl PpuCtrl {
    pub const NMI_ENABLE: u8 = 0b10000000;
    pub const MASTER_SLAVE: u8 = 0b01000000;
    pub const SPRITE_SIZE: u8 = 0b00100000;
    pub const BG_PATTERN_TABLE: u8 = 0b00010000;
    pub const SPR_PATTERN_TABLE: u8 = 0b00001000;
    pub const VRAM_INC: u8 = 0b00000100;
    pub const NAMETABLE: u8 = 0b00000011;

    pub fn new(val: u8) -> Self {
        Self(val)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn nmi_enable(&self) -> bool {
        (self.0 & Self::NMI_ENABLE) != 0
    }

    /// Sprite height in pixels (8 or 16)
    pub fn sprite_height(&self) -> u16 {
        if (self.0 & Self::SPRITE_SIZE) != 0 {
            16
        } else {
            8
        }
    }

    pub fn nametable(&self) -> u8 {
        self.0 & Self::NAMETABLE
    }

    /// Base nametable address (0x2000, 0x2400, 0x2800 or 0x2C00)
    pub fn base_nametable_address(&self) -> u16 {
        0x2000 + u16::from(self.nametable()) * 0x0400
    }

    /// PPUDATA address step
    pub fn vram_increment(&self) -> u16 {
        if (self.0 & Self::VRAM_INC) != 0 {
            32
        } else {
            1
        }
    }

    /// Pattern table used by 8x8 sprites
    pub fn sprite_pattern_table(&self) -> u16 {
        if (self.0 & Self::SPR_PATTERN_TABLE) != 0 {
            0x1000
        } else {
            0
        }
    }

    pub fn background_pattern_table(&self) -> u16 {
        if (self.0 & Self::BG_PATTERN_TABLE) != 0 {
            0x1000
        } else {
            0
        }
    }
}

/// PPU status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PpuStatus(u8);

impl PpuStatus {
    pub const VBLANK: u8 = 0b10000000;
    pub const SPRITE_ZERO_HIT: u8 = 0b01000000;
    pub const SPRITE_OVERFLOW: u8 = 0b00100000;

    pub fn new(val: u8) -> Self {
        Self(val)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn vblank(&self) -> bool {
        (self.0 & Self::VBLANK) != 0
    }

    pub fn sprite_zero_hit(&self) -> bool {
        (self.0 & Self::SPRITE_ZERO_HIT) != 0
    }

    pub fn sprite_overflow(&self) -> bool {
        (self.0 & Self::SPRITE_OVERFLOW) != 0
    }

    fn set(&mut self, mask: u8, val: bool) {
        self.0 = if val { self.0 | mask } else { self.0 & !mask };
    }

    pub fn set_vblank(&mut self, val: bool) {
        self.set(Self::VBLANK, val);
    }

    pub fn set_sprite_zero_hit(&mut self, val: bool) {
        self.set(Self::SPRITE_ZERO_HIT, val);
    }

    pub fn set_sprite_overflow(&mut self, val: bool) {
        self.set(Self::SPRITE_OVERFLOW, val);
    }
}

/// PPU render mask flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PpuMask(u8);

impl PpuMask {
    pub const EMPHASIZE_BLUE: u8 = 0b10000000;
    pub const EMPHASIZE_GREEN: u8 = 0b01000000;
    pub const EMPHASIZE_RED: u8 = 0b00100000;
    pub const RENDER_SPR: u8 = 0b00010000;      // Bit 4 - render sprites
    pub const RENDER_BG: u8 = 0b00001000;       // Bit 3 - render background
    pub const RENDER_SPR_LEFT: u8 = 0b00000100; // Bit 2 - sprites in left 8px
    pub const RENDER_BG_LEFT: u8 = 0b00000010;  // Bit 1 - background in left 8px
    pub const GRAYSCALE: u8 = 0b00000001;

    pub fn new(val: u8) -> Self {
        Self(val)
    }

    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn grayscale(&self) -> bool {
        (self.0 & Self::GRAYSCALE) != 0
    }

    pub fn render_background(&self) -> bool {
        (self.0 & Self::RENDER_BG) != 0
    }

    pub fn render_sprites(&self) -> bool {
        (self.0 & Self::RENDER_SPR) != 0
    }

    pub fn render_background_left(&self) -> bool {
        (self.0 & Self::RENDER_BG_LEFT) != 0
    }

    pub fn render_sprites_left(&self) -> bool {
        (self.0 & Self::RENDER_SPR_LEFT) != 0
    }

    /// Either layer enabled
    pub fn rendering(&self) -> bool {
        self.render_background() || self.render_sprites()
    }
}

/// Sprite attribute byte (OAM byte 2)
mod sprite_attribute {
    pub const PALETTE: u8 = 0b00000011;
    pub const PRIORITY: u8 = 0b00100000;
    pub const FLIP_H: u8 = 0b01000000;
    pub const FLIP_V: u8 = 0b10000000;
}

/// Per-dot sprite pixel encoding
mod sprite_pixel {
    pub const PALETTE: u8 = 0b00111111;
    pub const BEHIND_BG: u8 = 0b01000000;
    pub const ZERO: u8 = 0b10000000;
}

/// One secondary OAM entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sprite {
    y: u8,
    tile: u8,
    attributes: u8,
    x: u8,
    zero: bool,
}

impl Sprite {
    const EMPTY: Sprite = Sprite {
        y: 0xFF,
        tile: 0xFF,
        attributes: 0xFF,
        x: 0xFF,
        zero: false,
    };
}

/// Background fetch latches and shift registers
#[derive(Debug, Clone, Copy, Default)]
struct Background {
    nametable: u8,
    attribute: u8,
    pattern_low: u8,
    pattern_high: u8,
    shift_pattern_low: u16,
    shift_pattern_high: u16,
    shift_attribute_low: u16,
    shift_attribute_high: u16,
}

/// PPU internal state
#[derive(Debug, Clone)]
pub struct Ppu {
    ctrl: PpuCtrl,
    mask: PpuMask,
    status: PpuStatus,
    /// Current VRAM address (15 bits)
    v: u16,
    /// Temporary VRAM address (15 bits)
    t: u16,
    /// Fine X scroll (3 bits)
    x: u8,
    /// Write toggle for PPUSCROLL and PPUADDR
    w: bool,
    oam: [u8; OAM_SIZE],
    oam_addr: u8,
    secondary_oam: [Sprite; SECONDARY_OAM_SLOTS],
    sprite_pixels: [u8; SCREEN_WIDTH],
    background: Background,
    /// PPUDATA read buffer
    read_buffer: u8,
    /// Low 5 bits of the last register write
    open_bus: u8,
    /// Dots left before a pending NMI fires
    nmi_delay: Option<u8>,
    /// Scanline position (0-261)
    scanline: u16,
    /// Dot position (0-340)
    dot: u16,
    frame: u64,
    pixels: Vec<u8>,
}

impl Ppu {
    /// Create a new PPU instance
    pub fn new() -> Self {
        Self {
            ctrl: PpuCtrl::default(),
            mask: PpuMask::default(),
            status: PpuStatus::default(),
            v: 0,
            t: 0,
            x: 0,
            w: false,
            oam: [0; OAM_SIZE],
            oam_addr: 0,
            secondary_oam: [Sprite::EMPTY; SECONDARY_OAM_SLOTS],
            sprite_pixels: [0; SCREEN_WIDTH],
            background: Background::default(),
            read_buffer: 0,
            open_bus: 0,
            nmi_delay: None,
            scanline: 240,
            dot: 340,
            frame: 0,
            pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
        }
    }

    /// Advance one dot
    ///
    /// Returns `true` when this dot completed a frame.
    pub fn clock(&mut self, bus: &mut PpuBus<'_>, interrupt: &mut dyn InterruptSink) -> bool {
        let mut frame_done = false;

        if self.scanline == PRE_RENDER_SCANLINE
            && self.dot == 339
            && self.frame & 0x01 != 0
            && self.mask.rendering()
        {
            frame_done |= self.advance(bus, interrupt);
        }
        frame_done |= self.advance(bus, interrupt);

        if !self.mask.rendering() {
            return frame_done;
        }

        match self.scanline {
            0..=239 => self.visible_dot(bus),
            PRE_RENDER_SCANLINE => self.pre_render_dot(bus),
            _ => {}
        }

        frame_done
    }

    fn visible_dot(&mut self, bus: &mut PpuBus<'_>) {
        match self.dot {
            1 => self.clear_secondary_oam(),
            65 => self.evaluate_sprites(),
            _ => {}
        }

        if (1..=256).contains(&self.dot) {
            self.shift_background();
            self.render_pixel(bus);
            self.fetch_background(bus);
        }
        if self.dot == 256 {
            self.increment_y();
        }
        if self.dot == 257 {
            self.copy_horizontal();
            self.fetch_sprites(bus);
        }
        if (321..=336).contains(&self.dot) {
            self.shift_background();
            self.fetch_background(bus);
        }
    }

    fn pre_render_dot(&mut self, bus: &mut PpuBus<'_>) {
        if (1..=256).contains(&self.dot) {
            self.shift_background();
            self.fetch_background(bus);
        }
        if self.dot == 256 {
            self.increment_y();
        }
        if self.dot == 257 {
            self.copy_horizontal();
        }
        if (280..=304).contains(&self.dot) {
            self.copy_vertical();
        }
        if (321..=336).contains(&self.dot) {
            self.shift_background();
            self.fetch_background(bus);
        }
    }

    /// Move the beam one dot and handle the vblank edges
    fn advance(&mut self, bus: &mut PpuBus<'_>, interrupt: &mut dyn InterruptSink) -> bool {
        if self.status.vblank() && self.ctrl.nmi_enable() {
            match self.nmi_delay {
                Some(0) => {
                    self.nmi_delay = None;
                    interrupt.nmi();
                }
                Some(n) => self.nmi_delay = Some(n - 1),
                None => {}
            }
        }

        let mut frame_done = false;
        self.dot += 1;
        if self.dot >= DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline >= SCANLINES_PER_FRAME {
                self.scanline = 0;
                self.frame += 1;
                frame_done = true;
            }
        }

        if self.scanline == VBLANK_SCANLINE && self.dot == 1 {
            self.status.set_vblank(true);
            if self.ctrl.nmi_enable() {
                self.nmi_delay = Some(NMI_DELAY);
            }
        }

        if self.scanline == PRE_RENDER_SCANLINE && self.dot == 1 {
            self.status.set_vblank(false);
            self.status.set_sprite_zero_hit(false);
            self.status.set_sprite_overflow(false);
            // Nothing was fetched for line 0; drop what scanline 239 left behind
            self.sprite_pixels = [0; SCREEN_WIDTH];
        }

        if self.mask.rendering() {
            bus.mapper.on_ppu_cycle(self.scanline, self.dot, interrupt);
        }

        frame_done
    }

    fn fetch_background(&mut self, bus: &mut PpuBus<'_>) {
        // Scroll increments run with either layer enabled
        if self.dot & 0x07 == 0 {
            self.increment_x();
            return;
        }
        if !self.mask.render_background() {
            return;
        }

        let fine_y = (self.v >> 12) & 0x07;
        let pattern = self.ctrl.background_pattern_table()
            + u16::from(self.background.nametable) * 16
            + fine_y;

        match self.dot & 0x07 {
            1 => {
                self.load_background();
                self.background.nametable = bus.read(0x2000 | (self.v & 0x0FFF));
            }
            3 => {
                let address = 0x23C0 | (self.v & 0x0C00) | ((self.v >> 4) & 0x38) | ((self.v >> 2) & 0x07);
                // Quadrant within the 32x32 attribute block
                let shift = ((self.v >> 4) & 0x04) | (self.v & 0x02);
                self.background.attribute = (bus.read(address) >> shift) & 0x03;
            }
            5 => self.background.pattern_low = bus.read(pattern),
            7 => self.background.pattern_high = bus.read(pattern + 8),
            _ => {}
        }
    }

    fn load_background(&mut self) {
        let bg = &mut self.background;
        bg.shift_pattern_low |= u16::from(bg.pattern_low);
        bg.shift_pattern_high |= u16::from(bg.pattern_high);
        bg.shift_attribute_low |= if bg.attribute & 0x01 != 0 { 0xFF } else { 0 };
        bg.shift_attribute_high |= if bg.attribute & 0x02 != 0 { 0xFF } else { 0 };
    }

    fn shift_background(&mut self) {
        if !self.mask.render_background() {
            return;
        }
        let bg = &mut self.background;
        bg.shift_pattern_low <<= 1;
        bg.shift_pattern_high <<= 1;
        bg.shift_attribute_low <<= 1;
        bg.shift_attribute_high <<= 1;
    }

    fn increment_x(&mut self) {
        if self.v & 0x001F == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    fn increment_y(&mut self) {
        if self.v & 0x7000 != 0x7000 {
            self.v += 0x1000;
            return;
        }

        self.v &= !0x7000;
        let mut coarse_y = (self.v & 0x03E0) >> 5;
        if coarse_y == 29 {
            coarse_y = 0;
            self.v ^= 0x0800;
        } else if coarse_y == 31 {
            coarse_y = 0;
        } else {
            coarse_y += 1;
        }
        self.v = (self.v & !0x03E0) | (coarse_y << 5);
    }

    /// v: ....F.. ...EDCBA = t: ....F.. ...EDCBA
    fn copy_horizontal(&mut self) {
        self.v = (self.v & 0x7BE0) | (self.t & 0x041F);
    }

    /// v: IHGF.ED CBA..... = t: IHGF.ED CBA.....
    fn copy_vertical(&mut self) {
        self.v = (self.v & 0x041F) | (self.t & 0x7BE0);
    }

    fn render_pixel(&mut self, bus: &mut PpuBus<'_>) {
        let x = usize::from(self.dot - 1);
        let y = usize::from(self.scanline);
        let left_edge = x < 8;

        let bit = 0x8000u16 >> self.x;
        let bg = &self.background;
        let bg_index = u16::from(bg.shift_pattern_low & bit != 0)
            | u16::from(bg.shift_pattern_high & bit != 0) << 1
            | u16::from(bg.shift_attribute_low & bit != 0) << 2
            | u16::from(bg.shift_attribute_high & bit != 0) << 3;

        let sprite = self.sprite_pixels[x];
        let sprite_index = u16::from(sprite & sprite_pixel::PALETTE);

        let bg_transparent = bg_index % 4 == 0
            || !self.mask.render_background()
            || (left_edge && !self.mask.render_background_left());
        let sprite_transparent = sprite_index % 4 == 0
            || !self.mask.render_sprites()
            || (left_edge && !self.mask.render_sprites_left());

        let address = match (bg_transparent, sprite_transparent) {
            (true, true) => 0x3F00,
            (true, false) => 0x3F10 + sprite_index,
            (false, true) => 0x3F00 + bg_index,
            (false, false) => {
                if sprite & sprite_pixel::ZERO != 0 && x != 255 {
                    self.status.set_sprite_zero_hit(true);
                }
                if sprite & sprite_pixel::BEHIND_BG != 0 {
                    0x3F00 + bg_index
                } else {
                    0x3F10 + sprite_index
                }
            }
        };

        let mut color = bus.read(address) & 0x3F;
        if self.mask.grayscale() {
            color &= 0x30;
        }
        self.pixels[x + y * SCREEN_WIDTH] = color;
    }

    fn clear_secondary_oam(&mut self) {
        if !self.mask.render_sprites() {
            return;
        }
        self.secondary_oam = [Sprite::EMPTY; SECONDARY_OAM_SLOTS];
    }

    fn evaluate_sprites(&mut self) {
        if !self.mask.render_sprites() {
            return;
        }

        let height = self.ctrl.sprite_height();
        let mut count = 0;
        for (i, entry) in self.oam.chunks_exact(4).enumerate() {
            let y = u16::from(entry[0]);
            if self.scanline < y || self.scanline >= y + height {
                continue;
            }
            if count == SECONDARY_OAM_SLOTS {
                self.status.set_sprite_overflow(true);
                break;
            }
            self.secondary_oam[count] = Sprite {
                y: entry[0],
                tile: entry[1],
                attributes: entry[2],
                x: entry[3],
                zero: i == 0,
            };
            count += 1;
        }
    }

    /// Decode the sprites found for this line into per-dot sprite pixels for the next one
    fn fetch_sprites(&mut self, bus: &mut PpuBus<'_>) {
        if !self.mask.render_sprites() {
            return;
        }

        self.sprite_pixels = [0; SCREEN_WIDTH];
        let height = self.ctrl.sprite_height();

        // Lower slots win, so draw them last
        for sprite in self.secondary_oam.iter().rev() {
            if sprite.y >= 0xEF {
                continue;
            }

            let flip_h = sprite.attributes & sprite_attribute::FLIP_H != 0;
            let flip_v = sprite.attributes & sprite_attribute::FLIP_V != 0;
            // Slots can go stale if the sprite size changes mid-line
            let row = self.scanline.wrapping_sub(u16::from(sprite.y));
            if row >= height {
                continue;
            }
            let row = if flip_v { height - 1 - row } else { row };

            let address = if height == 8 {
                self.ctrl.sprite_pattern_table() + u16::from(sprite.tile) * 16 + row
            } else {
                let table = if sprite.tile & 0x01 != 0 { 0x1000 } else { 0 };
                table + u16::from(sprite.tile & 0xFE) * 16 + row % 8 + (row / 8) * 16
            };

            let low = bus.read(address);
            let high = bus.read(address + 8);
            let palette = (sprite.attributes & sprite_attribute::PALETTE) << 2;
            let flags = if sprite.attributes & sprite_attribute::PRIORITY != 0 {
                sprite_pixel::BEHIND_BG
            } else {
                0
            } | if sprite.zero { sprite_pixel::ZERO } else { 0 };

            for i in 0..8 {
                let x = usize::from(sprite.x) + i;
                if x >= SCREEN_WIDTH {
                    break;
                }
                let bit = if flip_h { 0x01 << i } else { 0x80 >> i };
                let index = palette | u8::from(low & bit != 0) | u8::from(high & bit != 0) << 1;
                // A transparent pixel never covers an opaque one
                if index % 4 == 0 && (self.sprite_pixels[x] & sprite_pixel::PALETTE) % 4 != 0 {
                    continue;
                }
                self.sprite_pixels[x] = index | flags;
            }
        }
    }

    /// CPU read of a PPU register
    pub fn read_register(&mut self, address: u16, bus: &mut PpuBus<'_>) -> u8 {
        match PpuRegister::from_address(address) {
            PpuRegister::PpuStatus => {
                let value = self.status.bits() | self.open_bus;
                self.status.set_vblank(false);
                self.w = false;
                value
            }
            PpuRegister::OamData => self.oam[usize::from(self.oam_addr)],
            PpuRegister::PpuData => self.read_data(bus),
            // Write-only
            PpuRegister::PpuCtrl
            | PpuRegister::PpuMask
            | PpuRegister::OamAddr
            | PpuRegister::PpuScroll
            | PpuRegister::PpuAddr => 0,
        }
    }

    /// CPU write of a PPU register
    pub fn write_register(&mut self, address: u16, value: u8, bus: &mut PpuBus<'_>) {
        self.open_bus = value & 0x1F;

        match PpuRegister::from_address(address) {
            PpuRegister::PpuCtrl => {
                let was_enabled = self.ctrl.nmi_enable();
                self.ctrl = PpuCtrl::new(value);
                // t: ...BA.. ........ = d: ......BA
                self.t = (self.t & 0xF3FF) | (u16::from(value & 0x03) << 10);
                if !was_enabled && self.ctrl.nmi_enable() && self.status.vblank() {
                    self.nmi_delay = Some(0);
                }
            }
            PpuRegister::PpuMask => self.mask = PpuMask::new(value),
            PpuRegister::PpuStatus => {}
            PpuRegister::OamAddr => self.oam_addr = value,
            PpuRegister::OamData => {
                self.oam[usize::from(self.oam_addr)] = value;
                self.oam_addr = self.oam_addr.wrapping_add(1);
            }
            PpuRegister::PpuScroll => {
                if !self.w {
                    // t: ....... ...HGFED = d: HGFED...
                    // x:              CBA = d: .....CBA
                    self.t = (self.t & 0xFFE0) | u16::from(value >> 3);
                    self.x = value & 0x07;
                } else {
                    // t: CBA..HG FED..... = d: HGFEDCBA
                    self.t = (self.t & 0x0C1F)
                        | (u16::from(value & 0x07) << 12)
                        | (u16::from(value & 0xF8) << 2);
                }
                self.w = !self.w;
            }
            PpuRegister::PpuAddr => {
                if !self.w {
                    // t: .FEDCBA ........ = d: ..FEDCBA, bit 14 cleared
                    self.t = (self.t & 0x80FF) | (u16::from(value & 0x3F) << 8);
                } else {
                    self.t = (self.t & 0xFF00) | u16::from(value);
                    self.v = self.t;
                }
                self.w = !self.w;
            }
            PpuRegister::PpuData => {
                bus.write(self.v, value);
                self.v = self.v.wrapping_add(self.ctrl.vram_increment()) & 0x7FFF;
            }
        }
    }

    fn read_data(&mut self, bus: &mut PpuBus<'_>) -> u8 {
        let mut value = bus.read(self.v);
        if self.v & 0x3FFF < 0x3F00 {
            std::mem::swap(&mut value, &mut self.read_buffer);
        } else {
            // Palette reads bypass the buffer but refill it from the nametable underneath
            self.read_buffer = bus.read(self.v.wrapping_sub(0x1000));
        }
        self.v = self.v.wrapping_add(self.ctrl.vram_increment()) & 0x7FFF;
        value
    }

    /// OAM DMA transfer, starting at the current OAMADDR
    pub fn dma_copy(&mut self, page: &[u8; OAM_SIZE]) {
        for (i, &byte) in page.iter().enumerate() {
            let index = (i + usize::from(self.oam_addr)) & 0xFF;
            self.oam[index] = byte;
        }
    }

    /// Picture being drawn, as palette indices. Only complete between frames.
    pub(crate) fn frame_buffer(&self) -> &[u8] {
        &self.pixels
    }

    pub fn ctrl(&self) -> &PpuCtrl {
        &self.ctrl
    }

    pub fn mask(&self) -> &PpuMask {
        &self.mask
    }

    pub fn status(&self) -> &PpuStatus {
        &self.status
    }

    /// Current VRAM address
    pub fn v(&self) -> u16 {
        self.v
    }

    /// Temporary VRAM address
    pub fn t(&self) -> u16 {
        self.t
    }

    pub fn fine_x(&self) -> u8 {
        self.x
    }

    pub fn write_toggle(&self) -> bool {
        self.w
    }

    pub fn oam(&self) -> &[u8; OAM_SIZE] {
        &self.oam
    }

    pub fn oam_addr(&self) -> u8 {
        self.oam_addr
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    /// Completed frames since power-on
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for Ppu {
    fn default() -> Self {
        Self::new()
    }
}
