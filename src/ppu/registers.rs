/// PPU Control Register ($2000) bit constants
const GENERATE_NMI: u8 = 0b1000_0000;
const SPRITE_SIZE: u8 = 0b0010_0000;
const BG_PATTERN_TABLE_ADDR: u8 = 0b0001_0000;
const SPRITE_PATTERN_TABLE_ADDR: u8 = 0b0000_1000;
const VRAM_ADDR_INCREMENT: u8 = 0b0000_0100;
const BASE_NAMETABLE_ADDR: u8 = 0b0000_0011;

/// PPU Mask Register ($2001) bit constants
const GRAYSCALE: u8 = 0b0000_0001;
const SHOW_BACKGROUND_LEFT: u8 = 0b0000_0010;
const SHOW_SPRITES_LEFT: u8 = 0b0000_0100;
const SHOW_BACKGROUND: u8 = 0b0000_1000;
const SHOW_SPRITES: u8 = 0b0001_0000;

/// PPUCTRL, PPUMASK, OAMADDR, the $2007 read buffer and the loopy
/// scroll registers
pub struct Registers {
    control: u8,
    mask: u8,
    pub oam_address: u8,
    data_buffer: u8,
    /// v: Current VRAM address (15 bits)
    v: u16,
    /// t: Temporary VRAM address (15 bits)
    t: u16,
    /// x: Fine X scroll (3 bits)
    x: u8,
    /// w: Write toggle shared by $2005 and $2006
    w: bool,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub fn new() -> Self {
        Self {
            control: 0,
            mask: 0,
            oam_address: 0,
            data_buffer: 0,
            v: 0,
            t: 0,
            x: 0,
            w: false,
        }
    }

    /// Reset button: PPUCTRL, PPUMASK, the write toggle and the read buffer
    /// are cleared; scroll and OAMADDR survive
    pub fn reset(&mut self) {
        self.control = 0;
        self.mask = 0;
        self.data_buffer = 0;
        self.w = false;
        self.t = 0;
        self.x = 0;
    }

    /// Write to control register ($2000)
    pub fn write_control(&mut self, value: u8) {
        self.control = value;
        // t: ...GH.. ........ <- d: ......GH
        let nametable_bits = (value & BASE_NAMETABLE_ADDR) as u16;
        self.t = (self.t & 0xF3FF) | (nametable_bits << 10);
    }

    /// Write to mask register ($2001)
    pub fn write_mask(&mut self, value: u8) {
        self.mask = value;
    }

    /// Write to scroll register ($2005)
    pub fn write_scroll(&mut self, value: u8) {
        if !self.w {
            // t: ....... ...ABCDE <- d: ABCDE...
            // x:              FGH <- d: .....FGH
            self.t = (self.t & 0xFFE0) | ((value as u16) >> 3);
            self.x = value & 0x07;
            self.w = true;
        } else {
            // t: FGH..AB CDE..... <- d: ABCDEFGH
            self.t = (self.t & 0x8FFF) | (((value as u16) & 0x07) << 12);
            self.t = (self.t & 0xFC1F) | (((value as u16) & 0xF8) << 2);
            self.w = false;
        }
    }

    /// Write to address register ($2006)
    pub fn write_address(&mut self, value: u8) {
        if !self.w {
            // t: .CDEFGH ........ <- d: ..CDEFGH, bit 14 cleared
            self.t = (self.t & 0x80FF) | (((value & 0x3F) as u16) << 8);
            self.w = true;
        } else {
            // t: ....... ABCDEFGH <- d: ABCDEFGH, then v <- t
            self.t = (self.t & 0xFF00) | (value as u16);
            self.v = self.t;
            self.w = false;
        }
    }

    /// $2002 reads reset the write toggle
    pub fn reset_write_toggle(&mut self) {
        self.w = false;
    }

    pub fn data_buffer(&self) -> u8 {
        self.data_buffer
    }

    pub fn set_data_buffer(&mut self, value: u8) {
        self.data_buffer = value;
    }

    /// Increment VRAM address by the amount selected in PPUCTRL
    pub fn increment_vram_address(&mut self) {
        let increment = if self.control & VRAM_ADDR_INCREMENT != 0 {
            32
        } else {
            1
        };
        self.v = self.v.wrapping_add(increment) & 0x7FFF;
    }

    /// Increment coarse X, wrapping into the neighbouring horizontal nametable
    pub fn increment_coarse_x(&mut self) {
        if (self.v & 0x001F) == 31 {
            self.v &= !0x001F;
            self.v ^= 0x0400;
        } else {
            self.v += 1;
        }
    }

    /// Increment fine Y, carrying into coarse Y
    pub fn increment_fine_y(&mut self) {
        if (self.v & 0x7000) != 0x7000 {
            self.v += 0x1000;
        } else {
            self.v &= !0x7000;
            let mut y = (self.v & 0x03E0) >> 5;
            if y == 29 {
                // Row 29 is the last tile row: wrap and switch vertical nametable
                y = 0;
                self.v ^= 0x0800;
            } else if y == 31 {
                // Rows 30-31 are attribute memory: wrap without switching
                y = 0;
            } else {
                y += 1;
            }
            self.v = (self.v & !0x03E0) | (y << 5);
        }
    }

    /// v: ....A.. ...BCDEF <- t: ....A.. ...BCDEF
    pub fn copy_horizontal_bits(&mut self) {
        self.v = (self.v & !0x041F) | (self.t & 0x041F);
    }

    /// v: GHIA.BC DEF..... <- t: GHIA.BC DEF.....
    pub fn copy_vertical_bits(&mut self) {
        self.v = (self.v & !0x7BE0) | (self.t & 0x7BE0);
    }

    pub fn v(&self) -> u16 {
        self.v
    }

    pub fn t(&self) -> u16 {
        self.t
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn w(&self) -> bool {
        self.w
    }

    pub fn nmi_enabled(&self) -> bool {
        self.control & GENERATE_NMI != 0
    }

    pub fn sprite_height(&self) -> u8 {
        if self.control & SPRITE_SIZE != 0 { 16 } else { 8 }
    }

    pub fn bg_pattern_table_addr(&self) -> u16 {
        if self.control & BG_PATTERN_TABLE_ADDR != 0 {
            0x1000
        } else {
            0x0000
        }
    }

    /// Ignored for 8x16 sprites, which select the table with tile bit 0
    pub fn sprite_pattern_table_addr(&self) -> u16 {
        if self.control & SPRITE_PATTERN_TABLE_ADDR != 0 {
            0x1000
        } else {
            0x0000
        }
    }

    pub fn is_background_enabled(&self) -> bool {
        self.mask & SHOW_BACKGROUND != 0
    }

    pub fn is_sprites_enabled(&self) -> bool {
        self.mask & SHOW_SPRITES != 0
    }

    pub fn is_rendering_enabled(&self) -> bool {
        self.mask & (SHOW_BACKGROUND | SHOW_SPRITES) != 0
    }

    pub fn show_background_left(&self) -> bool {
        self.mask & SHOW_BACKGROUND_LEFT != 0
    }

    pub fn show_sprites_left(&self) -> bool {
        self.mask & SHOW_SPRITES_LEFT != 0
    }

    pub fn is_grayscale(&self) -> bool {
        self.mask & GRAYSCALE != 0
    }

    /// Emphasis bits (red, green, blue) moved down to bits 0-2
    pub fn color_emphasis(&self) -> u8 {
        self.mask >> 5
    }
}
