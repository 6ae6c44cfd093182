use crate::cartridge::Mapper;

/// Background tile pipeline: fetch latches feeding 16-bit shift registers
///
/// The high byte of each shifter holds the tile being drawn and the low byte
/// the next tile. Fine X picks the bit.
#[derive(Default)]
pub struct Background {
    pattern_shift_lo: u16,
    pattern_shift_hi: u16,
    attribute_shift_lo: u16,
    attribute_shift_hi: u16,
    nametable_latch: u8,
    /// Two-bit palette for the tile being fetched
    attribute_latch: u8,
    pattern_lo_latch: u8,
    pattern_hi_latch: u8,
}

impl Background {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn fetch_nametable(&mut self, v: u16, mapper: &mut dyn Mapper) {
        self.nametable_latch = mapper.ppu_read(0x2000 | (v & 0x0FFF));
    }

    pub fn fetch_attribute(&mut self, v: u16, mapper: &mut dyn Mapper) {
        let addr = 0x23C0 | (v & 0x0C00) | ((v >> 4) & 0x38) | ((v >> 2) & 0x07);
        let mut attribute = mapper.ppu_read(addr);
        // Each attribute byte covers a 4x4 tile area split into 2x2 quadrants
        if v & 0x0040 != 0 {
            attribute >>= 4;
        }
        if v & 0x0002 != 0 {
            attribute >>= 2;
        }
        self.attribute_latch = attribute & 0x03;
    }

    fn pattern_address(&self, pattern_table: u16, v: u16) -> u16 {
        let fine_y = (v >> 12) & 0x07;
        pattern_table | ((self.nametable_latch as u16) << 4) | fine_y
    }

    pub fn fetch_pattern_lo(&mut self, pattern_table: u16, v: u16, mapper: &mut dyn Mapper) {
        self.pattern_lo_latch = mapper.ppu_read(self.pattern_address(pattern_table, v));
    }

    pub fn fetch_pattern_hi(&mut self, pattern_table: u16, v: u16, mapper: &mut dyn Mapper) {
        self.pattern_hi_latch = mapper.ppu_read(self.pattern_address(pattern_table, v) | 0x08);
    }

    /// Move the latched tile into the low byte of the shifters
    pub fn load_shift_registers(&mut self) {
        self.pattern_shift_lo = (self.pattern_shift_lo & 0xFF00) | self.pattern_lo_latch as u16;
        self.pattern_shift_hi = (self.pattern_shift_hi & 0xFF00) | self.pattern_hi_latch as u16;

        let fill = |bit: u8| if self.attribute_latch & bit != 0 { 0x00FF } else { 0x0000 };
        self.attribute_shift_lo = (self.attribute_shift_lo & 0xFF00) | fill(0x01);
        self.attribute_shift_hi = (self.attribute_shift_hi & 0xFF00) | fill(0x02);
    }

    pub fn shift_registers(&mut self) {
        self.pattern_shift_lo <<= 1;
        self.pattern_shift_hi <<= 1;
        self.attribute_shift_lo <<= 1;
        self.attribute_shift_hi <<= 1;
    }

    /// Palette index (palette * 4 + pixel) at the current position, 0 when
    /// the pixel is transparent
    pub fn pixel(&self, fine_x: u8) -> u8 {
        let bit = 15 - fine_x as u16;
        let lo = ((self.pattern_shift_lo >> bit) & 1) as u8;
        let hi = ((self.pattern_shift_hi >> bit) & 1) as u8;
        let pattern = (hi << 1) | lo;
        if pattern == 0 {
            return 0;
        }

        let palette_lo = ((self.attribute_shift_lo >> bit) & 1) as u8;
        let palette_hi = ((self.attribute_shift_hi >> bit) & 1) as u8;
        ((palette_hi << 1 | palette_lo) << 2) | pattern
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::{NROMMapper, numbered_image};

    fn mapper_with_chr_ram() -> Box<dyn Mapper> {
        // No CHR ROM: the board allocates 8KB of CHR-RAM
        Box::new(NROMMapper::new(numbered_image(32, 0)))
    }

    #[test]
    fn test_empty_pipeline_is_transparent() {
        let bg = Background::new();
        for fine_x in 0..8 {
            assert_eq!(bg.pixel(fine_x), 0);
        }
    }

    #[test]
    fn test_fetch_and_shift_tile() {
        let mut mapper = mapper_with_chr_ram();
        let m = mapper.as_mut();
        // Tile 1, row 0: low plane 0b1000_0001, high plane 0b1000_0000
        m.ppu_write(0x0010, 0b1000_0001);
        m.ppu_write(0x0018, 0b1000_0000);
        m.ppu_write(0x2000, 0x01);
        m.ppu_write(0x23C0, 0b0000_0010);

        let mut bg = Background::new();
        // v = 0: coarse (0, 0) of nametable 0, fine Y 0
        bg.fetch_nametable(0x0000, m);
        bg.fetch_attribute(0x0000, m);
        bg.fetch_pattern_lo(0x0000, 0x0000, m);
        bg.fetch_pattern_hi(0x0000, 0x0000, m);
        bg.load_shift_registers();
        for _ in 0..8 {
            bg.shift_registers();
        }

        // Palette 2, leftmost pixel 3, rightmost pixel 1
        assert_eq!(bg.pixel(0), 0b1011);
        assert_eq!(bg.pixel(1), 0);
        assert_eq!(bg.pixel(7), 0b1001);
    }

    #[test]
    fn test_attribute_quadrants() {
        let mut mapper = mapper_with_chr_ram();
        let m = mapper.as_mut();
        m.ppu_write(0x23C0, 0b1110_0100);

        let mut bg = Background::new();
        // Coarse (x, y): (0,0) top-left, (2,0) top-right, (0,2) bottom-left, (2,2) bottom-right
        for (v, expected) in [(0x2000, 0), (0x2002, 1), (0x2040, 2), (0x2042, 3)] {
            bg.fetch_attribute(v, m);
            assert_eq!(bg.attribute_latch, expected, "v = {:04X}", v);
        }
    }

    #[test]
    fn test_fine_y_selects_pattern_row() {
        let mut mapper = mapper_with_chr_ram();
        let m = mapper.as_mut();
        m.ppu_write(0x1005, 0xAA);

        let mut bg = Background::new();
        bg.fetch_pattern_lo(0x1000, 0x5000, m);
        assert_eq!(bg.pattern_lo_latch, 0xAA);
    }
}
