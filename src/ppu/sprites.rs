use crate::cartridge::Mapper;

/// Sprites per scanline the hardware can draw
pub const MAX_SPRITES_PER_LINE: usize = 8;

/// OAM attribute bits 2-4 do not exist and always read back as 0
const OAM_ATTRIBUTE_MASK: u8 = 0xE3;

const ATTR_FLIP_VERTICAL: u8 = 0x80;
const ATTR_FLIP_HORIZONTAL: u8 = 0x40;
const ATTR_BEHIND_BACKGROUND: u8 = 0x20;

/// Tile fetched for the unused slots, so the pattern bus still toggles A12
const DUMMY_TILE: u8 = 0xFF;

/// One sprite picked by evaluation, waiting for its pattern fetch
#[derive(Clone, Copy, Default)]
struct Candidate {
    row: u8,
    tile: u8,
    attributes: u8,
    x: u8,
}

/// A sprite ready to draw on the current scanline
#[derive(Clone, Copy, Default)]
struct LineSprite {
    x: u8,
    attributes: u8,
    pattern_lo: u8,
    pattern_hi: u8,
}

/// Opaque sprite pixel at one screen column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpritePixel {
    /// 5-bit palette index, always in the sprite half ($10-$1F)
    pub index: u8,
    pub behind_background: bool,
    pub is_sprite_zero: bool,
}

/// OAM plus the per-scanline sprite unit
///
/// Evaluation happens in one pass, then the eight pattern fetches run at
/// their hardware dots; the fetched line becomes visible on the next
/// scanline.
pub struct Sprites {
    oam: [u8; 256],
    candidates: [Candidate; MAX_SPRITES_PER_LINE],
    candidate_count: usize,
    candidate_has_zero: bool,
    next_line: [LineSprite; MAX_SPRITES_PER_LINE],
    line: [LineSprite; MAX_SPRITES_PER_LINE],
    line_count: usize,
    line_has_zero: bool,
}

impl Default for Sprites {
    fn default() -> Self {
        Self::new()
    }
}

impl Sprites {
    pub fn new() -> Self {
        Self {
            oam: [0xFF; 256],
            candidates: [Candidate::default(); MAX_SPRITES_PER_LINE],
            candidate_count: 0,
            candidate_has_zero: false,
            next_line: [LineSprite::default(); MAX_SPRITES_PER_LINE],
            line: [LineSprite::default(); MAX_SPRITES_PER_LINE],
            line_count: 0,
            line_has_zero: false,
        }
    }

    /// Drop the scanline buffers; OAM contents survive a reset
    pub fn reset(&mut self) {
        self.candidate_count = 0;
        self.candidate_has_zero = false;
        self.line_count = 0;
        self.line_has_zero = false;
    }

    pub fn read_oam(&self, addr: u8) -> u8 {
        let value = self.oam[addr as usize];
        if addr & 0x03 == 2 {
            value & OAM_ATTRIBUTE_MASK
        } else {
            value
        }
    }

    pub fn write_oam(&mut self, addr: u8, value: u8) {
        let value = if addr & 0x03 == 2 {
            value & OAM_ATTRIBUTE_MASK
        } else {
            value
        };
        self.oam[addr as usize] = value;
    }

    /// Find the sprites covering the line after `scanline`.
    ///
    /// Returns true when a ninth sprite is detected. Once eight sprites are
    /// found the hardware keeps scanning but also advances the byte offset
    /// within each entry, so it compares tile, attribute and X bytes as if
    /// they were Y coordinates.
    pub fn evaluate(&mut self, scanline: u16, sprite_height: u8) -> bool {
        let in_range = |y: u8| scanline.wrapping_sub(y as u16) < sprite_height as u16;

        self.candidate_count = 0;
        self.candidate_has_zero = false;

        let mut n = 0;
        while n < 64 && self.candidate_count < MAX_SPRITES_PER_LINE {
            let entry = &self.oam[n * 4..n * 4 + 4];
            if in_range(entry[0]) {
                self.candidates[self.candidate_count] = Candidate {
                    row: scanline.wrapping_sub(entry[0] as u16) as u8,
                    tile: entry[1],
                    attributes: entry[2],
                    x: entry[3],
                };
                self.candidate_count += 1;
                if n == 0 {
                    self.candidate_has_zero = true;
                }
            }
            n += 1;
        }

        let mut m = 0;
        while n < 64 {
            if in_range(self.oam[n * 4 + m]) {
                return true;
            }
            n += 1;
            m = (m + 1) & 3;
        }
        false
    }

    /// No sprites are fetched for the first visible line
    pub fn clear_candidates(&mut self) {
        self.candidate_count = 0;
        self.candidate_has_zero = false;
    }

    fn pattern_address(&self, slot: usize, sprite_height: u8, pattern_table: u16) -> u16 {
        let (tile, attributes, mut row) = if slot < self.candidate_count {
            let c = self.candidates[slot];
            (c.tile, c.attributes, c.row)
        } else {
            (DUMMY_TILE, 0, 0)
        };

        // PPUCTRL may have switched to 8x8 since evaluation
        row &= sprite_height - 1;
        if attributes & ATTR_FLIP_VERTICAL != 0 {
            row = sprite_height - 1 - row;
        }

        if sprite_height == 16 {
            let table = if tile & 1 != 0 { 0x1000 } else { 0x0000 };
            let mut tile = tile & 0xFE;
            if row >= 8 {
                tile += 1;
                row -= 8;
            }
            table | ((tile as u16) << 4) | row as u16
        } else {
            pattern_table | ((tile as u16) << 4) | row as u16
        }
    }

    /// Fetch one bit plane of the sprite in `slot`. Slots past the
    /// evaluated count fetch the dummy tile.
    pub fn fetch_pattern(
        &mut self,
        slot: usize,
        high_plane: bool,
        sprite_height: u8,
        pattern_table: u16,
        mapper: &mut dyn Mapper,
    ) {
        let mut addr = self.pattern_address(slot, sprite_height, pattern_table);
        if high_plane {
            addr |= 0x08;
        }
        let mut data = mapper.ppu_read(addr);

        if slot >= self.candidate_count {
            return;
        }
        let candidate = self.candidates[slot];
        if candidate.attributes & ATTR_FLIP_HORIZONTAL != 0 {
            data = data.reverse_bits();
        }
        let sprite = &mut self.next_line[slot];
        sprite.x = candidate.x;
        sprite.attributes = candidate.attributes;
        if high_plane {
            sprite.pattern_hi = data;
        } else {
            sprite.pattern_lo = data;
        }
    }

    /// Make the fetched sprites the ones drawn on the coming scanline
    pub fn commit_line(&mut self) {
        self.line = self.next_line;
        self.line_count = self.candidate_count;
        self.line_has_zero = self.candidate_has_zero;
    }

    /// First opaque sprite pixel at screen column `x`, if any
    pub fn pixel(&self, x: u8) -> Option<SpritePixel> {
        for (i, sprite) in self.line[..self.line_count].iter().enumerate() {
            let offset = x.wrapping_sub(sprite.x);
            if offset >= 8 || x < sprite.x {
                continue;
            }
            let bit = 7 - offset;
            let lo = (sprite.pattern_lo >> bit) & 1;
            let hi = (sprite.pattern_hi >> bit) & 1;
            let pattern = (hi << 1) | lo;
            if pattern == 0 {
                continue;
            }
            return Some(SpritePixel {
                index: 0x10 | ((sprite.attributes & 0x03) << 2) | pattern,
                behind_background: sprite.attributes & ATTR_BEHIND_BACKGROUND != 0,
                is_sprite_zero: i == 0 && self.line_has_zero,
            });
        }
        None
    }

    #[cfg(test)]
    pub(crate) fn line_count(&self) -> usize {
        self.line_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::{NROMMapper, numbered_image};

    fn place(sprites: &mut Sprites, index: u8, y: u8, tile: u8, attributes: u8, x: u8) {
        let base = index * 4;
        sprites.write_oam(base, y);
        sprites.write_oam(base + 1, tile);
        sprites.write_oam(base + 2, attributes);
        sprites.write_oam(base + 3, x);
    }

    fn fetch_all(sprites: &mut Sprites, height: u8, mapper: &mut dyn Mapper) {
        for slot in 0..MAX_SPRITES_PER_LINE {
            sprites.fetch_pattern(slot, false, height, 0x0000, mapper);
            sprites.fetch_pattern(slot, true, height, 0x0000, mapper);
        }
        sprites.commit_line();
    }

    #[test]
    fn test_attribute_bits_read_back_masked() {
        let mut sprites = Sprites::new();
        sprites.write_oam(2, 0xFF);
        sprites.write_oam(3, 0xFF);
        assert_eq!(sprites.read_oam(2), 0xE3);
        assert_eq!(sprites.read_oam(3), 0xFF);
    }

    #[test]
    fn test_unwritten_attribute_bytes_read_masked() {
        let sprites = Sprites::new();
        assert_eq!(sprites.read_oam(0), 0xFF);
        assert_eq!(sprites.read_oam(2), 0xE3);
        assert_eq!(sprites.read_oam(0xFE), 0xE3);
    }

    #[test]
    fn test_evaluation_keeps_first_eight() {
        let mut sprites = Sprites::new();
        for i in 0..8 {
            place(&mut sprites, i, 10, 0, 0, i * 10);
        }
        assert!(!sprites.evaluate(12, 8));
        assert_eq!(sprites.candidate_count, 8);
        assert!(sprites.candidate_has_zero);
    }

    #[test]
    fn test_ninth_sprite_sets_overflow() {
        let mut sprites = Sprites::new();
        for i in 0..9 {
            place(&mut sprites, i, 10, 0, 0, 0);
        }
        assert!(sprites.evaluate(10, 8));
        assert!(!sprites.evaluate(30, 8));
    }

    #[test]
    fn test_overflow_diagonal_bug() {
        let mut sprites = Sprites::new();
        for i in 0..8 {
            place(&mut sprites, i, 10, 0, 0, 0);
        }
        // Sprite 8 is in range by Y, but the scan compares its Y byte (m = 0),
        // then sprite 9's tile byte (m = 1), and so on.
        place(&mut sprites, 8, 100, 0, 0, 0);
        place(&mut sprites, 9, 100, 10, 0, 0);
        assert!(sprites.evaluate(10, 8));

        let mut sprites = Sprites::new();
        for i in 0..8 {
            place(&mut sprites, i, 10, 0, 0, 0);
        }
        // Sprite 9's Y is in range but the scan looks at its tile byte
        place(&mut sprites, 9, 10, 100, 0, 0);
        assert!(!sprites.evaluate(10, 8));
    }

    #[test]
    fn test_tall_sprites_range() {
        let mut sprites = Sprites::new();
        place(&mut sprites, 0, 20, 0, 0, 0);
        sprites.evaluate(35, 16);
        assert_eq!(sprites.candidate_count, 1);
        sprites.evaluate(36, 16);
        assert_eq!(sprites.candidate_count, 0);
    }

    #[test]
    fn test_pixel_lookup_and_priority() {
        let mut mapper = NROMMapper::new(numbered_image(32, 0));
        // Tile 1 row 2: leftmost pixel colour 1
        mapper.ppu_write(0x0012, 0x80);
        // Tile 2 row 2: every pixel colour 2
        mapper.ppu_write(0x002A, 0xFF);

        let mut sprites = Sprites::new();
        place(&mut sprites, 0, 8, 1, 0x01, 50);
        place(&mut sprites, 1, 8, 2, 0x22, 48);
        sprites.evaluate(10, 8);
        fetch_all(&mut sprites, 8, &mut mapper);

        assert_eq!(sprites.line_count(), 2);
        // Sprite 0 wins at its opaque column
        let p = sprites.pixel(50).unwrap();
        assert_eq!(p.index, 0x10 | 0x04 | 1);
        assert!(p.is_sprite_zero);
        // Elsewhere sprite 1 shows through, behind the background
        let p = sprites.pixel(51).unwrap();
        assert_eq!(p.index, 0x10 | 0x08 | 2);
        assert!(p.behind_background);
        assert!(!p.is_sprite_zero);
        assert!(sprites.pixel(47).is_none());
        assert!(sprites.pixel(56).is_none());
    }

    #[test]
    fn test_flips() {
        let mut mapper = NROMMapper::new(numbered_image(32, 0));
        // Tile 3: row 0 has only the leftmost pixel set, row 7 only the rightmost
        mapper.ppu_write(0x0030, 0x80);
        mapper.ppu_write(0x0037, 0x01);

        let mut sprites = Sprites::new();
        place(&mut sprites, 0, 0, 3, ATTR_FLIP_HORIZONTAL, 0);
        sprites.evaluate(0, 8);
        fetch_all(&mut sprites, 8, &mut mapper);
        assert!(sprites.pixel(0).is_none());
        assert!(sprites.pixel(7).is_some());

        place(&mut sprites, 0, 0, 3, ATTR_FLIP_VERTICAL, 0);
        sprites.evaluate(0, 8);
        fetch_all(&mut sprites, 8, &mut mapper);
        assert!(sprites.pixel(7).is_some());
        assert!(sprites.pixel(0).is_none());
    }

    #[test]
    fn test_tall_sprite_uses_tile_bit_for_table() {
        let mut mapper = NROMMapper::new(numbered_image(32, 0));
        // Tile $05 in 8x16 mode: table $1000, top half tile 4, bottom half tile 5
        mapper.ppu_write(0x1040, 0xF0);
        mapper.ppu_write(0x1053, 0x0F);

        let mut sprites = Sprites::new();
        place(&mut sprites, 0, 0, 0x05, 0, 0);
        sprites.evaluate(0, 16);
        fetch_all(&mut sprites, 16, &mut mapper);
        assert!(sprites.pixel(0).is_some());
        assert!(sprites.pixel(4).is_none());

        sprites.evaluate(11, 16);
        fetch_all(&mut sprites, 16, &mut mapper);
        assert!(sprites.pixel(0).is_none());
        assert!(sprites.pixel(4).is_some());
    }

    #[test]
    fn test_height_shrinks_between_evaluation_and_fetch() {
        let mut mapper = NROMMapper::new(numbered_image(32, 0));
        // Tile $05 in 8x8 mode, row 0: leftmost pixel
        mapper.ppu_write(0x0050, 0x80);

        let mut sprites = Sprites::new();
        place(&mut sprites, 0, 20, 0x05, ATTR_FLIP_VERTICAL, 0);
        // Bottom row of a 16-line sprite
        sprites.evaluate(35, 16);
        assert_eq!(sprites.candidate_count, 1);

        // $2000 switches to 8x8 before the pattern fetches
        fetch_all(&mut sprites, 8, &mut mapper);
        assert_eq!(sprites.line_count(), 1);
        // Row 15 wraps to row 7, flipped to row 0
        assert!(sprites.pixel(0).is_some());
        assert!(sprites.pixel(1).is_none());
    }
}
