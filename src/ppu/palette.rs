/// Palette RAM: 32 six-bit entries
///
/// Entries $10, $14, $18 and $1C are shared with $00, $04, $08 and $0C, so
/// the sprite palettes' transparent slots alias the background ones.
pub struct PaletteRam {
    entries: [u8; 32],
}

impl Default for PaletteRam {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteRam {
    pub fn new() -> Self {
        Self { entries: [0; 32] }
    }

    fn index(addr: u16) -> usize {
        let offset = (addr & 0x1F) as usize;
        if offset & 0x13 == 0x10 {
            offset & 0x0F
        } else {
            offset
        }
    }

    /// Read a PPU address in $3F00-$3FFF
    pub fn read(&self, addr: u16) -> u8 {
        self.entries[Self::index(addr)]
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        self.entries[Self::index(addr)] = value & 0x3F;
    }

    /// Backdrop colour ($3F00)
    pub fn backdrop(&self) -> u8 {
        self.entries[0]
    }

    /// Colour for a 5-bit palette index as the renderer produces it:
    /// bit 4 selects the sprite palettes, bits 2-3 the palette, bits 0-1 the
    /// pixel. A transparent pixel (bits 0-1 clear) falls back to the backdrop.
    pub fn color(&self, index: u8) -> u8 {
        if index & 0x03 == 0 {
            self.entries[0]
        } else {
            self.entries[(index & 0x1F) as usize]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stores_six_bits() {
        let mut palette = PaletteRam::new();
        palette.write(0x3F01, 0xFF);
        assert_eq!(palette.read(0x3F01), 0x3F);
    }

    #[test]
    fn test_sprite_backdrop_mirrors() {
        let mut palette = PaletteRam::new();
        for (mirror, base) in [(0x3F10, 0x3F00), (0x3F14, 0x3F04), (0x3F18, 0x3F08), (0x3F1C, 0x3F0C)] {
            palette.write(mirror, 0x2A);
            assert_eq!(palette.read(base), 0x2A);
            palette.write(base, 0x11);
            assert_eq!(palette.read(mirror), 0x11);
        }
    }

    #[test]
    fn test_sprite_colours_are_separate() {
        let mut palette = PaletteRam::new();
        palette.write(0x3F01, 0x05);
        palette.write(0x3F11, 0x06);
        assert_eq!(palette.read(0x3F01), 0x05);
        assert_eq!(palette.read(0x3F11), 0x06);
    }

    #[test]
    fn test_mirrors_every_32_bytes() {
        let mut palette = PaletteRam::new();
        palette.write(0x3F03, 0x12);
        assert_eq!(palette.read(0x3FE3), 0x12);
    }

    #[test]
    fn test_transparent_pixel_uses_backdrop() {
        let mut palette = PaletteRam::new();
        palette.write(0x3F00, 0x0F);
        palette.write(0x3F04, 0x20);
        palette.write(0x3F15, 0x16);
        assert_eq!(palette.color(0x04), 0x0F);
        assert_eq!(palette.color(0x15), 0x16);
    }
}
