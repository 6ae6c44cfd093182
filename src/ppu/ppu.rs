use crate::cartridge::Mapper;
use crate::nes::TvSystem;
use crate::ppu::{Background, PaletteRam, Registers, Sprites, Status, Timing};
use crate::screen_buffer::FrameBuffer;

/// Sprite pattern fetches start here, one 8-dot slot per sprite
const SPRITE_FETCH_START: u16 = 261;

/// The 2C02 picture processing unit
///
/// Every `clock` advances one dot and performs that dot's work: memory
/// fetches through the mapper, one output pixel on visible dots, and the
/// vblank and flag transitions. The mapper is borrowed per call; the PPU
/// never owns the cartridge.
pub struct Ppu {
    timing: Timing,
    status: Status,
    registers: Registers,
    palette: PaletteRam,
    background: Background,
    sprites: Sprites,
    frame: FrameBuffer,
    /// Last value driven on the PPU's CPU-facing data bus
    io_bus: u8,
    frame_complete: bool,
}

impl Ppu {
    pub fn new(tv_system: TvSystem) -> Self {
        Self {
            timing: Timing::new(tv_system),
            status: Status::new(),
            registers: Registers::new(),
            palette: PaletteRam::new(),
            background: Background::new(),
            sprites: Sprites::new(),
            frame: FrameBuffer::new(),
            io_bus: 0,
            frame_complete: false,
        }
    }

    /// Reset button. Palette RAM and OAM keep their contents.
    pub fn reset(&mut self) {
        self.timing.reset();
        self.status.reset();
        self.registers.reset();
        self.background.reset();
        self.sprites.reset();
        self.io_bus = 0;
        self.frame_complete = false;
    }

    /// Advance one PPU dot
    pub fn clock(&mut self, mapper: &mut dyn Mapper) {
        let skipped = self.timing.tick(self.registers.is_rendering_enabled());

        let scanline = self.timing.scanline();
        let dot = self.timing.dot();

        if scanline == 0 && dot == 0 {
            self.frame.set_dot_crawl(skipped);
        }

        if scanline == self.timing.vblank_line() && dot == 1 {
            self.status.enter_vblank();
            self.frame_complete = true;
        }

        if self.timing.is_prerender_line() && dot == 0 {
            self.status.clear_for_prerender();
        }

        let fetching = self.timing.is_rendering_line() && self.registers.is_rendering_enabled();
        if fetching {
            self.run_fetches(scanline, dot, mapper);
        }
        if dot == 257 {
            mapper.on_scanline(scanline, fetching);
        }

        if self.timing.is_visible_line() && (1..=256).contains(&dot) {
            if dot == 1 {
                self.frame
                    .set_background_color(scanline as usize, self.palette.backdrop());
            }
            self.render_pixel(dot - 1, scanline);
        }
    }

    /// Background and sprite memory traffic for one dot of a rendering line
    fn run_fetches(&mut self, scanline: u16, dot: u16, mapper: &mut dyn Mapper) {
        let v = self.registers.v();
        match dot {
            2..=257 | 321..=337 => {
                self.background.shift_registers();
                match (dot - 1) % 8 {
                    0 => {
                        self.background.load_shift_registers();
                        self.background.fetch_nametable(v, mapper);
                    }
                    2 => self.background.fetch_attribute(v, mapper),
                    4 => {
                        let table = self.registers.bg_pattern_table_addr();
                        self.background.fetch_pattern_lo(table, v, mapper);
                    }
                    6 => {
                        let table = self.registers.bg_pattern_table_addr();
                        self.background.fetch_pattern_hi(table, v, mapper);
                    }
                    7 => self.registers.increment_coarse_x(),
                    _ => {}
                }
            }
            // Unused nametable fetches at the end of the line
            338 | 340 => self.background.fetch_nametable(v, mapper),
            _ => {}
        }

        if dot == 256 {
            self.registers.increment_fine_y();
        }
        if dot == 257 {
            self.registers.copy_horizontal_bits();
        }
        if self.timing.is_prerender_line() && (280..=304).contains(&dot) {
            self.registers.copy_vertical_bits();
        }

        if (257..=320).contains(&dot) {
            self.registers.oam_address = 0;
        }

        let height = self.registers.sprite_height();
        if dot == SPRITE_FETCH_START - 1 {
            if self.timing.is_prerender_line() {
                self.sprites.clear_candidates();
            } else if self.sprites.evaluate(scanline, height) {
                self.status.set_sprite_overflow();
            }
        }
        if (SPRITE_FETCH_START..SPRITE_FETCH_START + 64).contains(&dot) {
            let offset = dot - SPRITE_FETCH_START;
            let slot = (offset / 8) as usize;
            let table = self.registers.sprite_pattern_table_addr();
            match offset % 8 {
                0 => self.sprites.fetch_pattern(slot, false, height, table, mapper),
                2 => self.sprites.fetch_pattern(slot, true, height, table, mapper),
                _ => {}
            }
        }
        if dot == 320 {
            self.sprites.commit_line();
        }
    }

    fn render_pixel(&mut self, x: u16, y: u16) {
        let regs = &self.registers;

        let color = if regs.is_rendering_enabled() {
            let bg = if regs.is_background_enabled() && (x >= 8 || regs.show_background_left()) {
                self.background.pixel(regs.x())
            } else {
                0
            };
            let sprite = if regs.is_sprites_enabled() && (x >= 8 || regs.show_sprites_left()) {
                self.sprites.pixel(x as u8)
            } else {
                None
            };

            let index = match sprite {
                Some(sprite) => {
                    if sprite.is_sprite_zero && bg != 0 && x != 255 {
                        self.status.set_sprite_0_hit();
                    }
                    if bg != 0 && sprite.behind_background {
                        bg
                    } else {
                        sprite.index
                    }
                }
                None => bg,
            };
            self.palette.color(index)
        } else {
            // With rendering off the PPU shows the palette entry v points at,
            // if any, instead of the backdrop
            let v = regs.v() & 0x3FFF;
            if v >= 0x3F00 {
                self.palette.read(v)
            } else {
                self.palette.backdrop()
            }
        };

        let color = if regs.is_grayscale() { color & 0x30 } else { color };
        let emphasis = regs.color_emphasis() as u16;
        self.frame
            .set_pixel(x as usize, y as usize, color as u16 | emphasis << 6);
    }

    /// Visible lines and the pre-render line while rendering is on
    fn is_rendering(&self) -> bool {
        self.registers.is_rendering_enabled() && self.timing.is_rendering_line()
    }

    /// CPU read of $2000-$3FFF (mirrored every 8 bytes)
    pub fn read_register(&mut self, addr: u16, mapper: &mut dyn Mapper) -> u8 {
        let value = match addr & 0x07 {
            2 => {
                if self.timing.scanline() == self.timing.vblank_line() && self.timing.dot() == 0 {
                    self.status.suppress_next_vblank();
                }
                self.registers.reset_write_toggle();
                self.status.read() | (self.io_bus & 0x1F)
            }
            4 => {
                let dot = self.timing.dot();
                if self.is_rendering() && (1..=64).contains(&dot) {
                    // Secondary OAM clear drives $FF onto the OAM bus
                    0xFF
                } else {
                    self.sprites.read_oam(self.registers.oam_address)
                }
            }
            7 => self.read_data(mapper),
            // Write-only registers return the data bus latch
            _ => self.io_bus,
        };
        self.io_bus = value;
        value
    }

    /// CPU write of $2000-$3FFF (mirrored every 8 bytes)
    pub fn write_register(&mut self, addr: u16, value: u8, mapper: &mut dyn Mapper) {
        self.io_bus = value;
        match addr & 0x07 {
            0 => self.registers.write_control(value),
            1 => self.registers.write_mask(value),
            2 => {}
            3 => self.registers.oam_address = value,
            4 => self.write_oam_data(value),
            5 => self.registers.write_scroll(value),
            6 => self.registers.write_address(value),
            _ => self.write_data(value, mapper),
        }
    }

    fn write_oam_data(&mut self, value: u8) {
        let addr = self.registers.oam_address;
        if self.is_rendering() {
            // Ignored while rendering, but the address still bumps the sprite index
            self.registers.oam_address = addr.wrapping_add(4);
        } else {
            self.sprites.write_oam(addr, value);
            self.registers.oam_address = addr.wrapping_add(1);
        }
    }

    fn read_data(&mut self, mapper: &mut dyn Mapper) -> u8 {
        let addr = self.registers.v() & 0x3FFF;
        let value = if addr >= 0x3F00 {
            // Palette reads are immediate; the buffer picks up the
            // nametable byte underneath
            self.registers
                .set_data_buffer(mapper.ppu_read(addr - 0x1000));
            let mut color = self.palette.read(addr);
            if self.registers.is_grayscale() {
                color &= 0x30;
            }
            color | (self.io_bus & 0xC0)
        } else {
            let buffered = self.registers.data_buffer();
            self.registers.set_data_buffer(mapper.ppu_read(addr));
            buffered
        };
        self.increment_after_data_access();
        value
    }

    fn write_data(&mut self, value: u8, mapper: &mut dyn Mapper) {
        let addr = self.registers.v() & 0x3FFF;
        if addr >= 0x3F00 {
            self.palette.write(addr, value);
        } else {
            mapper.ppu_write(addr, value);
        }
        self.increment_after_data_access();
    }

    /// During rendering, a $2007 access bumps coarse X and fine Y together
    /// instead of the normal 1/32 increment
    fn increment_after_data_access(&mut self) {
        if self.is_rendering() {
            self.registers.increment_coarse_x();
            self.registers.increment_fine_y();
        } else {
            self.registers.increment_vram_address();
        }
    }

    /// Level of the /NMI output (active while vblank and NMI enable are both set)
    pub fn nmi_line(&self) -> bool {
        self.status.is_in_vblank() && self.registers.nmi_enabled()
    }

    /// True once per frame, after vblank starts
    pub fn take_frame_complete(&mut self) -> bool {
        std::mem::take(&mut self.frame_complete)
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn scanline(&self) -> u16 {
        self.timing.scanline()
    }

    pub fn dot(&self) -> u16 {
        self.timing.dot()
    }

    pub fn frame_count(&self) -> u64 {
        self.timing.frame_count()
    }

    pub fn tv_system(&self) -> TvSystem {
        self.timing.tv_system()
    }

    pub fn is_in_vblank(&self) -> bool {
        self.status.is_in_vblank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::{Board, NROMMapper, numbered_image};

    fn setup() -> (Ppu, Box<dyn Mapper>) {
        (
            Ppu::new(TvSystem::Ntsc),
            Box::new(NROMMapper::new(numbered_image(32, 0))),
        )
    }

    fn run_to(ppu: &mut Ppu, mapper: &mut dyn Mapper, scanline: u16, dot: u16) {
        while ppu.scanline() != scanline || ppu.dot() != dot {
            ppu.clock(mapper);
        }
    }

    fn run_frame(ppu: &mut Ppu, mapper: &mut dyn Mapper) {
        while !ppu.take_frame_complete() {
            ppu.clock(mapper);
        }
    }

    fn set_address(ppu: &mut Ppu, mapper: &mut dyn Mapper, addr: u16) {
        ppu.write_register(0x2006, (addr >> 8) as u8, mapper);
        ppu.write_register(0x2006, addr as u8, mapper);
    }

    fn reset_scroll(ppu: &mut Ppu, mapper: &mut dyn Mapper) {
        ppu.write_register(0x2000, 0x00, mapper);
        ppu.write_register(0x2005, 0x00, mapper);
        ppu.write_register(0x2005, 0x00, mapper);
    }

    /// Tile 1 solid colour 1, every nametable cell tile 1
    fn fill_background(mapper: &mut dyn Mapper) {
        for row in 0..8 {
            mapper.ppu_write(0x0010 + row, 0xFF);
        }
        for addr in 0x2000..0x23C0 {
            mapper.ppu_write(addr, 0x01);
        }
    }

    #[test]
    fn test_vblank_set_at_dot_1() {
        let (mut ppu, mut mapper) = setup();
        run_to(&mut ppu, mapper.as_mut(), 241, 0);
        assert!(!ppu.is_in_vblank());
        assert!(!ppu.take_frame_complete());
        ppu.clock(mapper.as_mut());
        assert!(ppu.is_in_vblank());
        assert!(ppu.take_frame_complete());
        assert!(!ppu.take_frame_complete());
    }

    #[test]
    fn test_vblank_cleared_at_prerender_dot_0() {
        let (mut ppu, mut mapper) = setup();
        run_to(&mut ppu, mapper.as_mut(), 260, 340);
        assert!(ppu.is_in_vblank());
        ppu.clock(mapper.as_mut());
        assert_eq!((ppu.scanline(), ppu.dot()), (261, 0));
        assert!(!ppu.is_in_vblank());
    }

    #[test]
    fn test_vblank_timing_independent_of_rendering() {
        let (mut ppu, mut mapper) = setup();
        ppu.write_register(0x2001, 0x18, mapper.as_mut());
        run_to(&mut ppu, mapper.as_mut(), 241, 1);
        assert!(ppu.is_in_vblank());
        run_to(&mut ppu, mapper.as_mut(), 261, 0);
        assert!(!ppu.is_in_vblank());
    }

    #[test]
    fn test_nmi_line_needs_enable_bit() {
        let (mut ppu, mut mapper) = setup();
        run_to(&mut ppu, mapper.as_mut(), 241, 1);
        assert!(!ppu.nmi_line());
        ppu.write_register(0x2000, 0x80, mapper.as_mut());
        assert!(ppu.nmi_line());
        ppu.read_register(0x2002, mapper.as_mut());
        assert!(!ppu.nmi_line());
    }

    #[test]
    fn test_status_read_one_dot_early_suppresses_vblank() {
        let (mut ppu, mut mapper) = setup();
        ppu.write_register(0x2000, 0x80, mapper.as_mut());
        run_to(&mut ppu, mapper.as_mut(), 241, 0);
        assert_eq!(ppu.read_register(0x2002, mapper.as_mut()) & 0x80, 0);
        ppu.clock(mapper.as_mut());
        assert!(!ppu.is_in_vblank());
        assert!(!ppu.nmi_line());

        // Only that frame is affected
        assert!(ppu.take_frame_complete());
        run_frame(&mut ppu, mapper.as_mut());
        assert!(ppu.is_in_vblank());
    }

    #[test]
    fn test_status_read_low_bits_from_io_bus() {
        let (mut ppu, mut mapper) = setup();
        ppu.write_register(0x2000, 0x1F, mapper.as_mut());
        run_to(&mut ppu, mapper.as_mut(), 241, 1);
        assert_eq!(ppu.read_register(0x2002, mapper.as_mut()), 0x9F);
        assert_eq!(ppu.read_register(0x2002, mapper.as_mut()), 0x1F);
    }

    #[test]
    fn test_odd_frame_skip_with_rendering() {
        let (mut ppu, mut mapper) = setup();
        ppu.write_register(0x2001, 0x08, mapper.as_mut());
        let mut lengths = Vec::new();
        for _ in 0..3 {
            let frame = ppu.frame_count();
            let mut dots = 0u32;
            while ppu.frame_count() == frame {
                ppu.clock(mapper.as_mut());
                dots += 1;
            }
            lengths.push(dots);
        }
        assert_eq!(lengths, vec![89342, 89341, 89342]);
    }

    #[test]
    fn test_dot_crawl_reported_on_short_frame() {
        let (mut ppu, mut mapper) = setup();
        ppu.write_register(0x2001, 0x08, mapper.as_mut());
        run_frame(&mut ppu, mapper.as_mut());
        assert!(!ppu.frame().dot_crawl());
        // Frame 1 is odd; frame 2 starts after the skipped dot
        run_frame(&mut ppu, mapper.as_mut());
        run_frame(&mut ppu, mapper.as_mut());
        assert!(ppu.frame().dot_crawl());
    }

    #[test]
    fn test_pal_frame_has_no_skip() {
        let mut ppu = Ppu::new(TvSystem::Pal);
        let mut mapper: Box<dyn Mapper> = Box::new(NROMMapper::new(numbered_image(32, 0)));
        ppu.write_register(0x2001, 0x08, mapper.as_mut());
        for _ in 0..2 {
            let frame = ppu.frame_count();
            let mut dots = 0u32;
            while ppu.frame_count() == frame {
                ppu.clock(mapper.as_mut());
                dots += 1;
            }
            assert_eq!(dots, 312 * 341);
        }
    }

    #[test]
    fn test_data_reads_are_buffered() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        set_address(&mut ppu, m, 0x2105);
        ppu.write_register(0x2007, 0x55, m);
        ppu.write_register(0x2007, 0x66, m);

        set_address(&mut ppu, m, 0x2105);
        ppu.read_register(0x2007, m);
        assert_eq!(ppu.read_register(0x2007, m), 0x55);
        assert_eq!(ppu.read_register(0x2007, m), 0x66);
    }

    #[test]
    fn test_palette_reads_are_immediate() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        m.ppu_write(0x2F10, 0x77);
        set_address(&mut ppu, m, 0x3F10);
        ppu.write_register(0x2007, 0x2C, m);

        set_address(&mut ppu, m, 0x3F00);
        // $3F10 mirrors $3F00
        assert_eq!(ppu.read_register(0x2007, m) & 0x3F, 0x2C);

        // The read buffer now holds the nametable byte under the palette
        set_address(&mut ppu, m, 0x3F10);
        ppu.read_register(0x2007, m);
        set_address(&mut ppu, m, 0x0000);
        assert_eq!(ppu.read_register(0x2007, m), 0x77);
    }

    #[test]
    fn test_palette_read_keeps_io_bus_high_bits() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        set_address(&mut ppu, m, 0x3F01);
        ppu.write_register(0x2007, 0x21, m);
        set_address(&mut ppu, m, 0x3F01);
        // io_bus holds $01 from the address write
        assert_eq!(ppu.read_register(0x2007, m), 0x21);
        set_address(&mut ppu, m, 0x3F01);
        ppu.write_register(0x2000, 0xC0, m);
        assert_eq!(ppu.read_register(0x2007, m), 0xE1);
    }

    #[test]
    fn test_data_increment_by_32() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        ppu.write_register(0x2000, 0x04, m);
        set_address(&mut ppu, m, 0x2000);
        ppu.write_register(0x2007, 0x01, m);
        ppu.write_register(0x2007, 0x02, m);
        assert_eq!(m.ppu_read(0x2000), 0x01);
        assert_eq!(m.ppu_read(0x2020), 0x02);
    }

    #[test]
    fn test_write_only_registers_read_io_bus() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        ppu.write_register(0x2005, 0x5A, m);
        assert_eq!(ppu.read_register(0x2000, m), 0x5A);
        assert_eq!(ppu.read_register(0x3FFE, m), 0x5A);
    }

    #[test]
    fn test_oam_data_port() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        ppu.write_register(0x2003, 0x10, m);
        ppu.write_register(0x2004, 0xAB, m);
        ppu.write_register(0x2004, 0xFF, m);
        ppu.write_register(0x2003, 0x10, m);
        assert_eq!(ppu.read_register(0x2004, m), 0xAB);
        // Reads do not increment
        assert_eq!(ppu.read_register(0x2004, m), 0xAB);
        ppu.write_register(0x2003, 0x11, m);
        assert_eq!(ppu.read_register(0x2004, m), 0xFF);
        ppu.write_register(0x2003, 0x12, m);
        assert_eq!(ppu.read_register(0x2004, m), 0xE3);
    }

    #[test]
    fn test_oam_read_during_secondary_clear() {
        let (mut ppu, mut mapper) = setup();
        ppu.write_register(0x2003, 0x00, mapper.as_mut());
        ppu.write_register(0x2004, 0x42, mapper.as_mut());
        ppu.write_register(0x2003, 0x00, mapper.as_mut());
        ppu.write_register(0x2001, 0x18, mapper.as_mut());

        run_to(&mut ppu, mapper.as_mut(), 10, 30);
        assert_eq!(ppu.read_register(0x2004, mapper.as_mut()), 0xFF);
        run_to(&mut ppu, mapper.as_mut(), 10, 100);
        assert_eq!(ppu.read_register(0x2004, mapper.as_mut()), 0x42);
    }

    #[test]
    fn test_oam_write_during_rendering_is_ignored() {
        let (mut ppu, mut mapper) = setup();
        ppu.write_register(0x2001, 0x18, mapper.as_mut());
        run_to(&mut ppu, mapper.as_mut(), 20, 100);
        ppu.write_register(0x2003, 0x01, mapper.as_mut());
        ppu.write_register(0x2004, 0x99, mapper.as_mut());
        assert_eq!(ppu.registers.oam_address, 0x05);
        assert_eq!(ppu.sprites.read_oam(0x01), 0xFF);
    }

    #[test]
    fn test_oam_address_reset_during_sprite_fetch() {
        let (mut ppu, mut mapper) = setup();
        ppu.write_register(0x2001, 0x18, mapper.as_mut());
        run_to(&mut ppu, mapper.as_mut(), 5, 200);
        ppu.registers.oam_address = 0x33;
        run_to(&mut ppu, mapper.as_mut(), 5, 258);
        assert_eq!(ppu.registers.oam_address, 0);
    }

    #[test]
    fn test_backdrop_when_rendering_disabled() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        set_address(&mut ppu, m, 0x3F00);
        ppu.write_register(0x2007, 0x21, m);
        set_address(&mut ppu, m, 0x2000);
        run_frame(&mut ppu, m);
        assert_eq!(ppu.frame().pixel(0, 0), 0x21);
        assert_eq!(ppu.frame().pixel(255, 239), 0x21);
        assert_eq!(ppu.frame().background_colors()[100], 0x21);
    }

    #[test]
    fn test_backdrop_follows_palette_address() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        set_address(&mut ppu, m, 0x3F05);
        ppu.write_register(0x2007, 0x14, m);
        set_address(&mut ppu, m, 0x3F05);
        run_frame(&mut ppu, m);
        assert_eq!(ppu.frame().pixel(10, 10), 0x14);
    }

    #[test]
    fn test_grayscale_and_emphasis() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        set_address(&mut ppu, m, 0x3F00);
        ppu.write_register(0x2007, 0x27, m);
        set_address(&mut ppu, m, 0x2000);
        ppu.write_register(0x2001, 0xA1, m);
        run_frame(&mut ppu, m);
        assert_eq!(ppu.frame().pixel(50, 50), 0x20 | (0b101 << 6));
    }

    #[test]
    fn test_background_tiles_rendered() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        fill_background(m);
        set_address(&mut ppu, m, 0x3F00);
        ppu.write_register(0x2007, 0x0F, m);
        ppu.write_register(0x2007, 0x16, m);
        reset_scroll(&mut ppu, m);
        ppu.write_register(0x2001, 0x0A, m);

        // The first frame starts without a pre-render prefetch
        run_frame(&mut ppu, m);
        run_frame(&mut ppu, m);
        assert_eq!(ppu.frame().pixel(0, 0), 0x16);
        assert_eq!(ppu.frame().pixel(137, 200), 0x16);
        assert_eq!(ppu.frame().background_colors()[0], 0x0F);
    }

    #[test]
    fn test_left_column_clipping() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        fill_background(m);
        set_address(&mut ppu, m, 0x3F00);
        ppu.write_register(0x2007, 0x0F, m);
        ppu.write_register(0x2007, 0x16, m);
        reset_scroll(&mut ppu, m);
        ppu.write_register(0x2001, 0x08, m);

        run_frame(&mut ppu, m);
        run_frame(&mut ppu, m);
        assert_eq!(ppu.frame().pixel(7, 40), 0x0F);
        assert_eq!(ppu.frame().pixel(8, 40), 0x16);
    }

    #[test]
    fn test_sprite_zero_hit() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        fill_background(m);
        ppu.write_register(0x2003, 0x00, m);
        for byte in [30, 0x01, 0x00, 40] {
            ppu.write_register(0x2004, byte, m);
        }
        ppu.write_register(0x2001, 0x1E, m);

        run_to(&mut ppu, m, 31, 0);
        assert!(!ppu.status.sprite_0_hit());
        run_to(&mut ppu, m, 31, 42);
        assert!(ppu.status.sprite_0_hit());

        // Cleared on the pre-render line
        run_to(&mut ppu, m, 261, 1);
        assert!(!ppu.status.sprite_0_hit());
    }

    #[test]
    fn test_sprite_zero_hit_needs_background() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        for row in 0..8 {
            m.ppu_write(0x0010 + row, 0xFF);
        }
        ppu.write_register(0x2003, 0x00, m);
        for byte in [30, 0x01, 0x00, 40] {
            ppu.write_register(0x2004, byte, m);
        }
        ppu.write_register(0x2001, 0x1E, m);
        run_to(&mut ppu, m, 100, 0);
        assert!(!ppu.status.sprite_0_hit());
    }

    #[test]
    fn test_sprite_overflow_flag() {
        let (mut ppu, mut mapper) = setup();
        let m = mapper.as_mut();
        ppu.write_register(0x2003, 0x00, m);
        for i in 0..9u8 {
            for byte in [50, 0x00, 0x00, i * 8] {
                ppu.write_register(0x2004, byte, m);
            }
        }
        ppu.write_register(0x2001, 0x10, m);
        run_to(&mut ppu, m, 49, 300);
        assert!(!ppu.status.sprite_overflow());
        run_to(&mut ppu, m, 50, 300);
        assert!(ppu.status.sprite_overflow());
        assert_eq!(ppu.read_register(0x2002, m) & 0x20, 0x20);
    }

    struct ScanlineRecorder {
        board: Board,
        scanlines: Vec<(u16, bool)>,
    }

    impl Mapper for ScanlineRecorder {
        fn board(&self) -> &Board {
            &self.board
        }

        fn board_mut(&mut self) -> &mut Board {
            &mut self.board
        }

        fn name(&self) -> &'static str {
            "recorder"
        }

        fn on_scanline(&mut self, scanline: u16, rendering: bool) {
            self.scanlines.push((scanline, rendering));
        }
    }

    #[test]
    fn test_scanline_notifications() {
        let mut ppu = Ppu::new(TvSystem::Ntsc);
        let mut mapper = ScanlineRecorder {
            board: Board::new(numbered_image(32, 8)),
            scanlines: Vec::new(),
        };
        run_to(&mut ppu, &mut mapper, 0, 0);
        mapper.scanlines.clear();
        // Two whole frames with rendering off still notify every line
        run_to(&mut ppu, &mut mapper, 0, 1);
        run_to(&mut ppu, &mut mapper, 0, 0);
        run_to(&mut ppu, &mut mapper, 0, 1);
        run_to(&mut ppu, &mut mapper, 0, 0);
        assert_eq!(mapper.scanlines.len(), 2 * 262);
        assert!(mapper.scanlines.iter().all(|&(_, rendering)| !rendering));

        ppu.write_register(0x2001, 0x08, &mut mapper);
        run_to(&mut ppu, &mut mapper, 0, 1);
        mapper.scanlines.clear();
        run_to(&mut ppu, &mut mapper, 0, 0);
        let lines: Vec<u16> = mapper.scanlines.iter().map(|&(line, _)| line).collect();
        assert_eq!(lines, (0..262).collect::<Vec<u16>>());
        let rendered: Vec<u16> = mapper
            .scanlines
            .iter()
            .filter(|&&(_, rendering)| rendering)
            .map(|&(line, _)| line)
            .collect();
        let mut expected: Vec<u16> = (0..240).collect();
        expected.push(261);
        assert_eq!(rendered, expected);
    }
}
