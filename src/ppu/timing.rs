use crate::nes::TvSystem;

/// PPU dots per scanline, for every TV system
pub const DOTS_PER_SCANLINE: u16 = 341;

/// Scanline and dot counters for the PPU
///
/// `tick` advances first; the PPU then processes the dot it landed on.
pub struct Timing {
    tv_system: TvSystem,
    scanline: u16,
    dot: u16,
    frame_count: u64,
    total_dots: u64,
    prerender_line: u16,
    vblank_line: u16,
}

impl Timing {
    pub fn new(tv_system: TvSystem) -> Self {
        Self {
            tv_system,
            scanline: 0,
            dot: 0,
            frame_count: 0,
            total_dots: 0,
            prerender_line: tv_system.scanlines_per_frame() - 1,
            vblank_line: tv_system.vblank_scanline(),
        }
    }

    pub fn reset(&mut self) {
        self.scanline = 0;
        self.dot = 0;
        self.frame_count = 0;
        self.total_dots = 0;
    }

    /// Move to the next dot. Returns true when this tick skipped the last
    /// dot of the pre-render line (NTSC odd frame with rendering on).
    pub fn tick(&mut self, rendering_enabled: bool) -> bool {
        self.total_dots += 1;

        let skip = self.tv_system.has_odd_frame_skip()
            && rendering_enabled
            && self.frame_count & 1 == 1
            && self.scanline == self.prerender_line
            && self.dot == DOTS_PER_SCANLINE - 2;

        if skip {
            self.start_frame();
            return true;
        }

        self.dot += 1;
        if self.dot == DOTS_PER_SCANLINE {
            self.dot = 0;
            self.scanline += 1;
            if self.scanline > self.prerender_line {
                self.start_frame();
            }
        }
        false
    }

    fn start_frame(&mut self) {
        self.scanline = 0;
        self.dot = 0;
        self.frame_count = self.frame_count.wrapping_add(1);
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn total_dots(&self) -> u64 {
        self.total_dots
    }

    pub fn tv_system(&self) -> TvSystem {
        self.tv_system
    }

    pub fn prerender_line(&self) -> u16 {
        self.prerender_line
    }

    pub fn vblank_line(&self) -> u16 {
        self.vblank_line
    }

    pub fn is_visible_line(&self) -> bool {
        self.scanline < 240
    }

    pub fn is_prerender_line(&self) -> bool {
        self.scanline == self.prerender_line
    }

    /// Visible lines plus the pre-render line: the lines that fetch
    pub fn is_rendering_line(&self) -> bool {
        self.is_visible_line() || self.is_prerender_line()
    }

    #[cfg(test)]
    pub(crate) fn set_position(&mut self, scanline: u16, dot: u16, frame_count: u64) {
        self.scanline = scanline;
        self.dot = dot;
        self.frame_count = frame_count;
    }
}
