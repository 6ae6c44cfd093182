pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;

/// 2C02 palette as 0xRRGGBB, indexed by the 6-bit colour number
const SYSTEM_PALETTE: [u32; 64] = [
    0x545454, 0x001E74, 0x081090, 0x300088, 0x440064, 0x5C0030, 0x540400, 0x3C1800, 0x202A00,
    0x083A00, 0x004000, 0x003C00, 0x00302C, 0x000000, 0x000000, 0x000000, 0x989698, 0x084CC4,
    0x3032EC, 0x5C1EE4, 0x8814B0, 0xA01464, 0x982220, 0x783C00, 0x545A00, 0x287200, 0x087C00,
    0x007628, 0x006678, 0x000000, 0x000000, 0x000000, 0xECEEEC, 0x3C7EEC, 0x5C5CEC, 0x8844EC,
    0xB02CEC, 0xE028B0, 0xD83C50, 0xC45400, 0xAC7000, 0x808800, 0x409C30, 0x20A458, 0x209A88,
    0x404040, 0x000000, 0x000000, 0xECEEEC, 0xA8BCEC, 0xBCACEC, 0xD4A0EC, 0xEC94EC, 0xEC90D4,
    0xEC9CB4, 0xE4B090, 0xDCC878, 0xD4DC78, 0xB8EC98, 0xA8ECBC, 0xA0E4E4, 0xA0A0A0, 0x000000,
    0x000000,
];

/// Emphasis attenuates the two channels that are not emphasised
const EMPHASIS_ATTENUATION: f32 = 0.75;

/// One frame of PPU output
///
/// Pixels are stored as the PPU produces them, not as RGB: bits 0-5 hold the
/// colour index and bits 6-8 the PPUMASK emphasis bits (red, green, blue).
/// Converting to RGB is left to whoever displays the frame.
#[derive(Clone)]
pub struct FrameBuffer {
    pixels: Vec<u16>,
    /// Backdrop colour in effect at the start of each scanline
    background_colors: [u8; SCREEN_HEIGHT],
    /// Set when the frame was one PPU dot short (NTSC odd frame with rendering on)
    dot_crawl: bool,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
            background_colors: [0; SCREEN_HEIGHT],
            dot_crawl: false,
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, value: u16) {
        self.pixels[y * SCREEN_WIDTH + x] = value;
    }

    pub fn pixel(&self, x: usize, y: usize) -> u16 {
        self.pixels[y * SCREEN_WIDTH + x]
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn set_background_color(&mut self, line: usize, color: u8) {
        self.background_colors[line] = color;
    }

    pub fn background_colors(&self) -> &[u8; SCREEN_HEIGHT] {
        &self.background_colors
    }

    pub fn set_dot_crawl(&mut self, dot_crawl: bool) {
        self.dot_crawl = dot_crawl;
    }

    pub fn dot_crawl(&self) -> bool {
        self.dot_crawl
    }

    /// Convert the frame to packed RGB24, row by row
    pub fn to_rgb24(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixels.len() * 3);
        for &pixel in &self.pixels {
            let (r, g, b) = pixel_to_rgb(pixel);
            rgb.extend_from_slice(&[r, g, b]);
        }
        rgb
    }
}

/// Look up an indexed pixel in the system palette, applying emphasis
pub fn pixel_to_rgb(pixel: u16) -> (u8, u8, u8) {
    let color = SYSTEM_PALETTE[(pixel & 0x3F) as usize];
    let mut channels = [(color >> 16) as u8, (color >> 8) as u8, color as u8];

    let emphasis = (pixel >> 6) & 0x07;
    if emphasis != 0 {
        for (bit, channel) in channels.iter_mut().enumerate() {
            if emphasis & (1 << bit) == 0 {
                *channel = (*channel as f32 * EMPHASIS_ATTENUATION) as u8;
            }
        }
    }
    (channels[0], channels[1], channels[2])
}
