mod background;
mod palette;
mod ppu;
mod registers;
mod sprites;
mod status;
mod timing;

pub use background::Background;
pub use palette::PaletteRam;
pub use ppu::Ppu;
pub use registers::Registers;
pub use sprites::{SpritePixel, Sprites};
pub use status::Status;
pub use timing::{DOTS_PER_SCANLINE, Timing};
