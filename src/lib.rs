// Cycle-stepped NES emulation core. The SDL2 frontend is behind the
// `frontend` feature; everything else builds without native libraries.

pub mod apu;
pub mod cartridge;
pub mod config;
pub mod cpu;
pub mod error;
pub mod irq;
pub mod joypad;
pub mod mem_controller;
pub mod memory;
pub mod nes;
pub mod ppu; // Modular PPU structure
pub mod savefile;
pub mod screen_buffer;
pub mod test_rom;

#[cfg(feature = "frontend")]
pub mod audio;
#[cfg(feature = "frontend")]
pub mod eventloop;
