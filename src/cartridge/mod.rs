mod axrom;
mod board;
mod cartridge;
mod cnrom;
mod color_dreams;
mod gxrom;
mod mapper;
mod mmc1;
mod mmc2;
mod mmc3;
mod nrom;
mod tc0690;
mod uxrom;
mod vrc6;

pub use axrom::AxROMMapper;
pub use board::Board;
pub use cartridge::{Cartridge, MirroringMode, RomImage};
pub use cnrom::CNROMMapper;
pub use color_dreams::ColorDreamsMapper;
pub use gxrom::GxROMMapper;
pub use mapper::{Mapper, create_mapper, mapper_name, supported_mappers};
pub use mmc1::MMC1Mapper;
pub use mmc2::MMC2Mapper;
pub use mmc3::MMC3Mapper;
pub use nrom::NROMMapper;
pub use tc0690::TaitoTC0690Mapper;
pub use uxrom::UxROMMapper;
pub use vrc6::{Vrc6Audio, Vrc6Mapper};

#[cfg(test)]
pub(crate) use board::tests::numbered_image;
#[cfg(test)]
pub(crate) use cartridge::tests::create_test_rom;
