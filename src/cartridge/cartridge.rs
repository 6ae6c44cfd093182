use log::info;

use crate::cartridge::Mapper;
use crate::cartridge::mapper::{create_mapper, mapper_name};
use crate::error::LoadError;
use crate::nes::TvSystem;

const INES_HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;
const PRG_UNIT: usize = 16 * 1024; // 16KB
const CHR_UNIT: usize = 8 * 1024; // 8KB
const DEFAULT_PRG_RAM_SIZE: usize = 8 * 1024; // 8KB

// Mirroring types for nametables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirroringMode {
    Vertical,
    Horizontal,
    FourScreen,
    SingleScreenLower,
    SingleScreenUpper,
}

/// Header fields and raw ROM banks handed to a mapper constructor
#[derive(Debug, Clone)]
pub struct RomImage {
    pub prg_rom: Vec<u8>,
    /// Empty when the board carries CHR-RAM
    pub chr_rom: Vec<u8>,
    pub mapper_number: u16,
    pub submapper: u8,
    pub mirroring: MirroringMode,
    pub has_battery: bool,
    pub prg_ram_size: usize,
    pub tv_system: TvSystem,
}

impl RomImage {
    /// Parse an iNES 1.0 or NES 2.0 file image
    pub fn parse(data: &[u8]) -> Result<Self, LoadError> {
        // Validate iNES header (first 4 bytes should be "NES\x1A")
        if data.len() < INES_HEADER_SIZE || &data[0..4] != b"NES\x1A" {
            return Err(LoadError::InvalidHeader);
        }

        let flags6 = data[6];
        let is_nes2 = (data[7] & 0x0C) == 0x08;
        // Old dumps with "DiskDude!" in bytes 7-15 carry garbage in flags 7
        let dirty_tail = !is_nes2 && data[12..16].iter().any(|&b| b != 0);
        let flags7 = if dirty_tail { 0 } else { data[7] };

        let (prg_rom_size, chr_rom_size) = if is_nes2 {
            (
                nes2_rom_size(data[4], data[9] & 0x0F, PRG_UNIT),
                nes2_rom_size(data[5], data[9] >> 4, CHR_UNIT),
            )
        } else {
            (data[4] as usize * PRG_UNIT, data[5] as usize * CHR_UNIT)
        };

        if prg_rom_size == 0 {
            return Err(LoadError::EmptyPrgRom);
        }

        // Lower nibble from flags 6, upper nibble from flags 7, NES 2.0 adds bits 8-11
        let mut mapper_number = ((flags6 >> 4) | (flags7 & 0xF0)) as u16;
        let mut submapper = 0;
        if is_nes2 {
            mapper_number |= ((data[8] & 0x0F) as u16) << 8;
            submapper = data[8] >> 4;
        }

        // Bit 0: Mirroring (0 = horizontal, 1 = vertical)
        // Bit 3: Four-screen mode
        let mirroring = if (flags6 & 0x08) != 0 {
            MirroringMode::FourScreen
        } else if (flags6 & 0x01) != 0 {
            MirroringMode::Vertical
        } else {
            MirroringMode::Horizontal
        };
        let has_battery = (flags6 & 0x02) != 0;

        let prg_ram_size = if is_nes2 {
            let volatile = shift_size(data[10] & 0x0F);
            let battery = shift_size(data[10] >> 4);
            match volatile + battery {
                0 => DEFAULT_PRG_RAM_SIZE,
                n => n,
            }
        } else {
            match data[8] {
                0 => DEFAULT_PRG_RAM_SIZE,
                n => n as usize * DEFAULT_PRG_RAM_SIZE,
            }
        };

        let tv_system = if is_nes2 {
            match data[12] & 0x03 {
                1 => TvSystem::Pal,
                3 => TvSystem::Dendy,
                _ => TvSystem::Ntsc,
            }
        } else if !dirty_tail && data[9] & 0x01 != 0 {
            TvSystem::Pal
        } else {
            TvSystem::Ntsc
        };

        // Check if trainer is present (bit 2 of flags6)
        let trainer_offset = if (flags6 & 0x04) != 0 { TRAINER_SIZE } else { 0 };
        let prg_rom_start = INES_HEADER_SIZE + trainer_offset;
        let prg_rom_end = prg_rom_start.saturating_add(prg_rom_size);
        let chr_rom_end = prg_rom_end.saturating_add(chr_rom_size);

        if data.len() < chr_rom_end {
            return Err(LoadError::Truncated {
                expected: chr_rom_end,
                actual: data.len(),
            });
        }

        Ok(Self {
            prg_rom: data[prg_rom_start..prg_rom_end].to_vec(),
            chr_rom: data[prg_rom_end..chr_rom_end].to_vec(),
            mapper_number,
            submapper,
            mirroring,
            has_battery,
            prg_ram_size,
            tv_system,
        })
    }
}

/// NES 2.0 ROM size: plain unit count, or exponent-multiplier form when the MSB nibble is $F
fn nes2_rom_size(lsb: u8, msb: u8, unit: usize) -> usize {
    if msb == 0x0F {
        let exponent = (lsb >> 2) as u32;
        let multiplier = (lsb & 0x03) as usize * 2 + 1;
        // Anything past 2^30 bytes is not a real cartridge
        if exponent > 30 {
            return usize::MAX / 2;
        }
        (1usize << exponent) * multiplier
    } else {
        (((msb as usize) << 8) | lsb as usize) * unit
    }
}

fn shift_size(shift: u8) -> usize {
    if shift == 0 { 0 } else { 64usize << shift }
}

/// A parsed cartridge with its mapper ready to be plugged into the bus
pub struct Cartridge {
    /// Mapper instance that handles banking and memory access
    mapper: Box<dyn Mapper>,
    tv_system: TvSystem,
    mapper_number: u16,
}

impl Cartridge {
    /// Create a new cartridge by parsing iNES file data
    pub fn new(data: &[u8]) -> Result<Self, LoadError> {
        Self::from_image(RomImage::parse(data)?)
    }

    /// Build a cartridge from an already parsed image
    pub fn from_image(image: RomImage) -> Result<Self, LoadError> {
        let tv_system = image.tv_system;
        let mapper_number = image.mapper_number;
        info!(
            "Loading mapper {} ({}), PRG {}KB, CHR {}KB{}",
            mapper_number,
            mapper_name(mapper_number).unwrap_or("unknown"),
            image.prg_rom.len() / 1024,
            image.chr_rom.len() / 1024,
            if image.has_battery { ", battery" } else { "" }
        );
        let mapper = create_mapper(image)?;
        Ok(Self {
            mapper,
            tv_system,
            mapper_number,
        })
    }

    /// Get a reference to the mapper
    pub fn mapper(&self) -> &dyn Mapper {
        &*self.mapper
    }

    /// Get a mutable reference to the mapper
    pub fn mapper_mut(&mut self) -> &mut dyn Mapper {
        &mut *self.mapper
    }

    /// Region declared by the header
    pub fn tv_system(&self) -> TvSystem {
        self.tv_system
    }

    pub fn mapper_number(&self) -> u16 {
        self.mapper_number
    }

    /// Hand the mapper over to the bus
    pub fn into_mapper(self) -> Box<dyn Mapper> {
        self.mapper
    }
}
