use crate::apu::ExpansionAudio;
use crate::cartridge::{
    AxROMMapper, Board, CNROMMapper, ColorDreamsMapper, GxROMMapper, MMC1Mapper, MMC2Mapper,
    MMC3Mapper, MirroringMode, NROMMapper, RomImage, TaitoTC0690Mapper, UxROMMapper, Vrc6Mapper,
};
use crate::error::LoadError;

/// Trait for NES cartridge mappers
///
/// A mapper owns a [`Board`] (PRG/CHR backing store, 1KB bank tables,
/// nametable RAM) and reacts to register writes by re-pointing bank-table
/// entries or changing mirroring. Every hook has a default so a variant only
/// overrides what its hardware actually does.
///
/// # Example Implementation
///
/// ```ignore
/// struct MyMapper {
///     board: Board,
/// }
///
/// impl Mapper for MyMapper {
///     fn board(&self) -> &Board { &self.board }
///     fn board_mut(&mut self) -> &mut Board { &mut self.board }
///     fn name(&self) -> &'static str { "MyMapper" }
///
///     fn cart_write(&mut self, addr: u16, value: u8) {
///         if addr >= 0x8000 {
///             self.board.map_prg_16k(0, value as usize);
///         }
///     }
/// }
/// ```
pub trait Mapper {
    fn board(&self) -> &Board;
    fn board_mut(&mut self) -> &mut Board;

    /// Board name for logs
    fn name(&self) -> &'static str;

    /// CPU read at $4020-$FFFF
    /// - $6000-$7FFF: PRG-RAM (battery-backed on some cartridges)
    /// - $8000-$FFFF: PRG-ROM through the bank table
    fn cart_read(&mut self, addr: u16) -> u8 {
        self.board().cart_read(addr)
    }

    /// CPU write at $4020-$FFFF. Variants intercept their register ranges here.
    fn cart_write(&mut self, addr: u16, value: u8) {
        self.board_mut().write_prg_ram(addr, value);
    }

    /// PPU read at $0000-$3EFF (pattern tables and nametables)
    fn ppu_read(&mut self, addr: u16) -> u8 {
        self.board().ppu_read(addr)
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        self.board_mut().ppu_write(addr, value);
    }

    /// Called by the PPU at dot 257 of every scanline. `rendering` is set
    /// when the PPU is fetching on that line (visible or pre-render line with
    /// rendering enabled).
    fn on_scanline(&mut self, _scanline: u16, _rendering: bool) {}

    /// Called once per CPU cycle
    fn on_cpu_cycle(&mut self, _cycles: u32) {}

    /// Level of the mapper's IRQ output
    fn irq_pending(&self) -> bool {
        false
    }

    /// Sound chip on the cartridge, mixed in after the internal APU channels
    fn expansion_audio(&mut self) -> Option<&mut dyn ExpansionAudio> {
        None
    }

    /// Console reset button
    fn reset(&mut self) {}

    /// Get the current nametable mirroring mode
    fn mirroring(&self) -> MirroringMode {
        self.board().mirroring()
    }

    fn battery_ram(&self) -> Option<&[u8]> {
        self.board().battery_ram()
    }

    fn load_battery_ram(&mut self, data: &[u8]) {
        self.board_mut().load_battery_ram(data);
    }
}

/// One entry of the mapper registry
pub struct MapperEntry {
    pub number: u16,
    pub name: &'static str,
    construct: fn(RomImage) -> Box<dyn Mapper>,
}

static REGISTRY: &[MapperEntry] = &[
    MapperEntry {
        number: 0,
        name: "NROM",
        construct: |image| Box::new(NROMMapper::new(image)),
    },
    MapperEntry {
        number: 1,
        name: "MMC1",
        construct: |image| Box::new(MMC1Mapper::new(image)),
    },
    MapperEntry {
        number: 2,
        name: "UxROM",
        construct: |image| Box::new(UxROMMapper::new(image)),
    },
    MapperEntry {
        number: 3,
        name: "CNROM",
        construct: |image| Box::new(CNROMMapper::new(image)),
    },
    MapperEntry {
        number: 4,
        name: "MMC3",
        construct: |image| Box::new(MMC3Mapper::new(image)),
    },
    MapperEntry {
        number: 7,
        name: "AxROM",
        construct: |image| Box::new(AxROMMapper::new(image)),
    },
    MapperEntry {
        number: 9,
        name: "MMC2",
        construct: |image| Box::new(MMC2Mapper::new(image)),
    },
    MapperEntry {
        number: 11,
        name: "Color Dreams",
        construct: |image| Box::new(ColorDreamsMapper::new(image)),
    },
    MapperEntry {
        number: 24,
        name: "VRC6a",
        construct: |image| Box::new(Vrc6Mapper::new(image, false)),
    },
    MapperEntry {
        number: 26,
        name: "VRC6b",
        construct: |image| Box::new(Vrc6Mapper::new(image, true)),
    },
    MapperEntry {
        number: 48,
        name: "Taito TC0690",
        construct: |image| Box::new(TaitoTC0690Mapper::new(image)),
    },
    MapperEntry {
        number: 66,
        name: "GxROM",
        construct: |image| Box::new(GxROMMapper::new(image)),
    },
];

/// Build the mapper the image's header asks for
pub fn create_mapper(image: RomImage) -> Result<Box<dyn Mapper>, LoadError> {
    let number = image.mapper_number;
    REGISTRY
        .iter()
        .find(|entry| entry.number == number)
        .map(|entry| (entry.construct)(image))
        .ok_or(LoadError::UnsupportedMapper(number))
}

pub fn mapper_name(number: u16) -> Option<&'static str> {
    REGISTRY
        .iter()
        .find(|entry| entry.number == number)
        .map(|entry| entry.name)
}

/// Mapper numbers this build can run, with their board names
pub fn supported_mappers() -> impl Iterator<Item = (u16, &'static str)> {
    REGISTRY.iter().map(|entry| (entry.number, entry.name))
}
