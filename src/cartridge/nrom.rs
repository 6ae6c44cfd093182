use crate::cartridge::{Board, Mapper, RomImage};

/// NROM mapper (Mapper 0)
///
/// The simplest board, with no bank switching.
/// Supports:
/// - 16KB or 32KB PRG ROM (16KB is mirrored at $C000)
/// - PRG-RAM at $6000-$7FFF (Family Basic carts)
/// - 8KB CHR ROM or CHR-RAM
/// - Fixed nametable mirroring
pub struct NROMMapper {
    board: Board,
}

impl NROMMapper {
    pub fn new(image: RomImage) -> Self {
        Self {
            board: Board::new(image),
        }
    }
}

impl Mapper for NROMMapper {
    fn board(&self) -> &Board {
        &self.board
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn name(&self) -> &'static str {
        "NROM"
    }
}
