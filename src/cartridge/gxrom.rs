use crate::cartridge::{Board, Mapper, RomImage};

/// GxROM mapper (Mapper 66)
///
/// One register at $8000-$FFFF: bits 4-5 pick a 32KB PRG bank, bits 0-1 an 8KB CHR bank.
pub struct GxROMMapper {
    board: Board,
}

impl GxROMMapper {
    pub fn new(image: RomImage) -> Self {
        Self {
            board: Board::new(image),
        }
    }
}

impl Mapper for GxROMMapper {
    fn board(&self) -> &Board {
        &self.board
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn name(&self) -> &'static str {
        "GxROM"
    }

    fn cart_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x8000..=0xFFFF => {
                self.board.map_prg_32k(((value >> 4) & 0x03) as usize);
                self.board.map_chr_8k((value & 0x03) as usize);
            }
            _ => self.board.write_prg_ram(addr, value),
        }
    }
}
