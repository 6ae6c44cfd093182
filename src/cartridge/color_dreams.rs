use crate::cartridge::{Board, Mapper, RomImage};

/// Color Dreams mapper (Mapper 11)
///
/// The mirror image of GxROM: bits 0-1 select the 32KB PRG bank and bits 4-7
/// the 8KB CHR bank.
pub struct ColorDreamsMapper {
    board: Board,
}

impl ColorDreamsMapper {
    pub fn new(image: RomImage) -> Self {
        Self {
            board: Board::new(image),
        }
    }
}

impl Mapper for ColorDreamsMapper {
    fn board(&self) -> &Board {
        &self.board
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn name(&self) -> &'static str {
        "Color Dreams"
    }

    fn cart_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x8000..=0xFFFF => {
                self.board.map_prg_32k((value & 0x03) as usize);
                self.board.map_chr_8k((value >> 4) as usize);
            }
            _ => self.board.write_prg_ram(addr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::board::tests::numbered_image;

    #[test]
    fn test_color_dreams_switching() {
        let mut mapper = ColorDreamsMapper::new(numbered_image(128, 128));
        mapper.cart_write(0xC000, 0x32);
        assert_eq!(mapper.cart_read(0x8000), 64);
        assert_eq!(mapper.ppu_read(0x0400), 25);
    }
}
