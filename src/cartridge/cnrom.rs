use crate::cartridge::{Board, Mapper, RomImage};

/// CNROM mapper (Mapper 3)
///
/// Fixed 16KB or 32KB PRG with an 8KB CHR bank selected by any write to
/// $8000-$FFFF. Used by Arkanoid, Gradius and Paperboy.
pub struct CNROMMapper {
    board: Board,
}

impl CNROMMapper {
    pub fn new(image: RomImage) -> Self {
        Self {
            board: Board::new(image),
        }
    }
}

impl Mapper for CNROMMapper {
    fn board(&self) -> &Board {
        &self.board
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn name(&self) -> &'static str {
        "CNROM"
    }

    fn cart_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x8000..=0xFFFF => self.board.map_chr_8k(value as usize),
            _ => self.board.write_prg_ram(addr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::board::tests::numbered_image;

    #[test]
    fn test_cnrom_chr_switching() {
        let mut mapper = CNROMMapper::new(numbered_image(32, 32));
        assert_eq!(mapper.ppu_read(0x0000), 0);
        mapper.cart_write(0x8000, 2);
        assert_eq!(mapper.ppu_read(0x0000), 16);
        assert_eq!(mapper.ppu_read(0x1FFF), 23);
    }

    #[test]
    fn test_cnrom_prg_is_fixed() {
        let mut mapper = CNROMMapper::new(numbered_image(32, 32));
        mapper.cart_write(0x8000, 3);
        assert_eq!(mapper.cart_read(0x8000), 0);
        assert_eq!(mapper.cart_read(0xFFFF), 31);
    }
}
