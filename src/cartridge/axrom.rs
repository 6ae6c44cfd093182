use crate::cartridge::{Board, Mapper, MirroringMode, RomImage};

const AXROM_BANK_MASK: u8 = 0x07;
const AXROM_NAMETABLE_SELECT: u8 = 0x10;

/// AxROM mapper (Mapper 7)
///
/// 32KB switchable PRG bank and single-screen mirroring chosen by bit 4 of
/// the bank register. CHR is 8KB RAM. Used by Battletoads and Marble Madness.
pub struct AxROMMapper {
    board: Board,
}

impl AxROMMapper {
    pub fn new(image: RomImage) -> Self {
        let mut board = Board::new(image);
        board.set_mirroring(MirroringMode::SingleScreenLower);
        Self { board }
    }
}

impl Mapper for AxROMMapper {
    fn board(&self) -> &Board {
        &self.board
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn name(&self) -> &'static str {
        "AxROM"
    }

    fn cart_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x8000..=0xFFFF => {
                self.board.map_prg_32k((value & AXROM_BANK_MASK) as usize);
                self.board.set_mirroring(if value & AXROM_NAMETABLE_SELECT != 0 {
                    MirroringMode::SingleScreenUpper
                } else {
                    MirroringMode::SingleScreenLower
                });
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
    fn test_axrom_prg_switching() {
        let mut mapper = AxROMMapper::new(numbered_image(256, 0));
        mapper.cart_write(0x8000, 0x03);
        assert_eq!(mapper.cart_read(0x8000), 96);
        assert_eq!(mapper.cart_read(0xFFFF), 127);
    }

    #[test]
    fn test_axrom_single_screen_select() {
        let mut mapper = AxROMMapper::new(numbered_image(256, 0));
        assert_eq!(mapper.mirroring(), MirroringMode::SingleScreenLower);

        mapper.cart_write(0x8000, 0x10);
        assert_eq!(mapper.mirroring(), MirroringMode::SingleScreenUpper);
        mapper.ppu_write(0x2000, 0x77);
        assert_eq!(mapper.ppu_read(0x2C00), 0x77);

        mapper.cart_write(0x8000, 0x00);
        assert_ne!(mapper.ppu_read(0x2000), 0x77);
    }
}
