use crate::cartridge::{Board, Mapper, RomImage};

/// UxROM mapper (Mapper 2)
///
/// PRG banking mapper with switchable lower bank and fixed upper bank.
/// Supports:
/// - 16KB switchable PRG bank at $8000-$BFFF
/// - 16KB fixed PRG bank at $C000-$FFFF (always last bank)
/// - 8KB CHR-RAM (no CHR ROM banking)
/// - Bank select register at $8000-$FFFF (any write)
///
/// Common in games like Mega Man, Castlevania, Contra, Duck Tales, Metal Gear.
pub struct UxROMMapper {
    board: Board,
}

impl UxROMMapper {
    pub fn new(image: RomImage) -> Self {
        let mut board = Board::new(image);
        board.map_prg_16k(0, 0);
        let last = board.last_prg_bank(16);
        board.map_prg_16k(1, last);
        Self { board }
    }
}

impl Mapper for UxROMMapper {
    fn board(&self) -> &Board {
        &self.board
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn name(&self) -> &'static str {
        "UxROM"
    }

    fn cart_write(&mut self, addr: u16, value: u8) {
        match addr {
            0x8000..=0xFFFF => self.board.map_prg_16k(0, value as usize),
            _ => self.board.write_prg_ram(addr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::board::tests::numbered_image;

    #[test]
    fn test_uxrom_initial_state() {
        let mut mapper = UxROMMapper::new(numbered_image(128, 0));
        assert_eq!(mapper.cart_read(0x8000), 0);
        // Last 16KB bank (bank 7) fixed at $C000
        assert_eq!(mapper.cart_read(0xC000), 7 * 16);
    }

    #[test]
    fn test_uxrom_bank_switching() {
        let mut mapper = UxROMMapper::new(numbered_image(128, 0));
        for bank in 0..8usize {
            mapper.cart_write(0x8000, bank as u8);
            assert_eq!(mapper.cart_read(0x8000), (bank * 16) as u8);
            assert_eq!(mapper.cart_read(0xBFFF), (bank * 16 + 15) as u8);
            assert_eq!(mapper.cart_read(0xC000), 7 * 16);
        }
    }

    #[test]
    fn test_uxrom_bank_number_wraps() {
        let mut mapper = UxROMMapper::new(numbered_image(128, 0));
        mapper.cart_write(0xFFFF, 9);
        assert_eq!(mapper.cart_read(0x8000), 16);
    }

    #[test]
    fn test_uxrom_chr_ram() {
        let mut mapper = UxROMMapper::new(numbered_image(128, 0));
        mapper.ppu_write(0x0010, 0x5A);
        assert_eq!(mapper.ppu_read(0x0010), 0x5A);
    }
}
