use crate::cartridge::{Board, Mapper, MirroringMode, RomImage};

const LATCH_FD: u8 = 0xFD;
const LATCH_FE: u8 = 0xFE;

/// MMC2 mapper (Mapper 9, Punch-Out!!)
///
/// One 8KB switchable PRG bank at $8000 with the last three fixed. Each 4KB
/// CHR half has two candidate banks; which one is visible flips when the PPU
/// fetches tile $FD or $FE from that half, so the switch happens mid-frame
/// without CPU involvement.
pub struct MMC2Mapper {
    board: Board,
    chr_banks: [[u8; 2]; 2],
    latches: [u8; 2],
}

impl MMC2Mapper {
    pub fn new(image: RomImage) -> Self {
        let mut board = Board::new(image);
        let last = board.last_prg_bank(8);
        board.map_prg_8k(0, 0);
        for slot in 1..4 {
            board.map_prg_8k(slot, last + slot - 3);
        }
        let mut mapper = Self {
            board,
            chr_banks: [[0; 2]; 2],
            latches: [LATCH_FE, LATCH_FE],
        };
        mapper.update_chr();
        mapper
    }

    fn update_chr(&mut self) {
        for half in 0..2 {
            let index = usize::from(self.latches[half] == LATCH_FE);
            self.board
                .map_chr_4k(half, self.chr_banks[half][index] as usize);
        }
    }

    fn observe_fetch(&mut self, addr: u16) {
        let latch = match addr & 0x1FF8 {
            0x0FD8 => Some((0, LATCH_FD)),
            0x0FE8 => Some((0, LATCH_FE)),
            0x1FD8 => Some((1, LATCH_FD)),
            0x1FE8 => Some((1, LATCH_FE)),
            _ => None,
        };
        // Half 0 only reacts to the exact address; half 1 to the 8-byte range
        if let Some((half, value)) = latch {
            if half == 1 || addr & 0x0007 == 0 {
                self.latches[half] = value;
                self.update_chr();
            }
        }
    }
}

impl Mapper for MMC2Mapper {
    fn board(&self) -> &Board {
        &self.board
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn name(&self) -> &'static str {
        "MMC2"
    }

    fn cart_write(&mut self, addr: u16, value: u8) {
        let bank = value & 0x1F;
        match addr {
            0xA000..=0xAFFF => self.board.map_prg_8k(0, (value & 0x0F) as usize),
            0xB000..=0xBFFF => self.chr_banks[0][0] = bank,
            0xC000..=0xCFFF => self.chr_banks[0][1] = bank,
            0xD000..=0xDFFF => self.chr_banks[1][0] = bank,
            0xE000..=0xEFFF => self.chr_banks[1][1] = bank,
            0xF000..=0xFFFF => self.board.set_mirroring(if value & 1 == 0 {
                MirroringMode::Vertical
            } else {
                MirroringMode::Horizontal
            }),
            _ => {
                self.board.write_prg_ram(addr, value);
                return;
            }
        }
        if (0xB000..=0xEFFF).contains(&addr) {
            self.update_chr();
        }
    }

    fn ppu_read(&mut self, addr: u16) -> u8 {
        // The latch flips after the byte has been fetched
        let value = self.board.ppu_read(addr);
        if addr < 0x2000 {
            self.observe_fetch(addr);
        }
        value
    }
}
