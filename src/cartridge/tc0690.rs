use crate::cartridge::{Board, Mapper, MirroringMode, RomImage};

/// Taito TC0690 (Mapper 48)
///
/// Two switchable 8KB PRG banks with the last two fixed, two 2KB plus four
/// 1KB CHR banks, and a scanline IRQ counter. The counter is clocked from the
/// PPU's per-scanline notification rather than by watching A12.
///
/// Registers:
/// - $8000/$8001: PRG banks at $8000/$A000
/// - $8002/$8003: 2KB CHR banks at $0000/$0800
/// - $A000-$A003: 1KB CHR banks at $1000-$1C00
/// - $C000: IRQ latch (written inverted), $C001: reload
/// - $C002/$C003: IRQ enable / disable and acknowledge
/// - $E000: mirroring (bit 6)
pub struct TaitoTC0690Mapper {
    board: Board,
    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_flag: bool,
}

impl TaitoTC0690Mapper {
    pub fn new(image: RomImage) -> Self {
        let mut board = Board::new(image);
        let last = board.last_prg_bank(8);
        board.map_prg_8k(0, 0);
        board.map_prg_8k(1, 1);
        board.map_prg_8k(2, last.saturating_sub(1));
        board.map_prg_8k(3, last);
        Self {
            board,
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_flag: false,
        }
    }
}

impl Mapper for TaitoTC0690Mapper {
    fn board(&self) -> &Board {
        &self.board
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn name(&self) -> &'static str {
        "Taito TC0690"
    }

    fn cart_write(&mut self, addr: u16, value: u8) {
        match addr & 0xE003 {
            0x8000 => self.board.map_prg_8k(0, (value & 0x3F) as usize),
            0x8001 => self.board.map_prg_8k(1, (value & 0x3F) as usize),
            0x8002 => self.board.map_chr_2k(0, value as usize),
            0x8003 => self.board.map_chr_2k(1, value as usize),
            reg @ 0xA000..=0xA003 => self.board.map_chr_1k(4 + (reg & 3) as usize, value as usize),
            0xC000 => self.irq_latch = value ^ 0xFF,
            0xC001 => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            0xC002 => self.irq_enabled = true,
            0xC003 => {
                self.irq_enabled = false;
                self.irq_flag = false;
            }
            0xE000 => self.board.set_mirroring(if value & 0x40 != 0 {
                MirroringMode::Horizontal
            } else {
                MirroringMode::Vertical
            }),
            _ if addr < 0x8000 => self.board.write_prg_ram(addr, value),
            _ => {}
        }
    }

    fn on_scanline(&mut self, _scanline: u16, rendering: bool) {
        // The counter is clocked by pattern fetches, which stop with rendering
        if !rendering {
            return;
        }
        if self.irq_counter == 0 || self.irq_reload {
            self.irq_counter = self.irq_latch;
            self.irq_reload = false;
        } else {
            self.irq_counter -= 1;
        }
        if self.irq_counter == 0 && self.irq_enabled {
            self.irq_flag = true;
        }
    }

    fn irq_pending(&self) -> bool {
        self.irq_flag
    }
}
