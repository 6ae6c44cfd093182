use crate::cartridge::{Board, Mapper, MirroringMode, RomImage};

const MMC1_SHIFT_REGISTER_RESET: u8 = 0x80; // Bit 7 set triggers reset
const MMC1_WRITE_COUNT_MAX: u8 = 5; // Number of writes to load a register
const MMC1_DEFAULT_CONTROL: u8 = 0x0C; // PRG mode 3, CHR mode 0
const MMC1_PRG_RAM_DISABLE: u8 = 0x10;
const SUROM_THRESHOLD: usize = 256 * 1024; // 256KB PRG window

/// MMC1 mapper (Mapper 1)
///
/// Supports:
/// - PRG ROM: Switchable 16KB or 32KB banks, with the SUROM 512KB outer bank
/// - PRG RAM: 8KB at $6000-$7FFF (optional battery-backed, can be disabled)
/// - CHR: Switchable 4KB or 8KB banks (or CHR-RAM if no CHR ROM)
/// - Mirroring: Programmable (horizontal, vertical, one-screen)
/// - Serial shift register: 5-bit values loaded via sequential writes
///
/// Register loading mechanism:
/// - Write to $8000-$FFFF with bit 0 containing the next bit
/// - After 5 writes, the 5-bit value is loaded into the target register
/// - Writing with bit 7 set resets the shift register and sets control to mode 3
/// - A write on the cycle right after another write is dropped, which is what
///   makes read-modify-write instructions only count once
///
/// Registers (selected by address):
/// - $8000-$9FFF: Control (mirroring, PRG mode, CHR mode)
/// - $A000-$BFFF: CHR bank 0 (4KB at $0000 or 8KB at $0000)
/// - $C000-$DFFF: CHR bank 1 (4KB at $1000)
/// - $E000-$FFFF: PRG bank (16KB switchable)
pub struct MMC1Mapper {
    board: Board,

    // Shift register state
    shift_register: u8,
    write_count: u8,

    // Internal registers (5 bits each)
    control: u8,
    chr_bank_0: u8,
    chr_bank_1: u8,
    prg_bank: u8,

    cpu_cycle: u64,
    last_write_cycle: Option<u64>,
}

impl MMC1Mapper {
    pub fn new(image: RomImage) -> Self {
        let mut mapper = Self {
            board: Board::new(image),
            shift_register: 0,
            write_count: 0,
            control: MMC1_DEFAULT_CONTROL,
            chr_bank_0: 0,
            chr_bank_1: 0,
            prg_bank: 0,
            cpu_cycle: 0,
            last_write_cycle: None,
        };
        mapper.update_banks();
        mapper
    }

    fn reset_shift_register(&mut self) {
        self.shift_register = 0;
        self.write_count = 0;
        self.control |= MMC1_DEFAULT_CONTROL;
    }

    fn write_register(&mut self, addr: u16, value: u8) {
        match addr {
            0x8000..=0x9FFF => self.control = value,
            0xA000..=0xBFFF => self.chr_bank_0 = value,
            0xC000..=0xDFFF => self.chr_bank_1 = value,
            _ => self.prg_bank = value,
        }
        self.update_banks();
    }

    fn update_banks(&mut self) {
        self.board.set_mirroring(match self.control & 0x03 {
            0 => MirroringMode::SingleScreenLower,
            1 => MirroringMode::SingleScreenUpper,
            2 => MirroringMode::Vertical,
            _ => MirroringMode::Horizontal,
        });

        // SUROM: CHR bank 0 bit 4 selects the 256KB half of PRG
        let outer = if self.board.prg_len() > SUROM_THRESHOLD {
            (self.chr_bank_0 & 0x10) as usize
        } else {
            0
        };
        let bank = (self.prg_bank & 0x0F) as usize | outer;
        match (self.control >> 2) & 0x03 {
            0 | 1 => {
                self.board.map_prg_16k(0, bank & !1);
                self.board.map_prg_16k(1, bank | 1);
            }
            2 => {
                self.board.map_prg_16k(0, outer);
                self.board.map_prg_16k(1, bank);
            }
            _ => {
                self.board.map_prg_16k(0, bank);
                self.board.map_prg_16k(1, outer | 0x0F);
            }
        }

        if self.control & 0x10 == 0 {
            let bank = (self.chr_bank_0 & 0x1E) as usize;
            self.board.map_chr_4k(0, bank);
            self.board.map_chr_4k(1, bank | 1);
        } else {
            self.board.map_chr_4k(0, self.chr_bank_0 as usize);
            self.board.map_chr_4k(1, self.chr_bank_1 as usize);
        }

        self.board
            .set_prg_ram_enabled(self.prg_bank & MMC1_PRG_RAM_DISABLE == 0);
    }

    #[cfg(test)]
    fn serial_write(&mut self, addr: u16, value: u8) {
        for bit in 0..5 {
            self.cart_write(addr, (value >> bit) & 1);
            self.on_cpu_cycle(2);
        }
    }
}

impl Mapper for MMC1Mapper {
    fn board(&self) -> &Board {
        &self.board
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn name(&self) -> &'static str {
        "MMC1"
    }

    fn cart_write(&mut self, addr: u16, value: u8) {
        if addr < 0x8000 {
            self.board.write_prg_ram(addr, value);
            return;
        }

        // Back-to-back writes (RMW dummy write + real write) only register once
        let consecutive = self
            .last_write_cycle
            .is_some_and(|last| self.cpu_cycle.saturating_sub(last) < 2);
        self.last_write_cycle = Some(self.cpu_cycle);
        if consecutive {
            return;
        }

        if value & MMC1_SHIFT_REGISTER_RESET != 0 {
            self.reset_shift_register();
            self.update_banks();
            return;
        }

        self.shift_register |= (value & 1) << self.write_count;
        self.write_count += 1;
        if self.write_count == MMC1_WRITE_COUNT_MAX {
            let data = self.shift_register;
            self.shift_register = 0;
            self.write_count = 0;
            self.write_register(addr, data);
        }
    }

    fn on_cpu_cycle(&mut self, cycles: u32) {
        self.cpu_cycle += cycles as u64;
    }

    fn reset(&mut self) {
        self.reset_shift_register();
        self.update_banks();
    }
}
