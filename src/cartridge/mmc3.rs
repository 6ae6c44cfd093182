use crate::cartridge::{Board, Mapper, MirroringMode, RomImage};

const PPU_A12: u16 = 0x1000;
/// CPU cycles A12 must stay low before a rising edge clocks the counter
const A12_FILTER_CYCLES: u32 = 3;

/// MMC3 mapper (Mapper 4)
///
/// Supports:
/// - Two switchable 8KB PRG banks plus two fixed ones, with a swappable layout
/// - Two 2KB and four 1KB CHR banks, with the halves swappable
/// - Runtime horizontal/vertical mirroring
/// - PRG-RAM enable and write protect
/// - Scanline counter clocked by rising edges of PPU address line A12
///
/// The counter only sees an A12 rise after A12 has been low for a few CPU
/// cycles, which filters out the short blips between background tile fetches.
pub struct MMC3Mapper {
    board: Board,
    bank_select: u8,
    registers: [u8; 8],

    irq_latch: u8,
    irq_counter: u8,
    irq_reload: bool,
    irq_enabled: bool,
    irq_flag: bool,

    a12_high: bool,
    a12_low_cycles: u32,
}

impl MMC3Mapper {
    pub fn new(image: RomImage) -> Self {
        let mut mapper = Self {
            board: Board::new(image),
            bank_select: 0,
            registers: [0, 2, 4, 5, 6, 7, 0, 1],
            irq_latch: 0,
            irq_counter: 0,
            irq_reload: false,
            irq_enabled: false,
            irq_flag: false,
            a12_high: false,
            a12_low_cycles: 0,
        };
        mapper.update_banks();
        mapper
    }

    fn update_banks(&mut self) {
        let second_last = self.board.last_prg_bank(8).saturating_sub(1);
        let last = self.board.last_prg_bank(8);
        let r6 = self.registers[6] as usize;
        let r7 = self.registers[7] as usize;

        if self.bank_select & 0x40 == 0 {
            self.board.map_prg_8k(0, r6);
            self.board.map_prg_8k(2, second_last);
        } else {
            self.board.map_prg_8k(0, second_last);
            self.board.map_prg_8k(2, r6);
        }
        self.board.map_prg_8k(1, r7);
        self.board.map_prg_8k(3, last);

        // Inversion swaps the 2KB and 1KB halves of the pattern tables
        let base = if self.bank_select & 0x80 == 0 { 0 } else { 4 };
        let r = self.registers;
        self.board.map_chr_1k(base, (r[0] & 0xFE) as usize);
        self.board.map_chr_1k(base + 1, (r[0] | 0x01) as usize);
        self.board.map_chr_1k(base + 2, (r[1] & 0xFE) as usize);
        self.board.map_chr_1k(base + 3, (r[1] | 0x01) as usize);
        for i in 0..4 {
            self.board.map_chr_1k((base + 4 + i) % 8, r[2 + i] as usize);
        }
    }

    fn clock_irq_counter(&mut self) {
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

    fn observe_address(&mut self, addr: u16) {
        let a12 = addr & PPU_A12 != 0;
        if a12 && !self.a12_high && self.a12_low_cycles >= A12_FILTER_CYCLES {
            self.clock_irq_counter();
        }
        if !a12 && self.a12_high {
            self.a12_low_cycles = 0;
        }
        self.a12_high = a12;
    }
}

impl Mapper for MMC3Mapper {
    fn board(&self) -> &Board {
        &self.board
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn name(&self) -> &'static str {
        "MMC3"
    }

    fn cart_write(&mut self, addr: u16, value: u8) {
        let even = addr & 1 == 0;
        match (addr, even) {
            (0x6000..=0x7FFF, _) => self.board.write_prg_ram(addr, value),
            (0x8000..=0x9FFF, true) => {
                self.bank_select = value;
                self.update_banks();
            }
            (0x8000..=0x9FFF, false) => {
                self.registers[(self.bank_select & 0x07) as usize] = value;
                self.update_banks();
            }
            (0xA000..=0xBFFF, true) => self.board.set_mirroring(if value & 1 == 0 {
                MirroringMode::Vertical
            } else {
                MirroringMode::Horizontal
            }),
            (0xA000..=0xBFFF, false) => {
                self.board.set_prg_ram_enabled(value & 0x80 != 0);
                self.board.set_prg_ram_writable(value & 0x40 == 0);
            }
            (0xC000..=0xDFFF, true) => self.irq_latch = value,
            (0xC000..=0xDFFF, false) => {
                self.irq_counter = 0;
                self.irq_reload = true;
            }
            (0xE000..=0xFFFF, true) => {
                self.irq_enabled = false;
                self.irq_flag = false;
            }
            (0xE000..=0xFFFF, false) => self.irq_enabled = true,
            _ => {}
        }
    }

    fn ppu_read(&mut self, addr: u16) -> u8 {
        self.observe_address(addr);
        self.board.ppu_read(addr)
    }

    fn ppu_write(&mut self, addr: u16, value: u8) {
        self.observe_address(addr);
        self.board.ppu_write(addr, value);
    }

    fn on_cpu_cycle(&mut self, cycles: u32) {
        if !self.a12_high {
            self.a12_low_cycles = self.a12_low_cycles.saturating_add(cycles);
        }
    }

    fn irq_pending(&self) -> bool {
        self.irq_flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::board::tests::numbered_image;

    fn mmc3() -> MMC3Mapper {
        MMC3Mapper::new(numbered_image(128, 128))
    }

    /// One background fetch from $0000 followed by a sprite fetch from $1000
    fn simulate_scanline(mapper: &mut MMC3Mapper) {
        mapper.ppu_read(0x0000);
        mapper.on_cpu_cycle(80);
        mapper.ppu_read(0x1000);
        mapper.on_cpu_cycle(20);
    }

    #[test]
    fn test_mmc3_power_on_prg_layout() {
        let mut mapper = mmc3();
        assert_eq!(mapper.cart_read(0x8000), 0);
        assert_eq!(mapper.cart_read(0xA000), 8);
        assert_eq!(mapper.cart_read(0xC000), 112);
        assert_eq!(mapper.cart_read(0xE000), 120);
    }

    #[test]
    fn test_mmc3_prg_swap_mode() {
        let mut mapper = mmc3();
        mapper.cart_write(0x8000, 0x46);
        mapper.cart_write(0x8001, 3);
        assert_eq!(mapper.cart_read(0x8000), 112);
        assert_eq!(mapper.cart_read(0xC000), 24);
    }

    #[test]
    fn test_mmc3_chr_banks() {
        let mut mapper = mmc3();
        mapper.cart_write(0x8000, 0x00);
        mapper.cart_write(0x8001, 0x09); // R0 2KB, low bit ignored
        mapper.cart_write(0x8000, 0x02);
        mapper.cart_write(0x8001, 0x21);
        assert_eq!(mapper.ppu_read(0x0000), 8);
        assert_eq!(mapper.ppu_read(0x0400), 9);
        assert_eq!(mapper.ppu_read(0x1000), 0x21);

        // Inverted layout moves R2 to $0000
        mapper.cart_write(0x8000, 0x80);
        assert_eq!(mapper.ppu_read(0x0000), 0x21);
        assert_eq!(mapper.ppu_read(0x1000), 8);
    }

    #[test]
    fn test_mmc3_mirroring_and_ram_protect() {
        let mut mapper = mmc3();
        mapper.cart_write(0xA000, 1);
        assert_eq!(mapper.mirroring(), MirroringMode::Horizontal);

        mapper.cart_write(0xA001, 0x80);
        mapper.cart_write(0x6000, 0x12);
        mapper.cart_write(0xA001, 0xC0);
        mapper.cart_write(0x6000, 0x34);
        assert_eq!(mapper.cart_read(0x6000), 0x12);
    }

    #[test]
    fn test_mmc3_irq_fires_after_latch_scanlines() {
        let mut mapper = mmc3();
        mapper.cart_write(0xC000, 3);
        mapper.cart_write(0xC001, 0);
        mapper.cart_write(0xE001, 0);

        // First clock reloads to 3, then 2, 1, 0
        for _ in 0..3 {
            simulate_scanline(&mut mapper);
            assert!(!mapper.irq_pending());
        }
        simulate_scanline(&mut mapper);
        assert!(mapper.irq_pending());

        // Acknowledge
        mapper.cart_write(0xE000, 0);
        assert!(!mapper.irq_pending());
    }

    #[test]
    fn test_mmc3_a12_filter_ignores_short_low_pulses() {
        let mut mapper = mmc3();
        mapper.cart_write(0xC000, 0);
        mapper.cart_write(0xE001, 0);

        mapper.ppu_read(0x1000);
        mapper.ppu_read(0x0000);
        mapper.on_cpu_cycle(1);
        mapper.ppu_read(0x1000);
        assert!(!mapper.irq_pending());
    }

    #[test]
    fn test_mmc3_disabled_irq_never_fires() {
        let mut mapper = mmc3();
        mapper.cart_write(0xC000, 1);
        for _ in 0..5 {
            simulate_scanline(&mut mapper);
        }
        assert!(!mapper.irq_pending());
    }
}
