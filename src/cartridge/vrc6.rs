use crate::apu::ExpansionAudio;
use crate::cartridge::{Board, Mapper, MirroringMode, RomImage};

/// PPU dots per scanline, counted down by 3 every CPU cycle in scanline mode
const VRC_PRESCALER_RELOAD: i16 = 341;
/// Roughly the linear gain of one APU pulse step, so VRC6 levels sit next to the APU channels
const VRC6_OUTPUT_SCALE: f32 = 0.00752;

/// Konami VRC6 (Mappers 24 and 26)
///
/// Supports:
/// - 16KB PRG bank at $8000, 8KB at $C000, last 8KB fixed
/// - Eight 1KB CHR banks
/// - Runtime mirroring and PRG-RAM enable through $B003
/// - VRC IRQ counter, clocked per CPU cycle or through a scanline prescaler
/// - Expansion sound: two pulse channels and a sawtooth
///
/// Mapper 26 boards swap the A0 and A1 address lines.
pub struct Vrc6Mapper {
    board: Board,
    swapped_lines: bool,
    irq: VrcIrq,
    audio: Vrc6Audio,
}

impl Vrc6Mapper {
    pub fn new(image: RomImage, swapped_lines: bool) -> Self {
        let mut board = Board::new(image);
        let last = board.last_prg_bank(8);
        board.map_prg_16k(0, 0);
        board.map_prg_8k(2, 0);
        board.map_prg_8k(3, last);
        for slot in 0..8 {
            board.map_chr_1k(slot, slot);
        }
        board.set_prg_ram_enabled(false);
        Self {
            board,
            swapped_lines,
            irq: VrcIrq::new(),
            audio: Vrc6Audio::new(),
        }
    }

    fn normalize(&self, addr: u16) -> u16 {
        let addr = if self.swapped_lines {
            (addr & 0xFFFC) | ((addr & 0x01) << 1) | ((addr & 0x02) >> 1)
        } else {
            addr
        };
        addr & 0xF003
    }
}

impl Mapper for Vrc6Mapper {
    fn board(&self) -> &Board {
        &self.board
    }

    fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    fn name(&self) -> &'static str {
        "VRC6"
    }

    fn cart_write(&mut self, addr: u16, value: u8) {
        if addr < 0x8000 {
            self.board.write_prg_ram(addr, value);
            return;
        }
        match self.normalize(addr) {
            0x8000..=0x8003 => self.board.map_prg_16k(0, (value & 0x0F) as usize),
            reg @ 0x9000..=0x9002 => self.audio.pulses[0].write((reg & 3) as usize, value),
            0x9003 => self.audio.write_frequency_control(value),
            reg @ 0xA000..=0xA002 => self.audio.pulses[1].write((reg & 3) as usize, value),
            reg @ 0xB000..=0xB002 => self.audio.saw.write((reg & 3) as usize, value),
            0xB003 => {
                self.board.set_mirroring(match (value >> 2) & 0x03 {
                    0 => MirroringMode::Vertical,
                    1 => MirroringMode::Horizontal,
                    2 => MirroringMode::SingleScreenLower,
                    _ => MirroringMode::SingleScreenUpper,
                });
                self.board.set_prg_ram_enabled(value & 0x80 != 0);
            }
            0xC000..=0xC003 => self.board.map_prg_8k(2, (value & 0x1F) as usize),
            reg @ 0xD000..=0xD003 => self.board.map_chr_1k((reg & 3) as usize, value as usize),
            reg @ 0xE000..=0xE003 => {
                self.board.map_chr_1k(4 + (reg & 3) as usize, value as usize)
            }
            0xF000 => self.irq.latch = value,
            0xF001 => self.irq.write_control(value),
            0xF002 => self.irq.acknowledge(),
            _ => {}
        }
    }

    fn on_cpu_cycle(&mut self, cycles: u32) {
        for _ in 0..cycles {
            self.irq.clock();
        }
    }

    fn irq_pending(&self) -> bool {
        self.irq.flag
    }

    fn expansion_audio(&mut self) -> Option<&mut dyn ExpansionAudio> {
        Some(&mut self.audio)
    }
}

/// The IRQ counter shared by the VRC family
struct VrcIrq {
    latch: u8,
    counter: u8,
    prescaler: i16,
    enabled: bool,
    enable_after_ack: bool,
    cycle_mode: bool,
    flag: bool,
}

impl VrcIrq {
    fn new() -> Self {
        Self {
            latch: 0,
            counter: 0,
            prescaler: VRC_PRESCALER_RELOAD,
            enabled: false,
            enable_after_ack: false,
            cycle_mode: false,
            flag: false,
        }
    }

    fn write_control(&mut self, value: u8) {
        self.enable_after_ack = value & 0x01 != 0;
        self.enabled = value & 0x02 != 0;
        self.cycle_mode = value & 0x04 != 0;
        if self.enabled {
            self.counter = self.latch;
            self.prescaler = VRC_PRESCALER_RELOAD;
        }
        self.flag = false;
    }

    fn acknowledge(&mut self) {
        self.flag = false;
        self.enabled = self.enable_after_ack;
    }

    fn clock(&mut self) {
        if !self.enabled {
            return;
        }
        if self.cycle_mode {
            self.step();
        } else {
            self.prescaler -= 3;
            if self.prescaler <= 0 {
                self.prescaler += VRC_PRESCALER_RELOAD;
                self.step();
            }
        }
    }

    fn step(&mut self) {
        if self.counter == 0xFF {
            self.counter = self.latch;
            self.flag = true;
        } else {
            self.counter += 1;
        }
    }
}

/// VRC6 sound: two 16-step pulses with 8 duty settings and a 7-step sawtooth
pub struct Vrc6Audio {
    pulses: [Vrc6Pulse; 2],
    saw: Vrc6Saw,
    halt: bool,
    period_shift: u8,
}

impl Vrc6Audio {
    fn new() -> Self {
        Self {
            pulses: [Vrc6Pulse::default(), Vrc6Pulse::default()],
            saw: Vrc6Saw::default(),
            halt: false,
            period_shift: 0,
        }
    }

    fn write_frequency_control(&mut self, value: u8) {
        self.halt = value & 0x01 != 0;
        self.period_shift = if value & 0x04 != 0 {
            8
        } else if value & 0x02 != 0 {
            4
        } else {
            0
        };
    }

    /// Sum of the three channels before scaling (0-61)
    fn raw_output(&self) -> u8 {
        self.pulses[0].output() + self.pulses[1].output() + self.saw.output()
    }
}

impl ExpansionAudio for Vrc6Audio {
    fn clock(&mut self, cycles: u32) {
        if self.halt {
            return;
        }
        for _ in 0..cycles {
            for pulse in &mut self.pulses {
                pulse.clock(self.period_shift);
            }
            self.saw.clock(self.period_shift);
        }
    }

    fn output(&self) -> f32 {
        self.raw_output() as f32 * VRC6_OUTPUT_SCALE
    }
}

#[derive(Default)]
struct Vrc6Pulse {
    volume: u8,
    duty: u8,
    ignore_duty: bool,
    period: u16,
    counter: u16,
    step: u8,
    enabled: bool,
}

impl Vrc6Pulse {
    fn write(&mut self, reg: usize, value: u8) {
        match reg {
            0 => {
                self.volume = value & 0x0F;
                self.duty = (value >> 4) & 0x07;
                self.ignore_duty = value & 0x80 != 0;
            }
            1 => self.period = (self.period & 0x0F00) | value as u16,
            _ => {
                self.period = (self.period & 0x00FF) | (((value & 0x0F) as u16) << 8);
                self.enabled = value & 0x80 != 0;
                if !self.enabled {
                    self.step = 0;
                }
            }
        }
    }

    fn clock(&mut self, shift: u8) {
        if !self.enabled {
            return;
        }
        if self.counter == 0 {
            self.counter = self.period >> shift;
            self.step = (self.step + 1) & 0x0F;
        } else {
            self.counter -= 1;
        }
    }

    fn output(&self) -> u8 {
        if self.enabled && (self.ignore_duty || self.step <= self.duty) {
            self.volume
        } else {
            0
        }
    }
}

#[derive(Default)]
struct Vrc6Saw {
    rate: u8,
    period: u16,
    counter: u16,
    step: u8,
    accumulator: u8,
    enabled: bool,
}

impl Vrc6Saw {
    fn write(&mut self, reg: usize, value: u8) {
        match reg {
            0 => self.rate = value & 0x3F,
            1 => self.period = (self.period & 0x0F00) | value as u16,
            _ => {
                self.period = (self.period & 0x00FF) | (((value & 0x0F) as u16) << 8);
                self.enabled = value & 0x80 != 0;
                if !self.enabled {
                    self.step = 0;
                    self.accumulator = 0;
                }
            }
        }
    }

    fn clock(&mut self, shift: u8) {
        if !self.enabled {
            return;
        }
        if self.counter == 0 {
            self.counter = self.period >> shift;
            self.step += 1;
            if self.step == 14 {
                self.step = 0;
                self.accumulator = 0;
            } else if self.step % 2 == 0 {
                self.accumulator = self.accumulator.wrapping_add(self.rate);
            }
        } else {
            self.counter -= 1;
        }
    }

    fn output(&self) -> u8 {
        if self.enabled { self.accumulator >> 3 } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::board::tests::numbered_image;

    fn vrc6(swapped: bool) -> Vrc6Mapper {
        Vrc6Mapper::new(numbered_image(256, 256), swapped)
    }

    #[test]
    fn test_vrc6_prg_banks() {
        let mut mapper = vrc6(false);
        mapper.cart_write(0x8000, 2);
        mapper.cart_write(0xC000, 5);
        assert_eq!(mapper.cart_read(0x8000), 32);
        assert_eq!(mapper.cart_read(0xBFFF), 47);
        assert_eq!(mapper.cart_read(0xC000), 40);
        assert_eq!(mapper.cart_read(0xE000), 248);
    }

    #[test]
    fn test_vrc6_chr_banks() {
        let mut mapper = vrc6(false);
        mapper.cart_write(0xD001, 9);
        mapper.cart_write(0xE003, 17);
        assert_eq!(mapper.ppu_read(0x0400), 9);
        assert_eq!(mapper.ppu_read(0x1C00), 17);
    }

    #[test]
    fn test_vrc6b_swaps_address_lines() {
        let mut mapper = vrc6(true);
        // $D002 on a VRC6b board is register 1
        mapper.cart_write(0xD002, 9);
        assert_eq!(mapper.ppu_read(0x0400), 9);
    }

    #[test]
    fn test_vrc6_mirroring_and_ram_enable() {
        let mut mapper = vrc6(false);
        mapper.cart_write(0x6000, 0x11);
        assert_eq!(mapper.cart_read(0x6000), 0x60);

        mapper.cart_write(0xB003, 0x84);
        assert_eq!(mapper.mirroring(), MirroringMode::Horizontal);
        mapper.cart_write(0x6000, 0x11);
        assert_eq!(mapper.cart_read(0x6000), 0x11);
    }

    #[test]
    fn test_vrc_irq_cycle_mode() {
        let mut mapper = vrc6(false);
        mapper.cart_write(0xF000, 0xFD);
        mapper.cart_write(0xF001, 0x06); // enabled, cycle mode

        // Counter goes FD -> FE -> FF, then overflows on the third clock
        mapper.on_cpu_cycle(2);
        assert!(!mapper.irq_pending());
        mapper.on_cpu_cycle(1);
        assert!(mapper.irq_pending());

        mapper.cart_write(0xF002, 0);
        assert!(!mapper.irq_pending());
        // Acknowledge copied enable-after-ack (0), so the counter stops
        mapper.on_cpu_cycle(1000);
        assert!(!mapper.irq_pending());
    }

    #[test]
    fn test_vrc_irq_scanline_mode() {
        let mut mapper = vrc6(false);
        mapper.cart_write(0xF000, 0xFF);
        mapper.cart_write(0xF001, 0x02);

        // One scanline is 341 / 3 = 113.67 CPU cycles
        mapper.on_cpu_cycle(113);
        assert!(!mapper.irq_pending());
        mapper.on_cpu_cycle(1);
        assert!(mapper.irq_pending());
    }

    #[test]
    fn test_vrc6_pulse_output() {
        let mut mapper = vrc6(false);
        mapper.cart_write(0x9000, 0x8F); // ignore duty, volume 15
        mapper.cart_write(0x9002, 0x80);
        let audio = mapper.expansion_audio().unwrap();
        audio.clock(4);
        assert!((audio.output() - 15.0 * VRC6_OUTPUT_SCALE).abs() < 1e-6);
    }

    #[test]
    fn test_vrc6_saw_accumulates() {
        let mut saw = Vrc6Saw::default();
        saw.write(0, 0x10);
        saw.write(1, 0);
        saw.write(2, 0x80);
        // Period 0: one step per clock
        for _ in 0..6 {
            saw.clock(0);
        }
        // Steps 2, 4, 6 added the rate
        assert_eq!(saw.accumulator, 0x30);
        for _ in 0..8 {
            saw.clock(0);
        }
        assert_eq!(saw.step, 0);
        assert_eq!(saw.accumulator, 0);
    }

    #[test]
    fn test_vrc6_halt_freezes_channels() {
        let mut audio = Vrc6Audio::new();
        audio.pulses[0].write(0, 0x0F);
        audio.pulses[0].write(2, 0x80);
        audio.write_frequency_control(0x01);
        audio.clock(100);
        assert_eq!(audio.pulses[0].step, 0);
    }
}
