use std::collections::HashMap;

use log::debug;

use crate::apu::Apu;
use crate::cartridge::Mapper;
use crate::cpu::CpuBus;
use crate::irq::{IrqLine, IrqSource};
use crate::joypad::Joypad;
use crate::ppu::Ppu;

const RAM_SIZE: usize = 0x0800;

/// CPU cycles an OAM DMA takes, plus one when it starts on an odd cycle
const OAM_DMA_CYCLES: u32 = 513;

/// A read substitution. With `compare` set, only reads whose original value
/// matches are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Patch {
    pub value: u8,
    pub compare: Option<u8>,
}

/// The CPU address space
///
/// Owns every unit the CPU can reach: work RAM, PPU, APU, cartridge and
/// controllers. Accesses are timestamped with the CPU cycle they happen on
/// (the cycle the instruction started plus one per earlier access), so lazily
/// synchronised APU writes land on their exact cycle.
///
/// | Range | Target |
/// |---|---|
/// | $0000-$1FFF | 2KB work RAM, mirrored |
/// | $2000-$3FFF | PPU registers, mirrored every 8 bytes |
/// | $4000-$4013, $4015, $4017 | APU |
/// | $4014 | OAM DMA |
/// | $4016-$4017 | controllers |
/// | $4018-$4019 | unmapped |
/// | $401A-$FFFF | cartridge |
pub struct MemController {
    ram: [u8; RAM_SIZE],
    ppu: Ppu,
    apu: Apu,
    mapper: Box<dyn Mapper>,
    joypads: [Joypad; 2],
    irq: IrqLine,
    patches: HashMap<u16, Patch>,
    /// CPU cycles completed since power-on
    cpu_cycle: u64,
    /// Bus accesses made so far in the current CPU cycle's instruction
    accesses: u64,
    dma_stall: u32,
    /// Last value seen on the data bus
    open_bus: u8,
}

impl MemController {
    pub fn new(ppu: Ppu, apu: Apu, mapper: Box<dyn Mapper>) -> Self {
        Self {
            ram: [0; RAM_SIZE],
            ppu,
            apu,
            mapper,
            joypads: [Joypad::new(), Joypad::new()],
            irq: IrqLine::new(),
            patches: HashMap::new(),
            cpu_cycle: 0,
            accesses: 0,
            dma_stall: 0,
            open_bus: 0,
        }
    }

    /// Reset button: RAM keeps its contents
    pub fn reset(&mut self) {
        debug!("Bus reset at CPU cycle {}", self.cpu_cycle);
        self.ppu.reset();
        self.apu.reset();
        self.mapper.reset();
        self.irq.clear();
        self.dma_stall = 0;
    }

    /// Advance the PPU one dot
    pub fn clock_ppu(&mut self) {
        self.ppu.clock(self.mapper.as_mut());
    }

    /// Close the current CPU cycle and let the mapper count it
    pub fn end_cpu_cycle(&mut self) {
        self.cpu_cycle += 1;
        self.accesses = 0;
        self.mapper.on_cpu_cycle(1);
    }

    /// Catch the APU up to the current cycle and hand the frame's audio out
    pub fn finish_frame(&mut self) {
        self.apu.finish_frame(self.cpu_cycle, self.mapper.as_mut());
    }

    pub fn cpu_cycle(&self) -> u64 {
        self.cpu_cycle
    }

    /// Cycle the current access happens on
    fn access_cycle(&self) -> u64 {
        self.cpu_cycle + self.accesses
    }

    pub fn add_patch(&mut self, addr: u16, value: u8, compare: Option<u8>) {
        self.patches.insert(addr, Patch { value, compare });
    }

    pub fn clear_patches(&mut self) {
        self.patches.clear();
    }

    fn apply_patch(&self, addr: u16, value: u8) -> u8 {
        match self.patches.get(&addr) {
            Some(patch) if patch.compare.is_none_or(|c| c == value) => patch.value,
            _ => value,
        }
    }

    pub fn ppu(&self) -> &Ppu {
        &self.ppu
    }

    pub fn ppu_mut(&mut self) -> &mut Ppu {
        &mut self.ppu
    }

    pub fn apu_mut(&mut self) -> &mut Apu {
        &mut self.apu
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    pub fn mapper_mut(&mut self) -> &mut dyn Mapper {
        self.mapper.as_mut()
    }

    /// Controller 0 or 1
    pub fn joypad_mut(&mut self, port: usize) -> Option<&mut Joypad> {
        self.joypads.get_mut(port)
    }

    /// Mirror every unit's IRQ flag onto the shared line
    fn sync_irq(&mut self) {
        self.apu.update_to(self.access_cycle(), self.mapper.as_mut());
        self.irq.set(IrqSource::FrameCounter, self.apu.frame_irq());
        self.irq.set(IrqSource::Dmc, self.apu.dmc_irq());
        self.irq.set(IrqSource::Mapper, self.mapper.irq_pending());
    }

    fn read_unlogged(&mut self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x1FFF => self.ram[addr as usize & (RAM_SIZE - 1)],
            0x2000..=0x3FFF => self.ppu.read_register(addr, self.mapper.as_mut()),
            0x4015 => {
                let value = self.apu.read_status(self.access_cycle(), self.open_bus, self.mapper.as_mut());
                self.irq.set(IrqSource::FrameCounter, self.apu.frame_irq());
                value
            }
            0x4016 => self.joypads[0].read(),
            0x4017 => self.joypads[1].read(),
            // Write-only APU registers and the unmapped hole float
            0x4000..=0x4019 => (addr >> 8) as u8,
            _ => self.mapper.cart_read(addr),
        }
    }

    /// 256-byte copy from CPU page `page` into OAM through $2004
    fn oam_dma(&mut self, page: u8) {
        let base = (page as u16) << 8;
        for offset in 0..256u16 {
            let value = self.read_unlogged(base | offset);
            self.ppu.write_register(0x2004, value, self.mapper.as_mut());
        }
        self.dma_stall += OAM_DMA_CYCLES + (self.access_cycle() & 1) as u32;
    }
}

impl CpuBus for MemController {
    fn read(&mut self, addr: u16) -> u8 {
        let value = self.read_unlogged(addr);
        let value = self.apply_patch(addr, value);
        self.accesses += 1;
        self.open_bus = value;
        value
    }

    fn write(&mut self, addr: u16, value: u8) {
        self.open_bus = value;
        match addr {
            0x0000..=0x1FFF => self.ram[addr as usize & (RAM_SIZE - 1)] = value,
            0x2000..=0x3FFF => self.ppu.write_register(addr, value, self.mapper.as_mut()),
            0x4014 => self.oam_dma(value),
            0x4016 => {
                for joypad in self.joypads.iter_mut() {
                    joypad.write_strobe(value);
                }
            }
            0x4000..=0x4017 => {
                let cycle = self.access_cycle();
                self.apu.write_register(addr, value, cycle, self.mapper.as_mut());
            }
            0x4018..=0x4019 => {}
            _ => self.mapper.cart_write(addr, value),
        }
        self.accesses += 1;
    }

    fn peek(&mut self, addr: u16) -> u8 {
        let value = match addr {
            0x0000..=0x1FFF => self.ram[addr as usize & (RAM_SIZE - 1)],
            0x2000..=0x4019 => self.open_bus,
            _ => self.mapper.cart_read(addr),
        };
        self.apply_patch(addr, value)
    }

    fn nmi_line(&self) -> bool {
        self.ppu.nmi_line()
    }

    fn irq_line(&mut self) -> bool {
        self.sync_irq();
        self.irq.is_asserted()
    }

    fn take_stall_cycles(&mut self) -> u32 {
        std::mem::take(&mut self.dma_stall) + self.apu.take_stall_cycles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::{NROMMapper, numbered_image};
    use crate::config::Config;
    use crate::joypad::Button;
    use crate::nes::TvSystem;

    fn create_test_bus() -> MemController {
        let config = Config::default();
        MemController::new(
            Ppu::new(TvSystem::Ntsc),
            Apu::new(TvSystem::Ntsc, &config),
            Box::new(NROMMapper::new(numbered_image(32, 8))),
        )
    }

    #[test]
    fn test_ram_mirrors() {
        let mut bus = create_test_bus();
        bus.write(0x0001, 0x42);
        for mirror in [0x0801, 0x1001, 0x1801] {
            assert_eq!(bus.read(mirror), 0x42);
        }
        bus.write(0x1FFF, 0x99);
        assert_eq!(bus.read(0x07FF), 0x99);
    }

    #[test]
    fn test_cartridge_reads() {
        let mut bus = create_test_bus();
        assert_eq!(bus.read(0x8000), 0);
        assert_eq!(bus.read(0xFFFF), 31);
    }

    #[test]
    fn test_prg_ram_through_bus() {
        let mut bus = create_test_bus();
        bus.write(0x6000, 0x5A);
        assert_eq!(bus.read(0x6000), 0x5A);
    }

    #[test]
    fn test_unmapped_reads_float_high_byte() {
        let mut bus = create_test_bus();
        assert_eq!(bus.read(0x4018), 0x40);
        assert_eq!(bus.read(0x4000), 0x40);
    }

    #[test]
    fn test_patch_overlay() {
        let mut bus = create_test_bus();
        bus.add_patch(0x8004, 0xEA, None);
        bus.add_patch(0x8005, 0x11, Some(0x01));
        bus.add_patch(0x8006, 0x22, Some(0x00));
        assert_eq!(bus.read(0x8004), 0xEA);
        assert_eq!(bus.read(0x8005), 0x00);
        assert_eq!(bus.read(0x8006), 0x22);
        assert_eq!(bus.peek(0x8004), 0xEA);

        bus.clear_patches();
        assert_eq!(bus.read(0x8004), 0x00);
    }

    #[test]
    fn test_oam_dma_copies_page_and_stalls() {
        let mut bus = create_test_bus();
        for i in 0..=255u8 {
            bus.write(0x0200 + i as u16, i);
        }
        bus.write(0x2003, 0x00);
        bus.write(0x4014, 0x02);
        let stall = bus.take_stall_cycles();
        assert!(stall == 513 || stall == 514, "stall {}", stall);
        assert_eq!(bus.take_stall_cycles(), 0);

        bus.write(0x2003, 0x05);
        assert_eq!(bus.read(0x2004), 0x05);
    }

    #[test]
    fn test_oam_dma_odd_cycle_costs_one_more() {
        let mut bus = create_test_bus();
        bus.write(0x4014, 0x02);
        let even = bus.take_stall_cycles();
        bus.end_cpu_cycle();
        bus.write(0x4014, 0x02);
        let odd = bus.take_stall_cycles();
        assert_eq!(even, 513);
        assert_eq!(odd, 514);
    }

    #[test]
    fn test_joypad_reads() {
        let mut bus = create_test_bus();
        if let Some(pad) = bus.joypad_mut(0) {
            pad.set_button(Button::A, true);
        }
        bus.write(0x4016, 1);
        bus.write(0x4016, 0);
        assert_eq!(bus.read(0x4016), 0x41);
        assert_eq!(bus.read(0x4016), 0x40);
        assert_eq!(bus.read(0x4017), 0x40);
    }

    #[test]
    fn test_frame_irq_reaches_line() {
        let mut bus = create_test_bus();
        assert!(!bus.irq_line());
        // 4-step sequence with IRQ enabled; the flag rises after ~29830 cycles
        bus.write(0x4017, 0x00);
        for _ in 0..30_000 {
            bus.end_cpu_cycle();
        }
        assert!(bus.irq_line());
        // Reading $4015 acknowledges it
        bus.read(0x4015);
        assert!(!bus.irq_line());
    }

    #[test]
    fn test_irq_inhibit_keeps_line_low() {
        let mut bus = create_test_bus();
        bus.write(0x4017, 0x40);
        for _ in 0..30_000 {
            bus.end_cpu_cycle();
        }
        assert!(!bus.irq_line());
    }

    #[test]
    fn test_access_cycles_advance_within_instruction() {
        let mut bus = create_test_bus();
        bus.read(0x0000);
        bus.read(0x0001);
        assert_eq!(bus.access_cycle(), 2);
        bus.end_cpu_cycle();
        assert_eq!(bus.access_cycle(), 1);
    }

    #[test]
    fn test_ppu_registers_mirror() {
        let mut bus = create_test_bus();
        // OAMADDR through a mirror, OAMDATA through another
        bus.write(0x3FFB, 0x10);
        bus.write(0x2004, 0x77);
        bus.write(0x200B, 0x10);
        assert_eq!(bus.read(0x3FFC), 0x77);
    }
}
