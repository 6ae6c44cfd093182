//! Operand address resolution
//!
//! Each mode performs the bus reads the 6502 performs, dummy reads
//! included, so register side effects happen in hardware order.

use super::cpu::Cpu;
use super::opcode::{AddressingMode, Mnemonic};
use super::traits::CpuBus;

/// How an instruction uses its operand. Writes and read-modify-writes
/// always take the indexed dummy read; plain reads only on a page cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    ReadModifyWrite,
}

impl Access {
    pub fn of(mnemonic: Mnemonic) -> Self {
        use Mnemonic::*;
        match mnemonic {
            STA | STX | STY | SAX | AHX | SHX | SHY | TAS => Access::Write,
            ASL | LSR | ROL | ROR | INC | DEC | SLO | RLA | SRE | RRA | DCP | ISB => {
                Access::ReadModifyWrite
            }
            _ => Access::Read,
        }
    }
}

/// A resolved operand address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub addr: u16,
    /// Address before indexing
    pub base: u16,
    pub page_crossed: bool,
}

impl Target {
    fn direct(addr: u16) -> Self {
        Self {
            addr,
            base: addr,
            page_crossed: false,
        }
    }
}

fn crosses_page(a: u16, b: u16) -> bool {
    a & 0xFF00 != b & 0xFF00
}

impl Cpu {
    /// Read the byte at PC and advance it
    pub(super) fn fetch<B: CpuBus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    pub(super) fn fetch_word<B: CpuBus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch(bus) as u16;
        let hi = self.fetch(bus) as u16;
        (hi << 8) | lo
    }

    /// Resolve the operand address for `mode`, consuming operand bytes.
    /// Implied and accumulator modes only perform their dummy read of PC.
    pub(super) fn resolve<B: CpuBus>(
        &mut self,
        bus: &mut B,
        mode: AddressingMode,
        access: Access,
    ) -> Target {
        match mode {
            AddressingMode::Implied | AddressingMode::Accumulator => {
                bus.read(self.pc);
                Target::direct(self.pc)
            }
            AddressingMode::Immediate | AddressingMode::Relative => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                Target::direct(addr)
            }
            AddressingMode::ZeroPage => Target::direct(self.fetch(bus) as u16),
            AddressingMode::ZeroPageX | AddressingMode::ZeroPageY => {
                let base = self.fetch(bus);
                bus.read(base as u16);
                let index = if mode == AddressingMode::ZeroPageX { self.x } else { self.y };
                Target {
                    addr: base.wrapping_add(index) as u16,
                    base: base as u16,
                    page_crossed: false,
                }
            }
            AddressingMode::Absolute => Target::direct(self.fetch_word(bus)),
            AddressingMode::AbsoluteX | AddressingMode::AbsoluteY => {
                let base = self.fetch_word(bus);
                let index = if mode == AddressingMode::AbsoluteX { self.x } else { self.y };
                self.indexed(bus, base, index, access)
            }
            AddressingMode::Indirect => {
                let pointer = self.fetch_word(bus);
                let lo = bus.read(pointer) as u16;
                // The high byte never carries into the next page
                let hi = bus.read((pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF)) as u16;
                Target::direct((hi << 8) | lo)
            }
            AddressingMode::IndirectX => {
                let pointer = self.fetch(bus);
                bus.read(pointer as u16);
                let pointer = pointer.wrapping_add(self.x);
                let lo = bus.read(pointer as u16) as u16;
                let hi = bus.read(pointer.wrapping_add(1) as u16) as u16;
                Target::direct((hi << 8) | lo)
            }
            AddressingMode::IndirectY => {
                let pointer = self.fetch(bus);
                let lo = bus.read(pointer as u16) as u16;
                let hi = bus.read(pointer.wrapping_add(1) as u16) as u16;
                self.indexed(bus, (hi << 8) | lo, self.y, access)
            }
        }
    }

    fn indexed<B: CpuBus>(&mut self, bus: &mut B, base: u16, index: u8, access: Access) -> Target {
        let addr = base.wrapping_add(index as u16);
        let page_crossed = crosses_page(base, addr);
        if page_crossed || access != Access::Read {
            // The low byte is added first; the bus sees the unfixed address
            bus.read((base & 0xFF00) | (addr & 0x00FF));
        }
        Target {
            addr,
            base,
            page_crossed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;

    fn setup(program: &[u8]) -> (Cpu, Memory) {
        let mut memory = Memory::new();
        memory.load(0x8000, program);
        let mut cpu = Cpu::new();
        cpu.pc = 0x8000;
        (cpu, memory)
    }

    #[test]
    fn test_zero_page_x_wraps() {
        let (mut cpu, mut memory) = setup(&[0xF0]);
        cpu.x = 0x20;
        let target = cpu.resolve(&mut memory, AddressingMode::ZeroPageX, Access::Read);
        assert_eq!(target.addr, 0x0010);
        assert_eq!(cpu.pc, 0x8001);
    }

    #[test]
    fn test_absolute_x_dummy_read_only_on_page_cross() {
        let (mut cpu, mut memory) = setup(&[0x80, 0x12, 0xF0, 0x12]);
        cpu.x = 0x10;
        memory.start_logging();
        let target = cpu.resolve(&mut memory, AddressingMode::AbsoluteX, Access::Read);
        assert_eq!(target.addr, 0x1290);
        assert!(!target.page_crossed);
        assert_eq!(memory.take_reads(), vec![0x8000, 0x8001]);

        let target = cpu.resolve(&mut memory, AddressingMode::AbsoluteX, Access::Read);
        assert_eq!(target.addr, 0x1300);
        assert!(target.page_crossed);
        assert_eq!(memory.take_reads(), vec![0x8002, 0x8003, 0x1200]);
    }

    #[test]
    fn test_store_always_takes_dummy_read() {
        let (mut cpu, mut memory) = setup(&[0x80, 0x12]);
        cpu.x = 0x10;
        memory.start_logging();
        cpu.resolve(&mut memory, AddressingMode::AbsoluteX, Access::Write);
        assert_eq!(memory.take_reads(), vec![0x8000, 0x8001, 0x1290]);
    }

    #[test]
    fn test_indirect_x_reads_pointer_from_zero_page() {
        let (mut cpu, mut memory) = setup(&[0xFE]);
        cpu.x = 0x01;
        memory.write(0x00FF, 0x34);
        memory.write(0x0000, 0x12);
        let target = cpu.resolve(&mut memory, AddressingMode::IndirectX, Access::Read);
        assert_eq!(target.addr, 0x1234);
    }

    #[test]
    fn test_indirect_y_page_cross() {
        let (mut cpu, mut memory) = setup(&[0x40]);
        cpu.y = 0x20;
        memory.write(0x0040, 0xF0);
        memory.write(0x0041, 0x03);
        let target = cpu.resolve(&mut memory, AddressingMode::IndirectY, Access::Read);
        assert_eq!(target.addr, 0x0410);
        assert_eq!(target.base, 0x03F0);
        assert!(target.page_crossed);
    }

    #[test]
    fn test_indirect_jump_page_wrap_bug() {
        let (mut cpu, mut memory) = setup(&[0xFF, 0x02]);
        memory.write(0x02FF, 0x00);
        memory.write(0x0200, 0x90);
        memory.write(0x0300, 0x40);
        let target = cpu.resolve(&mut memory, AddressingMode::Indirect, Access::Read);
        assert_eq!(target.addr, 0x9000);
    }

    #[test]
    fn test_access_classification() {
        assert_eq!(Access::of(Mnemonic::STA), Access::Write);
        assert_eq!(Access::of(Mnemonic::DCP), Access::ReadModifyWrite);
        assert_eq!(Access::of(Mnemonic::LAX), Access::Read);
    }
}
