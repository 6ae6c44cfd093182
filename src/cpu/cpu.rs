use log::{Level, log_enabled, trace, warn};

use super::addressing::{Access, Target};
use super::opcode::{AddressingMode, Mnemonic, OPCODES};
use super::operations::*;
use super::trace::CpuTrace;
use super::traits::CpuBus;

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Cycles taken by reset and by interrupt entry
const INTERRUPT_CYCLES: u32 = 7;

/// 6502 core of the 2A03
///
/// Cycle-budgeted: `run_cycle` is called once per CPU clock. When the budget
/// is empty it executes a whole instruction, bus accesses in hardware order,
/// and charges the instruction's cost to the budget.
pub struct Cpu {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    /// Stack pointer
    pub s: u8,
    /// Status register, U always set, B never stored
    pub p: u8,
    pub pc: u16,
    cycles_left: u32,
    total_cycles: u64,
    halted: bool,
    /// NMI edge seen at the end of the previous cycle
    nmi_next: bool,
    /// NMI to service at the next instruction boundary
    nmi_pending: bool,
    nmi_line_prev: bool,
    /// I flag as it was before CLI/SEI/PLP, used for one more IRQ poll
    delayed_i: Option<bool>,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// Power-on register state. `reset` must run before the first cycle.
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0x00,
            p: FLAG_U | FLAG_I,
            pc: 0,
            cycles_left: 0,
            total_cycles: 0,
            halted: false,
            nmi_next: false,
            nmi_pending: false,
            nmi_line_prev: false,
            delayed_i: None,
        }
    }

    /// Reset sequence: three suppressed pushes, I set, PC from $FFFC
    pub fn reset<B: CpuBus>(&mut self, bus: &mut B) {
        self.s = self.s.wrapping_sub(3);
        self.p |= FLAG_I;
        self.pc = self.read_word(bus, RESET_VECTOR);
        self.cycles_left = INTERRUPT_CYCLES;
        self.total_cycles = 0;
        self.halted = false;
        self.nmi_next = false;
        self.nmi_pending = false;
        self.nmi_line_prev = bus.nmi_line();
        self.delayed_i = None;
    }

    /// Advance one CPU clock
    pub fn run_cycle<B: CpuBus>(&mut self, bus: &mut B) {
        self.cycles_left += bus.take_stall_cycles();
        if self.cycles_left == 0 && !self.halted {
            self.cycles_left = self.step(bus);
            self.cycles_left += bus.take_stall_cycles();
        }
        self.cycles_left = self.cycles_left.saturating_sub(1);
        self.total_cycles += 1;
        self.poll_nmi(bus);
    }

    /// Edge detector. An edge must be seen before the last cycle of an
    /// instruction to be serviced right after it.
    fn poll_nmi<B: CpuBus>(&mut self, bus: &mut B) {
        self.nmi_pending |= self.nmi_next;
        let line = bus.nmi_line();
        self.nmi_next = line && !self.nmi_line_prev;
        self.nmi_line_prev = line;
    }

    /// Service an interrupt or execute one instruction, returning its cost
    fn step<B: CpuBus>(&mut self, bus: &mut B) -> u32 {
        if self.nmi_pending {
            self.nmi_pending = false;
            self.delayed_i = None;
            self.interrupt(bus, NMI_VECTOR);
            return INTERRUPT_CYCLES;
        }

        let irq_masked = self.delayed_i.take().unwrap_or(self.p & FLAG_I != 0);
        if !irq_masked && bus.irq_line() {
            self.interrupt(bus, IRQ_VECTOR);
            return INTERRUPT_CYCLES;
        }

        if log_enabled!(Level::Trace) {
            trace!("{}", self.trace(bus));
        }

        let opcode = self.fetch(bus);
        self.execute(bus, opcode)
    }

    /// Hardware interrupt entry: two dummy reads, push PC and P with B clear
    fn interrupt<B: CpuBus>(&mut self, bus: &mut B, vector: u16) {
        bus.read(self.pc);
        bus.read(self.pc);
        self.push_word(bus, self.pc);
        self.push(bus, (self.p & !FLAG_B) | FLAG_U);
        self.p |= FLAG_I;
        self.pc = self.read_word(bus, vector);
    }

    fn read_word<B: CpuBus>(&mut self, bus: &mut B, addr: u16) -> u16 {
        let lo = bus.read(addr) as u16;
        let hi = bus.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    fn push<B: CpuBus>(&mut self, bus: &mut B, value: u8) {
        bus.write(0x0100 | self.s as u16, value);
        self.s = self.s.wrapping_sub(1);
    }

    fn push_word<B: CpuBus>(&mut self, bus: &mut B, value: u16) {
        self.push(bus, (value >> 8) as u8);
        self.push(bus, value as u8);
    }

    fn pull<B: CpuBus>(&mut self, bus: &mut B) -> u8 {
        self.s = self.s.wrapping_add(1);
        bus.read(0x0100 | self.s as u16)
    }

    fn pull_word<B: CpuBus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.pull(bus) as u16;
        let hi = self.pull(bus) as u16;
        (hi << 8) | lo
    }

    /// Value pulled into P: B dropped, U forced
    fn pulled_status(value: u8) -> u8 {
        (value & !FLAG_B) | FLAG_U
    }

    fn branch<B: CpuBus>(&mut self, bus: &mut B, condition: bool) -> u32 {
        let offset = self.fetch(bus) as i8;
        if !condition {
            return 0;
        }
        bus.read(self.pc);
        let target = self.pc.wrapping_add(offset as u16);
        let mut extra = 1;
        if target & 0xFF00 != self.pc & 0xFF00 {
            bus.read((self.pc & 0xFF00) | (target & 0x00FF));
            extra += 1;
        }
        self.pc = target;
        extra
    }

    /// Read-modify-write: read, write the old value back, write the result
    fn modify<B: CpuBus>(&mut self, bus: &mut B, target: Target, op: impl FnOnce(&mut Self, u8) -> u8) {
        let value = bus.read(target.addr);
        bus.write(target.addr, value);
        let result = op(self, value);
        bus.write(target.addr, result);
    }

    /// Unstable high-byte stores (SHX, SHY, AHX, TAS): the value is ANDed
    /// with the base high byte plus one, and a page cross replaces the
    /// address high byte with that value
    fn store_high_and<B: CpuBus>(&mut self, bus: &mut B, target: Target, value: u8) {
        let value = value & ((target.base >> 8) as u8).wrapping_add(1);
        let addr = if target.page_crossed {
            ((value as u16) << 8) | (target.addr & 0x00FF)
        } else {
            target.addr
        };
        bus.write(addr, value);
    }

    fn execute<B: CpuBus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        use Mnemonic::*;

        let op = OPCODES[opcode as usize];
        let mut cycles = op.cycles as u32;

        match op.mnemonic {
            BCC => return cycles + self.branch(bus, self.p & FLAG_C == 0),
            BCS => return cycles + self.branch(bus, self.p & FLAG_C != 0),
            BNE => return cycles + self.branch(bus, self.p & FLAG_Z == 0),
            BEQ => return cycles + self.branch(bus, self.p & FLAG_Z != 0),
            BPL => return cycles + self.branch(bus, self.p & FLAG_N == 0),
            BMI => return cycles + self.branch(bus, self.p & FLAG_N != 0),
            BVC => return cycles + self.branch(bus, self.p & FLAG_V == 0),
            BVS => return cycles + self.branch(bus, self.p & FLAG_V != 0),
            BRK => {
                // Padding byte
                self.fetch(bus);
                self.push_word(bus, self.pc);
                self.push(bus, self.p | FLAG_B | FLAG_U);
                self.p |= FLAG_I;
                // An NMI arriving during BRK takes over its vector
                let vector = if std::mem::take(&mut self.nmi_pending) {
                    NMI_VECTOR
                } else {
                    IRQ_VECTOR
                };
                self.pc = self.read_word(bus, vector);
                return cycles;
            }
            JSR => {
                let lo = self.fetch(bus) as u16;
                bus.read(0x0100 | self.s as u16);
                self.push_word(bus, self.pc);
                let hi = bus.read(self.pc) as u16;
                self.pc = (hi << 8) | lo;
                return cycles;
            }
            RTS => {
                bus.read(self.pc);
                bus.read(0x0100 | self.s as u16);
                self.pc = self.pull_word(bus);
                bus.read(self.pc);
                self.pc = self.pc.wrapping_add(1);
                return cycles;
            }
            RTI => {
                bus.read(self.pc);
                bus.read(0x0100 | self.s as u16);
                let status = self.pull(bus);
                self.p = Self::pulled_status(status);
                self.pc = self.pull_word(bus);
                return cycles;
            }
            JMP => {
                self.pc = self.resolve(bus, op.mode, Access::Read).addr;
                return cycles;
            }
            PHA | PHP => {
                bus.read(self.pc);
                let value = if op.mnemonic == PHA { self.a } else { self.p | FLAG_B | FLAG_U };
                self.push(bus, value);
                return cycles;
            }
            PLA | PLP => {
                bus.read(self.pc);
                bus.read(0x0100 | self.s as u16);
                let value = self.pull(bus);
                if op.mnemonic == PLA {
                    self.a = set_nz(&mut self.p, value);
                } else {
                    self.delayed_i = Some(self.p & FLAG_I != 0);
                    self.p = Self::pulled_status(value);
                }
                return cycles;
            }
            KIL => {
                warn!("KIL opcode {:02X} at {:04X}: CPU halted", opcode, self.pc.wrapping_sub(1));
                self.halted = true;
                self.pc = self.pc.wrapping_sub(1);
                return cycles;
            }
            _ => {}
        }

        let target = self.resolve(bus, op.mode, Access::of(op.mnemonic));
        if op.page_penalty && target.page_crossed {
            cycles += 1;
        }
        let accumulator = op.mode == AddressingMode::Accumulator;

        match op.mnemonic {
            // Loads and logic
            LDA => self.a = set_nz(&mut self.p, bus.read(target.addr)),
            LDX => self.x = set_nz(&mut self.p, bus.read(target.addr)),
            LDY => self.y = set_nz(&mut self.p, bus.read(target.addr)),
            LAX => {
                let value = bus.read(target.addr);
                self.a = value;
                self.x = set_nz(&mut self.p, value);
            }
            AND => self.a = set_nz(&mut self.p, self.a & bus.read(target.addr)),
            ORA => self.a = set_nz(&mut self.p, self.a | bus.read(target.addr)),
            EOR => self.a = set_nz(&mut self.p, self.a ^ bus.read(target.addr)),
            ADC => {
                let value = bus.read(target.addr);
                self.a = adc(&mut self.p, self.a, value);
            }
            SBC => {
                let value = bus.read(target.addr);
                self.a = sbc(&mut self.p, self.a, value);
            }
            CMP => compare(&mut self.p, self.a, bus.read(target.addr)),
            CPX => compare(&mut self.p, self.x, bus.read(target.addr)),
            CPY => compare(&mut self.p, self.y, bus.read(target.addr)),
            BIT => bit(&mut self.p, self.a, bus.read(target.addr)),
            NOP => {
                if !matches!(op.mode, AddressingMode::Implied) {
                    bus.read(target.addr);
                }
            }

            // Stores
            STA => bus.write(target.addr, self.a),
            STX => bus.write(target.addr, self.x),
            STY => bus.write(target.addr, self.y),
            SAX => bus.write(target.addr, self.a & self.x),
            SHX => self.store_high_and(bus, target, self.x),
            SHY => self.store_high_and(bus, target, self.y),
            AHX => self.store_high_and(bus, target, self.a & self.x),
            TAS => {
                self.s = self.a & self.x;
                self.store_high_and(bus, target, self.s);
            }
            LAS => {
                let value = bus.read(target.addr) & self.s;
                self.a = value;
                self.x = value;
                self.s = set_nz(&mut self.p, value);
            }

            // Shifts and increments
            ASL if accumulator => self.a = asl(&mut self.p, self.a),
            LSR if accumulator => self.a = lsr(&mut self.p, self.a),
            ROL if accumulator => self.a = rol(&mut self.p, self.a),
            ROR if accumulator => self.a = ror(&mut self.p, self.a),
            ASL => self.modify(bus, target, |cpu, v| asl(&mut cpu.p, v)),
            LSR => self.modify(bus, target, |cpu, v| lsr(&mut cpu.p, v)),
            ROL => self.modify(bus, target, |cpu, v| rol(&mut cpu.p, v)),
            ROR => self.modify(bus, target, |cpu, v| ror(&mut cpu.p, v)),
            INC => self.modify(bus, target, |cpu, v| inc(&mut cpu.p, v)),
            DEC => self.modify(bus, target, |cpu, v| dec(&mut cpu.p, v)),

            // Unofficial read-modify-write combinations
            SLO => self.modify(bus, target, |cpu, v| {
                let result = asl(&mut cpu.p, v);
                cpu.a = set_nz(&mut cpu.p, cpu.a | result);
                result
            }),
            RLA => self.modify(bus, target, |cpu, v| {
                let result = rol(&mut cpu.p, v);
                cpu.a = set_nz(&mut cpu.p, cpu.a & result);
                result
            }),
            SRE => self.modify(bus, target, |cpu, v| {
                let result = lsr(&mut cpu.p, v);
                cpu.a = set_nz(&mut cpu.p, cpu.a ^ result);
                result
            }),
            RRA => self.modify(bus, target, |cpu, v| {
                let result = ror(&mut cpu.p, v);
                cpu.a = adc(&mut cpu.p, cpu.a, result);
                result
            }),
            DCP => self.modify(bus, target, |cpu, v| {
                let result = v.wrapping_sub(1);
                compare(&mut cpu.p, cpu.a, result);
                result
            }),
            ISB => self.modify(bus, target, |cpu, v| {
                let result = v.wrapping_add(1);
                cpu.a = sbc(&mut cpu.p, cpu.a, result);
                result
            }),

            // Unofficial immediates
            ANC => {
                self.a = set_nz(&mut self.p, self.a & bus.read(target.addr));
                set_flag(&mut self.p, FLAG_C, self.a & 0x80 != 0);
            }
            ALR => {
                let value = self.a & bus.read(target.addr);
                self.a = lsr(&mut self.p, value);
            }
            ARR => {
                let value = bus.read(target.addr);
                self.a = arr(&mut self.p, self.a, value);
            }
            AXS => {
                let value = bus.read(target.addr);
                self.x = axs(&mut self.p, self.a, self.x, value);
            }
            XAA => {
                let value = bus.read(target.addr);
                self.a = set_nz(&mut self.p, (self.a | 0xEE) & self.x & value);
            }
            LXA => {
                let value = (self.a | 0xEE) & bus.read(target.addr);
                self.a = value;
                self.x = set_nz(&mut self.p, value);
            }

            // Register transfers
            TAX => self.x = set_nz(&mut self.p, self.a),
            TAY => self.y = set_nz(&mut self.p, self.a),
            TXA => self.a = set_nz(&mut self.p, self.x),
            TYA => self.a = set_nz(&mut self.p, self.y),
            TSX => self.x = set_nz(&mut self.p, self.s),
            TXS => self.s = self.x,
            INX => self.x = inc(&mut self.p, self.x),
            INY => self.y = inc(&mut self.p, self.y),
            DEX => self.x = dec(&mut self.p, self.x),
            DEY => self.y = dec(&mut self.p, self.y),

            // Flags
            CLC => self.p &= !FLAG_C,
            SEC => self.p |= FLAG_C,
            CLD => self.p &= !FLAG_D,
            SED => self.p |= FLAG_D,
            CLV => self.p &= !FLAG_V,
            CLI | SEI => {
                self.delayed_i = Some(self.p & FLAG_I != 0);
                set_flag(&mut self.p, FLAG_I, op.mnemonic == SEI);
            }

            BCC | BCS | BNE | BEQ | BPL | BMI | BVC | BVS | BRK | JSR | RTS | RTI | JMP | PHA
            | PHP | PLA | PLP | KIL => unreachable!("handled before operand resolution"),
        }

        cycles
    }

    /// Budget left on the current instruction. Zero means the next
    /// `run_cycle` starts a new instruction or interrupt.
    pub fn cycles_left(&self) -> u32 {
        self.cycles_left
    }

    /// CPU cycles since reset
    pub fn total_cycles(&self) -> u64 {
        self.total_cycles
    }

    /// True after a KIL opcode locked the CPU
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// State and disassembly of the instruction at PC
    pub fn trace<B: CpuBus>(&self, bus: &mut B) -> CpuTrace {
        let opcode = bus.peek(self.pc);
        let op = OPCODES[opcode as usize];
        let bytes = (0..op.len())
            .map(|i| bus.peek(self.pc.wrapping_add(i)))
            .collect();
        CpuTrace {
            pc: self.pc,
            bytes,
            mnemonic: op.mnemonic,
            mode: op.mode,
            official: op.official,
            a: self.a,
            x: self.x,
            y: self.y,
            p: self.p,
            s: self.s,
            cycles: self.total_cycles,
            ppu: None,
        }
    }
}
