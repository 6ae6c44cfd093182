use std::fmt;

use super::opcode::{AddressingMode, Mnemonic};

/// CPU state at the start of one instruction
///
/// `Display` follows the nestest log layout, without the resolved memory
/// values that log prints after some operands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuTrace {
    pub pc: u16,
    /// Opcode followed by its operand bytes
    pub bytes: Vec<u8>,
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    pub official: bool,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub p: u8,
    pub s: u8,
    pub cycles: u64,
    /// PPU (scanline, dot), filled in by the console
    pub ppu: Option<(u16, u16)>,
}

impl CpuTrace {
    fn operand_byte(&self) -> u8 {
        self.bytes.get(1).copied().unwrap_or(0)
    }

    fn operand_word(&self) -> u16 {
        let hi = self.bytes.get(2).copied().unwrap_or(0) as u16;
        (hi << 8) | self.operand_byte() as u16
    }

    /// Operand in assembler syntax
    pub fn operand(&self) -> String {
        match self.mode {
            AddressingMode::Implied => String::new(),
            AddressingMode::Accumulator => "A".to_string(),
            AddressingMode::Immediate => format!("#${:02X}", self.operand_byte()),
            AddressingMode::ZeroPage => format!("${:02X}", self.operand_byte()),
            AddressingMode::ZeroPageX => format!("${:02X},X", self.operand_byte()),
            AddressingMode::ZeroPageY => format!("${:02X},Y", self.operand_byte()),
            AddressingMode::Absolute => format!("${:04X}", self.operand_word()),
            AddressingMode::AbsoluteX => format!("${:04X},X", self.operand_word()),
            AddressingMode::AbsoluteY => format!("${:04X},Y", self.operand_word()),
            AddressingMode::Indirect => format!("(${:04X})", self.operand_word()),
            AddressingMode::IndirectX => format!("(${:02X},X)", self.operand_byte()),
            AddressingMode::IndirectY => format!("(${:02X}),Y", self.operand_byte()),
            AddressingMode::Relative => {
                let offset = self.operand_byte() as i8;
                let target = self.pc.wrapping_add(2).wrapping_add(offset as u16);
                format!("${:04X}", target)
            }
        }
    }
}

impl fmt::Display for CpuTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self
            .bytes
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ");
        let marker = if self.official { ' ' } else { '*' };
        let instruction = format!("{} {}", self.mnemonic, self.operand());

        write!(
            f,
            "{:04X}  {:<8} {}{:<32}A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} ",
            self.pc,
            bytes,
            marker,
            instruction.trim_end(),
            self.a,
            self.x,
            self.y,
            self.p,
            self.s
        )?;
        if let Some((scanline, dot)) = self.ppu {
            write!(f, "PPU:{:>3},{:>3} ", scanline, dot)?;
        }
        write!(f, "CYC:{}", self.cycles)
    }
}
