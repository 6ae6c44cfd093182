//! The 256-entry 6502 opcode table, unofficial opcodes included

/// CPU operation mnemonic
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mnemonic {
    // Arithmetic and logic
    ADC,
    SBC,
    AND,
    ORA,
    EOR,
    BIT,
    CMP,
    CPX,
    CPY,
    // Shift/Rotate
    ASL,
    LSR,
    ROL,
    ROR,
    // Increment/Decrement
    INC,
    DEC,
    INX,
    INY,
    DEX,
    DEY,
    // Load/Store
    LDA,
    LDX,
    LDY,
    STA,
    STX,
    STY,
    // Transfer
    TAX,
    TAY,
    TXA,
    TYA,
    TSX,
    TXS,
    // Stack
    PHA,
    PHP,
    PLA,
    PLP,
    // Branch
    BCC,
    BCS,
    BEQ,
    BMI,
    BNE,
    BPL,
    BVC,
    BVS,
    // Jump/Call
    JMP,
    JSR,
    RTS,
    RTI,
    BRK,
    // Flags
    CLC,
    CLD,
    CLI,
    CLV,
    SEC,
    SED,
    SEI,
    NOP,
    // Unofficial read-modify-write combinations
    SLO,
    RLA,
    SRE,
    RRA,
    DCP,
    ISB,
    // Unofficial loads and stores
    LAX,
    SAX,
    LAS,
    AHX,
    SHX,
    SHY,
    TAS,
    // Unofficial immediates
    ANC,
    ALR,
    ARR,
    AXS,
    XAA,
    LXA,
    // Locks the CPU
    KIL,
}

impl std::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
}

impl AddressingMode {
    /// Operand bytes following the opcode
    pub fn operand_len(self) -> u16 {
        match self {
            AddressingMode::Implied | AddressingMode::Accumulator => 0,
            AddressingMode::Absolute
            | AddressingMode::AbsoluteX
            | AddressingMode::AbsoluteY
            | AddressingMode::Indirect => 2,
            _ => 1,
        }
    }
}

/// One opcode table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpCode {
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Base cycle count
    pub cycles: u8,
    /// Read instructions pay one extra cycle when indexing crosses a page
    pub page_penalty: bool,
    pub official: bool,
}

impl OpCode {
    /// Total instruction length in bytes
    pub fn len(&self) -> u16 {
        1 + self.mode.operand_len()
    }
}

const fn op(mnemonic: Mnemonic, mode: AddressingMode, cycles: u8, page_penalty: bool, official: bool) -> OpCode {
    OpCode {
        mnemonic,
        mode,
        cycles,
        page_penalty,
        official,
    }
}

use AddressingMode::*;

#[rustfmt::skip]
pub static OPCODES: [OpCode; 256] = [
    /* 00 */ op(Mnemonic::BRK, Implied, 7, false, true),
    /* 01 */ op(Mnemonic::ORA, IndirectX, 6, false, true),
    /* 02 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* 03 */ op(Mnemonic::SLO, IndirectX, 8, false, false),
    /* 04 */ op(Mnemonic::NOP, ZeroPage, 3, false, false),
    /* 05 */ op(Mnemonic::ORA, ZeroPage, 3, false, true),
    /* 06 */ op(Mnemonic::ASL, ZeroPage, 5, false, true),
    /* 07 */ op(Mnemonic::SLO, ZeroPage, 5, false, false),
    /* 08 */ op(Mnemonic::PHP, Implied, 3, false, true),
    /* 09 */ op(Mnemonic::ORA, Immediate, 2, false, true),
    /* 0A */ op(Mnemonic::ASL, Accumulator, 2, false, true),
    /* 0B */ op(Mnemonic::ANC, Immediate, 2, false, false),
    /* 0C */ op(Mnemonic::NOP, Absolute, 4, false, false),
    /* 0D */ op(Mnemonic::ORA, Absolute, 4, false, true),
    /* 0E */ op(Mnemonic::ASL, Absolute, 6, false, true),
    /* 0F */ op(Mnemonic::SLO, Absolute, 6, false, false),
    /* 10 */ op(Mnemonic::BPL, Relative, 2, false, true),
    /* 11 */ op(Mnemonic::ORA, IndirectY, 5, true, true),
    /* 12 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* 13 */ op(Mnemonic::SLO, IndirectY, 8, false, false),
    /* 14 */ op(Mnemonic::NOP, ZeroPageX, 4, false, false),
    /* 15 */ op(Mnemonic::ORA, ZeroPageX, 4, false, true),
    /* 16 */ op(Mnemonic::ASL, ZeroPageX, 6, false, true),
    /* 17 */ op(Mnemonic::SLO, ZeroPageX, 6, false, false),
    /* 18 */ op(Mnemonic::CLC, Implied, 2, false, true),
    /* 19 */ op(Mnemonic::ORA, AbsoluteY, 4, true, true),
    /* 1A */ op(Mnemonic::NOP, Implied, 2, false, false),
    /* 1B */ op(Mnemonic::SLO, AbsoluteY, 7, false, false),
    /* 1C */ op(Mnemonic::NOP, AbsoluteX, 4, true, false),
    /* 1D */ op(Mnemonic::ORA, AbsoluteX, 4, true, true),
    /* 1E */ op(Mnemonic::ASL, AbsoluteX, 7, false, true),
    /* 1F */ op(Mnemonic::SLO, AbsoluteX, 7, false, false),
    /* 20 */ op(Mnemonic::JSR, Absolute, 6, false, true),
    /* 21 */ op(Mnemonic::AND, IndirectX, 6, false, true),
    /* 22 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* 23 */ op(Mnemonic::RLA, IndirectX, 8, false, false),
    /* 24 */ op(Mnemonic::BIT, ZeroPage, 3, false, true),
    /* 25 */ op(Mnemonic::AND, ZeroPage, 3, false, true),
    /* 26 */ op(Mnemonic::ROL, ZeroPage, 5, false, true),
    /* 27 */ op(Mnemonic::RLA, ZeroPage, 5, false, false),
    /* 28 */ op(Mnemonic::PLP, Implied, 4, false, true),
    /* 29 */ op(Mnemonic::AND, Immediate, 2, false, true),
    /* 2A */ op(Mnemonic::ROL, Accumulator, 2, false, true),
    /* 2B */ op(Mnemonic::ANC, Immediate, 2, false, false),
    /* 2C */ op(Mnemonic::BIT, Absolute, 4, false, true),
    /* 2D */ op(Mnemonic::AND, Absolute, 4, false, true),
    /* 2E */ op(Mnemonic::ROL, Absolute, 6, false, true),
    /* 2F */ op(Mnemonic::RLA, Absolute, 6, false, false),
    /* 30 */ op(Mnemonic::BMI, Relative, 2, false, true),
    /* 31 */ op(Mnemonic::AND, IndirectY, 5, true, true),
    /* 32 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* 33 */ op(Mnemonic::RLA, IndirectY, 8, false, false),
    /* 34 */ op(Mnemonic::NOP, ZeroPageX, 4, false, false),
    /* 35 */ op(Mnemonic::AND, ZeroPageX, 4, false, true),
    /* 36 */ op(Mnemonic::ROL, ZeroPageX, 6, false, true),
    /* 37 */ op(Mnemonic::RLA, ZeroPageX, 6, false, false),
    /* 38 */ op(Mnemonic::SEC, Implied, 2, false, true),
    /* 39 */ op(Mnemonic::AND, AbsoluteY, 4, true, true),
    /* 3A */ op(Mnemonic::NOP, Implied, 2, false, false),
    /* 3B */ op(Mnemonic::RLA, AbsoluteY, 7, false, false),
    /* 3C */ op(Mnemonic::NOP, AbsoluteX, 4, true, false),
    /* 3D */ op(Mnemonic::AND, AbsoluteX, 4, true, true),
    /* 3E */ op(Mnemonic::ROL, AbsoluteX, 7, false, true),
    /* 3F */ op(Mnemonic::RLA, AbsoluteX, 7, false, false),
    /* 40 */ op(Mnemonic::RTI, Implied, 6, false, true),
    /* 41 */ op(Mnemonic::EOR, IndirectX, 6, false, true),
    /* 42 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* 43 */ op(Mnemonic::SRE, IndirectX, 8, false, false),
    /* 44 */ op(Mnemonic::NOP, ZeroPage, 3, false, false),
    /* 45 */ op(Mnemonic::EOR, ZeroPage, 3, false, true),
    /* 46 */ op(Mnemonic::LSR, ZeroPage, 5, false, true),
    /* 47 */ op(Mnemonic::SRE, ZeroPage, 5, false, false),
    /* 48 */ op(Mnemonic::PHA, Implied, 3, false, true),
    /* 49 */ op(Mnemonic::EOR, Immediate, 2, false, true),
    /* 4A */ op(Mnemonic::LSR, Accumulator, 2, false, true),
    /* 4B */ op(Mnemonic::ALR, Immediate, 2, false, false),
    /* 4C */ op(Mnemonic::JMP, Absolute, 3, false, true),
    /* 4D */ op(Mnemonic::EOR, Absolute, 4, false, true),
    /* 4E */ op(Mnemonic::LSR, Absolute, 6, false, true),
    /* 4F */ op(Mnemonic::SRE, Absolute, 6, false, false),
    /* 50 */ op(Mnemonic::BVC, Relative, 2, false, true),
    /* 51 */ op(Mnemonic::EOR, IndirectY, 5, true, true),
    /* 52 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* 53 */ op(Mnemonic::SRE, IndirectY, 8, false, false),
    /* 54 */ op(Mnemonic::NOP, ZeroPageX, 4, false, false),
    /* 55 */ op(Mnemonic::EOR, ZeroPageX, 4, false, true),
    /* 56 */ op(Mnemonic::LSR, ZeroPageX, 6, false, true),
    /* 57 */ op(Mnemonic::SRE, ZeroPageX, 6, false, false),
    /* 58 */ op(Mnemonic::CLI, Implied, 2, false, true),
    /* 59 */ op(Mnemonic::EOR, AbsoluteY, 4, true, true),
    /* 5A */ op(Mnemonic::NOP, Implied, 2, false, false),
    /* 5B */ op(Mnemonic::SRE, AbsoluteY, 7, false, false),
    /* 5C */ op(Mnemonic::NOP, AbsoluteX, 4, true, false),
    /* 5D */ op(Mnemonic::EOR, AbsoluteX, 4, true, true),
    /* 5E */ op(Mnemonic::LSR, AbsoluteX, 7, false, true),
    /* 5F */ op(Mnemonic::SRE, AbsoluteX, 7, false, false),
    /* 60 */ op(Mnemonic::RTS, Implied, 6, false, true),
    /* 61 */ op(Mnemonic::ADC, IndirectX, 6, false, true),
    /* 62 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* 63 */ op(Mnemonic::RRA, IndirectX, 8, false, false),
    /* 64 */ op(Mnemonic::NOP, ZeroPage, 3, false, false),
    /* 65 */ op(Mnemonic::ADC, ZeroPage, 3, false, true),
    /* 66 */ op(Mnemonic::ROR, ZeroPage, 5, false, true),
    /* 67 */ op(Mnemonic::RRA, ZeroPage, 5, false, false),
    /* 68 */ op(Mnemonic::PLA, Implied, 4, false, true),
    /* 69 */ op(Mnemonic::ADC, Immediate, 2, false, true),
    /* 6A */ op(Mnemonic::ROR, Accumulator, 2, false, true),
    /* 6B */ op(Mnemonic::ARR, Immediate, 2, false, false),
    /* 6C */ op(Mnemonic::JMP, Indirect, 5, false, true),
    /* 6D */ op(Mnemonic::ADC, Absolute, 4, false, true),
    /* 6E */ op(Mnemonic::ROR, Absolute, 6, false, true),
    /* 6F */ op(Mnemonic::RRA, Absolute, 6, false, false),
    /* 70 */ op(Mnemonic::BVS, Relative, 2, false, true),
    /* 71 */ op(Mnemonic::ADC, IndirectY, 5, true, true),
    /* 72 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* 73 */ op(Mnemonic::RRA, IndirectY, 8, false, false),
    /* 74 */ op(Mnemonic::NOP, ZeroPageX, 4, false, false),
    /* 75 */ op(Mnemonic::ADC, ZeroPageX, 4, false, true),
    /* 76 */ op(Mnemonic::ROR, ZeroPageX, 6, false, true),
    /* 77 */ op(Mnemonic::RRA, ZeroPageX, 6, false, false),
    /* 78 */ op(Mnemonic::SEI, Implied, 2, false, true),
    /* 79 */ op(Mnemonic::ADC, AbsoluteY, 4, true, true),
    /* 7A */ op(Mnemonic::NOP, Implied, 2, false, false),
    /* 7B */ op(Mnemonic::RRA, AbsoluteY, 7, false, false),
    /* 7C */ op(Mnemonic::NOP, AbsoluteX, 4, true, false),
    /* 7D */ op(Mnemonic::ADC, AbsoluteX, 4, true, true),
    /* 7E */ op(Mnemonic::ROR, AbsoluteX, 7, false, true),
    /* 7F */ op(Mnemonic::RRA, AbsoluteX, 7, false, false),
    /* 80 */ op(Mnemonic::NOP, Immediate, 2, false, false),
    /* 81 */ op(Mnemonic::STA, IndirectX, 6, false, true),
    /* 82 */ op(Mnemonic::NOP, Immediate, 2, false, false),
    /* 83 */ op(Mnemonic::SAX, IndirectX, 6, false, false),
    /* 84 */ op(Mnemonic::STY, ZeroPage, 3, false, true),
    /* 85 */ op(Mnemonic::STA, ZeroPage, 3, false, true),
    /* 86 */ op(Mnemonic::STX, ZeroPage, 3, false, true),
    /* 87 */ op(Mnemonic::SAX, ZeroPage, 3, false, false),
    /* 88 */ op(Mnemonic::DEY, Implied, 2, false, true),
    /* 89 */ op(Mnemonic::NOP, Immediate, 2, false, false),
    /* 8A */ op(Mnemonic::TXA, Implied, 2, false, true),
    /* 8B */ op(Mnemonic::XAA, Immediate, 2, false, false),
    /* 8C */ op(Mnemonic::STY, Absolute, 4, false, true),
    /* 8D */ op(Mnemonic::STA, Absolute, 4, false, true),
    /* 8E */ op(Mnemonic::STX, Absolute, 4, false, true),
    /* 8F */ op(Mnemonic::SAX, Absolute, 4, false, false),
    /* 90 */ op(Mnemonic::BCC, Relative, 2, false, true),
    /* 91 */ op(Mnemonic::STA, IndirectY, 6, false, true),
    /* 92 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* 93 */ op(Mnemonic::AHX, IndirectY, 6, false, false),
    /* 94 */ op(Mnemonic::STY, ZeroPageX, 4, false, true),
    /* 95 */ op(Mnemonic::STA, ZeroPageX, 4, false, true),
    /* 96 */ op(Mnemonic::STX, ZeroPageY, 4, false, true),
    /* 97 */ op(Mnemonic::SAX, ZeroPageY, 4, false, false),
    /* 98 */ op(Mnemonic::TYA, Implied, 2, false, true),
    /* 99 */ op(Mnemonic::STA, AbsoluteY, 5, false, true),
    /* 9A */ op(Mnemonic::TXS, Implied, 2, false, true),
    /* 9B */ op(Mnemonic::TAS, AbsoluteY, 5, false, false),
    /* 9C */ op(Mnemonic::SHY, AbsoluteX, 5, false, false),
    /* 9D */ op(Mnemonic::STA, AbsoluteX, 5, false, true),
    /* 9E */ op(Mnemonic::SHX, AbsoluteY, 5, false, false),
    /* 9F */ op(Mnemonic::AHX, AbsoluteY, 5, false, false),
    /* A0 */ op(Mnemonic::LDY, Immediate, 2, false, true),
    /* A1 */ op(Mnemonic::LDA, IndirectX, 6, false, true),
    /* A2 */ op(Mnemonic::LDX, Immediate, 2, false, true),
    /* A3 */ op(Mnemonic::LAX, IndirectX, 6, false, false),
    /* A4 */ op(Mnemonic::LDY, ZeroPage, 3, false, true),
    /* A5 */ op(Mnemonic::LDA, ZeroPage, 3, false, true),
    /* A6 */ op(Mnemonic::LDX, ZeroPage, 3, false, true),
    /* A7 */ op(Mnemonic::LAX, ZeroPage, 3, false, false),
    /* A8 */ op(Mnemonic::TAY, Implied, 2, false, true),
    /* A9 */ op(Mnemonic::LDA, Immediate, 2, false, true),
    /* AA */ op(Mnemonic::TAX, Implied, 2, false, true),
    /* AB */ op(Mnemonic::LXA, Immediate, 2, false, false),
    /* AC */ op(Mnemonic::LDY, Absolute, 4, false, true),
    /* AD */ op(Mnemonic::LDA, Absolute, 4, false, true),
    /* AE */ op(Mnemonic::LDX, Absolute, 4, false, true),
    /* AF */ op(Mnemonic::LAX, Absolute, 4, false, false),
    /* B0 */ op(Mnemonic::BCS, Relative, 2, false, true),
    /* B1 */ op(Mnemonic::LDA, IndirectY, 5, true, true),
    /* B2 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* B3 */ op(Mnemonic::LAX, IndirectY, 5, true, false),
    /* B4 */ op(Mnemonic::LDY, ZeroPageX, 4, false, true),
    /* B5 */ op(Mnemonic::LDA, ZeroPageX, 4, false, true),
    /* B6 */ op(Mnemonic::LDX, ZeroPageY, 4, false, true),
    /* B7 */ op(Mnemonic::LAX, ZeroPageY, 4, false, false),
    /* B8 */ op(Mnemonic::CLV, Implied, 2, false, true),
    /* B9 */ op(Mnemonic::LDA, AbsoluteY, 4, true, true),
    /* BA */ op(Mnemonic::TSX, Implied, 2, false, true),
    /* BB */ op(Mnemonic::LAS, AbsoluteY, 4, true, false),
    /* BC */ op(Mnemonic::LDY, AbsoluteX, 4, true, true),
    /* BD */ op(Mnemonic::LDA, AbsoluteX, 4, true, true),
    /* BE */ op(Mnemonic::LDX, AbsoluteY, 4, true, true),
    /* BF */ op(Mnemonic::LAX, AbsoluteY, 4, true, false),
    /* C0 */ op(Mnemonic::CPY, Immediate, 2, false, true),
    /* C1 */ op(Mnemonic::CMP, IndirectX, 6, false, true),
    /* C2 */ op(Mnemonic::NOP, Immediate, 2, false, false),
    /* C3 */ op(Mnemonic::DCP, IndirectX, 8, false, false),
    /* C4 */ op(Mnemonic::CPY, ZeroPage, 3, false, true),
    /* C5 */ op(Mnemonic::CMP, ZeroPage, 3, false, true),
    /* C6 */ op(Mnemonic::DEC, ZeroPage, 5, false, true),
    /* C7 */ op(Mnemonic::DCP, ZeroPage, 5, false, false),
    /* C8 */ op(Mnemonic::INY, Implied, 2, false, true),
    /* C9 */ op(Mnemonic::CMP, Immediate, 2, false, true),
    /* CA */ op(Mnemonic::DEX, Implied, 2, false, true),
    /* CB */ op(Mnemonic::AXS, Immediate, 2, false, false),
    /* CC */ op(Mnemonic::CPY, Absolute, 4, false, true),
    /* CD */ op(Mnemonic::CMP, Absolute, 4, false, true),
    /* CE */ op(Mnemonic::DEC, Absolute, 6, false, true),
    /* CF */ op(Mnemonic::DCP, Absolute, 6, false, false),
    /* D0 */ op(Mnemonic::BNE, Relative, 2, false, true),
    /* D1 */ op(Mnemonic::CMP, IndirectY, 5, true, true),
    /* D2 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* D3 */ op(Mnemonic::DCP, IndirectY, 8, false, false),
    /* D4 */ op(Mnemonic::NOP, ZeroPageX, 4, false, false),
    /* D5 */ op(Mnemonic::CMP, ZeroPageX, 4, false, true),
    /* D6 */ op(Mnemonic::DEC, ZeroPageX, 6, false, true),
    /* D7 */ op(Mnemonic::DCP, ZeroPageX, 6, false, false),
    /* D8 */ op(Mnemonic::CLD, Implied, 2, false, true),
    /* D9 */ op(Mnemonic::CMP, AbsoluteY, 4, true, true),
    /* DA */ op(Mnemonic::NOP, Implied, 2, false, false),
    /* DB */ op(Mnemonic::DCP, AbsoluteY, 7, false, false),
    /* DC */ op(Mnemonic::NOP, AbsoluteX, 4, true, false),
    /* DD */ op(Mnemonic::CMP, AbsoluteX, 4, true, true),
    /* DE */ op(Mnemonic::DEC, AbsoluteX, 7, false, true),
    /* DF */ op(Mnemonic::DCP, AbsoluteX, 7, false, false),
    /* E0 */ op(Mnemonic::CPX, Immediate, 2, false, true),
    /* E1 */ op(Mnemonic::SBC, IndirectX, 6, false, true),
    /* E2 */ op(Mnemonic::NOP, Immediate, 2, false, false),
    /* E3 */ op(Mnemonic::ISB, IndirectX, 8, false, false),
    /* E4 */ op(Mnemonic::CPX, ZeroPage, 3, false, true),
    /* E5 */ op(Mnemonic::SBC, ZeroPage, 3, false, true),
    /* E6 */ op(Mnemonic::INC, ZeroPage, 5, false, true),
    /* E7 */ op(Mnemonic::ISB, ZeroPage, 5, false, false),
    /* E8 */ op(Mnemonic::INX, Implied, 2, false, true),
    /* E9 */ op(Mnemonic::SBC, Immediate, 2, false, true),
    /* EA */ op(Mnemonic::NOP, Implied, 2, false, true),
    /* EB */ op(Mnemonic::SBC, Immediate, 2, false, false),
    /* EC */ op(Mnemonic::CPX, Absolute, 4, false, true),
    /* ED */ op(Mnemonic::SBC, Absolute, 4, false, true),
    /* EE */ op(Mnemonic::INC, Absolute, 6, false, true),
    /* EF */ op(Mnemonic::ISB, Absolute, 6, false, false),
    /* F0 */ op(Mnemonic::BEQ, Relative, 2, false, true),
    /* F1 */ op(Mnemonic::SBC, IndirectY, 5, true, true),
    /* F2 */ op(Mnemonic::KIL, Implied, 2, false, false),
    /* F3 */ op(Mnemonic::ISB, IndirectY, 8, false, false),
    /* F4 */ op(Mnemonic::NOP, ZeroPageX, 4, false, false),
    /* F5 */ op(Mnemonic::SBC, ZeroPageX, 4, false, true),
    /* F6 */ op(Mnemonic::INC, ZeroPageX, 6, false, true),
    /* F7 */ op(Mnemonic::ISB, ZeroPageX, 6, false, false),
    /* F8 */ op(Mnemonic::SED, Implied, 2, false, true),
    /* F9 */ op(Mnemonic::SBC, AbsoluteY, 4, true, true),
    /* FA */ op(Mnemonic::NOP, Implied, 2, false, false),
    /* FB */ op(Mnemonic::ISB, AbsoluteY, 7, false, false),
    /* FC */ op(Mnemonic::NOP, AbsoluteX, 4, true, false),
    /* FD */ op(Mnemonic::SBC, AbsoluteX, 4, true, true),
    /* FE */ op(Mnemonic::INC, AbsoluteX, 7, false, true),
    /* FF */ op(Mnemonic::ISB, AbsoluteX, 7, false, false),
];
