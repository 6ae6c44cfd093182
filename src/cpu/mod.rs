//! 2A03 CPU core
//!
//! Split into the opcode table, operand addressing, ALU operations and the
//! cycle-budgeted engine that ties them together.

mod addressing;
#[allow(clippy::module_inception)]
mod cpu;
mod opcode;
mod operations;
mod trace;
mod traits;

pub use addressing::{Access, Target};
pub use cpu::{Cpu, IRQ_VECTOR, NMI_VECTOR, RESET_VECTOR};
pub use opcode::{AddressingMode, Mnemonic, OPCODES, OpCode};
pub use trace::CpuTrace;
pub use traits::CpuBus;
