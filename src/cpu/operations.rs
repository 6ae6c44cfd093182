//! Timing-independent ALU operations on values and the status register
//!
//! Every function takes the status byte and returns the result; the engine
//! decides where operands come from and where results go.

// Status flag bit positions
pub const FLAG_C: u8 = 0b0000_0001; // Carry
pub const FLAG_Z: u8 = 0b0000_0010; // Zero
pub const FLAG_I: u8 = 0b0000_0100; // Interrupt Disable
pub const FLAG_D: u8 = 0b0000_1000; // Decimal Mode (no effect on the 2A03)
pub const FLAG_B: u8 = 0b0001_0000; // Break (only exists on the stack)
pub const FLAG_U: u8 = 0b0010_0000; // Unused (always set when pushed)
pub const FLAG_V: u8 = 0b0100_0000; // Overflow
pub const FLAG_N: u8 = 0b1000_0000; // Negative

/// Set or clear a flag
pub fn set_flag(p: &mut u8, flag: u8, condition: bool) {
    if condition {
        *p |= flag;
    } else {
        *p &= !flag;
    }
}

/// Update N and Z from a result and pass it through
pub fn set_nz(p: &mut u8, value: u8) -> u8 {
    set_flag(p, FLAG_N, value & 0x80 != 0);
    set_flag(p, FLAG_Z, value == 0);
    value
}

/// Binary add with carry. Decimal mode is ignored.
pub fn adc(p: &mut u8, a: u8, operand: u8) -> u8 {
    let carry = (*p & FLAG_C) as u16;
    let sum = a as u16 + operand as u16 + carry;
    let result = sum as u8;
    set_flag(p, FLAG_C, sum > 0xFF);
    set_flag(p, FLAG_V, (a ^ result) & (operand ^ result) & 0x80 != 0);
    set_nz(p, result)
}

pub fn sbc(p: &mut u8, a: u8, operand: u8) -> u8 {
    adc(p, a, !operand)
}

/// CMP/CPX/CPY: register minus operand, flags only
pub fn compare(p: &mut u8, register: u8, operand: u8) {
    set_flag(p, FLAG_C, register >= operand);
    set_nz(p, register.wrapping_sub(operand));
}

pub fn bit(p: &mut u8, a: u8, operand: u8) {
    set_flag(p, FLAG_Z, a & operand == 0);
    set_flag(p, FLAG_N, operand & 0x80 != 0);
    set_flag(p, FLAG_V, operand & 0x40 != 0);
}

pub fn asl(p: &mut u8, value: u8) -> u8 {
    set_flag(p, FLAG_C, value & 0x80 != 0);
    set_nz(p, value << 1)
}

pub fn lsr(p: &mut u8, value: u8) -> u8 {
    set_flag(p, FLAG_C, value & 0x01 != 0);
    set_nz(p, value >> 1)
}

pub fn rol(p: &mut u8, value: u8) -> u8 {
    let carry_in = *p & FLAG_C;
    set_flag(p, FLAG_C, value & 0x80 != 0);
    set_nz(p, (value << 1) | carry_in)
}

pub fn ror(p: &mut u8, value: u8) -> u8 {
    let carry_in = (*p & FLAG_C) << 7;
    set_flag(p, FLAG_C, value & 0x01 != 0);
    set_nz(p, (value >> 1) | carry_in)
}

pub fn inc(p: &mut u8, value: u8) -> u8 {
    set_nz(p, value.wrapping_add(1))
}

pub fn dec(p: &mut u8, value: u8) -> u8 {
    set_nz(p, value.wrapping_sub(1))
}

/// ARR: AND then rotate right, with C and V taken from bits 6 and 5
pub fn arr(p: &mut u8, a: u8, operand: u8) -> u8 {
    let carry_in = (*p & FLAG_C) << 7;
    let result = ((a & operand) >> 1) | carry_in;
    set_flag(p, FLAG_C, result & 0x40 != 0);
    set_flag(p, FLAG_V, ((result >> 6) ^ (result >> 5)) & 0x01 != 0);
    set_nz(p, result)
}

/// AXS: X = (A & X) - operand, compare-style carry
pub fn axs(p: &mut u8, a: u8, x: u8, operand: u8) -> u8 {
    let value = a & x;
    set_flag(p, FLAG_C, value >= operand);
    set_nz(p, value.wrapping_sub(operand))
}
