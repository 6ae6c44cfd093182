use super::envelope::LengthCounter;

/// Length of the triangle wave sequence
const TRIANGLE_SEQUENCE_LENGTH: u8 = 32;

/// Triangle wave sequence (32 steps)
/// Produces values: 15,14,13,...,1,0,0,1,2,...,14,15
const TRIANGLE_SEQUENCE: [u8; TRIANGLE_SEQUENCE_LENGTH as usize] = [
    15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11,
    12, 13, 14, 15,
];

/// Periods below this are ultrasonic; the sequencer holds its position
const ULTRASONIC_PERIOD: u16 = 2;

/// Triangle wave channel for the NES APU
///
/// The timer runs at the CPU rate. The sequencer only advances while both the
/// linear counter and the length counter are non-zero, so silencing the
/// channel freezes the output level instead of dropping it to zero.
pub struct Triangle {
    timer_period: u16,
    timer_counter: u16,
    sequence_position: u8,

    linear_counter: u8,
    linear_counter_reload_value: u8,
    linear_counter_reload_flag: bool,
    /// Also acts as the length counter halt
    control_flag: bool,

    length: LengthCounter,
}

impl Default for Triangle {
    fn default() -> Self {
        Self::new()
    }
}

impl Triangle {
    pub fn new() -> Self {
        Self {
            timer_period: 0,
            timer_counter: 0,
            sequence_position: 0,
            linear_counter: 0,
            linear_counter_reload_value: 0,
            linear_counter_reload_flag: false,
            control_flag: false,
            length: LengthCounter::default(),
        }
    }

    /// $4008: CRRR.RRRR (control flag, linear counter reload value)
    pub fn write_linear_counter(&mut self, value: u8) {
        self.control_flag = value & 0x80 != 0;
        self.linear_counter_reload_value = value & 0x7F;
        self.length.set_halt(self.control_flag);
    }

    /// $400A
    pub fn write_timer_low(&mut self, value: u8) {
        self.timer_period = (self.timer_period & 0x0700) | value as u16;
    }

    /// $400B: LLLL.LTTT, also sets the linear counter reload flag
    pub fn write_length_and_timer_high(&mut self, value: u8) {
        self.timer_period = (self.timer_period & 0x00FF) | (((value & 0x07) as u16) << 8);
        self.length.load(value >> 3);
        self.linear_counter_reload_flag = true;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.length.set_enabled(enabled);
    }

    pub fn is_active(&self) -> bool {
        self.length.is_active()
    }

    pub fn linear_counter(&self) -> u8 {
        self.linear_counter
    }

    /// Clock the timer (called every CPU cycle)
    pub fn clock_timer(&mut self) {
        if self.timer_counter == 0 {
            self.timer_counter = self.timer_period;
            if self.linear_counter > 0
                && self.length.is_active()
                && self.timer_period >= ULTRASONIC_PERIOD
            {
                self.sequence_position = (self.sequence_position + 1) % TRIANGLE_SEQUENCE_LENGTH;
            }
        } else {
            self.timer_counter -= 1;
        }
    }

    /// Quarter frame
    pub fn clock_linear_counter(&mut self) {
        if self.linear_counter_reload_flag {
            self.linear_counter = self.linear_counter_reload_value;
        } else if self.linear_counter > 0 {
            self.linear_counter -= 1;
        }
        if !self.control_flag {
            self.linear_counter_reload_flag = false;
        }
    }

    /// Half frame
    pub fn clock_length_counter(&mut self) {
        self.length.clock();
    }

    pub fn output(&self) -> u8 {
        TRIANGLE_SEQUENCE[self.sequence_position as usize]
    }
}
