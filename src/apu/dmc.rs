use crate::nes::TvSystem;

/// DMC output rates in CPU cycles per bit, indexed by the low nibble of $4010
const NTSC_RATE_TABLE: [u16; 16] = [
    428, 380, 340, 320, 286, 254, 226, 214, 190, 160, 142, 128, 106, 84, 72, 54,
];
const PAL_RATE_TABLE: [u16; 16] = [
    398, 354, 316, 298, 276, 236, 210, 198, 176, 148, 132, 118, 98, 78, 66, 50,
];

/// Delta Modulation Channel
///
/// The output unit shifts one bit per timer period out of an 8-bit shift
/// register, moving the 7-bit output level up or down by 2. The memory reader
/// refills a one-byte sample buffer from cartridge space; the APU services
/// that request through [`Dmc::pending_fetch`] and [`Dmc::fill_sample_buffer`]
/// since it owns access to the cartridge.
pub struct Dmc {
    rate_table: &'static [u16; 16],
    irq_enabled: bool,
    loop_flag: bool,
    timer_period: u16,
    timer_counter: u16,

    output_level: u8,
    shift_register: u8,
    bits_remaining: u8,
    silence: bool,

    sample_address: u16,
    sample_length: u16,
    current_address: u16,
    bytes_remaining: u16,
    sample_buffer: Option<u8>,

    irq_flag: bool,
}

impl Dmc {
    pub fn new(tv_system: TvSystem) -> Self {
        let rate_table = match tv_system {
            TvSystem::Pal => &PAL_RATE_TABLE,
            TvSystem::Ntsc | TvSystem::Dendy => &NTSC_RATE_TABLE,
        };
        Self {
            rate_table,
            irq_enabled: false,
            loop_flag: false,
            timer_period: rate_table[0],
            timer_counter: 0,
            output_level: 0,
            shift_register: 0,
            bits_remaining: 8,
            silence: true,
            sample_address: 0xC000,
            sample_length: 1,
            current_address: 0xC000,
            bytes_remaining: 0,
            sample_buffer: None,
            irq_flag: false,
        }
    }

    /// $4010: IL--.RRRR
    pub fn write_flags_and_rate(&mut self, value: u8) {
        self.irq_enabled = value & 0x80 != 0;
        self.loop_flag = value & 0x40 != 0;
        self.timer_period = self.rate_table[(value & 0x0F) as usize];
        if !self.irq_enabled {
            self.irq_flag = false;
        }
    }

    /// $4011: -DDD.DDDD
    pub fn write_direct_load(&mut self, value: u8) {
        self.output_level = value & 0x7F;
    }

    /// $4012: sample address = $C000 + A * 64
    pub fn write_sample_address(&mut self, value: u8) {
        self.sample_address = 0xC000 | ((value as u16) << 6);
    }

    /// $4013: sample length = L * 16 + 1 bytes
    pub fn write_sample_length(&mut self, value: u8) {
        self.sample_length = ((value as u16) << 4) | 1;
    }

    /// $4015 bit 4
    pub fn set_enabled(&mut self, enabled: bool) {
        self.irq_flag = false;
        if !enabled {
            self.bytes_remaining = 0;
        } else if self.bytes_remaining == 0 {
            self.restart_sample();
        }
    }

    fn restart_sample(&mut self) {
        self.current_address = self.sample_address;
        self.bytes_remaining = self.sample_length;
    }

    /// Address the memory reader wants next, if the buffer is empty
    pub fn pending_fetch(&self) -> Option<u16> {
        if self.sample_buffer.is_none() && self.bytes_remaining > 0 {
            Some(self.current_address)
        } else {
            None
        }
    }

    /// Completes a fetch started by [`Dmc::pending_fetch`]
    pub fn fill_sample_buffer(&mut self, value: u8) {
        self.sample_buffer = Some(value);
        // Address wraps from $FFFF to $8000
        self.current_address = self.current_address.wrapping_add(1) | 0x8000;
        self.bytes_remaining = self.bytes_remaining.saturating_sub(1);
        if self.bytes_remaining == 0 {
            if self.loop_flag {
                self.restart_sample();
            } else if self.irq_enabled {
                self.irq_flag = true;
            }
        }
    }

    /// Clock the timer (called every CPU cycle)
    pub fn clock_timer(&mut self) {
        if self.timer_counter == 0 {
            self.timer_counter = self.timer_period - 1;
            self.clock_output();
        } else {
            self.timer_counter -= 1;
        }
    }

    fn clock_output(&mut self) {
        if !self.silence {
            if self.shift_register & 1 == 1 {
                if self.output_level <= 125 {
                    self.output_level += 2;
                }
            } else if self.output_level >= 2 {
                self.output_level -= 2;
            }
        }
        self.shift_register >>= 1;

        self.bits_remaining -= 1;
        if self.bits_remaining == 0 {
            self.bits_remaining = 8;
            match self.sample_buffer.take() {
                Some(sample) => {
                    self.silence = false;
                    self.shift_register = sample;
                }
                None => self.silence = true,
            }
        }
    }

    pub fn output(&self) -> u8 {
        self.output_level
    }

    pub fn irq_flag(&self) -> bool {
        self.irq_flag
    }

    pub fn is_active(&self) -> bool {
        self.bytes_remaining > 0
    }

    /// Reset keeps only the low bit of the output level
    pub fn reset(&mut self) {
        self.output_level &= 1;
        self.bytes_remaining = 0;
        self.irq_flag = false;
    }
}
