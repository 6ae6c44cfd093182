/// Length counter load table (indexed by bits 7-3 of $4003/$4007/$400B/$400F)
pub const LENGTH_COUNTER_TABLE: [u8; 32] = [
    10, 254, 20, 2, 40, 4, 80, 6, 160, 8, 60, 10, 14, 12, 26, 14, 12, 16, 24, 18, 48, 20, 96, 22,
    192, 24, 72, 26, 16, 28, 32, 30,
];

/// Volume envelope shared by the pulse and noise channels
///
/// Bits of the control register ($4000/$4004/$400C):
/// - Bit 5: loop (also the length counter halt flag)
/// - Bit 4: constant volume
/// - Bits 3-0: constant volume level or envelope divider period
#[derive(Debug, Clone, Default)]
pub struct Envelope {
    start: bool,
    looping: bool,
    constant_volume: bool,
    period: u8,
    divider: u8,
    decay_level: u8,
}

impl Envelope {
    pub fn write_control(&mut self, value: u8) {
        self.looping = value & 0x20 != 0;
        self.constant_volume = value & 0x10 != 0;
        self.period = value & 0x0F;
    }

    /// Set by writes to the channel's length register
    pub fn restart(&mut self) {
        self.start = true;
    }

    /// Clocked by the frame counter on every quarter frame
    pub fn clock(&mut self) {
        if self.start {
            self.start = false;
            self.decay_level = 15;
            self.divider = self.period;
            return;
        }

        if self.divider > 0 {
            self.divider -= 1;
            return;
        }

        self.divider = self.period;
        if self.decay_level > 0 {
            self.decay_level -= 1;
        } else if self.looping {
            self.decay_level = 15;
        }
    }

    pub fn volume(&self) -> u8 {
        if self.constant_volume {
            self.period
        } else {
            self.decay_level
        }
    }

    pub fn start_pending(&self) -> bool {
        self.start
    }
}

/// Length counter, silencing a channel once it counts down to zero
#[derive(Debug, Clone, Default)]
pub struct LengthCounter {
    value: u8,
    halt: bool,
    enabled: bool,
}

impl LengthCounter {
    /// Load from the 5-bit table index; ignored while the channel is disabled in $4015
    pub fn load(&mut self, index: u8) {
        if self.enabled {
            self.value = LENGTH_COUNTER_TABLE[(index & 0x1F) as usize];
        }
    }

    pub fn set_halt(&mut self, halt: bool) {
        self.halt = halt;
    }

    /// Disabling the channel clears the counter immediately
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.value = 0;
        }
    }

    /// Clocked on every half frame
    pub fn clock(&mut self) {
        if !self.halt && self.value > 0 {
            self.value -= 1;
        }
    }

    pub fn is_active(&self) -> bool {
        self.value > 0
    }

    pub fn value(&self) -> u8 {
        self.value
    }
}
