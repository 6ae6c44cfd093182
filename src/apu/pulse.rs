use super::envelope::{Envelope, LengthCounter};

/// Duty cycle sequence lookup tables
/// Sequencer starts at 0 and counts down (reads 0, 7, 6, 5, 4, 3, 2, 1)
const DUTY_SEQUENCES: [[u8; 8]; 4] = [
    [0, 0, 0, 0, 0, 0, 0, 1], // 12.5%
    [0, 0, 0, 0, 0, 0, 1, 1], // 25%
    [0, 0, 0, 0, 1, 1, 1, 1], // 50%
    [1, 1, 1, 1, 1, 1, 0, 0], // 25% negated
];

/// Pulse wave channel for the NES APU
/// Generates square waves with variable duty cycle
pub struct Pulse {
    /// Pulse 1 negates with ones' complement, pulse 2 with two's complement
    ones_complement: bool,

    timer_period: u16,
    timer_counter: u16,

    duty_mode: u8,
    sequence_position: u8,

    envelope: Envelope,
    length: LengthCounter,

    sweep_enabled: bool,
    sweep_divider_period: u8,
    sweep_negate: bool,
    sweep_shift: u8,
    sweep_reload: bool,
    sweep_divider: u8,
}

impl Pulse {
    pub fn new(ones_complement: bool) -> Self {
        Self {
            ones_complement,
            timer_period: 0,
            timer_counter: 0,
            duty_mode: 0,
            sequence_position: 0,
            envelope: Envelope::default(),
            length: LengthCounter::default(),
            sweep_enabled: false,
            sweep_divider_period: 0,
            sweep_negate: false,
            sweep_shift: 0,
            sweep_reload: false,
            sweep_divider: 0,
        }
    }

    /// $4000/$4004: DDLC.VVVV (duty, halt/loop, constant volume, volume/period)
    pub fn write_control(&mut self, value: u8) {
        self.duty_mode = value >> 6;
        self.length.set_halt(value & 0x20 != 0);
        self.envelope.write_control(value);
    }

    /// $4001/$4005: EPPP.NSSS
    /// Bit 7: Enable flag
    /// Bits 6-4: Divider period (P), actual period = P + 1
    /// Bit 3: Negate flag
    /// Bits 2-0: Shift count
    pub fn write_sweep(&mut self, value: u8) {
        self.sweep_enabled = (value & 0x80) != 0;
        self.sweep_divider_period = (value >> 4) & 0x07;
        self.sweep_negate = (value & 0x08) != 0;
        self.sweep_shift = value & 0x07;
        self.sweep_reload = true;
    }

    /// $4002/$4006: low 8 bits of the timer period
    pub fn write_timer_low(&mut self, value: u8) {
        self.timer_period = (self.timer_period & 0x0700) | (value as u16);
    }

    /// $4003/$4007: LLLL.LTTT
    /// Also restarts the envelope and the duty sequence
    pub fn write_length_and_timer_high(&mut self, value: u8) {
        self.timer_period = (self.timer_period & 0x00FF) | (((value & 0x07) as u16) << 8);
        self.length.load(value >> 3);
        self.envelope.restart();
        self.sequence_position = 0;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.length.set_enabled(enabled);
    }

    pub fn timer_period(&self) -> u16 {
        self.timer_period
    }

    pub fn length_counter(&self) -> u8 {
        self.length.value()
    }

    pub fn is_active(&self) -> bool {
        self.length.is_active()
    }

    /// Clock the timer (called every APU cycle, which is every 2 CPU cycles)
    pub fn clock_timer(&mut self) {
        if self.timer_counter == 0 {
            self.timer_counter = self.timer_period;
            self.sequence_position = (self.sequence_position + 7) & 7;
        } else {
            self.timer_counter -= 1;
        }
    }

    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub fn clock_length_counter(&mut self) {
        self.length.clock();
    }

    /// Target = current period + (current period >> shift), negated per channel
    pub fn sweep_target_period(&self) -> u16 {
        let change = self.timer_period >> self.sweep_shift;
        if self.sweep_negate {
            let negated = if self.ones_complement {
                change.wrapping_neg().wrapping_sub(1)
            } else {
                change.wrapping_neg()
            };
            self.timer_period.wrapping_add(negated)
        } else {
            self.timer_period.wrapping_add(change)
        }
    }

    /// Mutes if the current period is below 8 or the target overflows $7FF,
    /// even while the sweep unit is disabled
    pub fn is_sweep_muting(&self) -> bool {
        self.timer_period < 8
            || (!self.sweep_negate && self.sweep_target_period() > 0x7FF)
    }

    /// Clock the sweep unit (called by half frame)
    pub fn clock_sweep(&mut self) {
        let should_update = self.sweep_divider == 0;

        if self.sweep_divider == 0 || self.sweep_reload {
            self.sweep_divider = self.sweep_divider_period;
            self.sweep_reload = false;
        } else {
            self.sweep_divider -= 1;
        }

        if should_update && self.sweep_enabled && self.sweep_shift != 0 && !self.is_sweep_muting()
        {
            self.timer_period = self.sweep_target_period();
        }
    }

    /// Current channel output (0-15)
    pub fn output(&self) -> u8 {
        if !self.length.is_active()
            || self.is_sweep_muting()
            || DUTY_SEQUENCES[self.duty_mode as usize][self.sequence_position as usize] == 0
        {
            return 0;
        }
        self.envelope.volume()
    }

    #[cfg(test)]
    fn envelope_start_pending(&self) -> bool {
        self.envelope.start_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audible_pulse() -> Pulse {
        let mut pulse = Pulse::new(true);
        pulse.set_enabled(true);
        pulse.write_control(0b1011_1111); // 50% duty, halt, constant volume 15
        pulse.write_timer_low(0x40);
        pulse.write_length_and_timer_high(0x08);
        pulse
    }

    #[test]
    fn test_timer_period_assembled_from_two_registers() {
        let mut pulse = Pulse::new(true);
        pulse.write_timer_low(0xAB);
        pulse.write_length_and_timer_high(0xFD);
        assert_eq!(pulse.timer_period(), 0x5AB);
    }

    #[test]
    fn test_duty_sequence_counts_down() {
        let mut pulse = audible_pulse();
        pulse.write_timer_low(8);
        pulse.write_length_and_timer_high(0x08);

        // 50% duty: positions 7, 6, 5, 4 are high, 3, 2, 1, 0 low
        let mut outputs = Vec::new();
        for _ in 0..8 {
            pulse.clock_timer();
            outputs.push(pulse.output());
            for _ in 0..8 {
                pulse.clock_timer();
            }
        }
        assert_eq!(outputs, vec![15, 15, 15, 15, 0, 0, 0, 0]);
    }

    #[test]
    fn test_length_write_restarts_envelope() {
        let mut pulse = Pulse::new(true);
        pulse.set_enabled(true);
        pulse.write_length_and_timer_high(0x00);
        assert!(pulse.envelope_start_pending());
        pulse.clock_envelope();
        assert!(!pulse.envelope_start_pending());
    }

    #[test]
    fn test_disabled_channel_ignores_length_load() {
        let mut pulse = Pulse::new(true);
        pulse.write_length_and_timer_high(0xF8);
        assert_eq!(pulse.length_counter(), 0);
        assert_eq!(pulse.output(), 0);
    }

    #[test]
    fn test_sweep_target_negate_differs_between_channels() {
        let mut pulse1 = Pulse::new(true);
        let mut pulse2 = Pulse::new(false);
        for pulse in [&mut pulse1, &mut pulse2] {
            pulse.write_timer_low(0x00);
            pulse.write_length_and_timer_high(0x01); // period $100
            pulse.write_sweep(0b1000_1001); // negate, shift 1
        }
        assert_eq!(pulse1.sweep_target_period(), 0x100 - 0x80 - 1);
        assert_eq!(pulse2.sweep_target_period(), 0x100 - 0x80);
    }

    #[test]
    fn test_sweep_mutes_low_period_and_overflow() {
        let mut pulse = audible_pulse();
        pulse.write_timer_low(0x07);
        pulse.write_length_and_timer_high(0x08);
        assert!(pulse.is_sweep_muting());

        pulse.write_timer_low(0xFF);
        pulse.write_length_and_timer_high(0x0F); // period $7FF
        pulse.write_sweep(0x01); // disabled, shift 1, target overflows
        assert!(pulse.is_sweep_muting());
        assert_eq!(pulse.output(), 0);
    }

    #[test]
    fn test_sweep_updates_period_on_divider_expiry() {
        let mut pulse = audible_pulse();
        pulse.write_sweep(0b1001_0010); // enabled, period 1 (2 half frames), shift 2
        pulse.clock_sweep(); // divider 0 at reload: update $40 -> $50, reload to 1
        assert_eq!(pulse.timer_period(), 0x50);
        pulse.clock_sweep(); // divider 1 -> 0
        assert_eq!(pulse.timer_period(), 0x50);
        pulse.clock_sweep(); // update again
        assert_eq!(pulse.timer_period(), 0x64);
    }

    #[test]
    fn test_sweep_disabled_keeps_period() {
        let mut pulse = audible_pulse();
        pulse.write_sweep(0b0000_0001);
        for _ in 0..4 {
            pulse.clock_sweep();
        }
        assert_eq!(pulse.timer_period(), 0x40);
    }
}
