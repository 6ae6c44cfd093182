use std::f32::consts::PI;

/// Cutoff of the DC-blocking high-pass filter
const HIGH_PASS_HZ: f32 = 90.0;
/// Cutoff of the anti-aliasing low-pass filter
const LOW_PASS_HZ: f32 = 14_000.0;

/// Non-linear DAC model
///
/// The two pulse channels share one resistor ladder and triangle, noise and
/// DMC share another; both are approximated with lookup tables indexed by the
/// summed channel levels.
pub struct Mixer {
    pulse_table: [f32; 31],
    tnd_table: [f32; 203],
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    pub fn new() -> Self {
        let mut pulse_table = [0.0; 31];
        for (n, entry) in pulse_table.iter_mut().enumerate().skip(1) {
            *entry = 95.52 / (8128.0 / n as f32 + 100.0);
        }
        let mut tnd_table = [0.0; 203];
        for (n, entry) in tnd_table.iter_mut().enumerate().skip(1) {
            *entry = 163.67 / (24329.0 / n as f32 + 100.0);
        }
        Self {
            pulse_table,
            tnd_table,
        }
    }

    /// Mixes channel levels (pulses and noise 0-15, triangle 0-15, DMC 0-127)
    /// into a 0.0-1.0 signal
    pub fn mix(&self, pulse1: u8, pulse2: u8, triangle: u8, noise: u8, dmc: u8) -> f32 {
        let pulse = self.pulse_table[(pulse1 + pulse2) as usize];
        let tnd_index = 3 * triangle as usize + 2 * noise as usize + dmc as usize;
        pulse + self.tnd_table[tnd_index]
    }
}

/// Single-pole high-pass filter
pub struct HighPass {
    alpha: f32,
    prev_input: f32,
    prev_output: f32,
}

impl HighPass {
    pub fn new(cutoff_hz: f32, clock_hz: f32) -> Self {
        let rc = 1.0 / (2.0 * PI * cutoff_hz);
        let dt = 1.0 / clock_hz;
        Self {
            alpha: rc / (rc + dt),
            prev_input: 0.0,
            prev_output: 0.0,
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.alpha * (self.prev_output + input - self.prev_input);
        self.prev_input = input;
        self.prev_output = output;
        output
    }
}

/// Single-pole low-pass filter
pub struct LowPass {
    alpha: f32,
    prev_output: f32,
}

impl LowPass {
    pub fn new(cutoff_hz: f32, clock_hz: f32) -> Self {
        let rc = 1.0 / (2.0 * PI * cutoff_hz);
        let dt = 1.0 / clock_hz;
        Self {
            alpha: dt / (rc + dt),
            prev_output: 0.0,
        }
    }

    pub fn process(&mut self, input: f32) -> f32 {
        self.prev_output += self.alpha * (input - self.prev_output);
        self.prev_output
    }
}

/// Converts the per-CPU-cycle signal into host-rate PCM
///
/// Each output sample is the average of the CPU-rate samples since the
/// previous one. The phase accumulator is integer so the sample cadence is
/// exact for any sample rate and clock.
pub struct Resampler {
    sample_rate: u64,
    clock_hz: u64,
    phase: u64,
    accumulator: f32,
    count: u32,
    high_pass: Option<HighPass>,
    low_pass: Option<LowPass>,
    volume: f32,
}

impl Resampler {
    pub fn new(sample_rate: u32, clock_hz: u32, filtering: bool, volume: f32) -> Self {
        let (high_pass, low_pass) = if filtering {
            (
                Some(HighPass::new(HIGH_PASS_HZ, clock_hz as f32)),
                Some(LowPass::new(LOW_PASS_HZ, clock_hz as f32)),
            )
        } else {
            (None, None)
        };
        Self {
            sample_rate: sample_rate as u64,
            clock_hz: clock_hz as u64,
            phase: 0,
            accumulator: 0.0,
            count: 0,
            high_pass,
            low_pass,
            volume,
        }
    }

    /// Feeds one CPU cycle's mix; returns a PCM sample when one is due
    pub fn push(&mut self, input: f32) -> Option<i16> {
        let mut signal = input;
        if let Some(filter) = self.high_pass.as_mut() {
            signal = filter.process(signal);
        }
        if let Some(filter) = self.low_pass.as_mut() {
            signal = filter.process(signal);
        }
        self.accumulator += signal;
        self.count += 1;

        self.phase += self.sample_rate;
        if self.phase < self.clock_hz {
            return None;
        }
        self.phase -= self.clock_hz;

        let average = self.accumulator / self.count as f32;
        self.accumulator = 0.0;
        self.count = 0;
        let scaled = (average * self.volume * i16::MAX as f32)
            .clamp(i16::MIN as f32, i16::MAX as f32);
        Some(scaled as i16)
    }
}
