use log::debug;

use super::dmc::Dmc;
use super::frame_counter::FrameCounter;
use super::mixer::{Mixer, Resampler};
use super::noise::Noise;
use super::output::{AudioOutput, NullAudio};
use super::pulse::Pulse;
use super::triangle::Triangle;
use crate::cartridge::Mapper;
use crate::config::Config;
use crate::nes::TvSystem;

// Status register ($4015) bit masks
const STATUS_PULSE1: u8 = 1 << 0;
const STATUS_PULSE2: u8 = 1 << 1;
const STATUS_TRIANGLE: u8 = 1 << 2;
const STATUS_NOISE: u8 = 1 << 3;
const STATUS_DMC: u8 = 1 << 4;
const STATUS_OPEN_BUS: u8 = 1 << 5;
const STATUS_FRAME_IRQ: u8 = 1 << 6;
const STATUS_DMC_IRQ: u8 = 1 << 7;

/// CPU cycles the DMC memory reader takes from the CPU per fetched byte
const DMC_STALL_CYCLES: u32 = 4;

/// Audio Processing Unit
///
/// The APU is synchronised lazily: it keeps its own CPU-cycle count and
/// [`Apu::update_to`] replays every cycle between that count and the
/// requested one. The bus calls it before any APU register access and at the
/// end of each frame, so every register side effect lands on the right cycle
/// no matter how rarely the APU is caught up.
pub struct Apu {
    frame_counter: FrameCounter,
    pulse1: Pulse,
    pulse2: Pulse,
    triangle: Triangle,
    noise: Noise,
    dmc: Dmc,

    mixer: Mixer,
    resampler: Resampler,
    output: Box<dyn AudioOutput>,

    /// CPU cycles simulated so far
    cycle: u64,
    /// CPU cycles owed to DMC fetches, collected by the bus
    stall_cycles: u32,
}

impl Apu {
    pub fn new(tv_system: TvSystem, config: &Config) -> Self {
        Self {
            frame_counter: FrameCounter::new(tv_system),
            pulse1: Pulse::new(true),
            pulse2: Pulse::new(false),
            triangle: Triangle::new(),
            noise: Noise::new(tv_system),
            dmc: Dmc::new(tv_system),
            mixer: Mixer::new(),
            resampler: Resampler::new(
                config.sample_rate,
                tv_system.cpu_clock_hz(),
                config.audio_filtering,
                config.volume,
            ),
            output: Box::new(NullAudio),
            cycle: 0,
            stall_cycles: 0,
        }
    }

    /// Replace the sample sink, returning the previous one
    pub fn set_output(&mut self, output: Box<dyn AudioOutput>) -> Box<dyn AudioOutput> {
        std::mem::replace(&mut self.output, output)
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Catch up to `cpu_cycle`, replaying channel clocks, frame sequencer
    /// steps and sample output in order
    pub fn update_to(&mut self, cpu_cycle: u64, cart: &mut dyn Mapper) {
        while self.cycle < cpu_cycle {
            self.step(cart);
            self.cycle += 1;
        }
    }

    fn step(&mut self, cart: &mut dyn Mapper) {
        let (quarter_frame, half_frame) = self.frame_counter.clock();
        if quarter_frame {
            self.pulse1.clock_envelope();
            self.pulse2.clock_envelope();
            self.triangle.clock_linear_counter();
            self.noise.clock_envelope();
        }
        if half_frame {
            self.pulse1.clock_length_counter();
            self.pulse1.clock_sweep();
            self.pulse2.clock_length_counter();
            self.pulse2.clock_sweep();
            self.triangle.clock_length_counter();
            self.noise.clock_length_counter();
        }

        // Pulse timers run at the APU rate, everything else at the CPU rate
        if self.cycle & 1 == 1 {
            self.pulse1.clock_timer();
            self.pulse2.clock_timer();
        }
        self.triangle.clock_timer();
        self.noise.clock_timer();
        self.dmc.clock_timer();

        if let Some(addr) = self.dmc.pending_fetch() {
            let value = cart.cart_read(addr);
            self.dmc.fill_sample_buffer(value);
            self.stall_cycles += DMC_STALL_CYCLES;
        }

        let mut level = self.mixer.mix(
            self.pulse1.output(),
            self.pulse2.output(),
            self.triangle.output(),
            self.noise.output(),
            self.dmc.output(),
        );
        if let Some(chip) = cart.expansion_audio() {
            chip.clock(1);
            level += chip.output();
        }

        if let Some(sample) = self.resampler.push(level) {
            self.output.output_sample(sample);
        }
    }

    /// Write to $4000-$4013, $4015 or $4017
    pub fn write_register(&mut self, addr: u16, value: u8, cpu_cycle: u64, cart: &mut dyn Mapper) {
        self.update_to(cpu_cycle, cart);
        match addr {
            0x4000 => self.pulse1.write_control(value),
            0x4001 => self.pulse1.write_sweep(value),
            0x4002 => self.pulse1.write_timer_low(value),
            0x4003 => self.pulse1.write_length_and_timer_high(value),
            0x4004 => self.pulse2.write_control(value),
            0x4005 => self.pulse2.write_sweep(value),
            0x4006 => self.pulse2.write_timer_low(value),
            0x4007 => self.pulse2.write_length_and_timer_high(value),
            0x4008 => self.triangle.write_linear_counter(value),
            0x400A => self.triangle.write_timer_low(value),
            0x400B => self.triangle.write_length_and_timer_high(value),
            0x400C => self.noise.write_envelope(value),
            0x400E => self.noise.write_period(value),
            0x400F => self.noise.write_length(value),
            0x4010 => self.dmc.write_flags_and_rate(value),
            0x4011 => self.dmc.write_direct_load(value),
            0x4012 => self.dmc.write_sample_address(value),
            0x4013 => self.dmc.write_sample_length(value),
            0x4015 => self.write_status(value),
            0x4017 => self.frame_counter.write_register(value, self.cycle),
            _ => {}
        }
    }

    fn write_status(&mut self, value: u8) {
        self.pulse1.set_enabled(value & STATUS_PULSE1 != 0);
        self.pulse2.set_enabled(value & STATUS_PULSE2 != 0);
        self.triangle.set_enabled(value & STATUS_TRIANGLE != 0);
        self.noise.set_enabled(value & STATUS_NOISE != 0);
        self.dmc.set_enabled(value & STATUS_DMC != 0);
    }

    /// Read the APU status register ($4015)
    /// Returns: IF-D NT21
    /// - Bit 7 (I): DMC interrupt flag
    /// - Bit 6 (F): Frame counter interrupt flag
    /// - Bit 5: Open bus
    /// - Bit 4 (D): DMC active (bytes remaining > 0)
    /// - Bits 3-0: length counters of noise, triangle, pulse 2, pulse 1 non-zero
    ///
    /// Side effect: Clears the frame counter interrupt flag
    pub fn read_status(&mut self, cpu_cycle: u64, open_bus: u8, cart: &mut dyn Mapper) -> u8 {
        self.update_to(cpu_cycle, cart);

        let mut status = open_bus & STATUS_OPEN_BUS;
        let flags = [
            (self.pulse1.is_active(), STATUS_PULSE1),
            (self.pulse2.is_active(), STATUS_PULSE2),
            (self.triangle.is_active(), STATUS_TRIANGLE),
            (self.noise.is_active(), STATUS_NOISE),
            (self.dmc.is_active(), STATUS_DMC),
            (self.frame_counter.irq_flag(), STATUS_FRAME_IRQ),
            (self.dmc.irq_flag(), STATUS_DMC_IRQ),
        ];
        for (set, bit) in flags {
            if set {
                status |= bit;
            }
        }

        self.frame_counter.clear_irq_flag();
        status
    }

    pub fn frame_irq(&self) -> bool {
        self.frame_counter.irq_flag()
    }

    pub fn dmc_irq(&self) -> bool {
        self.dmc.irq_flag()
    }

    /// Drain the CPU cycles stolen by DMC fetches since the last call
    pub fn take_stall_cycles(&mut self) -> u32 {
        std::mem::take(&mut self.stall_cycles)
    }

    /// Catch up to the end of the frame and signal the sink
    pub fn finish_frame(&mut self, cpu_cycle: u64, cart: &mut dyn Mapper) {
        self.update_to(cpu_cycle, cart);
        self.output.flush_frame();
    }

    /// Console reset: silence every channel and restart the frame sequencer
    pub fn reset(&mut self) {
        debug!("APU reset at cycle {}", self.cycle);
        self.write_status(0);
        self.dmc.reset();
        self.frame_counter.reset();
    }
}
