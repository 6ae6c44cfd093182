use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::apu::{Apu, AudioOutput, NullAudio};
use crate::cartridge::Cartridge;
use crate::config::Config;
use crate::cpu::{Cpu, CpuBus, CpuTrace};
use crate::error::LoadError;
use crate::joypad::Button;
use crate::mem_controller::MemController;
use crate::ppu::Ppu;
use crate::screen_buffer::FrameBuffer;

/// Television standard, which fixes the master clock and frame shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TvSystem {
    Ntsc,
    Pal,
    /// PAL-region famiclone: PAL frame, NTSC-like CPU divider
    Dendy,
}

impl TvSystem {
    pub fn cpu_clock_hz(self) -> u32 {
        match self {
            TvSystem::Ntsc => 1_789_773,
            TvSystem::Pal => 1_662_607,
            TvSystem::Dendy => 1_773_448,
        }
    }

    pub fn scanlines_per_frame(self) -> u16 {
        match self {
            TvSystem::Ntsc => 262,
            TvSystem::Pal | TvSystem::Dendy => 312,
        }
    }

    /// Scanline whose dot 1 sets the vblank flag
    pub fn vblank_scanline(self) -> u16 {
        match self {
            TvSystem::Ntsc | TvSystem::Pal => 241,
            TvSystem::Dendy => 291,
        }
    }

    /// Only the NTSC PPU drops a dot on odd frames
    pub fn has_odd_frame_skip(self) -> bool {
        self == TvSystem::Ntsc
    }

    /// PPU dots per CPU cycle, repeating. PAL runs 16 dots per 5 CPU cycles.
    pub fn clock_pattern(self) -> &'static [u8] {
        match self {
            TvSystem::Ntsc | TvSystem::Dendy => &[3],
            TvSystem::Pal => &[4, 3, 3, 3, 3],
        }
    }

    pub fn frames_per_second(self) -> f64 {
        let dots_per_frame = self.scanlines_per_frame() as f64 * 341.0;
        let pattern = self.clock_pattern();
        let dots_per_cpu_cycle =
            pattern.iter().map(|&d| d as f64).sum::<f64>() / pattern.len() as f64;
        self.cpu_clock_hz() as f64 * dots_per_cpu_cycle / dots_per_frame
    }
}

/// Counts PPU dots down to the next CPU cycle
struct ClockDivider {
    pattern: &'static [u8],
    position: usize,
    countdown: u8,
}

impl ClockDivider {
    fn new(tv_system: TvSystem) -> Self {
        let pattern = tv_system.clock_pattern();
        Self {
            pattern,
            position: 0,
            countdown: pattern[0],
        }
    }

    /// Count one PPU dot; true when the CPU runs a cycle on it
    fn tick(&mut self) -> bool {
        self.countdown -= 1;
        if self.countdown > 0 {
            return false;
        }
        self.position = (self.position + 1) % self.pattern.len();
        self.countdown = self.pattern[self.position];
        true
    }
}

/// Outcome of [`Nes::run_frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Completed,
    /// A KIL opcode locked the CPU
    Halted,
}

/// One emulated console with a cartridge inserted
///
/// The master loop steps the PPU one dot at a time. Every few dots (see
/// [`TvSystem::clock_pattern`]) the CPU runs one cycle and the mapper is told
/// about it. The APU is caught up lazily by the bus.
pub struct Nes {
    cpu: Cpu,
    bus: MemController,
    divider: ClockDivider,
    config: Config,
    tv_system: TvSystem,
}

impl Nes {
    /// Power on with `rom` inserted
    pub fn new(config: Config, rom: &[u8]) -> Result<Self, LoadError> {
        let cartridge = Cartridge::new(rom)?;
        let tv_system = config.tv_system.unwrap_or(cartridge.tv_system());
        info!(
            "Powering on with mapper {} ({:?})",
            cartridge.mapper_number(),
            tv_system
        );

        let ppu = Ppu::new(tv_system);
        let apu = Apu::new(tv_system, &config);
        let mut bus = MemController::new(ppu, apu, cartridge.into_mapper());
        let mut cpu = Cpu::new();
        cpu.reset(&mut bus);

        Ok(Self {
            cpu,
            bus,
            divider: ClockDivider::new(tv_system),
            config,
            tv_system,
        })
    }

    /// Swap cartridges with a power cycle. On error the running session is
    /// left as it was. The audio sink moves to the new session.
    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), LoadError> {
        let mut next = Nes::new(self.config.clone(), rom)?;
        let output = self.bus.apu_mut().set_output(Box::new(NullAudio));
        next.bus.apu_mut().set_output(output);
        *self = next;
        Ok(())
    }

    /// Reset button
    pub fn reset(&mut self) {
        debug!("Console reset");
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.divider = ClockDivider::new(self.tv_system);
    }

    /// One PPU dot, plus a CPU cycle when the divider says so. Returns true
    /// when the PPU finished a frame on this dot.
    fn clock(&mut self) -> bool {
        self.bus.clock_ppu();
        if self.divider.tick() {
            self.cpu.run_cycle(&mut self.bus);
            self.bus.end_cpu_cycle();
        }
        let complete = self.bus.ppu_mut().take_frame_complete();
        if complete {
            self.bus.finish_frame();
        }
        complete
    }

    /// Run until the PPU enters vblank or the CPU halts
    pub fn run_frame(&mut self) -> FrameStatus {
        while !self.cpu.is_halted() {
            if self.clock() {
                return FrameStatus::Completed;
            }
        }
        self.bus.finish_frame();
        FrameStatus::Halted
    }

    /// Run until the CPU is about to start its next instruction or
    /// interrupt. The first call after power-on or reset finishes the reset
    /// sequence.
    pub fn step_instruction(&mut self) -> FrameStatus {
        let start = self.cpu.total_cycles();
        while !self.cpu.is_halted() {
            self.clock();
            if self.cpu.total_cycles() != start && self.cpu.cycles_left() == 0 {
                return FrameStatus::Completed;
            }
        }
        FrameStatus::Halted
    }

    /// Trace record for the instruction at PC, with the PPU position
    pub fn trace(&mut self) -> CpuTrace {
        let mut trace = self.cpu.trace(&mut self.bus);
        trace.ppu = Some((self.bus.ppu().scanline(), self.bus.ppu().dot()));
        trace
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &MemController {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut MemController {
        &mut self.bus
    }

    pub fn is_halted(&self) -> bool {
        self.cpu.is_halted()
    }

    /// Read CPU memory without side effects
    pub fn peek(&mut self, addr: u16) -> u8 {
        self.bus.peek(addr)
    }

    pub fn frame(&self) -> &FrameBuffer {
        self.bus.ppu().frame()
    }

    pub fn tv_system(&self) -> TvSystem {
        self.tv_system
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replace the sample sink, returning the previous one
    pub fn set_audio_output(&mut self, output: Box<dyn AudioOutput>) -> Box<dyn AudioOutput> {
        self.bus.apu_mut().set_output(output)
    }

    /// Set one button on controller `port` (0 or 1)
    pub fn set_button(&mut self, port: usize, button: Button, pressed: bool) {
        if let Some(pad) = self.bus.joypad_mut(port) {
            pad.set_button(button, pressed);
        }
    }

    /// Set every button on controller `port`, bit 0 = A
    pub fn set_buttons(&mut self, port: usize, states: u8) {
        if let Some(pad) = self.bus.joypad_mut(port) {
            pad.set_buttons(states);
        }
    }

    /// Battery-backed PRG-RAM, when the cartridge has a battery
    pub fn battery_ram(&self) -> Option<&[u8]> {
        self.bus.mapper().battery_ram()
    }

    pub fn load_battery_ram(&mut self, data: &[u8]) {
        self.bus.mapper_mut().load_battery_ram(data);
    }
}
