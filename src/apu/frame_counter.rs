use crate::nes::TvSystem;

/// CPU cycles, counted from a sequencer reset, at which each step fires
#[derive(Debug)]
struct StepTiming {
    /// Quarter, quarter+half, quarter, quarter+half (4-step) or the first
    /// four steps of 5-step mode, where the fourth step is silent
    steps: [u32; 4],
    five_step_end: u32,
}

const NTSC_TIMING: StepTiming = StepTiming {
    steps: [7457, 14913, 22371, 29829],
    five_step_end: 37281,
};

const PAL_TIMING: StepTiming = StepTiming {
    steps: [8313, 16627, 24939, 33253],
    five_step_end: 41565,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    FourStep,
    FiveStep,
}

/// Frame Counter for the NES APU
/// Sequences envelope, sweep, and length counter clocks
/// Operates in two modes: 4-step and 5-step
pub struct FrameCounter {
    timing: &'static StepTiming,
    mode: Mode,
    irq_inhibit: bool,
    cycle_counter: u32,
    irq_flag: bool,
    /// $4017 value waiting to reset the sequencer, and cycles left until it does
    pending_write: Option<(u8, u8)>,
    last_write: u8,
}

impl FrameCounter {
    pub fn new(tv_system: TvSystem) -> Self {
        let timing = match tv_system {
            TvSystem::Pal => &PAL_TIMING,
            TvSystem::Ntsc | TvSystem::Dendy => &NTSC_TIMING,
        };
        Self {
            timing,
            mode: Mode::FourStep,
            irq_inhibit: false,
            cycle_counter: 0,
            irq_flag: false,
            pending_write: None,
            last_write: 0,
        }
    }

    /// Write to the frame counter register ($4017)
    /// Bit 7: Mode (0 = 4-step, 1 = 5-step)
    /// Bit 6: IRQ inhibit (1 = disable IRQ)
    ///
    /// The inhibit flag takes effect at once. The sequencer reset lands 3 CPU
    /// cycles later when written on an even APU cycle, 4 when written on an odd one.
    pub fn write_register(&mut self, value: u8, apu_cycle: u64) {
        self.irq_inhibit = value & 0x40 != 0;
        if self.irq_inhibit {
            self.irq_flag = false;
        }
        let delay = if apu_cycle & 1 == 0 { 3 } else { 4 };
        self.pending_write = Some((value, delay));
        self.last_write = value;
    }

    /// Console reset behaves like rewriting the last $4017 value
    pub fn reset(&mut self) {
        self.irq_flag = false;
        self.write_register(self.last_write, 0);
    }

    pub fn is_five_step(&self) -> bool {
        self.mode == Mode::FiveStep
    }

    pub fn cycle_counter(&self) -> u32 {
        self.cycle_counter
    }

    pub fn irq_flag(&self) -> bool {
        self.irq_flag
    }

    /// Side effect of reading $4015
    pub fn clear_irq_flag(&mut self) {
        self.irq_flag = false;
    }

    /// Clock the frame counter by one CPU cycle
    /// Returns (quarter_frame, half_frame) signals
    pub fn clock(&mut self) -> (bool, bool) {
        if let Some((value, delay)) = self.pending_write {
            if delay <= 1 {
                self.pending_write = None;
                self.cycle_counter = 0;
                if value & 0x80 != 0 {
                    self.mode = Mode::FiveStep;
                    // Entering 5-step mode clocks both units immediately
                    return (true, true);
                }
                self.mode = Mode::FourStep;
                return (false, false);
            }
            self.pending_write = Some((value, delay - 1));
        }

        self.cycle_counter += 1;
        let [step1, step2, step3, step4] = self.timing.steps;
        let c = self.cycle_counter;

        match self.mode {
            Mode::FourStep => {
                // The IRQ flag is asserted on the three cycles around the last step
                if (step4 - 1..=step4 + 1).contains(&c) && !self.irq_inhibit {
                    self.irq_flag = true;
                }
                if c == step4 + 1 {
                    self.cycle_counter = 0;
                }
                match c {
                    _ if c == step1 || c == step3 => (true, false),
                    _ if c == step2 || c == step4 => (true, true),
                    _ => (false, false),
                }
            }
            Mode::FiveStep => {
                let end = self.timing.five_step_end;
                if c == end + 1 {
                    self.cycle_counter = 0;
                }
                match c {
                    _ if c == step1 || c == step3 => (true, false),
                    _ if c == step2 || c == end => (true, true),
                    _ => (false, false),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_n(counter: &mut FrameCounter, n: u32) -> (u32, u32) {
        let mut quarters = 0;
        let mut halves = 0;
        for _ in 0..n {
            let (quarter, half) = counter.clock();
            quarters += quarter as u32;
            halves += half as u32;
        }
        (quarters, halves)
    }

    #[test]
    fn test_four_step_sequence_ntsc() {
        let mut counter = FrameCounter::new(TvSystem::Ntsc);
        for _ in 0..7456 {
            assert_eq!(counter.clock(), (false, false));
        }
        assert_eq!(counter.clock(), (true, false));
        assert_eq!(clock_n(&mut counter, 14913 - 7457), (1, 1));
        assert_eq!(clock_n(&mut counter, 29829 - 14913), (2, 1));
        assert!(counter.irq_flag());
    }

    #[test]
    fn test_four_step_period_and_irq_window() {
        let mut counter = FrameCounter::new(TvSystem::Ntsc);
        clock_n(&mut counter, 29827);
        assert!(!counter.irq_flag());
        counter.clock();
        assert!(counter.irq_flag());

        counter.clear_irq_flag();
        clock_n(&mut counter, 2); // 29829 and 29830 re-assert
        assert!(counter.irq_flag());
        assert_eq!(counter.cycle_counter(), 0);

        // Second frame has the same shape
        assert_eq!(clock_n(&mut counter, 29830), (4, 2));
    }

    #[test]
    fn test_irq_inhibit_clears_and_blocks() {
        let mut counter = FrameCounter::new(TvSystem::Ntsc);
        clock_n(&mut counter, 29830);
        assert!(counter.irq_flag());

        counter.write_register(0x40, 0);
        assert!(!counter.irq_flag());
        clock_n(&mut counter, 40000);
        assert!(!counter.irq_flag());
    }

    #[test]
    fn test_five_step_sequence() {
        let mut counter = FrameCounter::new(TvSystem::Ntsc);
        counter.write_register(0x80, 0);
        clock_n(&mut counter, 2);
        // Reset lands on the third cycle with an immediate clock
        assert_eq!(counter.clock(), (true, true));
        assert!(counter.is_five_step());

        assert_eq!(clock_n(&mut counter, 37282), (4, 2));
        assert!(!counter.irq_flag());
        assert_eq!(counter.cycle_counter(), 0);
    }

    #[test]
    fn test_write_delay_depends_on_parity() {
        let mut counter = FrameCounter::new(TvSystem::Ntsc);
        clock_n(&mut counter, 100);
        counter.write_register(0x00, 1);
        clock_n(&mut counter, 3);
        assert_eq!(counter.cycle_counter(), 103);
        counter.clock();
        assert_eq!(counter.cycle_counter(), 0);
    }

    #[test]
    fn test_pal_step_lengths() {
        let mut counter = FrameCounter::new(TvSystem::Pal);
        assert_eq!(clock_n(&mut counter, 8312), (0, 0));
        assert_eq!(counter.clock(), (true, false));
        assert_eq!(clock_n(&mut counter, 33253 - 8313), (3, 2));
        assert!(counter.irq_flag());
    }
}
