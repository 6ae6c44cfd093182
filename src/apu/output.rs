use std::cell::RefCell;
use std::rc::Rc;

/// Sound hardware on the cartridge (VRC6, and similar chips)
///
/// Clocked by the APU at the CPU rate and mixed after the internal channels.
pub trait ExpansionAudio {
    fn clock(&mut self, cycles: u32);

    /// Current level, on the same scale as the internal mix (roughly 0.0-1.0)
    fn output(&self) -> f32;
}

/// Destination for resampled PCM
pub trait AudioOutput {
    fn output_sample(&mut self, sample: i16);

    /// Called once per emulated frame after the last sample of that frame
    fn flush_frame(&mut self) {}
}

/// Discards all samples
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioOutput for NullAudio {
    fn output_sample(&mut self, _sample: i16) {}
}

/// Collects samples into a shared buffer
///
/// Clones share the same storage, so one handle can be given to the APU while
/// another is kept to drain samples.
#[derive(Debug, Default, Clone)]
pub struct SampleBuffer {
    samples: Rc<RefCell<Vec<i16>>>,
    frames: Rc<RefCell<u64>>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns everything collected so far
    pub fn take(&self) -> Vec<i16> {
        std::mem::take(&mut *self.samples.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.samples.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.borrow().is_empty()
    }

    pub fn frames(&self) -> u64 {
        *self.frames.borrow()
    }
}

impl AudioOutput for SampleBuffer {
    fn output_sample(&mut self, sample: i16) {
        self.samples.borrow_mut().push(sample);
    }

    fn flush_frame(&mut self) {
        *self.frames.borrow_mut() += 1;
    }
}
