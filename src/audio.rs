//! SDL2 audio sink for the APU
//!
//! Samples are gathered during a frame and queued on the device when the
//! APU flushes the frame. If the device falls behind, whole frames are
//! dropped to keep latency bounded.

use log::{debug, warn};
use sdl2::audio::{AudioQueue, AudioSpecDesired};

use crate::apu::AudioOutput;

/// Queued audio beyond this many frames is treated as lag
const MAX_QUEUED_FRAMES: u32 = 4;
/// Size of one sample in the device queue
const SAMPLE_BYTES: u32 = 2;

pub struct SdlAudio {
    queue: AudioQueue<i16>,
    pending: Vec<i16>,
    max_queued_bytes: u32,
}

impl SdlAudio {
    /// Open a mono 16-bit playback queue at `sample_rate` Hz and start it
    ///
    /// `frames_per_second` sizes the lag limit.
    pub fn new(
        sdl_context: &sdl2::Sdl,
        sample_rate: u32,
        frames_per_second: f64,
    ) -> Result<Self, String> {
        let audio_subsystem = sdl_context.audio()?;

        let desired_spec = AudioSpecDesired {
            freq: Some(sample_rate as i32),
            channels: Some(1), // Mono audio
            samples: Some(1024),
        };
        let queue = audio_subsystem.open_queue::<i16, _>(None, &desired_spec)?;
        let obtained = queue.spec().freq;
        if obtained != sample_rate as i32 {
            warn!("Requested {} Hz audio, device runs at {} Hz", sample_rate, obtained);
        }
        queue.resume();

        let samples_per_frame = (sample_rate as f64 / frames_per_second).ceil() as u32;
        Ok(Self {
            queue,
            pending: Vec::with_capacity(samples_per_frame as usize),
            max_queued_bytes: samples_per_frame * SAMPLE_BYTES * MAX_QUEUED_FRAMES,
        })
    }

    pub fn pause(&self) {
        self.queue.pause();
    }

    pub fn resume(&self) {
        self.queue.resume();
    }
}

impl AudioOutput for SdlAudio {
    fn output_sample(&mut self, sample: i16) {
        self.pending.push(sample);
    }

    fn flush_frame(&mut self) {
        if self.queue.size() > self.max_queued_bytes {
            debug!("Audio queue is {} bytes behind, dropping a frame", self.queue.size());
        } else if let Err(e) = self.queue.queue_audio(&self.pending) {
            warn!("Failed to queue audio: {}", e);
        }
        self.pending.clear();
    }
}
