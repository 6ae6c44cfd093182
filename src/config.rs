use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::nes::TvSystem;

const MIN_SAMPLE_RATE: u32 = 8_000;
const MAX_SAMPLE_RATE: u32 = 192_000;
const MAX_VOLUME: f32 = 4.0;

/// Console configuration, built once and handed to `Nes::new`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Host audio sample rate in Hz
    pub sample_rate: u32,
    /// Forced TV standard; `None` follows the ROM header
    pub tv_system: Option<TvSystem>,
    /// Run the DC-blocking high-pass and the low-pass filter on the mix
    pub audio_filtering: bool,
    /// Output gain applied after mixing
    pub volume: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            tv_system: None,
            audio_filtering: true,
            volume: 1.0,
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file. Missing keys use defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&text)?;
        Ok(config.sanitized())
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, text)
    }

    /// Clamp out-of-range values, warning about each one
    pub fn sanitized(mut self) -> Self {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            let clamped = self.sample_rate.clamp(MIN_SAMPLE_RATE, MAX_SAMPLE_RATE);
            warn!(
                "Sample rate {} is out of range. Clamping to {}.",
                self.sample_rate, clamped
            );
            self.sample_rate = clamped;
        }
        if !self.volume.is_finite() || !(0.0..=MAX_VOLUME).contains(&self.volume) {
            let clamped = if self.volume.is_finite() {
                self.volume.clamp(0.0, MAX_VOLUME)
            } else {
                1.0
            };
            warn!("Volume {} is out of range. Clamping to {}.", self.volume, clamped);
            self.volume = clamped;
        }
        self
    }
}
