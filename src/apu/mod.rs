mod apu;
pub mod dmc;
pub mod envelope;
pub mod frame_counter;
pub mod mixer;
pub mod noise;
mod output;
pub mod pulse;
pub mod triangle;

pub use apu::Apu;
pub use output::{AudioOutput, ExpansionAudio, NullAudio, SampleBuffer};
