use std::io;

use thiserror::Error;

/// Errors raised while turning a ROM image into a running console.
///
/// Everything past a successful load is infallible: execution anomalies are
/// logged and absorbed by the core instead of being returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Invalid iNES file format")]
    InvalidHeader,

    #[error("File too small for specified ROM sizes (expected {expected} bytes, got {actual})")]
    Truncated { expected: usize, actual: usize },

    #[error("ROM image declares no PRG-ROM")]
    EmptyPrgRom,

    #[error("Mapper {0} not implemented")]
    UnsupportedMapper(u16),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
