//! Error types for Vout.

use thiserror::Error;

use crate::format::{DecoderPixelFormat, PixelFormat};

/// Main error type for overlay operations.
#[derive(Error, Debug)]
pub enum VoutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Zero-sized frame: {width}x{height}")]
    ZeroSize { width: u32, height: u32 },

    #[error("Allocation of {bytes} bytes failed")]
    AllocationFailed { bytes: usize },

    #[error("Decoder format {decoder} is incompatible with display format {display}")]
    Incompatible {
        decoder: DecoderPixelFormat,
        display: PixelFormat,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VoutError {
    /// Whether this error came from a failed or impossible buffer allocation.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(self, Self::ZeroSize { .. } | Self::AllocationFailed { .. })
    }
}

/// Result type alias for overlay operations.
pub type Result<T> = std::result::Result<T, VoutError>;
