//! Error types for the equalizer chain

use thiserror::Error;

/// Result type alias using `ChainError`
pub type Result<T> = std::result::Result<T, ChainError>;

/// Chain errors
#[derive(Debug, Error)]
pub enum ChainError {
    /// Stage index does not exist in the chain
    #[error("Stage index out of range: {index} (chain has {len} stages)")]
    StageOutOfRange { index: usize, len: usize },

    /// Gain value is NaN or infinite
    #[error("Invalid gain: {0}")]
    InvalidGain(f32),

    /// Host audio graph rejected an operation
    #[error("Host audio graph error: {0}")]
    Host(String),
}

impl ChainError {
    /// Create a host error
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }
}
