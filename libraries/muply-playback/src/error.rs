//! Error types for playback management

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Active ordering has no tracks
    #[error("Playlist is empty")]
    QueueEmpty,

    /// Index outside the active ordering
    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),

    /// Transport refused to start playback (autoplay policy, unsupported format, ...)
    #[error("Playback failed to start: {0}")]
    StartFailed(String),

    /// Imported session document is not valid JSON or has the wrong shape
    #[error("Failed to parse session document: {0}")]
    ImportParse(#[source] serde_json::Error),

    /// Persistence boundary failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Equalizer chain error
    #[error("Audio chain error: {0}")]
    Chain(#[from] muply_audio::ChainError),

    /// Serialization error while exporting
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlaybackError {
    /// Errors that the command layer treats as a no-op
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::QueueEmpty | Self::IndexOutOfBounds(_))
    }
}

/// Errors at the key-value persistence boundary
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Backend could not read or write
    #[error("Storage backend error: {0}")]
    Store(String),

    /// Stored value could not be decoded
    #[error("Corrupt value under key {key}: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },
}

impl PersistenceError {
    /// Create a backend error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
