/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    BadInput(String),

    #[error("Playback error: {0}")]
    Playback(#[from] muply_playback::PlaybackError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] muply_playback::PersistenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
