//! Muply CLI Library
//!
//! Headless host for the Muply player: JSON-file persistence, a logging
//! transport and a console renderer.
//!
//! This library exposes the host components for testing purposes.

pub mod cli;
pub mod config;
pub mod error;
pub mod file_store;
pub mod host;
pub mod intake;
pub mod session;

// Re-export commonly used types for convenience
pub use cli::{Action, Cli, ShellLine};
pub use config::AppConfig;
pub use error::{CliError, Result};
pub use file_store::JsonFileStore;
pub use host::{format_view, ConsoleRenderer, LogTransport};
pub use session::CliSession;
