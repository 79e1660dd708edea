//! Command-line grammar, shared by one-shot invocations and the shell

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "muply")]
#[command(about = "Muply headless music player", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MUPLY_CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// State file (overrides the configured one)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Action,
}

/// One line typed into `muply shell`
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub action: Action,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Action {
    /// Add files or directories to the playlist
    Add {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Show the playlist
    List,
    /// Play a position of the playlist
    Play {
        /// Position (0-based)
        index: usize,
    },
    /// Pause or resume
    Toggle,
    /// Next track
    Next,
    /// Previous track
    Prev,
    /// Remove a position from the playlist
    Remove {
        /// Position (0-based)
        index: usize,
    },
    /// Swap two positions
    Move {
        /// First position
        from: usize,
        /// Second position
        to: usize,
    },
    /// Toggle shuffle
    Shuffle,
    /// Regenerate the shuffle order
    Reshuffle,
    /// Show or set equalizer gains
    Eq {
        /// Stage index (0-4)
        stage: Option<usize>,
        /// Gain in dB (-40 to 40)
        #[arg(allow_negative_numbers = true)]
        gain: Option<f32>,
    },
    /// Seek within the current track
    Seek {
        /// Position in seconds
        seconds: f64,
    },
    /// Set volume
    Volume {
        /// Level (0.0-1.0)
        level: f32,
    },
    /// Export the session document
    Export {
        /// Output file (default: muply_YYYY-MM-DD.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the session with an exported document
    Import {
        /// Session document
        file: PathBuf,
    },
    /// Interactive shell keeping shuffle and transport state between commands
    Shell,
}
