//! Muply Audio
//!
//! Equalizer chain model for the Muply player.
//!
//! This crate provides:
//! - A fixed pipeline of peaking stages (source → stages → analysis tap → sink)
//! - Per-stage gain control with range checking
//! - Wiring into a host audio graph via [`ChainHost`]
//! - A software fallback filter for hosts without native filter nodes
//!
//! # Example
//!
//! ```rust
//! use muply_audio::AudioChain;
//!
//! let mut chain = AudioChain::new();
//! chain.set_stage_gain(0, 4.0).unwrap(); // boost 60 Hz
//!
//! let mut buffer = vec![0.0f32; 1024]; // interleaved stereo
//! chain.process(&mut buffer, 44100);
//! assert_eq!(chain.stage_gain(0), Some(4.0));
//! ```

mod chain;
mod error;
mod host;
mod stage;
mod tap;

pub use chain::{AudioChain, AudioEffect};
pub use error::{ChainError, Result};
pub use host::{ChainHost, ChainNode};
pub use stage::{
    EqStage, FilterKind, StageSpec, DEFAULT_STAGE_FREQUENCIES, DEFAULT_STAGE_Q, MAX_GAIN_DB,
    MIN_GAIN_DB,
};
pub use tap::{AnalysisTap, LevelReading};
