//! Muply - Playback Management
//!
//! Platform-agnostic playlist and playback state machine for the Muply
//! player.
//!
//! This crate provides:
//! - A canonical playlist plus a lazily generated shuffle ordering over one
//!   backing store
//! - Wrap-around navigation, deletion with wrap-to-start, swap reordering
//! - Session persistence through a string key-value store
//! - Export/import of session documents
//! - A five-stage equalizer (via `muply-audio`)
//!
//! # Architecture
//!
//! `muply-playback` never decodes or outputs audio. Hosts plug in:
//! - a [`Transport`] that loads and plays sources,
//! - a [`Renderer`] that draws a [`PlaylistView`],
//! - a [`KeyValueStore`] for persistence.
//!
//! # Example
//!
//! ```rust
//! use muply_playback::{
//!     Command, NullRenderer, NullTransport, Player, PlayerConfig, PlayerState, Track,
//! };
//!
//! let mut player = Player::in_memory(
//!     PlayerConfig::default(),
//!     Box::new(NullTransport::new()),
//!     Box::new(NullRenderer),
//! );
//!
//! // Adding to an empty playlist starts the first track
//! player.add_tracks(vec![
//!     Track::new("Intro", "intro.mp3"),
//!     Track::new("Outro", "outro.mp3"),
//! ]);
//! assert_eq!(player.state(), PlayerState::Playing);
//!
//! player.dispatch(Command::Next);
//! assert_eq!(player.current_index(), Some(1));
//!
//! // Navigation wraps
//! player.dispatch(Command::Next);
//! assert_eq!(player.current_index(), Some(0));
//! ```

mod command;
mod error;
pub mod events;
pub mod intake;
pub mod persistence;
mod player;
pub mod render;
pub mod session;
mod shuffle;
mod store;
pub mod transport;
pub mod types;

#[cfg(feature = "wasm")]
pub mod wasm;

// Public exports
pub use command::Command;
pub use error::{PersistenceError, PlaybackError, Result};
pub use events::PlaybackEvent;
pub use intake::FileHandle;
pub use persistence::{KeyValueStore, MemoryStore, PersistenceGateway, SavedSession, StorageKeys};
pub use player::Player;
pub use render::{NullRenderer, PlaylistView, Progress, Renderer, ViewEntry};
pub use session::SessionDocument;
pub use shuffle::ShuffleView;
pub use store::PlaylistStore;
pub use transport::{position_from_secs, LoadId, NullTransport, Transport, TransportEvent};
pub use types::{
    PlayOutcome, PlayerConfig, PlayerState, ShuffleIndexPolicy, SourceRef, Track, TrackKey,
};

pub use muply_audio::{AudioChain, ChainHost, ChainNode, StageSpec};
