//! Playback Events
//!
//! Events queued by the player for host UI synchronization. Hosts poll them
//! with [`Player::drain_events`](crate::Player::drain_events).

use crate::types::PlayerState;
use serde::{Deserialize, Serialize};

/// Events emitted by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PlaybackEvent {
    /// Transport state changed
    StateChanged {
        /// The new state
        state: PlayerState,
    },

    /// A track was loaded
    TrackChanged {
        /// Position in the active ordering
        index: usize,
        /// Display name
        name: String,
    },

    /// Tracks were added, removed, reordered or replaced
    PlaylistChanged {
        /// Length of the active ordering
        length: usize,
    },

    /// Shuffle was toggled or regenerated
    ShuffleChanged {
        /// Whether shuffle is now on
        enabled: bool,
    },

    /// An equalizer stage changed
    StageGainChanged {
        /// Stage index
        stage: usize,
        /// Stored gain after clamping
        gain_db: f32,
    },

    /// Position update forwarded from the transport
    Progress {
        /// Current position
        position_ms: u64,
        /// Duration, if known
        duration_ms: Option<u64>,
    },

    /// A swallowed failure worth showing to the user
    Error {
        /// Error message
        message: String,
    },
}
