//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque locator of decodable media (object URL, file path, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRef(String);

impl SourceRef {
    /// Wrap a locator
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Locator as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SourceRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Playlist entry
///
/// Identity is positional: two tracks with the same name and source are
/// still distinct entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Display name
    pub name: String,

    /// Media locator (older saves used the `url` key)
    #[serde(rename = "sourceRef", alias = "url")]
    pub source_ref: SourceRef,
}

impl Track {
    /// Create a track
    pub fn new(name: impl Into<String>, source_ref: impl Into<SourceRef>) -> Self {
        Self {
            name: name.into(),
            source_ref: source_ref.into(),
        }
    }
}

/// Key of a track entity in the playlist backing store
///
/// Keys are never reused within a session, so a stale shuffle entry can
/// never alias a newer track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackKey(pub(crate) u64);

impl TrackKey {
    /// Raw key value
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Player transport state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerState {
    /// No track loaded
    #[default]
    Idle,

    /// Track loaded but not playing (start was refused)
    Ready,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

/// Result of asking the transport to start
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Playback started
    Started,

    /// Transport refused; the track stays loaded and nothing is retried
    StartFailed(String),
}

impl PlayOutcome {
    /// Check if playback started
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }
}

/// How the current index is resolved when shuffle is toggled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleIndexPolicy {
    /// Keep the raw index; it now points into the other ordering and may
    /// name a different track
    #[default]
    ReuseIndex,

    /// Move the index to wherever the current track sits in the new ordering
    FollowTrack,
}

/// Configuration for the player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Index resolution on shuffle toggle (default: ReuseIndex)
    pub shuffle_index_policy: ShuffleIndexPolicy,

    /// Title shown when nothing is current
    pub default_title: String,

    /// Initial volume (0.0-1.0, default: 1.0)
    pub volume: f32,

    /// Initial equalizer gains in dB, in stage order (default: all neutral)
    pub stage_gains: Vec<f32>,
}

/// Title shown while no track is current
pub const DEFAULT_TITLE: &str = "Muply – CyberTerminal Music Player";

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            shuffle_index_policy: ShuffleIndexPolicy::ReuseIndex,
            default_title: DEFAULT_TITLE.to_string(),
            volume: 1.0,
            stage_gains: Vec::new(),
        }
    }
}
