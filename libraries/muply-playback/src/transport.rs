//! Host transport abstraction
//!
//! The transport decodes and outputs one source at a time. Muply never
//! decodes audio itself; hosts implement [`Transport`] over whatever they
//! have (an HTML audio element, a native player, a test double).

use crate::types::SourceRef;
use std::time::Duration;

/// Generation of a `load` request
///
/// Every [`Player::play_track_at`](crate::Player::play_track_at) bumps the
/// generation. An asynchronous start rejection carrying an older generation
/// belongs to a superseded load and is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LoadId(u64);

impl LoadId {
    /// Wrap a raw generation
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Following generation
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Raw generation value
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Host playback transport
pub trait Transport {
    /// Set the current source; does not start playback
    fn load(&mut self, source: &SourceRef, load_id: LoadId);

    /// Drop the current source
    fn clear(&mut self);

    /// Request playback start or resume
    ///
    /// # Errors
    /// Returns the host's reason when it refuses synchronously (autoplay
    /// policy, unsupported format). Hosts that only learn about failure later
    /// report it with [`TransportEvent::StartRejected`].
    fn play(&mut self) -> std::result::Result<(), String>;

    /// Pause playback, keeping the position
    fn pause(&mut self);

    /// Seek within the current source
    fn seek(&mut self, position: Duration);

    /// Set output volume (0.0-1.0)
    fn set_volume(&mut self, volume: f32);

    /// Duration of the current source, once known
    fn duration(&self) -> Option<Duration>;

    /// Current playback position
    fn current_time(&self) -> Duration;
}

/// Events flowing from the transport back into the player
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Periodic position update
    Progress {
        /// Current position
        position: Duration,
        /// Duration of the current source, if known
        duration: Option<Duration>,
    },

    /// Current source played to its end
    Ended,

    /// Asynchronous refusal of a start request
    StartRejected {
        /// Generation of the load the refusal belongs to
        load_id: LoadId,
        /// Host reason
        reason: String,
    },
}

/// Transport that accepts every request and plays nothing
///
/// Useful for headless hosts and tests that only care about playlist state.
#[derive(Debug, Default, Clone)]
pub struct NullTransport {
    loaded: Option<SourceRef>,
    position: Duration,
}

impl NullTransport {
    /// Create a null transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently loaded source
    pub fn loaded(&self) -> Option<&SourceRef> {
        self.loaded.as_ref()
    }
}

impl Transport for NullTransport {
    fn load(&mut self, source: &SourceRef, _load_id: LoadId) {
        self.loaded = Some(source.clone());
        self.position = Duration::ZERO;
    }

    fn clear(&mut self) {
        self.loaded = None;
        self.position = Duration::ZERO;
    }

    fn play(&mut self) -> std::result::Result<(), String> {
        if self.loaded.is_some() {
            Ok(())
        } else {
            Err("no source loaded".to_string())
        }
    }

    fn pause(&mut self) {}

    fn seek(&mut self, position: Duration) {
        self.position = position;
    }

    fn set_volume(&mut self, _volume: f32) {}

    fn duration(&self) -> Option<Duration> {
        None
    }

    fn current_time(&self) -> Duration {
        self.position
    }
}

/// Position in seconds from a host, if it names a valid duration
///
/// Negative, non-finite and out-of-range values give `None`.
pub fn position_from_secs(secs: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(secs).ok()
}
