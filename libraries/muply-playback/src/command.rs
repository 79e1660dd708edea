//! Host command interface

use crate::intake::FileHandle;
use crate::transport::TransportEvent;
use crate::types::Track;
use std::time::Duration;

/// User or host action, applied with [`Player::dispatch`](crate::Player::dispatch)
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Play the track at a position of the active ordering
    PlayAt(usize),
    /// Pause when playing, resume otherwise
    TogglePlayPause,
    /// Next track, wrapping
    Next,
    /// Previous track, wrapping
    Previous,
    /// Flip shuffle mode
    ToggleShuffle,
    /// Regenerate the shuffle ordering
    Reshuffle,
    /// Remove a position of the active ordering
    Delete(usize),
    /// Swap two positions of the active ordering
    Reorder {
        /// First position
        from: usize,
        /// Second position
        to: usize,
    },
    /// Append tracks
    AddTracks(Vec<Track>),
    /// Append the playable files among these handles
    AddFiles(Vec<FileHandle>),
    /// Seek the current source
    Seek(Duration),
    /// Set output volume (0.0-1.0)
    SetVolume(f32),
    /// Set an equalizer stage gain
    SetStageGain {
        /// Stage index
        stage: usize,
        /// Gain in dB
        gain_db: f32,
    },
    /// Replace the session with an exported document
    Import(String),
    /// Event reported by the transport
    Transport(TransportEvent),
}
