//! View model handed to the host renderer

use crate::types::PlayerState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One row of the rendered playlist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewEntry {
    /// Position in the active ordering
    pub index: usize,
    /// Display name
    pub name: String,
}

/// Snapshot of everything a renderer needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistView {
    /// Active ordering, in display order
    pub entries: Vec<ViewEntry>,

    /// Current position in the active ordering
    pub current_index: Option<usize>,

    /// Row to highlight; only set while not shuffled
    pub highlighted: Option<usize>,

    /// Whether the active ordering is the shuffle ordering
    pub is_shuffled: bool,

    /// Transport state
    pub state: PlayerState,

    /// Number of tracks in the canonical playlist
    pub track_count: usize,

    /// Title of the current track, or the default title
    pub now_playing: String,
}

/// Playback position for progress displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Current position
    pub position: Duration,
    /// Duration, if known
    pub duration: Option<Duration>,
}

impl Progress {
    /// Fraction played (0.0-1.0), or 0.0 when the duration is unknown
    pub fn fraction(&self) -> f64 {
        match self.duration {
            Some(d) if !d.is_zero() => {
                (self.position.as_secs_f64() / d.as_secs_f64()).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// `mm:ss / mm:ss` label
    pub fn label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.position),
            format_time(self.duration.unwrap_or(Duration::ZERO))
        )
    }
}

/// Format a duration as `mm:ss` (minutes are not wrapped at 60)
pub fn format_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Host renderer
pub trait Renderer {
    /// Redraw the playlist and title
    fn render(&mut self, view: &PlaylistView);

    /// Update the progress display
    fn render_progress(&mut self, _progress: Progress) {}
}

/// Renderer that draws nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _view: &PlaylistView) {}
}
