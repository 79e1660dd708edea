//! Export/import session documents
//!
//! ```json
//! {"tracks":[{"name":"A","sourceRef":"a.mp3"}],"currentIndex":0,"shuffled":false,"shuffleOrder":[]}
//! ```
//!
//! `shuffleOrder` holds indices into `tracks`. Imports are lenient: missing
//! or null fields take their defaults and out-of-range indices are dropped.

use crate::error::{PlaybackError, Result};
use crate::types::Track;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Portable snapshot of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    /// Canonical playlist
    pub tracks: Vec<Track>,
    /// Current index into the active ordering
    pub current_index: usize,
    /// Whether shuffle is on
    pub shuffled: bool,
    /// Shuffle ordering as indices into `tracks` (empty when not shuffled)
    pub shuffle_order: Vec<usize>,
}

/// Wire shape accepted on import
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    tracks: Option<Vec<Track>>,
    #[serde(default)]
    current_index: Option<i64>,
    #[serde(default)]
    shuffled: Option<bool>,
    #[serde(default)]
    shuffle_order: Option<Vec<i64>>,
}

impl SessionDocument {
    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and normalize an imported document
    ///
    /// # Errors
    /// [`PlaybackError::ImportParse`] when the text is not JSON or a field
    /// has the wrong type.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(text).map_err(PlaybackError::ImportParse)?;
        Ok(Self::normalize(raw))
    }

    fn normalize(raw: RawDocument) -> Self {
        let tracks = raw.tracks.unwrap_or_default();
        let len = tracks.len();

        let in_range = |i: i64| usize::try_from(i).ok().filter(|&i| i < len);

        let raw_order = raw.shuffle_order.unwrap_or_default();
        let shuffle_order: Vec<usize> = raw_order.iter().copied().filter_map(in_range).collect();
        if shuffle_order.len() != raw_order.len() {
            debug!(
                dropped = raw_order.len() - shuffle_order.len(),
                "Dropped out-of-range shuffle entries"
            );
        }

        let shuffled = raw.shuffled.unwrap_or(false);
        let active_len = if shuffled && !shuffle_order.is_empty() {
            shuffle_order.len()
        } else {
            len
        };
        let current_index = raw
            .current_index
            .and_then(|i| usize::try_from(i).ok())
            .filter(|&i| i < active_len)
            .unwrap_or(0);

        Self {
            tracks,
            current_index,
            shuffled,
            shuffle_order,
        }
    }
}

/// Export file name for a date: `muply_YYYY-MM-DD.json`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("muply_{}.json", date.format("%Y-%m-%d"))
}

/// Export file name for today (UTC)
pub fn export_file_name_today() -> String {
    export_file_name(Utc::now().date_naive())
}
