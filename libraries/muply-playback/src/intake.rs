//! Turning host file handles into tracks

use crate::types::{SourceRef, Track};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// File offered by the host (file picker, drag-and-drop, CLI argument)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    /// File name including extension
    pub name: String,
    /// MIME type reported by the host
    pub mime_type: String,
    /// Locator the transport can load
    pub source_ref: SourceRef,
}

impl FileHandle {
    /// Create a file handle
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        source_ref: impl Into<SourceRef>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source_ref: source_ref.into(),
        }
    }
}

/// Accept MIME types mentioning `audio` or `video`, in any case
pub fn is_playable_mime(mime_type: &str) -> bool {
    let lower = mime_type.to_ascii_lowercase();
    lower.contains("audio") || lower.contains("video")
}

/// File name without its last extension
///
/// `"a.b.mp3"` becomes `"a.b"`; names without a dot are kept. A leading dot
/// is an extension too, so `".mp3"` becomes `""`.
pub fn display_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if !file_name[dot + 1..].contains('/') && dot + 1 < file_name.len() => {
            &file_name[..dot]
        }
        _ => file_name,
    }
}

/// Filter playable files and convert them to tracks, keeping order
pub fn tracks_from_files(files: impl IntoIterator<Item = FileHandle>) -> Vec<Track> {
    files
        .into_iter()
        .filter_map(|file| {
            if is_playable_mime(&file.mime_type) {
                Some(Track::new(display_name(&file.name), file.source_ref))
            } else {
                debug!(name = %file.name, mime = %file.mime_type, "Skipping non-media file");
                None
            }
        })
        .collect()
}
