//! File handles from command-line paths

use crate::error::{CliError, Result};
use muply_playback::FileHandle;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// MIME type guessed from the extension
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// File handle for one file path
pub fn file_handle(path: &Path) -> Result<FileHandle> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::BadInput(format!("not a file name: {}", path.display())))?;
    let source = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());

    Ok(FileHandle::new(
        name,
        guess_mime(path),
        source.to_string_lossy().into_owned(),
    ))
}

/// Expand paths into file handles
///
/// Directories contribute their direct entries in name order, like a
/// folder picker. Filtering by MIME type happens in the player.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<FileHandle>> {
    let mut handles = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(path)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            entries.sort();
            debug!(dir = %path.display(), files = entries.len(), "Expanding directory");
            for entry in entries {
                handles.push(file_handle(&entry)?);
            }
        } else if path.is_file() {
            handles.push(file_handle(path)?);
        } else {
            return Err(CliError::BadInput(format!(
                "no such file or directory: {}",
                path.display()
            )));
        }
    }
    Ok(handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("a.mp3")), "audio/mpeg");
        assert!(guess_mime(Path::new("b.mp4")).starts_with("video/"));
        assert_eq!(guess_mime(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_directory_expands_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["b.mp3", "a.flac", "cover.jpg"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("sub")).unwrap();

        let handles = collect_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<&str> = handles.iter().map(|h| h.name.as_str()).collect();

        assert_eq!(names, vec!["a.flac", "b.mp3", "cover.jpg"]);
        assert_eq!(handles[2].mime_type, "image/jpeg");
    }

    #[test]
    fn test_missing_path_is_error() {
        let result = collect_files(&[PathBuf::from("/definitely/not/here.mp3")]);
        assert!(matches!(result, Err(CliError::BadInput(_))));
    }
}
