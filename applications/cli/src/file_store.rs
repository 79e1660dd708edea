/// JSON file key-value store
///
/// Holds the same string values a browser keeps in `localStorage`, as one
/// JSON object on disk. Every write rewrites the file.
use muply_playback::{KeyValueStore, PersistenceError};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open a store; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| PersistenceError::Corrupt {
                key: path.display().to_string(),
                source: e,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(PersistenceError::store(e.to_string())),
        };

        debug!(path = %path.display(), keys = values.len(), "State file opened");
        Ok(Self { path, values })
    }

    /// Backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| PersistenceError::store(e.to_string()))?;
            }
        }
        let json = serde_json::to_string_pretty(&self.values)
            .map_err(|e| PersistenceError::store(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| PersistenceError::store(e.to_string()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
