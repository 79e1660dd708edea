//! Session persistence through a string key-value store
//!
//! Only the canonical playlist and the current index are persisted; shuffle
//! state lives for the session. The layout matches what browser hosts keep in
//! `localStorage`:
//!
//! - `muplyPlaylist`: JSON array of `{name, sourceRef}`
//! - `muplyIndex`: decimal index

use crate::error::PersistenceError;
use crate::types::Track;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

type StoreResult<T> = std::result::Result<T, PersistenceError>;

/// Key used for the playlist by default
pub const DEFAULT_PLAYLIST_KEY: &str = "muplyPlaylist";

/// Key used for the current index by default
pub const DEFAULT_INDEX_KEY: &str = "muplyIndex";

/// String-valued storage backend
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value
    fn set(&mut self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a value (absent keys are not an error)
    fn remove(&mut self, key: &str) -> StoreResult<()>;
}

/// In-memory store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with initial values
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Storage key names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Key holding the playlist JSON
    pub playlist: String,
    /// Key holding the current index
    pub index: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            playlist: DEFAULT_PLAYLIST_KEY.to_string(),
            index: DEFAULT_INDEX_KEY.to_string(),
        }
    }
}

/// State recovered at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SavedSession {
    /// Canonical playlist
    pub tracks: Vec<Track>,
    /// Saved current index (not validated against `tracks`)
    pub current_index: usize,
}

/// Serializes session state into a [`KeyValueStore`]
pub struct PersistenceGateway {
    store: Box<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl PersistenceGateway {
    /// Create a gateway with the default keys
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self::with_keys(store, StorageKeys::default())
    }

    /// Create a gateway with custom keys
    pub fn with_keys(store: Box<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    /// Gateway over a fresh [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Key names in use
    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Underlying store
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Underlying store, for hosts keeping extra keys next to the session
    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }

    /// Write the canonical playlist and the current index
    pub fn save<'a>(
        &mut self,
        tracks: impl IntoIterator<Item = &'a Track>,
        current_index: usize,
    ) -> StoreResult<()> {
        let tracks: Vec<&Track> = tracks.into_iter().collect();
        let json =
            serde_json::to_string(&tracks).map_err(|e| PersistenceError::store(e.to_string()))?;

        self.store.set(&self.keys.playlist, &json)?;
        self.store.set(&self.keys.index, &current_index.to_string())?;

        debug!(tracks = tracks.len(), current_index, "Session persisted");
        Ok(())
    }

    /// Read the saved session
    ///
    /// A missing playlist is an empty list and a missing or unparsable index
    /// is 0.
    ///
    /// # Errors
    /// [`PersistenceError::Corrupt`] when the playlist value is not a valid
    /// track array; [`PersistenceError::Store`] on backend failure.
    pub fn load(&self) -> StoreResult<SavedSession> {
        let tracks = match self.store.get(&self.keys.playlist)? {
            Some(raw) => serde_json::from_str::<Vec<Track>>(&raw).map_err(|e| {
                PersistenceError::Corrupt {
                    key: self.keys.playlist.clone(),
                    source: e,
                }
            })?,
            None => Vec::new(),
        };

        let current_index = match self.store.get(&self.keys.index)? {
            Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
                warn!(value = %raw, "Unparsable saved index, using 0");
                0
            }),
            None => 0,
        };

        Ok(SavedSession {
            tracks,
            current_index,
        })
    }

    /// Remove both keys
    pub fn clear(&mut self) -> StoreResult<()> {
        self.store.remove(&self.keys.playlist)?;
        self.store.remove(&self.keys.index)
    }
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}
