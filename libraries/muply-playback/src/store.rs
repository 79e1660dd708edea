//! Playlist backing store and canonical ordering
//!
//! Track entities live once in the store, keyed by [`TrackKey`]. The
//! canonical ordering and the shuffle ordering are both plain key arrays over
//! it, so a track is never duplicated and divergence between the two
//! orderings is a visible mapping difference.

use crate::error::{PlaybackError, Result};
use crate::types::{Track, TrackKey};
use std::collections::{BTreeMap, HashSet};

/// Owner of track entities and the canonical (insertion) ordering
#[derive(Debug, Clone, Default)]
pub struct PlaylistStore {
    entries: BTreeMap<TrackKey, Track>,
    canonical: Vec<TrackKey>,
    next_key: u64,
}

impl PlaylistStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with tracks in canonical order
    pub fn from_tracks(tracks: impl IntoIterator<Item = Track>) -> Self {
        let mut store = Self::new();
        store.extend(tracks);
        store
    }

    /// Append a track to the canonical ordering (no dedup)
    pub fn add(&mut self, track: Track) -> TrackKey {
        let key = TrackKey(self.next_key);
        self.next_key += 1;
        self.entries.insert(key, track);
        self.canonical.push(key);
        key
    }

    /// Append several tracks
    pub fn extend(&mut self, tracks: impl IntoIterator<Item = Track>) -> Vec<TrackKey> {
        tracks.into_iter().map(|t| self.add(t)).collect()
    }

    /// Replace every track; keys of the previous content are never reused
    pub fn replace(&mut self, tracks: impl IntoIterator<Item = Track>) -> Vec<TrackKey> {
        self.entries.clear();
        self.canonical.clear();
        self.extend(tracks)
    }

    /// Number of tracks in the canonical ordering
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    /// Check if the canonical ordering is empty
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Canonical ordering as keys
    pub fn keys(&self) -> &[TrackKey] {
        &self.canonical
    }

    /// Resolve a key to its track
    pub fn track(&self, key: TrackKey) -> Option<&Track> {
        self.entries.get(&key)
    }

    /// Track at a canonical position
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.canonical.get(index).and_then(|k| self.entries.get(k))
    }

    /// Tracks in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.canonical.iter().filter_map(|k| self.entries.get(k))
    }

    /// Canonical position of a key
    pub fn position_of(&self, key: TrackKey) -> Option<usize> {
        self.canonical.iter().position(|&k| k == key)
    }

    /// Remove the canonical entry at `index`
    ///
    /// The entity itself stays in the store until
    /// [`retain_referenced`](Self::retain_referenced) finds it unused.
    pub fn remove_at(&mut self, index: usize) -> Result<TrackKey> {
        remove_key_at(&mut self.canonical, index)
    }

    /// Swap two canonical positions
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        swap_positions(&mut self.canonical, from, to)
    }

    /// Drop entities referenced neither by the canonical ordering nor by
    /// `other` (the shuffle ordering). Returns how many were dropped.
    pub fn retain_referenced(&mut self, other: &[TrackKey]) -> usize {
        let live: HashSet<TrackKey> = self.canonical.iter().chain(other).copied().collect();
        let before = self.entries.len();
        self.entries.retain(|k, _| live.contains(k));
        before - self.entries.len()
    }

    /// Number of stored entities (canonical or referenced elsewhere)
    pub fn entity_count(&self) -> usize {
        self.entries.len()
    }
}

/// Remove the key at `index`
pub(crate) fn remove_key_at(order: &mut Vec<TrackKey>, index: usize) -> Result<TrackKey> {
    if index >= order.len() {
        return Err(PlaybackError::IndexOutOfBounds(index));
    }
    Ok(order.remove(index))
}

/// Pairwise swap of two positions (not a shift)
pub(crate) fn swap_positions(order: &mut [TrackKey], from: usize, to: usize) -> Result<()> {
    let len = order.len();
    if from >= len {
        return Err(PlaybackError::IndexOutOfBounds(from));
    }
    if to >= len {
        return Err(PlaybackError::IndexOutOfBounds(to));
    }
    order.swap(from, to);
    Ok(())
}
