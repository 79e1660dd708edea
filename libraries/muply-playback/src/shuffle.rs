//! Shuffle ordering
//!
//! A permutation of the canonical keys, generated lazily on the first
//! activation with an empty buffer. Disabling shuffle keeps the buffer so
//! re-enabling reuses the same order; only [`ShuffleView::reshuffle`]
//! regenerates it.

use crate::error::Result;
use crate::store::{remove_key_at, swap_positions};
use crate::types::TrackKey;
use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use std::collections::HashMap;

/// Shuffle flag plus the shuffled key buffer
#[derive(Debug, Clone, Default)]
pub struct ShuffleView {
    order: Vec<TrackKey>,
    enabled: bool,
}

impl ShuffleView {
    /// Create a disabled view with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn shuffle on, generating the buffer if it is empty
    ///
    /// Returns true when a new permutation was generated.
    pub fn enable(&mut self, canonical: &[TrackKey]) -> bool {
        self.enable_with(canonical, &mut thread_rng())
    }

    /// [`enable`](Self::enable) with a caller-provided RNG
    pub fn enable_with<R: Rng + ?Sized>(&mut self, canonical: &[TrackKey], rng: &mut R) -> bool {
        self.enabled = true;
        if self.order.is_empty() {
            self.generate(canonical, rng);
            true
        } else {
            false
        }
    }

    /// Turn shuffle off; the buffer is kept for reuse
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Discard the buffer and generate a new permutation
    pub fn reshuffle(&mut self, canonical: &[TrackKey]) {
        self.reshuffle_with(canonical, &mut thread_rng());
    }

    /// [`reshuffle`](Self::reshuffle) with a caller-provided RNG
    pub fn reshuffle_with<R: Rng + ?Sized>(&mut self, canonical: &[TrackKey], rng: &mut R) {
        self.generate(canonical, rng);
    }

    fn generate<R: Rng + ?Sized>(&mut self, canonical: &[TrackKey], rng: &mut R) {
        self.order = canonical.to_vec();
        self.order.shuffle(rng);
    }

    /// Replace flag and buffer (session import)
    pub fn restore(&mut self, order: Vec<TrackKey>, enabled: bool) {
        self.order = order;
        self.enabled = enabled;
    }

    /// Check if shuffle is on
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Shuffled keys (may be stale while shuffle is off)
    pub fn order(&self) -> &[TrackKey] {
        &self.order
    }

    /// Check if a buffer exists
    pub fn has_buffer(&self) -> bool {
        !self.order.is_empty()
    }

    /// Remove the key at a shuffled position
    pub fn remove_at(&mut self, index: usize) -> Result<TrackKey> {
        remove_key_at(&mut self.order, index)
    }

    /// Swap two shuffled positions
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        swap_positions(&mut self.order, from, to)
    }

    /// Check that the buffer holds exactly the canonical multiset
    ///
    /// Adding or removing canonical tracks after the buffer was generated
    /// makes this false until the next reshuffle.
    pub fn is_consistent_with(&self, canonical: &[TrackKey]) -> bool {
        if self.order.len() != canonical.len() {
            return false;
        }
        let mut counts: HashMap<TrackKey, isize> = HashMap::new();
        for key in canonical {
            *counts.entry(*key).or_default() += 1;
        }
        for key in &self.order {
            *counts.entry(*key).or_default() -= 1;
        }
        counts.values().all(|&c| c == 0)
    }
}
