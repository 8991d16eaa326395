//! Last-access tracking for upload batches.
//!
//! HTTP handlers touch a batch whenever they read or write it; the retention
//! sweeper leaves recently touched batches alone for a grace window.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// In-memory map of batch name to last access time.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    touched: RwLock<HashMap<String, Instant>>,
}

impl ActivityTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an access to `name` now.
    pub fn touch(&self, name: &str) {
        self.touch_at(name, Instant::now());
    }

    /// Record an access to `name` at the given instant.
    ///
    /// An older instant never replaces a newer one.
    pub fn touch_at(&self, name: &str, at: Instant) {
        let mut touched = self.touched.write().unwrap_or_else(PoisonError::into_inner);
        let entry = touched.entry(name.to_string()).or_insert(at);
        if at > *entry {
            *entry = at;
        }
    }

    /// Last recorded access to `name`.
    pub fn last_touched(&self, name: &str) -> Option<Instant> {
        let touched = self.touched.read().unwrap_or_else(PoisonError::into_inner);
        touched.get(name).copied()
    }

    /// Check whether `name` was accessed less than `grace` ago.
    ///
    /// Always false for a zero grace.
    pub fn touched_within(&self, name: &str, grace: Duration) -> bool {
        if grace.is_zero() {
            return false;
        }
        let touched = self.touched.read().unwrap_or_else(PoisonError::into_inner);
        touched
            .get(name)
            .is_some_and(|at| at.elapsed() < grace)
    }

    /// Move the entry for `old` to `new` and mark it accessed now.
    pub fn rename(&self, old: &str, new: &str) {
        let mut touched = self.touched.write().unwrap_or_else(PoisonError::into_inner);
        touched.remove(old);
        touched.insert(new.to_string(), Instant::now());
    }

    /// Drop the entry for `name`.
    pub fn forget(&self, name: &str) {
        let mut touched = self.touched.write().unwrap_or_else(PoisonError::into_inner);
        touched.remove(name);
    }

    /// Drop every entry not accessed within `max_age`.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&self, max_age: Duration) -> usize {
        let mut touched = self.touched.write().unwrap_or_else(PoisonError::into_inner);
        let before = touched.len();
        touched.retain(|_, at| at.elapsed() < max_age);
        before - touched.len()
    }

    /// Number of tracked batches.
    pub fn len(&self) -> usize {
        self.touched
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
