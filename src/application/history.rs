//! Bounded, time-stamped history shared by the planner and the orchestrator.

use std::collections::VecDeque;

use crate::domain::foundation::Timestamp;

/// Default number of entries kept before trimming.
pub const DEFAULT_CAPACITY: usize = 1_000;
/// Default number of most recent entries kept after a trim.
pub const DEFAULT_TRIM_TO: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry<T> {
    pub recorded_at: Timestamp,
    pub value: T,
}

/// Append-only log that drops its oldest entries in bulk.
///
/// Pushing past `capacity` keeps only the `trim_to` most recent entries,
/// so trimming happens once per `capacity - trim_to` pushes rather than on
/// every push.
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    entries: VecDeque<HistoryEntry<T>>,
    capacity: usize,
    trim_to: usize,
}

impl<T> Default for BoundedHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TRIM_TO)
    }
}

impl<T> BoundedHistory<T> {
    /// `trim_to` is capped at `capacity`.
    pub fn new(capacity: usize, trim_to: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            trim_to: trim_to.min(capacity),
        }
    }

    /// Appends an entry and returns how many old entries were dropped.
    pub fn push(&mut self, recorded_at: Timestamp, value: T) -> usize {
        self.entries.push_back(HistoryEntry { recorded_at, value });
        if self.entries.len() <= self.capacity {
            return 0;
        }
        let excess = self.entries.len() - self.trim_to;
        self.entries.drain(..excess);
        excess
    }

    /// Removes entries recorded before `cutoff`.
    pub fn remove_older_than(&mut self, cutoff: Timestamp) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.recorded_at.is_before(&cutoff));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry<T>> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry<T>> {
        self.entries.back()
    }
}

impl<T: Clone> BoundedHistory<T> {
    /// The `limit` most recent values, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<T> {
        let skip = self.entries.len().saturating_sub(limit);
        self.entries.iter().skip(skip).map(|e| e.value.clone()).collect()
    }
}
