//! Bounded newest-first history of accepted snapshots.

use std::collections::VecDeque;

use super::processor::{self, TrendState};
use super::types::{ClassifiedSnapshot, Snapshot};

/// Maximum number of entries kept.
pub const HISTORY_CAPACITY: usize = 10;

/// Newest-first record of classified snapshots plus the trend baseline.
///
/// The trend baseline lives here so that clearing the history and resetting
/// the baseline always happen together.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: VecDeque<ClassifiedSnapshot>,
    trend: TrendState,
    cleared: bool,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies `snapshot` against the current trend baseline.
    pub fn classify(&self, snapshot: Snapshot) -> ClassifiedSnapshot {
        processor::process(snapshot, &self.trend)
    }

    /// Inserts an entry at the front, advances the trend baseline, and
    /// evicts the oldest entry beyond capacity.
    ///
    /// # Returns
    ///
    /// The evicted entry, if any.
    pub fn push(&mut self, entry: ClassifiedSnapshot) -> Option<ClassifiedSnapshot> {
        self.trend.advance(&entry.snapshot);
        self.entries.push_front(entry);
        self.cleared = false;
        if self.entries.len() > HISTORY_CAPACITY {
            self.entries.pop_back()
        } else {
            None
        }
    }

    /// Empties the history and resets the trend baseline.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.trend.reset();
        self.cleared = true;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if the last mutation was an explicit [`clear`](Self::clear).
    pub fn was_cleared(&self) -> bool {
        self.cleared
    }

    /// Entry at display position `idx` (0 = most recent).
    pub fn get(&self, idx: usize) -> Option<&ClassifiedSnapshot> {
        self.entries.get(idx)
    }

    /// Most recently accepted entry.
    pub fn newest(&self) -> Option<&ClassifiedSnapshot> {
        self.entries.front()
    }

    /// Entries in display order, most recent first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ClassifiedSnapshot> + '_ {
        self.entries.iter()
    }

    /// Entries in chart order, oldest first.
    pub fn oldest_first(&self) -> impl Iterator<Item = &ClassifiedSnapshot> + '_ {
        self.entries.iter().rev()
    }

    pub fn trend_state(&self) -> &TrendState {
        &self.trend
    }
}
