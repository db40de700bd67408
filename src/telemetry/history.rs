//! Bounded history of recent sensor snapshots.

use std::collections::VecDeque;

use super::{SensorKind, SensorSnapshot};

/// Default number of snapshots retained per unit.
pub const DEFAULT_CAPACITY: usize = 20;

/// Ordered, bounded sequence of snapshots, most-recent-last.
///
/// Appending at capacity evicts the oldest entry first -- strict FIFO, no
/// reordering. Readers only ever see borrowed or cloned views; the pipeline
/// is the sole writer.
#[derive(Debug, Clone)]
pub struct HistoryWindow {
    capacity: usize,
    entries: VecDeque<SensorSnapshot>,
}

impl HistoryWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, snapshot: SensorSnapshot) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorSnapshot> {
        self.entries.iter()
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

    pub fn latest(&self) -> Option<&SensorSnapshot> {
        self.entries.back()
    }

    /// The last `n` readings of one metric, oldest first.
    pub fn recent_values(&self, kind: SensorKind, n: usize) -> Vec<f64> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries
            .iter()
            .skip(skip)
            .map(|s| s.value(kind))
            .collect()
    }

    /// Cloned view of the full window for presentation consumers.
    pub fn snapshot_vec(&self) -> Vec<SensorSnapshot> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for HistoryWindow {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
