//! Change tracker - bounded change log with an undo/redo cursor

use chrono::{DateTime, Utc};
use doc_model::{ChangeKind, ChangeRecord, SlideId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of changes kept in the log
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Counts over the applied portion of the change log
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub total: usize,
    pub additions: usize,
    pub updates: usize,
    pub deletions: usize,
    pub last_change_time: Option<DateTime<Utc>>,
}

/// Ordered log of change records plus a cursor.
///
/// `position` counts the applied records: records `[0, position)` are applied,
/// `[position, len)` form the redo branch. Recording a change discards the
/// redo branch. Once the log exceeds `capacity`, the oldest record is evicted
/// and can no longer be undone.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    records: VecDeque<ChangeRecord>,
    position: usize,
    capacity: usize,
}

impl ChangeTracker {
    /// Create a tracker holding at most `capacity` records (at least one)
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            position: 0,
            capacity: capacity.max(1),
        }
    }

    /// Restore a tracker from a saved log and cursor
    pub fn from_parts(records: Vec<ChangeRecord>, position: usize, capacity: usize) -> Self {
        let mut tracker = Self::new(capacity);
        tracker.records = records.into();
        let evicted = tracker.records.len().saturating_sub(tracker.capacity);
        tracker.records.drain(..evicted);
        tracker.position = position.saturating_sub(evicted).min(tracker.records.len());
        tracker
    }

    /// Append a change, discarding any redo branch
    pub fn record(&mut self, change: ChangeRecord) {
        self.records.truncate(self.position);
        self.records.push_back(change);
        self.position += 1;

        while self.records.len() > self.capacity {
            if let Some(evicted) = self.records.pop_front() {
                tracing::debug!("History full, evicting change {}", evicted.id());
            }
            self.position -= 1;
        }
    }

    /// Step the cursor back, returning the change to revert
    pub fn undo(&mut self) -> Option<&ChangeRecord> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        self.records.get(self.position)
    }

    /// Step the cursor forward, returning the change to re-apply
    pub fn redo(&mut self) -> Option<&ChangeRecord> {
        if self.position == self.records.len() {
            return None;
        }
        self.position += 1;
        self.records.get(self.position - 1)
    }

    /// The change [`ChangeTracker::undo`] would return, without moving the cursor
    pub fn peek_undo(&self) -> Option<&ChangeRecord> {
        self.position.checked_sub(1).and_then(|i| self.records.get(i))
    }

    /// The change [`ChangeTracker::redo`] would return, without moving the cursor
    pub fn peek_redo(&self) -> Option<&ChangeRecord> {
        self.records.get(self.position)
    }

    pub fn can_undo(&self) -> bool {
        self.position > 0
    }

    pub fn can_redo(&self) -> bool {
        self.position < self.records.len()
    }

    /// Drop all records
    pub fn clear(&mut self) {
        self.records.clear();
        self.position = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of applied records
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The whole log, including the redo branch
    pub fn records(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter()
    }

    /// Applied records, oldest first
    pub fn applied(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.records.iter().take(self.position)
    }

    /// Remove every applied change targeting `slide_id` and discard the redo
    /// branch. The removed records are returned oldest first.
    pub fn take_slide_changes(&mut self, slide_id: SlideId) -> Vec<ChangeRecord> {
        self.records.truncate(self.position);
        let (taken, kept): (Vec<_>, Vec<_>) = self
            .records
            .drain(..)
            .partition(|record| record.slide_id() == slide_id);
        self.records = kept.into();
        self.position = self.records.len();
        taken
    }

    /// Summary over the applied records
    pub fn summary(&self) -> ChangeSummary {
        let mut summary = ChangeSummary::default();
        for record in self.applied() {
            summary.total += 1;
            match record.kind() {
                ChangeKind::Add => summary.additions += 1,
                ChangeKind::Update => summary.updates += 1,
                ChangeKind::Delete => summary.deletions += 1,
            }
            summary.last_change_time = Some(record.timestamp());
        }
        summary
    }
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
