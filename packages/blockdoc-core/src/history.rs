use std::collections::VecDeque;

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::document::Document;

/// Linear undo/redo over full document snapshots.
///
/// Holds at most `capacity + 1` snapshots: the baseline plus one per recorded edit.
/// Recording after an undo discards the redo tail.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: VecDeque<Document>,
    index: usize,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Document::new(), DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(baseline: Document, capacity: usize) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(baseline);
        Self {
            snapshots,
            index: 0,
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained snapshots, baseline included, so never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &Document {
        &self.snapshots[self.index]
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Append `doc` after the current entry, dropping any redo tail and evicting the
    /// oldest snapshots past capacity.
    pub fn record(&mut self, doc: Document) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push_back(doc);
        self.index = self.snapshots.len() - 1;
        while self.snapshots.len() > self.capacity + 1 {
            self.snapshots.pop_front();
            self.index -= 1;
        }
    }

    pub fn undo(&mut self) -> Option<&Document> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        log::debug!("undo to snapshot {}/{}", self.index, self.snapshots.len());
        Some(&self.snapshots[self.index])
    }

    pub fn redo(&mut self) -> Option<&Document> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        log::debug!("redo to snapshot {}/{}", self.index, self.snapshots.len());
        Some(&self.snapshots[self.index])
    }

    /// Forget everything and start over from `baseline`.
    pub fn reset(&mut self, baseline: Document) {
        self.snapshots.clear();
        self.snapshots.push_back(baseline);
        self.index = 0;
    }
}
