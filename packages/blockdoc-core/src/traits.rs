use std::cell::RefCell;
use std::rc::Rc;

use uuid::Uuid;

use crate::document::Document;
use crate::error::Outcome;
use crate::ids::BlockId;

/// Pluggable id source, so sessions can mint random ids while tests stay deterministic.
pub trait IdGenerator {
    fn next_id(&mut self) -> BlockId;
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> BlockId {
        (**self).next_id()
    }
}

/// Random v4 ids; the default for editing sessions.
#[derive(Clone, Debug)]
pub struct UuidIds {
    prefix: String,
}

impl UuidIds {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for UuidIds {
    fn default() -> Self {
        Self::with_prefix("block")
    }
}

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> BlockId {
        BlockId::new(format!("{}-{}", self.prefix, Uuid::new_v4().simple()))
    }
}

/// Counter-backed ids (`block-1`, `block-2`, ...) useful for tests and reproducible sessions.
#[derive(Clone, Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: u64,
}

impl SequentialIds {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: 0,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::with_prefix("block")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> BlockId {
        self.counter += 1;
        BlockId::new(format!("{}-{}", self.prefix, self.counter))
    }
}

/// What a committed edit did. Handed to listeners together with the new document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change {
    Added(BlockId),
    Updated(BlockId),
    Deleted(BlockId),
    Moved(BlockId),
    Duplicated { source: BlockId, copy: BlockId },
    Pasted(BlockId),
    Cut(BlockId),
    Undo,
    Redo,
    Loaded,
}

/// Observer for post-mutation documents (renderer, autosave).
///
/// Called synchronously after the edit has been committed; listeners must not assume
/// they can call back into the editor.
pub trait ChangeListener {
    fn document_changed(&mut self, doc: &Document, change: &Change);
}

impl<L: ChangeListener + ?Sized> ChangeListener for Rc<RefCell<L>> {
    fn document_changed(&mut self, doc: &Document, change: &Change) {
        self.borrow_mut().document_changed(doc, change);
    }
}

/// Records changes and a dirty flag; useful for tests and for hosts that debounce
/// autosave by polling.
#[derive(Clone, Debug, Default)]
pub struct ChangeLog {
    changes: Vec<Change>,
    dirty: bool,
}

impl ChangeLog {
    /// Changes seen since the last `take_dirty` or `take_changes`.
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    /// Returns whether anything changed since the last call, and forgets what did.
    pub fn take_dirty(&mut self) -> bool {
        self.changes.clear();
        std::mem::take(&mut self.dirty)
    }

    /// Drain the pending changes and reset the dirty flag.
    pub fn take_changes(&mut self) -> Vec<Change> {
        self.dirty = false;
        std::mem::take(&mut self.changes)
    }
}

impl ChangeListener for ChangeLog {
    fn document_changed(&mut self, _doc: &Document, change: &Change) {
        self.changes.push(change.clone());
        self.dirty = true;
    }
}

/// The one call the drag-and-drop layer makes into an editing surface.
pub trait BlockMover {
    fn document(&self) -> &Document;

    fn move_block(
        &mut self,
        block_id: &str,
        from_parent_id: &str,
        to_parent_id: &str,
        to_index: usize,
        to_column_index: Option<usize>,
    ) -> Outcome;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_ids_are_unique_and_never_root() {
        let mut ids = UuidIds::default();
        let mut seen = HashSet::new();
        for _ in 0..256 {
            let id = ids.next_id();
            assert!(!id.is_root());
            assert!(id.as_str().starts_with("block-"));
            assert!(seen.insert(id));
        }
    }

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::with_prefix("t");
        assert_eq!(ids.next_id(), BlockId::from("t-1"));
        assert_eq!(ids.next_id(), BlockId::from("t-2"));
    }

    #[test]
    fn change_log_tracks_dirty_flag() {
        let mut log = ChangeLog::default();
        assert!(!log.take_dirty());
        log.document_changed(&Document::new(), &Change::Loaded);
        assert_eq!(log.changes(), &[Change::Loaded]);
        assert!(log.take_dirty());
        assert!(!log.take_dirty());
        assert!(log.changes().is_empty());

        log.document_changed(&Document::new(), &Change::Undo);
        log.document_changed(&Document::new(), &Change::Redo);
        assert_eq!(log.take_changes(), vec![Change::Undo, Change::Redo]);
        assert!(!log.take_dirty());
        assert!(log.changes().is_empty());
    }
}
