use crate::block::{Block, DataPatch};
use crate::clipboard::ClipboardEntry;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::{Error, Outcome};
use crate::history::History;
use crate::ids::BlockId;
use crate::store::BlockStore;
use crate::traits::{BlockMover, Change, ChangeListener, IdGenerator, UuidIds};

/// One editing session: the block store, its undo history, and the listeners that
/// observe committed documents. Owned by the host; there is no global instance.
pub struct Editor<G: IdGenerator = UuidIds> {
    store: BlockStore<G>,
    history: History,
    listeners: Vec<Box<dyn ChangeListener>>,
}

impl Editor<UuidIds> {
    pub fn new(document: Document, config: &EditorConfig) -> Self {
        Self::with_ids(document, config, UuidIds::with_prefix(config.id_prefix.clone()))
    }
}

impl Default for Editor<UuidIds> {
    fn default() -> Self {
        Self::new(Document::new(), &EditorConfig::default())
    }
}

impl<G: IdGenerator> Editor<G> {
    pub fn with_ids(document: Document, config: &EditorConfig, ids: G) -> Self {
        Self {
            history: History::new(document.clone(), config.history_capacity),
            store: BlockStore::with_ids(document, ids),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn ChangeListener>) {
        self.listeners.push(listener);
    }

    pub fn store(&self) -> &BlockStore<G> {
        &self.store
    }

    pub fn document(&self) -> &Document {
        self.store.document()
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.store.block(id)
    }

    pub fn selected(&self) -> Option<&BlockId> {
        self.store.selected()
    }

    pub fn clipboard(&self) -> Option<&ClipboardEntry> {
        self.store.clipboard()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the document with a freshly loaded one and start a new history.
    pub fn load(&mut self, document: Document) {
        self.history.reset(document.clone());
        self.store.load(document);
        self.notify(&Change::Loaded);
    }

    pub fn select_block(&mut self, block_id: Option<&str>) -> Outcome {
        self.store.select_block(block_id)
    }

    pub fn add_block(
        &mut self,
        block: Block,
        parent_id: &str,
        index: Option<usize>,
    ) -> Outcome<BlockId> {
        let outcome = self.store.add_block(block, parent_id, index);
        self.commit_with(outcome, |id| Change::Added(id.clone()))
    }

    pub fn add_block_to_column(
        &mut self,
        block: Block,
        parent_id: &str,
        column_index: usize,
        index: Option<usize>,
    ) -> Outcome<BlockId> {
        let outcome = self
            .store
            .add_block_to_column(block, parent_id, column_index, index);
        self.commit_with(outcome, |id| Change::Added(id.clone()))
    }

    pub fn update_block(&mut self, block_id: &str, patch: DataPatch) -> Outcome {
        let outcome = self.store.update_block(block_id, patch);
        self.commit(outcome, Change::Updated(block_id.into()))
    }

    pub fn delete_block(&mut self, block_id: &str) -> Outcome {
        let outcome = self.store.delete_block(block_id);
        self.commit(outcome, Change::Deleted(block_id.into()))
    }

    pub fn move_block_up(&mut self, block_id: &str, parent_id: &str) -> Outcome {
        let outcome = self.store.move_block_up(block_id, parent_id);
        self.commit(outcome, Change::Moved(block_id.into()))
    }

    pub fn move_block_down(&mut self, block_id: &str, parent_id: &str) -> Outcome {
        let outcome = self.store.move_block_down(block_id, parent_id);
        self.commit(outcome, Change::Moved(block_id.into()))
    }

    pub fn move_block(
        &mut self,
        block_id: &str,
        from_parent_id: &str,
        to_parent_id: &str,
        to_index: usize,
        to_column_index: Option<usize>,
    ) -> Outcome {
        let outcome = self.store.move_block(
            block_id,
            from_parent_id,
            to_parent_id,
            to_index,
            to_column_index,
        );
        self.commit(outcome, Change::Moved(block_id.into()))
    }

    pub fn duplicate_block(&mut self, block_id: &str) -> Outcome<BlockId> {
        let outcome = self.store.duplicate_block(block_id);
        self.commit_with(outcome, |copy| Change::Duplicated {
            source: block_id.into(),
            copy: copy.clone(),
        })
    }

    /// Copying never touches the document, so it is not a history entry.
    pub fn copy_block(&mut self, block_id: &str) -> Outcome {
        self.store.copy_block(block_id)
    }

    pub fn cut_block(&mut self, block_id: &str) -> Outcome {
        let outcome = self.store.cut_block(block_id);
        self.commit(outcome, Change::Cut(block_id.into()))
    }

    pub fn paste_block(&mut self, parent_id: &str, index: Option<usize>) -> Outcome<BlockId> {
        let outcome = self.store.paste_block(parent_id, index);
        self.commit_with(outcome, |id| Change::Pasted(id.clone()))
    }

    pub fn undo(&mut self) -> Outcome {
        match self.history.undo() {
            Some(doc) => {
                let doc = doc.clone();
                self.store.load(doc);
                self.notify(&Change::Undo);
                Outcome::Applied(())
            }
            None => Outcome::Unchanged(Error::HistoryBoundary),
        }
    }

    pub fn redo(&mut self) -> Outcome {
        match self.history.redo() {
            Some(doc) => {
                let doc = doc.clone();
                self.store.load(doc);
                self.notify(&Change::Redo);
                Outcome::Applied(())
            }
            None => Outcome::Unchanged(Error::HistoryBoundary),
        }
    }

    /// Rebase history on the current document, dropping every undo/redo step.
    pub fn clear_history(&mut self) {
        self.history.reset(self.store.document().clone());
    }

    fn commit(&mut self, outcome: Outcome, change: Change) -> Outcome {
        self.commit_with(outcome, |_| change)
    }

    /// Record a snapshot and notify listeners when the call really changed the document.
    fn commit_with<T>(
        &mut self,
        outcome: Outcome<T>,
        change: impl FnOnce(&T) -> Change,
    ) -> Outcome<T> {
        if let Outcome::Applied(value) = &outcome {
            if self.store.document() != self.history.current() {
                self.history.record(self.store.document().clone());
                let change = change(value);
                self.notify(&change);
            }
        }
        outcome
    }

    fn notify(&mut self, change: &Change) {
        let doc = self.store.document();
        for listener in &mut self.listeners {
            listener.document_changed(doc, change);
        }
    }
}

impl<G: IdGenerator> BlockMover for Editor<G> {
    fn document(&self) -> &Document {
        self.store.document()
    }

    fn move_block(
        &mut self,
        block_id: &str,
        from_parent_id: &str,
        to_parent_id: &str,
        to_index: usize,
        to_column_index: Option<usize>,
    ) -> Outcome {
        Editor::move_block(
            self,
            block_id,
            from_parent_id,
            to_parent_id,
            to_index,
            to_column_index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;
    use crate::traits::{ChangeLog, SequentialIds};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn editor(capacity: usize) -> Editor<SequentialIds> {
        let config = EditorConfig {
            history_capacity: capacity,
            ..EditorConfig::default()
        };
        Editor::with_ids(Document::new(), &config, SequentialIds::default())
    }

    #[test]
    fn no_ops_are_not_recorded() {
        let mut editor = editor(10);
        assert!(!editor.delete_block("ghost").is_applied());
        assert!(!editor.can_undo());

        let id = editor
            .add_block(Block::new(BlockType::Text), "root", None)
            .applied()
            .unwrap();
        // moving to where it already is changes nothing
        assert!(editor.move_block(id.as_str(), "root", "root", 0, None).is_applied());
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn undo_restores_and_clears_selection() {
        let mut editor = editor(10);
        let initial = editor.document().clone();
        let id = editor
            .add_block(Block::new(BlockType::Text), "root", None)
            .applied()
            .unwrap();
        editor.select_block(Some(id.as_str())).applied().unwrap();
        let after_add = editor.document().clone();

        assert!(editor.undo().is_applied());
        assert_eq!(editor.document(), &initial);
        assert!(editor.selected().is_none());
        assert_eq!(editor.undo(), Outcome::Unchanged(Error::HistoryBoundary));

        assert!(editor.redo().is_applied());
        assert_eq!(editor.document(), &after_add);
        assert!(!editor.redo().is_applied());
    }

    #[test]
    fn listeners_see_committed_changes_only() {
        let mut editor = editor(10);
        let log = Rc::new(RefCell::new(ChangeLog::default()));
        editor.subscribe(Box::new(log.clone()));

        let id = editor
            .add_block(Block::new(BlockType::Text), "root", None)
            .applied()
            .unwrap();
        let _ = editor.delete_block("ghost");
        editor.copy_block(id.as_str()).applied().unwrap();
        editor.undo().applied().unwrap();

        assert_eq!(log.borrow().changes(), &[Change::Added(id), Change::Undo]);
        assert!(log.borrow_mut().take_dirty());
    }

    #[test]
    fn polled_change_log_stays_bounded() {
        let mut editor = editor(10);
        let log = Rc::new(RefCell::new(ChangeLog::default()));
        editor.subscribe(Box::new(log.clone()));

        for _ in 0..1000 {
            let id = editor
                .add_block(Block::new(BlockType::Text), "root", None)
                .applied()
                .unwrap();
            editor.delete_block(id.as_str()).applied().unwrap();
            assert!(log.borrow_mut().take_dirty());
            assert!(log.borrow().changes().is_empty());
        }
        assert!(!log.borrow_mut().take_dirty());
        assert_eq!(editor.history().len(), 11);
    }

    #[test]
    fn load_resets_history() {
        let mut editor = editor(10);
        let _ = editor.add_block(Block::new(BlockType::Text), "root", None);
        editor.load(Document::new());
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
        assert_eq!(editor.document(), &Document::new());
    }
}
