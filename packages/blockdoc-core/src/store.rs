use std::collections::HashSet;

use crate::block::{Block, DataPatch, Slot};
use crate::clipboard::ClipboardEntry;
use crate::document::Document;
use crate::error::{Error, Outcome, Result};
use crate::ids::BlockId;
use crate::navigator::{descendants, find_parent_of_block, is_descendant};
use crate::traits::{BlockMover, IdGenerator, UuidIds};

/// Owns the canonical document and is the only place structural edits happen.
///
/// Every public mutation either applies completely or leaves the document untouched
/// and reports why through [`Outcome::Unchanged`]; nothing panics on bad ids or
/// indices coming from the UI.
pub struct BlockStore<G: IdGenerator = UuidIds> {
    pub(crate) document: Document,
    pub(crate) selected: Option<BlockId>,
    pub(crate) clipboard: Option<ClipboardEntry>,
    pub(crate) ids: G,
}

impl Default for BlockStore<UuidIds> {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl BlockStore<UuidIds> {
    pub fn new(document: Document) -> Self {
        Self::with_ids(document, UuidIds::default())
    }
}

impl<G: IdGenerator> BlockStore<G> {
    pub fn with_ids(document: Document, ids: G) -> Self {
        Self {
            document,
            selected: None,
            clipboard: None,
            ids,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.document.get(id)
    }

    pub fn selected(&self) -> Option<&BlockId> {
        self.selected.as_ref()
    }

    /// Swap in a freshly loaded document. Selection is dropped; the clipboard survives
    /// so content can be pasted across templates.
    pub fn load(&mut self, document: Document) {
        self.document = document;
        self.selected = None;
    }

    pub fn select_block(&mut self, block_id: Option<&str>) -> Outcome {
        match block_id {
            None => {
                self.selected = None;
                Outcome::Applied(())
            }
            Some(id) if self.document.contains(id) => {
                self.selected = Some(BlockId::from(id));
                Outcome::Applied(())
            }
            Some(id) => Outcome::from(Err(Error::InvalidReference(BlockId::from(id)))),
        }
    }

    /// Insert `block` into the linear children of `parent_id` at `index`, or append.
    pub fn add_block(
        &mut self,
        block: Block,
        parent_id: &str,
        index: Option<usize>,
    ) -> Outcome<BlockId> {
        self.insert_new(block, parent_id, Slot::Linear, index).into()
    }

    /// Insert `block` into column `column_index` of `parent_id` at `index`, or append.
    pub fn add_block_to_column(
        &mut self,
        block: Block,
        parent_id: &str,
        column_index: usize,
        index: Option<usize>,
    ) -> Outcome<BlockId> {
        self.insert_new(block, parent_id, Slot::Column(column_index), index)
            .into()
    }

    /// Shallow-merge `patch` into the block's data. Type and children never change here.
    pub fn update_block(&mut self, block_id: &str, patch: DataPatch) -> Outcome {
        let res = match self.document.get_mut(block_id) {
            Some(block) => {
                patch.merge_into(&mut block.data);
                Ok(())
            }
            None => Err(Error::InvalidReference(BlockId::from(block_id))),
        };
        res.into()
    }

    /// Remove the block and its whole subtree, then scrub any reference to a removed
    /// id from every container. Calling it again for the same id changes nothing.
    pub fn delete_block(&mut self, block_id: &str) -> Outcome {
        self.remove_subtree(block_id).into()
    }

    pub fn move_block_up(&mut self, block_id: &str, parent_id: &str) -> Outcome {
        self.shift_sibling(block_id, parent_id, -1).into()
    }

    pub fn move_block_down(&mut self, block_id: &str, parent_id: &str) -> Outcome {
        self.shift_sibling(block_id, parent_id, 1).into()
    }

    /// Detach the block from wherever it actually lives and insert it into the
    /// destination sequence at `to_index` (counted after the detach, then clamped).
    ///
    /// `from_parent_id` is only a hint: the real parent is looked up every time and a
    /// disagreement is logged.
    pub fn move_block(
        &mut self,
        block_id: &str,
        from_parent_id: &str,
        to_parent_id: &str,
        to_index: usize,
        to_column_index: Option<usize>,
    ) -> Outcome {
        self.relocate(block_id, from_parent_id, to_parent_id, to_index, to_column_index)
            .into()
    }

    pub(crate) fn mint_id(&mut self) -> BlockId {
        loop {
            let id = self.ids.next_id();
            if !id.is_root() && !self.document.contains(id.as_str()) {
                return id;
            }
        }
    }

    /// Resolve the child sequence `slot` of `parent_id`, reporting which rule failed.
    fn check_slot(&self, parent_id: &str, slot: Slot) -> Result<usize> {
        let parent = self
            .document
            .get(parent_id)
            .ok_or_else(|| Error::InvalidReference(BlockId::from(parent_id)))?;
        match slot {
            Slot::Linear => parent.linear_children().map(Vec::len).ok_or_else(|| {
                Error::StructuralMismatch(format!("{parent_id} has no childrenIds"))
            }),
            Slot::Column(idx) => {
                let columns = parent.columns().ok_or_else(|| {
                    Error::StructuralMismatch(format!("{parent_id} has no columns"))
                })?;
                columns
                    .get(idx)
                    .map(|c| c.children_ids.len())
                    .ok_or(Error::BoundsError {
                        index: idx,
                        len: columns.len(),
                    })
            }
        }
    }

    pub(crate) fn attach(
        &mut self,
        id: BlockId,
        parent_id: &str,
        slot: Slot,
        index: Option<usize>,
    ) -> Result<()> {
        let children = self
            .document
            .get_mut(parent_id)
            .and_then(|p| p.slot_mut(slot))
            .ok_or_else(|| Error::InvalidReference(BlockId::from(parent_id)))?;
        let idx = index.unwrap_or(children.len()).min(children.len());
        children.insert(idx, id);
        Ok(())
    }

    fn insert_new(
        &mut self,
        mut block: Block,
        parent_id: &str,
        slot: Slot,
        index: Option<usize>,
    ) -> Result<BlockId> {
        self.check_slot(parent_id, slot)?;
        // a fresh block cannot own anything yet
        block.clear_children();
        let id = self.mint_id();
        self.document.insert(id.clone(), block);
        self.attach(id.clone(), parent_id, slot, index)?;
        Ok(id)
    }

    fn remove_subtree(&mut self, block_id: &str) -> Result<()> {
        if block_id == BlockId::ROOT {
            return Err(Error::ProtectedBlock(BlockId::root()));
        }

        let mut removed: HashSet<BlockId> = if self.document.contains(block_id) {
            descendants(&self.document, block_id).into_iter().collect()
        } else {
            HashSet::from([BlockId::from(block_id)])
        };
        // malformed input can list root as a child; it still must survive
        removed.remove(BlockId::ROOT);

        let mut changed = false;
        for id in &removed {
            changed |= self.document.remove(id.as_str()).is_some();
        }
        for (_, block) in self.document.iter_mut() {
            block.for_each_slot_mut(|children| {
                let before = children.len();
                children.retain(|c| !removed.contains(c));
                changed |= children.len() != before;
            });
        }

        if !changed {
            return Err(Error::InvalidReference(BlockId::from(block_id)));
        }
        if self.selected.as_ref().is_some_and(|s| removed.contains(s)) {
            self.selected = None;
        }
        Ok(())
    }

    fn shift_sibling(&mut self, block_id: &str, parent_id: &str, delta: isize) -> Result<()> {
        let parent = self
            .document
            .get_mut(parent_id)
            .ok_or_else(|| Error::InvalidReference(BlockId::from(parent_id)))?;
        let children = parent.linear_children_mut().ok_or_else(|| {
            Error::StructuralMismatch(format!("{parent_id} has no childrenIds"))
        })?;
        let pos = children
            .iter()
            .position(|c| c.as_str() == block_id)
            .ok_or_else(|| Error::InvalidReference(BlockId::from(block_id)))?;
        let target = pos as isize + delta;
        if target < 0 || target as usize >= children.len() {
            return Err(Error::BoundsError {
                index: target.max(0) as usize,
                len: children.len(),
            });
        }
        children.swap(pos, target as usize);
        Ok(())
    }

    fn relocate(
        &mut self,
        block_id: &str,
        from_parent_id: &str,
        to_parent_id: &str,
        to_index: usize,
        to_column_index: Option<usize>,
    ) -> Result<()> {
        if block_id == BlockId::ROOT {
            return Err(Error::ProtectedBlock(BlockId::root()));
        }
        if !self.document.contains(block_id) {
            return Err(Error::InvalidReference(BlockId::from(block_id)));
        }
        let slot = match to_column_index {
            Some(idx) => Slot::Column(idx),
            None => Slot::Linear,
        };
        // validate the destination before touching anything
        self.check_slot(to_parent_id, slot)?;
        if is_descendant(&self.document, block_id, to_parent_id) {
            return Err(Error::CycleDetected(BlockId::from(block_id)));
        }

        let actual = find_parent_of_block(&self.document, block_id);
        match &actual {
            Some(parent) if parent.parent_id.as_str() != from_parent_id => log::warn!(
                "move of {block_id}: hinted parent {from_parent_id}, actual parent {}",
                parent.parent_id
            ),
            None => log::warn!("move of {block_id}: block had no parent, attaching it"),
            _ => {}
        }

        if let Some(parent) = actual {
            if let Some(children) = self
                .document
                .get_mut(parent.parent_id.as_str())
                .and_then(|p| p.slot_mut(parent.slot()))
            {
                children.retain(|c| c.as_str() != block_id);
            }
        }
        self.attach(BlockId::from(block_id), to_parent_id, slot, Some(to_index))
    }
}

impl<G: IdGenerator> BlockMover for BlockStore<G> {
    fn document(&self) -> &Document {
        &self.document
    }

    fn move_block(
        &mut self,
        block_id: &str,
        from_parent_id: &str,
        to_parent_id: &str,
        to_index: usize,
        to_column_index: Option<usize>,
    ) -> Outcome {
        BlockStore::move_block(
            self,
            block_id,
            from_parent_id,
            to_parent_id,
            to_index,
            to_column_index,
        )
    }
}
