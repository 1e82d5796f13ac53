//! Subtree capture and id remapping behind duplicate, copy, cut, and paste.

use std::collections::{HashMap, HashSet};

use crate::block::{Block, Slot};
use crate::document::Document;
use crate::error::{Error, Outcome, Result};
use crate::ids::BlockId;
use crate::navigator::{descendants, position_in_parent};
use crate::store::BlockStore;
use crate::traits::IdGenerator;

/// Deep copy of a subtree, detached from the live document.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipboardEntry {
    pub root_id: BlockId,
    pub block: Block,
    /// Every descendant of `block`, keyed by its original id.
    pub child_blocks: HashMap<BlockId, Block>,
}

impl ClipboardEntry {
    fn subtree(&self) -> HashMap<BlockId, Block> {
        let mut all = self.child_blocks.clone();
        all.insert(self.root_id.clone(), self.block.clone());
        all
    }
}

/// A subtree under fresh ids, plus the old → new mapping that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct RemappedSubtree {
    pub blocks: HashMap<BlockId, Block>,
    pub mapping: HashMap<BlockId, BlockId>,
}

/// `block_id` and its entire subtree as an id → block map. Unknown ids give an empty map.
pub fn collect_child_blocks(doc: &Document, block_id: &str) -> HashMap<BlockId, Block> {
    descendants(doc, block_id)
        .into_iter()
        .filter_map(|id| doc.get(id.as_str()).cloned().map(|block| (id, block)))
        .collect()
}

/// Give every block in `subtree` a fresh id and rewrite the child references that point
/// inside the subtree. References to ids outside it are kept verbatim.
pub fn remap_block_ids(
    subtree: &HashMap<BlockId, Block>,
    ids: &mut impl IdGenerator,
) -> RemappedSubtree {
    let mut issued = HashSet::new();
    let mut mapping = HashMap::with_capacity(subtree.len());
    for old in subtree.keys() {
        let fresh = loop {
            let candidate = ids.next_id();
            if !subtree.contains_key(&candidate) && issued.insert(candidate.clone()) {
                break candidate;
            }
        };
        mapping.insert(old.clone(), fresh);
    }

    let blocks = subtree
        .iter()
        .map(|(old, block)| {
            let mut block = block.clone();
            block.for_each_slot_mut(|children| {
                for child in children.iter_mut() {
                    if let Some(new) = mapping.get(child) {
                        *child = new.clone();
                    }
                }
            });
            (mapping[old].clone(), block)
        })
        .collect();

    RemappedSubtree { blocks, mapping }
}

/// Mints ids that are unused in the live document.
struct FreshIds<'a, G: IdGenerator> {
    inner: &'a mut G,
    taken: &'a Document,
}

impl<G: IdGenerator> IdGenerator for FreshIds<'_, G> {
    fn next_id(&mut self) -> BlockId {
        loop {
            let id = self.inner.next_id();
            if !id.is_root() && !self.taken.contains(id.as_str()) {
                return id;
            }
        }
    }
}

impl<G: IdGenerator> BlockStore<G> {
    pub fn clipboard(&self) -> Option<&ClipboardEntry> {
        self.clipboard.as_ref()
    }

    /// Clone the subtree in place, right after the original, and select the copy.
    pub fn duplicate_block(&mut self, block_id: &str) -> Outcome<BlockId> {
        self.duplicate(block_id).into()
    }

    /// Snapshot the subtree into the clipboard. Ids are remapped at paste time.
    pub fn copy_block(&mut self, block_id: &str) -> Outcome {
        self.capture(block_id)
            .map(|entry| self.clipboard = Some(entry))
            .into()
    }

    /// Copy then delete.
    pub fn cut_block(&mut self, block_id: &str) -> Outcome {
        let res = self.capture(block_id).and_then(|entry| {
            self.delete_block(block_id).into_result()?;
            self.clipboard = Some(entry);
            Ok(())
        });
        res.into()
    }

    /// Insert a freshly remapped copy of the clipboard into the linear children of
    /// `parent_id`. Column targets are not supported and are left unchanged.
    pub fn paste_block(&mut self, parent_id: &str, index: Option<usize>) -> Outcome<BlockId> {
        self.paste(parent_id, index).into()
    }

    fn capture(&self, block_id: &str) -> Result<ClipboardEntry> {
        if block_id == BlockId::ROOT {
            return Err(Error::ProtectedBlock(BlockId::root()));
        }
        let mut child_blocks = collect_child_blocks(&self.document, block_id);
        let block = child_blocks
            .remove(block_id)
            .ok_or_else(|| Error::InvalidReference(BlockId::from(block_id)))?;
        Ok(ClipboardEntry {
            root_id: BlockId::from(block_id),
            block,
            child_blocks,
        })
    }

    fn splice(
        &mut self,
        remapped: RemappedSubtree,
        root: &BlockId,
        parent_id: &str,
        slot: Slot,
        index: Option<usize>,
    ) -> Result<BlockId> {
        let new_root = remapped
            .mapping
            .get(root)
            .cloned()
            .ok_or_else(|| Error::InconsistentState(format!("remap lost {root}")))?;
        for (id, block) in remapped.blocks {
            self.document.insert(id, block);
        }
        self.attach(new_root.clone(), parent_id, slot, index)?;
        self.selected = Some(new_root.clone());
        Ok(new_root)
    }

    fn remap_fresh(&mut self, subtree: &HashMap<BlockId, Block>) -> RemappedSubtree {
        let mut fresh = FreshIds {
            inner: &mut self.ids,
            taken: &self.document,
        };
        remap_block_ids(subtree, &mut fresh)
    }

    fn duplicate(&mut self, block_id: &str) -> Result<BlockId> {
        if block_id == BlockId::ROOT {
            return Err(Error::ProtectedBlock(BlockId::root()));
        }
        let (parent, pos) = position_in_parent(&self.document, block_id)
            .ok_or_else(|| Error::InvalidReference(BlockId::from(block_id)))?;
        let subtree = collect_child_blocks(&self.document, block_id);
        let remapped = self.remap_fresh(&subtree);
        self.splice(
            remapped,
            &BlockId::from(block_id),
            parent.parent_id.as_str(),
            parent.slot(),
            Some(pos + 1),
        )
    }

    fn paste(&mut self, parent_id: &str, index: Option<usize>) -> Result<BlockId> {
        let entry = self.clipboard.as_ref().ok_or(Error::EmptyClipboard)?;
        let parent = self
            .document
            .get(parent_id)
            .ok_or_else(|| Error::InvalidReference(BlockId::from(parent_id)))?;
        if parent.linear_children().is_none() {
            return Err(Error::StructuralMismatch(format!(
                "{parent_id} has no childrenIds"
            )));
        }
        let root = entry.root_id.clone();
        let subtree = entry.subtree();
        let remapped = self.remap_fresh(&subtree);
        self.splice(remapped, &root, parent_id, Slot::Linear, index)
    }
}
