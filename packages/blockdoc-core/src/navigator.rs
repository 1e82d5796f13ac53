//! Read-only structural queries over a [`Document`].
//!
//! The document stores no parent pointers, so every lookup here is a scan. That is
//! fine at editor scale (tens to low hundreds of blocks).

use std::collections::HashSet;

use crate::block::Slot;
use crate::document::Document;
use crate::ids::BlockId;

/// Where a block currently lives.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParentRef {
    pub parent_id: BlockId,
    pub column_index: Option<usize>,
}

impl ParentRef {
    pub fn linear(parent_id: impl Into<BlockId>) -> Self {
        Self {
            parent_id: parent_id.into(),
            column_index: None,
        }
    }

    pub fn column(parent_id: impl Into<BlockId>, column_index: usize) -> Self {
        Self {
            parent_id: parent_id.into(),
            column_index: Some(column_index),
        }
    }

    pub fn slot(&self) -> Slot {
        match self.column_index {
            Some(idx) => Slot::Column(idx),
            None => Slot::Linear,
        }
    }
}

/// First container (linear or column) whose children include `block_id`.
pub fn find_parent_of_block(doc: &Document, block_id: &str) -> Option<ParentRef> {
    doc.iter().find_map(|(pid, block)| {
        block.slots().into_iter().find_map(|(slot, children)| {
            children.iter().any(|c| c.as_str() == block_id).then(|| match slot {
                Slot::Linear => ParentRef::linear(pid.clone()),
                Slot::Column(idx) => ParentRef::column(pid.clone(), idx),
            })
        })
    })
}

/// Parent plus the index of `block_id` within the owning sequence.
pub fn position_in_parent(doc: &Document, block_id: &str) -> Option<(ParentRef, usize)> {
    let parent = find_parent_of_block(doc, block_id)?;
    let index = doc
        .get(parent.parent_id.as_str())?
        .slot(parent.slot())?
        .iter()
        .position(|c| c.as_str() == block_id)?;
    Some((parent, index))
}

/// Pre-order walk of `block_id` and everything below it. Unknown ids yield nothing;
/// ids already visited are skipped so malformed (cyclic) input still terminates.
pub fn descendants(doc: &Document, block_id: &str) -> Vec<BlockId> {
    let mut out = Vec::new();
    if !doc.contains(block_id) {
        return out;
    }
    let mut seen = HashSet::new();
    let mut stack = vec![BlockId::from(block_id)];
    while let Some(id) = stack.pop() {
        if !seen.insert(id.clone()) {
            continue;
        }
        if let Some(block) = doc.get(id.as_str()) {
            let mut children = block.child_ids();
            children.reverse();
            stack.extend(children);
        }
        out.push(id);
    }
    out
}

/// Whether `candidate` is `ancestor` itself or sits anywhere below it.
pub fn is_descendant(doc: &Document, ancestor: &str, candidate: &str) -> bool {
    descendants(doc, ancestor)
        .iter()
        .any(|id| id.as_str() == candidate)
}
