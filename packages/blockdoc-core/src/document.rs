use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::block::{Block, BlockType};
use crate::error::{Error, Result};
use crate::ids::BlockId;

/// Flat id → block map for one template. `root` is always present.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Document {
    blocks: HashMap<BlockId, Block>,
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        HashMap::deserialize(deserializer).map(Self::from_blocks)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty template: a layout root with no children.
    pub fn new() -> Self {
        let mut blocks = HashMap::new();
        blocks.insert(BlockId::root(), Block::layout());
        Self { blocks }
    }

    /// Build from an arbitrary map. A missing root is filled in with an empty layout;
    /// nothing else is checked.
    pub fn from_blocks(mut blocks: HashMap<BlockId, Block>) -> Self {
        if !blocks.contains_key(BlockId::ROOT) {
            log::warn!("document has no root block; inserting an empty layout");
            blocks.insert(BlockId::root(), Block::layout());
        }
        Self { blocks }
    }

    /// Hydrate from a stored design payload. Shape errors surface here only when the
    /// JSON cannot be read as blocks at all; structural problems pass through.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn root(&self) -> Option<&Block> {
        self.blocks.get(BlockId::ROOT)
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Block> {
        self.blocks.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blocks.contains_key(id)
    }

    /// Number of blocks, root included, so never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = &BlockId> {
        self.blocks.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockId, &Block)> {
        self.blocks.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&BlockId, &mut Block)> {
        self.blocks.iter_mut()
    }

    pub(crate) fn insert(&mut self, id: BlockId, block: Block) {
        self.blocks.insert(id, block);
    }

    pub(crate) fn remove(&mut self, id: &str) -> Option<Block> {
        self.blocks.remove(id)
    }

    /// Validate invariants: root present with the layout type, every referenced child
    /// exists, every non-root block is owned exactly once, and no cycles.
    /// Intended for tests and debugging.
    pub fn validate_invariants(&self) -> Result<()> {
        match self.root() {
            Some(root) if root.block_type == BlockType::EmailLayout => {}
            Some(root) => {
                return Err(Error::InconsistentState(format!(
                    "root has type {}",
                    root.block_type
                )))
            }
            None => return Err(Error::InconsistentState("root missing".into())),
        }

        let mut owner: HashMap<&BlockId, &BlockId> = HashMap::new();
        for (pid, block) in &self.blocks {
            for (_, children) in block.slots() {
                for child in children {
                    if !self.blocks.contains_key(child) {
                        return Err(Error::InconsistentState(format!(
                            "{pid} references missing child {child}"
                        )));
                    }
                    if child.is_root() {
                        return Err(Error::InconsistentState(format!("{pid} owns root")));
                    }
                    if let Some(prev) = owner.insert(child, pid) {
                        return Err(Error::InconsistentState(format!(
                            "{child} owned by both {prev} and {pid}"
                        )));
                    }
                }
            }
        }

        for id in self.blocks.keys() {
            if !id.is_root() && !owner.contains_key(id) {
                return Err(Error::InconsistentState(format!("{id} is orphaned")));
            }
        }

        // acyclic check: every ownership chain must reach root
        for start in self.blocks.keys() {
            let mut visited = HashSet::new();
            let mut current = start;
            while let Some(parent) = owner.get(current) {
                if !visited.insert(current) {
                    return Err(Error::InconsistentState(format!("cycle through {start}")));
                }
                current = *parent;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_document_is_valid() {
        let doc = Document::new();
        assert_eq!(doc.len(), 1);
        doc.validate_invariants().unwrap();
    }

    #[test]
    fn loads_stored_design_payload() {
        let doc = Document::from_json_value(json!({
            "root": { "type": "EmailLayout", "data": { "childrenIds": ["t1"] } },
            "t1": { "type": "Text", "data": { "props": { "text": "hello" } } }
        }))
        .unwrap();
        doc.validate_invariants().unwrap();
        assert_eq!(doc.get("t1").unwrap().block_type, BlockType::Text);
    }

    #[test]
    fn missing_root_is_filled_in() {
        let doc = Document::from_json_str("{}").unwrap();
        assert!(doc.root().is_some());

        // plain serde entry points get the same repair
        let doc: Document = serde_json::from_str("{}").unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.root().unwrap().block_type, BlockType::EmailLayout);
    }

    #[test]
    fn detects_double_ownership_and_orphans() {
        let shared = Document::from_json_value(json!({
            "root": { "type": "EmailLayout", "data": { "childrenIds": ["a", "a"] } },
            "a": { "type": "Text" }
        }))
        .unwrap();
        assert!(shared.validate_invariants().is_err());

        let orphan = Document::from_json_value(json!({
            "root": { "type": "EmailLayout", "data": { "childrenIds": [] } },
            "a": { "type": "Text" }
        }))
        .unwrap();
        assert!(orphan.validate_invariants().is_err());
    }

    #[test]
    fn detects_cycles() {
        let doc = Document::from_json_value(json!({
            "root": { "type": "EmailLayout", "data": { "childrenIds": [] } },
            "a": { "type": "Container", "data": { "props": { "childrenIds": ["b"] } } },
            "b": { "type": "Container", "data": { "props": { "childrenIds": ["a"] } } }
        }))
        .unwrap();
        assert!(doc.validate_invariants().is_err());
    }
}
