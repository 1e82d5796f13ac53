//! Pointer-gesture glue: drag start, hover over drop zones, drop.
//!
//! The coordinator only remembers what is being dragged and where it would land.
//! A drop turns into exactly one [`BlockMover::move_block`] call; the mover still
//! validates everything, since hover targets come straight from the UI.

use crate::document::Document;
use crate::error::{Error, Outcome};
use crate::ids::BlockId;
use crate::navigator::{is_descendant, position_in_parent, ParentRef};
use crate::traits::BlockMover;

/// A resolved drop zone. `index` is the insertion point as the UI sees the list,
/// i.e. with the dragged block still in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DropTarget {
    pub parent_id: BlockId,
    pub index: usize,
    pub column_index: Option<usize>,
}

impl DropTarget {
    pub fn linear(parent_id: impl Into<BlockId>, index: usize) -> Self {
        Self {
            parent_id: parent_id.into(),
            index,
            column_index: None,
        }
    }

    pub fn column(parent_id: impl Into<BlockId>, column_index: usize, index: usize) -> Self {
        Self {
            parent_id: parent_id.into(),
            index,
            column_index: Some(column_index),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        block_id: BlockId,
        origin: Option<(ParentRef, usize)>,
        target: Option<DropTarget>,
    },
}

#[derive(Clone, Debug, Default)]
pub struct DragDropCoordinator {
    state: DragState,
}

impl DragDropCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn begin(&mut self, doc: &Document, block_id: &str) -> Outcome {
        if block_id == BlockId::ROOT {
            return Outcome::Unchanged(Error::ProtectedBlock(BlockId::root()));
        }
        if !doc.contains(block_id) {
            return Outcome::Unchanged(Error::InvalidReference(block_id.into()));
        }
        self.state = DragState::Dragging {
            block_id: block_id.into(),
            origin: position_in_parent(doc, block_id),
            target: None,
        };
        Outcome::Applied(())
    }

    /// Point at a drop zone. Zones inside the dragged subtree are refused and clear
    /// any previous target.
    pub fn hover(&mut self, doc: &Document, target: DropTarget) -> Outcome {
        let DragState::Dragging {
            block_id,
            target: current,
            ..
        } = &mut self.state
        else {
            return Outcome::Unchanged(Error::StructuralMismatch("no drag in progress".into()));
        };
        if is_descendant(doc, block_id.as_str(), target.parent_id.as_str()) {
            *current = None;
            return Outcome::Unchanged(Error::CycleDetected(block_id.clone()));
        }
        *current = Some(target);
        Outcome::Applied(())
    }

    /// Pointer left every drop zone.
    pub fn leave(&mut self) {
        if let DragState::Dragging { target, .. } = &mut self.state {
            *target = None;
        }
    }

    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }

    /// Finish the gesture. Always returns to idle; moves only when a target was resolved.
    pub fn drop_on(&mut self, mover: &mut impl BlockMover) -> Outcome {
        let DragState::Dragging {
            block_id,
            origin,
            target,
        } = std::mem::take(&mut self.state)
        else {
            return Outcome::Unchanged(Error::StructuralMismatch("no drag in progress".into()));
        };
        let Some(target) = target else {
            return Outcome::Unchanged(Error::StructuralMismatch("no drop target".into()));
        };

        // the origin may be stale if the document changed mid-drag
        let current = position_in_parent(mover.document(), block_id.as_str()).or(origin);
        let from_parent = current
            .as_ref()
            .map(|(p, _)| p.parent_id.clone())
            .unwrap_or_else(BlockId::root);

        let mut index = target.index;
        if let Some((parent, pos)) = &current {
            let same_sequence =
                parent.parent_id == target.parent_id && parent.column_index == target.column_index;
            if same_sequence && *pos < index {
                index -= 1;
            }
        }

        mover.move_block(
            block_id.as_str(),
            from_parent.as_str(),
            target.parent_id.as_str(),
            index,
            target.column_index,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Slot;
    use crate::store::BlockStore;
    use crate::traits::SequentialIds;
    use serde_json::json;

    fn store() -> BlockStore<SequentialIds> {
        let doc = Document::from_json_value(json!({
            "root": { "type": "EmailLayout", "data": { "childrenIds": ["a", "b", "c", "cols"] } },
            "a": { "type": "Text" },
            "b": { "type": "Text" },
            "c": { "type": "Text" },
            "cols": { "type": "ColumnsContainer", "data": { "props": { "columns": [
                { "childrenIds": [] }, { "childrenIds": ["inner"] }
            ] } } },
            "inner": { "type": "Container", "data": { "props": { "childrenIds": [] } } }
        }))
        .unwrap();
        BlockStore::with_ids(doc, SequentialIds::default())
    }

    fn root_children(store: &BlockStore<SequentialIds>) -> Vec<String> {
        store
            .document()
            .root()
            .unwrap()
            .linear_children()
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn drop_below_in_same_list_accounts_for_detach() {
        let mut store = store();
        let mut dnd = DragDropCoordinator::new();
        dnd.begin(store.document(), "a").applied().unwrap();
        // UI says: insert before "c" (index 2 with "a" still present)
        dnd.hover(store.document(), DropTarget::linear("root", 2))
            .applied()
            .unwrap();
        assert!(dnd.drop_on(&mut store).is_applied());
        assert_eq!(root_children(&store), vec!["b", "a", "c", "cols"]);
        assert!(!dnd.is_dragging());
    }

    #[test]
    fn drop_into_column() {
        let mut store = store();
        let mut dnd = DragDropCoordinator::new();
        dnd.begin(store.document(), "b").applied().unwrap();
        dnd.hover(store.document(), DropTarget::column("cols", 0, 0))
            .applied()
            .unwrap();
        assert!(dnd.drop_on(&mut store).is_applied());
        let cols = store.block("cols").unwrap();
        assert_eq!(cols.slot(Slot::Column(0)).unwrap(), &vec![BlockId::from("b")]);
        store.document().validate_invariants().unwrap();
    }

    #[test]
    fn refuses_targets_inside_dragged_subtree() {
        let mut store = store();
        let mut dnd = DragDropCoordinator::new();
        dnd.begin(store.document(), "cols").applied().unwrap();
        assert!(!dnd
            .hover(store.document(), DropTarget::linear("inner", 0))
            .is_applied());
        let before = store.document().clone();
        assert!(!dnd.drop_on(&mut store).is_applied());
        assert_eq!(store.document(), &before);
    }

    #[test]
    fn drop_without_drag_or_target_is_a_no_op() {
        let mut store = store();
        let mut dnd = DragDropCoordinator::new();
        assert!(!dnd.drop_on(&mut store).is_applied());
        assert!(!dnd.begin(store.document(), "root").is_applied());

        dnd.begin(store.document(), "a").applied().unwrap();
        dnd.hover(store.document(), DropTarget::linear("root", 3))
            .applied()
            .unwrap();
        dnd.leave();
        assert!(!dnd.drop_on(&mut store).is_applied());

        dnd.begin(store.document(), "a").applied().unwrap();
        dnd.cancel();
        assert_eq!(dnd.state(), &DragState::Idle);
    }
}
