//! Fixtures and invariant checks shared by the blockdoc test suites.

use std::collections::HashMap;

use blockdoc_core::{
    Block, BlockId, BlockMover, BlockProps, BlockType, Document, Editor, IdGenerator, Outcome,
};
use serde_json::json;

pub fn text(s: &str) -> Block {
    Block::new(BlockType::Text).with_props(BlockProps::default().with("text", json!(s)))
}

pub fn container() -> Block {
    Block::new(BlockType::Container).with_props(BlockProps::linear())
}

pub fn columns(count: usize) -> Block {
    Block::new(BlockType::ColumnsContainer)
        .with_props(BlockProps::columns(count).with("columnsCount", json!(count)))
}

/// A small newsletter: heading, a two-column row (text | container with image and
/// button), a chart, and a footer text.
pub fn newsletter() -> Document {
    Document::from_json_value(json!({
        "root": {
            "type": "EmailLayout",
            "data": {
                "backdropColor": "#F5F5F5",
                "canvasColor": "#FFFFFF",
                "childrenIds": ["heading", "row", "chart", "footer"]
            }
        },
        "heading": { "type": "Heading", "data": { "props": { "text": "Monthly update", "level": "h1" } } },
        "row": { "type": "ColumnsContainer", "data": { "props": {
            "columnsCount": 2,
            "columns": [
                { "childrenIds": ["intro"] },
                { "childrenIds": ["card"] }
            ]
        } } },
        "intro": { "type": "Text", "data": { "props": { "text": "Hello {{name}}" } } },
        "card": { "type": "Container", "data": {
            "style": { "padding": { "top": 16, "bottom": 16 } },
            "props": { "childrenIds": ["photo", "cta"] }
        } },
        "photo": { "type": "Image", "data": { "props": { "url": "https://example.com/a.png" } } },
        "cta": { "type": "Button", "data": { "props": { "text": "Read more", "url": "https://example.com" } } },
        "chart": { "type": "Chart", "data": { "props": {
            "dataSource": { "mode": "static", "series": [1, 2, 3] }
        } } },
        "footer": { "type": "Text", "data": { "props": { "text": "Unsubscribe" } } }
    }))
    .expect("newsletter fixture is valid JSON")
}

/// How many containers list each block id. A healthy tree has 1 for every non-root id.
pub fn ownership_counts(doc: &Document) -> HashMap<BlockId, usize> {
    let mut counts: HashMap<BlockId, usize> = doc.ids().map(|id| (id.clone(), 0)).collect();
    for (_, block) in doc.iter() {
        for child in block.child_ids() {
            *counts.entry(child).or_default() += 1;
        }
    }
    counts
}

/// Panics with a readable message when the document is not a proper tree.
pub fn assert_tree(doc: &Document) {
    if let Err(err) = doc.validate_invariants() {
        panic!("document is not a tree: {err}\n{doc:#?}");
    }
    for (id, count) in ownership_counts(doc) {
        let expected = usize::from(!id.is_root());
        assert_eq!(count, expected, "block {id} owned {count} times");
    }
}

/// One scripted editor call. Indices and ids are raw, as a UI would send them.
#[derive(Clone, Debug)]
pub enum Step {
    Add { parent: usize, index: usize },
    AddColumns { parent: usize },
    AddToColumn { parent: usize, column: usize },
    Delete { block: usize },
    Move { block: usize, to: usize, index: usize, column: Option<usize> },
    Up { block: usize },
    Down { block: usize },
    Duplicate { block: usize },
    Copy { block: usize },
    Paste { parent: usize },
}

/// Pick the `n`th id (sorted, wrapping) so scripted steps hit real blocks most of
/// the time without knowing minted ids in advance.
pub fn pick(doc: &Document, n: usize) -> BlockId {
    let mut ids: Vec<BlockId> = doc.ids().cloned().collect();
    ids.sort();
    ids[n % ids.len()].clone()
}

/// Apply `step` and report whether the document changed shape.
pub fn apply_step<G: IdGenerator>(editor: &mut Editor<G>, step: &Step) -> bool {
    let doc = editor.document().clone();
    let id = |n: usize| pick(&doc, n);
    match step {
        Step::Add { parent, index } => editor
            .add_block(text("t"), id(*parent).as_str(), Some(*index))
            .is_applied(),
        Step::AddColumns { parent } => editor
            .add_block(columns(2), id(*parent).as_str(), None)
            .is_applied(),
        Step::AddToColumn { parent, column } => editor
            .add_block_to_column(container(), id(*parent).as_str(), *column, None)
            .is_applied(),
        Step::Delete { block } => editor.delete_block(id(*block).as_str()).is_applied(),
        Step::Move {
            block,
            to,
            index,
            column,
        } => {
            let block = id(*block);
            let outcome: Outcome = BlockMover::move_block(
                editor,
                block.as_str(),
                "root",
                id(*to).as_str(),
                *index,
                *column,
            );
            outcome.is_applied()
        }
        Step::Up { block } => {
            let block = id(*block);
            let parent = blockdoc_core::find_parent_of_block(&doc, block.as_str())
                .map(|p| p.parent_id)
                .unwrap_or_else(BlockId::root);
            editor.move_block_up(block.as_str(), parent.as_str()).is_applied()
        }
        Step::Down { block } => {
            let block = id(*block);
            let parent = blockdoc_core::find_parent_of_block(&doc, block.as_str())
                .map(|p| p.parent_id)
                .unwrap_or_else(BlockId::root);
            editor.move_block_down(block.as_str(), parent.as_str()).is_applied()
        }
        Step::Duplicate { block } => editor.duplicate_block(id(*block).as_str()).is_applied(),
        Step::Copy { block } => {
            let _ = editor.copy_block(id(*block).as_str());
            false
        }
        Step::Paste { parent } => editor.paste_block(id(*parent).as_str(), None).is_applied(),
    }
}
