#![forbid(unsafe_code)]
//! Block-tree document model and mutation engine for the template designer.
//! A document is a flat id → block map; this crate keeps it a proper tree under every
//! edit, with linear undo/redo, clipboard, and drag-and-drop glue. It does no I/O, so
//! hosts (wasm, tests, servers) own persistence and rendering.

pub mod block;
pub mod chart;
pub mod clipboard;
pub mod config;
pub mod dnd;
pub mod document;
pub mod editor;
pub mod error;
pub mod history;
pub mod ids;
pub mod navigator;
pub mod store;
pub mod traits;

pub use block::{Block, BlockData, BlockProps, BlockType, Column, DataPatch, Slot};
pub use chart::{chart_blocks, chart_placeholder, ChartBlock, ChartDataSource, ChartMode};
pub use clipboard::{collect_child_blocks, remap_block_ids, ClipboardEntry, RemappedSubtree};
pub use config::{EditorConfig, DEFAULT_HISTORY_CAPACITY};
pub use dnd::{DragDropCoordinator, DragState, DropTarget};
pub use document::Document;
pub use editor::Editor;
pub use error::{Error, Outcome, Result};
pub use history::History;
pub use ids::BlockId;
pub use navigator::{descendants, find_parent_of_block, is_descendant, position_in_parent, ParentRef};
pub use store::BlockStore;
pub use traits::{
    BlockMover, Change, ChangeListener, ChangeLog, IdGenerator, SequentialIds, UuidIds,
};
