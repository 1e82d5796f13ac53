#![forbid(unsafe_code)]
//! WASM-friendly bridge for the blockdoc editor.
//! Exposes one `WasmEditor` per editing session; documents and blocks cross the
//! boundary as the same JSON the template store persists.

use std::cell::RefCell;
use std::rc::Rc;

use blockdoc_core::{
    chart_blocks, chart_placeholder, Block, BlockId, ChangeLog, ChartMode, DataPatch, Document,
    DragDropCoordinator, DropTarget, Editor, EditorConfig, Outcome,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    #[cfg(feature = "console_log")]
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::warn!("logger already initialized");
    }
}

#[derive(Serialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
struct JsChart {
    id: String,
    mode: ChartMode,
    placeholder: String,
    data_source: serde_json::Value,
}

fn parse_block(json: &str) -> Result<Block, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid block: {e}"))
}

fn parse_patch(json: &str) -> Result<DataPatch, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid patch: {e}"))
}

fn drop_target(parent: String, index: u32, column: Option<u32>) -> DropTarget {
    match column {
        Some(column) => DropTarget::column(parent, column as usize, index as usize),
        None => DropTarget::linear(parent, index as usize),
    }
}

fn chart_rows(doc: &Document) -> Vec<JsChart> {
    chart_blocks(doc)
        .into_iter()
        .map(|chart| JsChart {
            placeholder: chart_placeholder(&chart.id),
            id: chart.id.to_string(),
            mode: chart.source.mode,
            data_source: serde_json::to_value(&chart.source).unwrap_or_default(),
        })
        .collect()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    // plain objects rather than ES Maps, so the host can treat it as stored JSON
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn id_of(outcome: Outcome<BlockId>) -> Option<String> {
    outcome.applied().map(|id| id.to_string())
}

#[wasm_bindgen]
pub struct WasmEditor {
    inner: Editor,
    dnd: DragDropCoordinator,
    changes: Rc<RefCell<ChangeLog>>,
}

#[wasm_bindgen]
impl WasmEditor {
    /// `config_json` is an optional `EditorConfig` object (`historyCapacity`, `idPrefix`).
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<WasmEditor, JsValue> {
        let config = match config_json.as_deref() {
            Some(json) => {
                EditorConfig::from_json_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => EditorConfig::default(),
        };
        let changes = Rc::new(RefCell::new(ChangeLog::default()));
        let mut inner = Editor::new(Document::new(), &config);
        inner.subscribe(Box::new(changes.clone()));
        Ok(WasmEditor {
            inner,
            dnd: DragDropCoordinator::new(),
            changes,
        })
    }

    #[wasm_bindgen(js_name = loadDocument)]
    pub fn load_document(&mut self, json: String) -> Result<(), JsValue> {
        let doc = Document::from_json_str(&json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.dnd.cancel();
        self.inner.load(doc);
        Ok(())
    }

    #[wasm_bindgen(js_name = documentJson)]
    pub fn document_json(&self) -> Result<String, JsValue> {
        self.inner
            .document()
            .to_json_string()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn document(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.document())
    }

    pub fn block(&self, id: String) -> Result<JsValue, JsValue> {
        match self.inner.block(&id) {
            Some(block) => to_js(block),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Structural check for hosts that load untrusted payloads.
    pub fn validate(&self) -> Result<(), JsValue> {
        self.inner
            .document()
            .validate_invariants()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn selected(&self) -> Option<String> {
        self.inner.selected().map(ToString::to_string)
    }

    #[wasm_bindgen(js_name = selectBlock)]
    pub fn select_block(&mut self, id: Option<String>) -> bool {
        self.inner.select_block(id.as_deref()).is_applied()
    }

    /// Returns the new id, or `undefined` when nothing was inserted.
    #[wasm_bindgen(js_name = addBlock)]
    pub fn add_block(
        &mut self,
        block_json: String,
        parent_id: String,
        index: Option<u32>,
    ) -> Result<Option<String>, JsValue> {
        let block = parse_block(&block_json).map_err(|e| JsValue::from_str(&e))?;
        Ok(id_of(self.inner.add_block(
            block,
            &parent_id,
            index.map(|i| i as usize),
        )))
    }

    #[wasm_bindgen(js_name = addBlockToColumn)]
    pub fn add_block_to_column(
        &mut self,
        block_json: String,
        parent_id: String,
        column_index: u32,
        index: Option<u32>,
    ) -> Result<Option<String>, JsValue> {
        let block = parse_block(&block_json).map_err(|e| JsValue::from_str(&e))?;
        Ok(id_of(self.inner.add_block_to_column(
            block,
            &parent_id,
            column_index as usize,
            index.map(|i| i as usize),
        )))
    }

    #[wasm_bindgen(js_name = updateBlock)]
    pub fn update_block(&mut self, id: String, patch_json: String) -> Result<bool, JsValue> {
        let patch = parse_patch(&patch_json).map_err(|e| JsValue::from_str(&e))?;
        Ok(self.inner.update_block(&id, patch).is_applied())
    }

    #[wasm_bindgen(js_name = deleteBlock)]
    pub fn delete_block(&mut self, id: String) -> bool {
        self.inner.delete_block(&id).is_applied()
    }

    #[wasm_bindgen(js_name = moveBlockUp)]
    pub fn move_block_up(&mut self, id: String, parent_id: String) -> bool {
        self.inner.move_block_up(&id, &parent_id).is_applied()
    }

    #[wasm_bindgen(js_name = moveBlockDown)]
    pub fn move_block_down(&mut self, id: String, parent_id: String) -> bool {
        self.inner.move_block_down(&id, &parent_id).is_applied()
    }

    #[wasm_bindgen(js_name = moveBlock)]
    pub fn move_block(
        &mut self,
        id: String,
        from_parent_id: String,
        to_parent_id: String,
        to_index: u32,
        to_column_index: Option<u32>,
    ) -> bool {
        self.inner
            .move_block(
                &id,
                &from_parent_id,
                &to_parent_id,
                to_index as usize,
                to_column_index.map(|c| c as usize),
            )
            .is_applied()
    }

    #[wasm_bindgen(js_name = duplicateBlock)]
    pub fn duplicate_block(&mut self, id: String) -> Option<String> {
        id_of(self.inner.duplicate_block(&id))
    }

    #[wasm_bindgen(js_name = copyBlock)]
    pub fn copy_block(&mut self, id: String) -> bool {
        self.inner.copy_block(&id).is_applied()
    }

    #[wasm_bindgen(js_name = cutBlock)]
    pub fn cut_block(&mut self, id: String) -> bool {
        self.inner.cut_block(&id).is_applied()
    }

    #[wasm_bindgen(js_name = pasteBlock)]
    pub fn paste_block(&mut self, parent_id: String, index: Option<u32>) -> Option<String> {
        id_of(self.inner.paste_block(&parent_id, index.map(|i| i as usize)))
    }

    #[wasm_bindgen(js_name = hasClipboard)]
    pub fn has_clipboard(&self) -> bool {
        self.inner.clipboard().is_some()
    }

    pub fn undo(&mut self) -> bool {
        self.inner.undo().is_applied()
    }

    pub fn redo(&mut self) -> bool {
        self.inner.redo().is_applied()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    #[wasm_bindgen(js_name = clearHistory)]
    pub fn clear_history(&mut self) {
        self.inner.clear_history();
    }

    #[wasm_bindgen(js_name = dragBegin)]
    pub fn drag_begin(&mut self, id: String) -> bool {
        self.dnd.begin(self.inner.document(), &id).is_applied()
    }

    #[wasm_bindgen(js_name = dragHover)]
    pub fn drag_hover(&mut self, parent_id: String, index: u32, column_index: Option<u32>) -> bool {
        let target = drop_target(parent_id, index, column_index);
        self.dnd.hover(self.inner.document(), target).is_applied()
    }

    #[wasm_bindgen(js_name = dragLeave)]
    pub fn drag_leave(&mut self) {
        self.dnd.leave();
    }

    #[wasm_bindgen(js_name = dragCancel)]
    pub fn drag_cancel(&mut self) {
        self.dnd.cancel();
    }

    #[wasm_bindgen(js_name = dragDrop)]
    pub fn drag_drop(&mut self) -> bool {
        self.dnd.drop_on(&mut self.inner).is_applied()
    }

    #[wasm_bindgen(js_name = isDragging)]
    pub fn is_dragging(&self) -> bool {
        self.dnd.is_dragging()
    }

    /// True once after any committed change; autosave polls this to debounce writes.
    #[wasm_bindgen(js_name = takeChanged)]
    pub fn take_changed(&mut self) -> bool {
        self.changes.borrow_mut().take_dirty()
    }

    pub fn charts(&self) -> Result<JsValue, JsValue> {
        to_js(&chart_rows(self.inner.document()))
    }
}
