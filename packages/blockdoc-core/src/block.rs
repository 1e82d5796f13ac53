//! Block model: a type tag plus an opaque style/props payload whose structural
//! fields (`childrenIds`, `columns`) decide whether the block is a container.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::BlockId;

/// Type tag of a block. Unknown tags from stored templates survive as `Custom`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BlockType {
    EmailLayout,
    Container,
    ColumnsContainer,
    Text,
    Heading,
    Button,
    Image,
    Avatar,
    Divider,
    Spacer,
    Html,
    Chart,
    Custom(String),
}

impl BlockType {
    pub fn as_str(&self) -> &str {
        match self {
            BlockType::EmailLayout => "EmailLayout",
            BlockType::Container => "Container",
            BlockType::ColumnsContainer => "ColumnsContainer",
            BlockType::Text => "Text",
            BlockType::Heading => "Heading",
            BlockType::Button => "Button",
            BlockType::Image => "Image",
            BlockType::Avatar => "Avatar",
            BlockType::Divider => "Divider",
            BlockType::Spacer => "Spacer",
            BlockType::Html => "Html",
            BlockType::Chart => "Chart",
            BlockType::Custom(tag) => tag,
        }
    }
}

impl From<String> for BlockType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "EmailLayout" => BlockType::EmailLayout,
            "Container" => BlockType::Container,
            "ColumnsContainer" => BlockType::ColumnsContainer,
            "Text" => BlockType::Text,
            "Heading" => BlockType::Heading,
            "Button" => BlockType::Button,
            "Image" => BlockType::Image,
            "Avatar" => BlockType::Avatar,
            "Divider" => BlockType::Divider,
            "Spacer" => BlockType::Spacer,
            "Html" => BlockType::Html,
            "Chart" => BlockType::Chart,
            _ => BlockType::Custom(tag),
        }
    }
}

impl From<BlockType> for String {
    fn from(ty: BlockType) -> Self {
        match ty {
            BlockType::Custom(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a column container.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(default)]
    pub children_ids: Vec<BlockId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_ids: Option<Vec<BlockId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Column>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BlockProps {
    /// Props with an empty linear child list.
    pub fn linear() -> Self {
        Self {
            children_ids: Some(Vec::new()),
            ..Self::default()
        }
    }

    /// Props with `count` empty columns.
    pub fn columns(count: usize) -> Self {
        Self {
            columns: Some(vec![Column::default(); count]),
            ..Self::default()
        }
    }

    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.extra.insert(key.to_string(), value);
        self
    }
}

/// Block payload. The layout root keeps its children at `data.childrenIds`,
/// every other container under `data.props`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<BlockProps>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_ids: Option<Vec<BlockId>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub data: BlockData,
}

/// Identifies one ordered child sequence inside a container block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Linear,
    Column(usize),
}

impl Block {
    pub fn new(block_type: BlockType) -> Self {
        Self {
            block_type,
            data: BlockData::default(),
        }
    }

    /// The layout root of an empty document.
    pub fn layout() -> Self {
        Self {
            block_type: BlockType::EmailLayout,
            data: BlockData {
                children_ids: Some(Vec::new()),
                ..BlockData::default()
            },
        }
    }

    pub fn with_props(mut self, props: BlockProps) -> Self {
        self.data.props = Some(props);
        self
    }

    pub fn with_style(mut self, style: Map<String, Value>) -> Self {
        self.data.style = Some(style);
        self
    }

    pub fn linear_children(&self) -> Option<&Vec<BlockId>> {
        self.data
            .props
            .as_ref()
            .and_then(|p| p.children_ids.as_ref())
            .or(self.data.children_ids.as_ref())
    }

    pub fn linear_children_mut(&mut self) -> Option<&mut Vec<BlockId>> {
        let in_props = self
            .data
            .props
            .as_ref()
            .is_some_and(|p| p.children_ids.is_some());
        if in_props {
            self.data.props.as_mut().and_then(|p| p.children_ids.as_mut())
        } else {
            self.data.children_ids.as_mut()
        }
    }

    pub fn columns(&self) -> Option<&Vec<Column>> {
        self.data.props.as_ref().and_then(|p| p.columns.as_ref())
    }

    pub fn columns_mut(&mut self) -> Option<&mut Vec<Column>> {
        self.data.props.as_mut().and_then(|p| p.columns.as_mut())
    }

    pub fn is_container(&self) -> bool {
        self.linear_children().is_some() || self.columns().is_some()
    }

    pub fn slot(&self, slot: Slot) -> Option<&Vec<BlockId>> {
        match slot {
            Slot::Linear => self.linear_children(),
            Slot::Column(idx) => self.columns().and_then(|c| c.get(idx)).map(|c| &c.children_ids),
        }
    }

    pub fn slot_mut(&mut self, slot: Slot) -> Option<&mut Vec<BlockId>> {
        match slot {
            Slot::Linear => self.linear_children_mut(),
            Slot::Column(idx) => self
                .columns_mut()
                .and_then(|c| c.get_mut(idx))
                .map(|c| &mut c.children_ids),
        }
    }

    /// Every child sequence of this block, linear first, then columns in order.
    pub fn slots(&self) -> Vec<(Slot, &Vec<BlockId>)> {
        let mut out = Vec::new();
        if let Some(children) = self.linear_children() {
            out.push((Slot::Linear, children));
        }
        if let Some(columns) = self.columns() {
            for (idx, column) in columns.iter().enumerate() {
                out.push((Slot::Column(idx), &column.children_ids));
            }
        }
        out
    }

    /// All direct children, across every sequence.
    pub fn child_ids(&self) -> Vec<BlockId> {
        self.slots()
            .into_iter()
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect()
    }

    /// Apply `f` to every child sequence in place.
    pub fn for_each_slot_mut(&mut self, mut f: impl FnMut(&mut Vec<BlockId>)) {
        if let Some(children) = self.data.children_ids.as_mut() {
            f(children);
        }
        if let Some(props) = self.data.props.as_mut() {
            if let Some(children) = props.children_ids.as_mut() {
                f(children);
            }
            if let Some(columns) = props.columns.as_mut() {
                for column in columns {
                    f(&mut column.children_ids);
                }
            }
        }
    }

    /// Empty every child sequence while keeping the container shape.
    pub(crate) fn clear_children(&mut self) {
        self.for_each_slot_mut(Vec::clear);
    }
}

/// Partial update for [`Block::data`]. Present fields replace their counterparts;
/// structural fields are carried over from the existing block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub props: Option<BlockProps>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DataPatch {
    pub fn is_empty(&self) -> bool {
        self.style.is_none() && self.props.is_none() && self.extra.is_empty()
    }

    pub(crate) fn merge_into(self, data: &mut BlockData) {
        if let Some(style) = self.style {
            data.style = Some(style);
        }
        if let Some(mut props) = self.props {
            let (children, columns) = match data.props.take() {
                Some(old) => (old.children_ids, old.columns),
                None => (None, None),
            };
            props.children_ids = children;
            props.columns = columns;
            data.props = Some(props);
        }
        for (key, value) in self.extra {
            if key == "childrenIds" {
                continue;
            }
            data.extra.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn layout_root_children_live_on_data() {
        let block: Block = serde_json::from_value(json!({
            "type": "EmailLayout",
            "data": { "backdropColor": "#eee", "childrenIds": ["a", "b"] }
        }))
        .unwrap();
        assert_eq!(block.block_type, BlockType::EmailLayout);
        assert_eq!(
            block.linear_children().unwrap(),
            &vec![BlockId::from("a"), BlockId::from("b")]
        );
        assert_eq!(block.data.extra.get("backdropColor"), Some(&json!("#eee")));
    }

    #[test]
    fn columns_and_opaque_props_round_trip() {
        let raw = json!({
            "type": "ColumnsContainer",
            "data": {
                "style": { "padding": 8 },
                "props": {
                    "columnsCount": 2,
                    "columns": [
                        { "childrenIds": ["x"] },
                        { "childrenIds": [], "width": "40%" }
                    ]
                }
            }
        });
        let block: Block = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(block.slot(Slot::Column(0)).unwrap(), &vec![BlockId::from("x")]);
        assert!(block.slot(Slot::Column(2)).is_none());
        assert!(block.linear_children().is_none());
        assert_eq!(serde_json::to_value(&block).unwrap(), raw);
    }

    #[test]
    fn unknown_type_is_preserved() {
        let block: Block = serde_json::from_value(json!({ "type": "Countdown" })).unwrap();
        assert_eq!(block.block_type, BlockType::Custom("Countdown".into()));
        assert_eq!(serde_json::to_value(&block).unwrap()["type"], json!("Countdown"));
    }

    #[test]
    fn patch_keeps_structure() {
        let mut block = Block::new(BlockType::Container).with_props(BlockProps {
            children_ids: Some(vec![BlockId::from("kid")]),
            ..BlockProps::default()
        });
        let patch = DataPatch {
            props: Some(BlockProps::default().with("align", json!("center"))),
            ..DataPatch::default()
        };
        patch.merge_into(&mut block.data);
        assert_eq!(block.linear_children().unwrap(), &vec![BlockId::from("kid")]);
        assert_eq!(
            block.data.props.as_ref().unwrap().extra.get("align"),
            Some(&json!("center"))
        );
    }
}
