//! Chart blocks as seen by the external compiler: which blocks are charts, where their
//! data comes from, and the inert placeholder that stands in for them in stored markup.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::BlockType;
use crate::document::Document;
use crate::ids::BlockId;
use crate::navigator::descendants;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMode {
    #[default]
    Static,
    /// Resolved from template variables at send time.
    Dynamic,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDataSource {
    #[serde(default)]
    pub mode: ChartMode,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, Value>,
}

impl ChartDataSource {
    /// Lenient parse of `props.dataSource`; anything unreadable counts as static with
    /// no payload.
    pub fn from_props_value(value: Option<&Value>) -> Self {
        value
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartBlock {
    pub id: BlockId,
    pub source: ChartDataSource,
}

/// Every chart block reachable from root, in document order.
pub fn chart_blocks(doc: &Document) -> Vec<ChartBlock> {
    descendants(doc, BlockId::ROOT)
        .into_iter()
        .filter_map(|id| {
            let block = doc.get(id.as_str())?;
            if block.block_type != BlockType::Chart {
                return None;
            }
            let raw = block
                .data
                .props
                .as_ref()
                .and_then(|p| p.extra.get("dataSource"));
            Some(ChartBlock {
                source: ChartDataSource::from_props_value(raw),
                id,
            })
        })
        .collect()
}

/// Inert marker substituted for a chart in compiled markup.
pub fn chart_placeholder(id: &BlockId) -> String {
    format!("<!--chart:{id}-->")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_charts_in_document_order() {
        let doc = Document::from_json_value(json!({
            "root": { "type": "EmailLayout", "data": { "childrenIds": ["c2", "box"] } },
            "box": { "type": "Container", "data": { "props": { "childrenIds": ["c1"] } } },
            "c1": { "type": "Chart", "data": { "props": {
                "dataSource": { "mode": "dynamic", "variable": "sales" }
            } } },
            "c2": { "type": "Chart", "data": { "props": { "dataSource": { "mode": 42 } } } },
            "loose": { "type": "Chart" }
        }))
        .unwrap();

        let charts = chart_blocks(&doc);
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].id, BlockId::from("c2"));
        assert_eq!(charts[0].source.mode, ChartMode::Static);
        assert_eq!(charts[1].id, BlockId::from("c1"));
        assert_eq!(charts[1].source.mode, ChartMode::Dynamic);
        assert_eq!(charts[1].source.payload.get("variable"), Some(&json!("sales")));
    }

    #[test]
    fn placeholder_embeds_id() {
        assert_eq!(chart_placeholder(&BlockId::from("c1")), "<!--chart:c1-->");
    }
}
