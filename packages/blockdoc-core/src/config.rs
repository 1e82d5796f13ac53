use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Per-session editor settings. Every field has a default, so hosts only pass overrides.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Number of undo steps kept; older snapshots are evicted.
    pub history_capacity: usize,
    /// Prefix for minted block ids.
    pub id_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            id_prefix: "block".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// A capacity of zero would make undo impossible; treat it as one step.
    fn normalized(mut self) -> Self {
        if self.history_capacity == 0 {
            log::warn!("historyCapacity 0 is not usable, using 1");
            self.history_capacity = 1;
        }
        if self.id_prefix.is_empty() {
            self.id_prefix = Self::default().id_prefix;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EditorConfig::from_json_str(r#"{ "historyCapacity": 5 }"#).unwrap();
        assert_eq!(config.history_capacity, 5);
        assert_eq!(config.id_prefix, "block");
        assert_eq!(EditorConfig::from_json_str("{}").unwrap(), EditorConfig::default());
    }

    #[test]
    fn zero_capacity_and_empty_prefix_are_normalized() {
        let config =
            EditorConfig::from_json_str(r#"{ "historyCapacity": 0, "idPrefix": "" }"#).unwrap();
        assert_eq!(config.history_capacity, 1);
        assert_eq!(config.id_prefix, "block");
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(EditorConfig::from_json_str("[1, 2]").is_err());
    }
}
