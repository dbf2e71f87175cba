use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enums::NodeKind;

/// A node as written in a workflow description.
///
/// Per-type settings may appear in two shapes, often mixed by editors:
/// nested under `config`, or flat next to `type` and `label`. See
/// [`NodeDef::merged_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
  /// Raw type tag. Kept as a string so that unknown kinds survive parsing and
  /// can be reported by the builder instead of failing the whole document.
  #[serde(rename = "type")]
  pub node_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub config: Option<Map<String, Value>>,
  #[serde(flatten)]
  pub flat: Map<String, Value>,
}

impl NodeDef {
  pub fn new(node_type: impl Into<String>) -> Self {
    Self {
      node_type: node_type.into(),
      label: None,
      config: None,
      flat: Map::new(),
    }
  }

  pub fn with_label(mut self, label: impl Into<String>) -> Self {
    self.label = Some(label.into());
    self
  }

  /// Set a field in the nested `config` object.
  pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
    self
      .config
      .get_or_insert_with(Map::new)
      .insert(key.into(), value);
    self
  }

  /// Set a flat field next to `type`.
  pub fn with_flat(mut self, key: impl Into<String>, value: Value) -> Self {
    self.flat.insert(key.into(), value);
    self
  }

  /// The parsed kind, or `None` if the tag is unknown.
  pub fn kind(&self) -> Option<NodeKind> {
    NodeKind::parse(&self.node_type)
  }

  /// Flat fields overlaid by the nested `config` object.
  ///
  /// Nested values win on conflicts. Null nested values count as missing and
  /// do not hide a flat value.
  pub fn merged_config(&self) -> Map<String, Value> {
    let mut merged = self.flat.clone();
    if let Some(config) = &self.config {
      for (key, value) in config {
        if !value.is_null() {
          merged.insert(key.clone(), value.clone());
        }
      }
    }
    merged
  }
}
