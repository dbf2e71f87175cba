use serde::{Deserialize, Serialize};

use crate::edge::EdgeSet;
use crate::enums::WorkflowType;
use crate::error::ConfigError;
use crate::node::NodeDef;
use crate::ordered::OrderedMap;

/// A complete workflow description: node-id -> node, plus edges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDef {
  #[serde(rename = "type", default)]
  pub workflow_type: WorkflowType,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  /// Delay between repeat cycles, used when the caller does not pick one.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub interval_ms: Option<u64>,
  pub nodes: OrderedMap<NodeDef>,
  #[serde(default)]
  pub edges: EdgeSet,
}

impl WorkflowDef {
  pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::parse("workflow description", e))
  }

  pub fn get_node(&self, node_id: &str) -> Option<&NodeDef> {
    self.nodes.get(node_id)
  }
}
