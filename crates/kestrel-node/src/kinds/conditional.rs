use std::fmt;

use async_trait::async_trait;
use kestrel_config::NodeKind;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::NodeError;
use crate::node::{Node, NodeBase, NodeReport};
use crate::slots::{NumberSlot, flexible_number, number_slot};

/// Output slot holding the chosen branch.
pub const PATH_SLOT: &str = "path";
/// Branch sentinel for a condition that held.
pub const PATH_TRUE: &str = "true";
/// Branch sentinel for a condition that did not hold.
pub const PATH_FALSE: &str = "false";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
  #[default]
  #[serde(alias = ">")]
  Gt,
  #[serde(alias = ">=")]
  Gte,
  #[serde(alias = "<")]
  Lt,
  #[serde(alias = "<=")]
  Lte,
  #[serde(alias = "==")]
  Eq,
  #[serde(alias = "!=")]
  Neq,
}

impl Operator {
  pub fn evaluate(&self, value: f64, threshold: f64) -> bool {
    match self {
      Self::Gt => value > threshold,
      Self::Gte => value >= threshold,
      Self::Lt => value < threshold,
      Self::Lte => value <= threshold,
      Self::Eq => value == threshold,
      Self::Neq => value != threshold,
    }
  }

  pub fn symbol(&self) -> &'static str {
    match self {
      Self::Gt => ">",
      Self::Gte => ">=",
      Self::Lt => "<",
      Self::Lte => "<=",
      Self::Eq => "==",
      Self::Neq => "!=",
    }
  }
}

impl fmt::Display for Operator {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.symbol())
  }
}

fn default_input() -> String {
  "price".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionalConfig {
  pub operator: Operator,
  #[serde(deserialize_with = "flexible_number")]
  pub threshold: Option<f64>,
  /// Input slot compared against the threshold.
  pub input: String,
}

impl Default for ConditionalConfig {
  fn default() -> Self {
    Self {
      operator: Operator::Gt,
      threshold: None,
      input: default_input(),
    }
  }
}

/// Compares one numeric input against a threshold and picks a branch.
///
/// The scheduler reads [`PATH_SLOT`] after execution: only outgoing edges whose
/// wiring names the chosen sentinel fire. Settings live in the config, not in
/// `inputs`, and survive input resets between cycles.
pub struct ConditionalNode {
  base: NodeBase,
  config: ConditionalConfig,
}

impl ConditionalNode {
  pub fn new(base: NodeBase, config: ConditionalConfig) -> Self {
    Self { base, config }
  }

  pub fn config(&self) -> &ConditionalConfig {
    &self.config
  }
}

#[async_trait]
impl Node for ConditionalNode {
  fn kind(&self) -> NodeKind {
    NodeKind::Conditional
  }

  fn base(&self) -> &NodeBase {
    &self.base
  }

  fn base_mut(&mut self) -> &mut NodeBase {
    &mut self.base
  }

  async fn execute(&mut self) -> Result<Option<NodeReport>, NodeError> {
    let id = self.base.id.as_str();
    let slot = self.config.input.as_str();
    let value = match number_slot(&self.base.inputs, slot) {
      NumberSlot::Present(value) => value,
      NumberSlot::Missing => return Err(NodeError::missing_input(id, slot)),
      NumberSlot::Invalid(raw) => {
        return Err(NodeError::invalid_input(
          id,
          slot,
          format!("expected a number, got {}", raw),
        ));
      }
    };
    let threshold = self.config.threshold.unwrap_or(0.0);
    let result = self.config.operator.evaluate(value, threshold);
    let path = if result { PATH_TRUE } else { PATH_FALSE };

    let outputs = &mut self.base.outputs;
    outputs.clear();
    outputs.insert(PATH_SLOT.to_string(), Value::String(path.to_string()));
    // Compared value under the chosen sentinel.
    outputs.insert(path.to_string(), json!(value));
    outputs.insert("result".to_string(), Value::Bool(result));
    outputs.insert("value".to_string(), json!(value));
    outputs.insert("threshold".to_string(), json!(threshold));

    Ok(Some(NodeReport::success(format!(
      "{} {} {} is {}",
      value, self.config.operator, threshold, result
    ))))
  }
}
