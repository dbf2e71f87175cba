use async_trait::async_trait;
use kestrel_config::NodeKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NodeError;
use crate::node::{Node, NodeBase, NodeReport};
use crate::slots::{NumberSlot, TRIGGER_SLOT, flexible_number, number_slot};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyGateConfig {
  /// Largest `amount` input allowed through.
  #[serde(deserialize_with = "flexible_number")]
  pub max_amount: Option<f64>,
  /// Smallest `balance` input allowed through.
  #[serde(deserialize_with = "flexible_number")]
  pub min_balance: Option<f64>,
  /// The `signal` input must equal this value.
  pub require_signal: Option<String>,
}

/// Stops the run unless every configured limit holds.
///
/// A limit whose input is missing counts as violated. On success the inputs
/// are forwarded as outputs so downstream steps see the values that were
/// checked.
pub struct SafetyGateNode {
  base: NodeBase,
  config: SafetyGateConfig,
}

impl SafetyGateNode {
  pub fn new(base: NodeBase, config: SafetyGateConfig) -> Self {
    Self { base, config }
  }

  fn number(&self, slot: &str) -> Result<f64, NodeError> {
    let id = self.base.id.as_str();
    match number_slot(&self.base.inputs, slot) {
      NumberSlot::Present(value) => Ok(value),
      NumberSlot::Missing => Err(NodeError::missing_input(id, slot)),
      NumberSlot::Invalid(raw) => Err(NodeError::invalid_input(
        id,
        slot,
        format!("expected a number, got {}", raw),
      )),
    }
  }

  fn check(&self) -> Result<Vec<String>, NodeError> {
    let id = self.base.id.as_str();
    let mut passed = Vec::new();

    if let Some(max) = self.config.max_amount {
      let amount = self.number("amount")?;
      if amount > max {
        return Err(NodeError::rejected(
          id,
          format!("amount {} exceeds limit {}", amount, max),
        ));
      }
      passed.push(format!("amount {} <= {}", amount, max));
    }

    if let Some(min) = self.config.min_balance {
      let balance = self.number("balance")?;
      if balance < min {
        return Err(NodeError::rejected(
          id,
          format!("balance {} below minimum {}", balance, min),
        ));
      }
      passed.push(format!("balance {} >= {}", balance, min));
    }

    if let Some(required) = &self.config.require_signal {
      let signal = match self.base.inputs.get("signal") {
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(NodeError::invalid_input(id, "signal", "expected a string")),
        None => return Err(NodeError::missing_input(id, "signal")),
      };
      if !signal.eq_ignore_ascii_case(required) {
        return Err(NodeError::rejected(
          id,
          format!("signal '{}' is not '{}'", signal, required),
        ));
      }
      passed.push(format!("signal is {}", required));
    }

    Ok(passed)
  }
}

#[async_trait]
impl Node for SafetyGateNode {
  fn kind(&self) -> NodeKind {
    NodeKind::SafetyGate
  }

  fn base(&self) -> &NodeBase {
    &self.base
  }

  fn base_mut(&mut self) -> &mut NodeBase {
    &mut self.base
  }

  async fn execute(&mut self) -> Result<Option<NodeReport>, NodeError> {
    let passed = self.check()?;

    let forwarded: Vec<(String, Value)> = self
      .base
      .inputs
      .iter()
      .filter(|(key, _)| key.as_str() != TRIGGER_SLOT)
      .map(|(key, value)| (key.clone(), value.clone()))
      .collect();

    let outputs = &mut self.base.outputs;
    outputs.clear();
    outputs.extend(forwarded);
    outputs.insert("approved".to_string(), Value::Bool(true));

    let message = if passed.is_empty() {
      "no limits configured".to_string()
    } else {
      passed.join(", ")
    };
    Ok(Some(NodeReport::success(format!("approved: {}", message))))
  }
}
