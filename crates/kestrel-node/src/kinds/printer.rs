use async_trait::async_trait;
use kestrel_config::NodeKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::NodeError;
use crate::node::{Node, NodeBase, NodeReport};
use crate::slots::{Slots, TRIGGER_SLOT};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
  /// Template; `{slot}` is replaced by that input. Without a template the
  /// inputs are printed as JSON.
  pub message: Option<String>,
}

/// Writes its inputs to the console log.
pub struct PrinterNode {
  base: NodeBase,
  config: PrinterConfig,
}

impl PrinterNode {
  pub fn new(base: NodeBase, config: PrinterConfig) -> Self {
    Self { base, config }
  }
}

fn render(template: &str, inputs: &Slots) -> String {
  let mut out = template.to_string();
  for (key, value) in inputs {
    let placeholder = format!("{{{}}}", key);
    if out.contains(&placeholder) {
      let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
      };
      out = out.replace(&placeholder, &text);
    }
  }
  out
}

#[async_trait]
impl Node for PrinterNode {
  fn kind(&self) -> NodeKind {
    NodeKind::Printer
  }

  fn base(&self) -> &NodeBase {
    &self.base
  }

  fn base_mut(&mut self) -> &mut NodeBase {
    &mut self.base
  }

  async fn execute(&mut self) -> Result<Option<NodeReport>, NodeError> {
    let message = match &self.config.message {
      Some(template) => render(template, &self.base.inputs),
      None => {
        let data: Slots = self
          .base
          .inputs
          .iter()
          .filter(|(key, _)| key.as_str() != TRIGGER_SLOT)
          .map(|(key, value)| (key.clone(), value.clone()))
          .collect();
        Value::Object(data).to_string()
      }
    };

    self
      .base
      .outputs
      .insert("printed".to_string(), Value::String(message.clone()));

    Ok(Some(NodeReport::console(format!("{}: {}", self.base.label, message))))
  }
}
