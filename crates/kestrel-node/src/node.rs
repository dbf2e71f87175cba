use async_trait::async_trait;
use kestrel_config::NodeKind;
use serde::{Deserialize, Serialize};

use crate::error::NodeError;
use crate::slots::{Slots, default_trigger};

/// State shared by every node: identity and the two slot bags.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBase {
  pub id: String,
  pub label: String,
  pub inputs: Slots,
  pub outputs: Slots,
}

impl NodeBase {
  /// A node whose inputs start as the default trigger bag.
  pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      label: label.into(),
      inputs: default_trigger(),
      outputs: Slots::new(),
    }
  }

  /// A node with empty inputs. Conditional nodes start this way because their
  /// settings live in their config, not in `inputs`.
  pub fn empty(id: impl Into<String>, label: impl Into<String>) -> Self {
    Self {
      inputs: Slots::new(),
      ..Self::new(id, label)
    }
  }
}

/// How a node wants its report to appear in the execution log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
  Info,
  Console,
  Success,
  Payment,
}

/// Optional extra detail returned from `execute()`, used only for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeReport {
  pub kind: ReportKind,
  pub message: String,
}

impl NodeReport {
  pub fn new(kind: ReportKind, message: impl Into<String>) -> Self {
    Self {
      kind,
      message: message.into(),
    }
  }

  pub fn success(message: impl Into<String>) -> Self {
    Self::new(ReportKind::Success, message)
  }

  pub fn console(message: impl Into<String>) -> Self {
    Self::new(ReportKind::Console, message)
  }

  pub fn payment(message: impl Into<String>) -> Self {
    Self::new(ReportKind::Payment, message)
  }
}

/// The contract every executable step implements.
///
/// The scheduler writes into `inputs` while wiring and resets them between
/// repeat cycles. Only `execute()` writes `outputs`.
#[async_trait]
pub trait Node: Send + Sync {
  fn kind(&self) -> NodeKind;

  fn base(&self) -> &NodeBase;

  fn base_mut(&mut self) -> &mut NodeBase;

  /// Read `inputs`, do the work, write `outputs`.
  ///
  /// Missing inputs are "not yet available" and only an error when the node
  /// cannot do its job without them.
  async fn execute(&mut self) -> Result<Option<NodeReport>, NodeError>;

  fn id(&self) -> &str {
    &self.base().id
  }

  fn label(&self) -> &str {
    &self.base().label
  }

  fn inputs(&self) -> &Slots {
    &self.base().inputs
  }

  fn inputs_mut(&mut self) -> &mut Slots {
    &mut self.base_mut().inputs
  }

  fn outputs(&self) -> &Slots {
    &self.base().outputs
  }

  fn reset_inputs(&mut self) {
    self.base_mut().inputs = default_trigger();
  }
}
