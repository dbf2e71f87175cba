use async_trait::async_trait;
use kestrel_config::NodeKind;

use crate::error::NodeError;
use crate::node::{Node, NodeBase, NodeReport};

/// Stand-in for a node whose settings could not be decoded.
///
/// It keeps the declared kind, so the scheduler wires and prunes around it as
/// usual, and fails with [`NodeError::InvalidConfig`] whenever it executes.
pub struct MisconfiguredNode {
  base: NodeBase,
  kind: NodeKind,
  message: String,
}

impl MisconfiguredNode {
  pub fn new(base: NodeBase, kind: NodeKind, message: impl Into<String>) -> Self {
    Self {
      base,
      kind,
      message: message.into(),
    }
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}

#[async_trait]
impl Node for MisconfiguredNode {
  fn kind(&self) -> NodeKind {
    self.kind
  }

  fn base(&self) -> &NodeBase {
    &self.base
  }

  fn base_mut(&mut self) -> &mut NodeBase {
    &mut self.base
  }

  async fn execute(&mut self) -> Result<Option<NodeReport>, NodeError> {
    self.base.outputs.clear();
    Err(NodeError::invalid_config(&self.base.id, self.message.clone()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_execute_always_fails_with_settings_error() {
    let mut node = MisconfiguredNode::new(
      NodeBase::empty("check", "Check"),
      NodeKind::Conditional,
      "unknown variant `above`",
    );

    assert_eq!(node.kind(), NodeKind::Conditional);
    let err = node.execute().await.unwrap_err();
    assert_eq!(err.node_id(), "check");
    assert!(matches!(&err, NodeError::InvalidConfig { message, .. } if message.contains("above")));
    assert!(node.outputs().is_empty());
  }
}
