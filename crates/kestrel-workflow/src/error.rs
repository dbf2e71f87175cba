//! Error types for workflow scheduling.

use kestrel_node::NodeError;
use thiserror::Error;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum WorkflowError {
  /// A node's `execute()` failed. The rest of the run's queue is abandoned.
  #[error("node '{node_id}' failed: {source}")]
  NodeFailed {
    node_id: String,
    #[source]
    source: NodeError,
  },
}

impl WorkflowError {
  pub fn node_id(&self) -> &str {
    match self {
      Self::NodeFailed { node_id, .. } => node_id,
    }
  }
}
