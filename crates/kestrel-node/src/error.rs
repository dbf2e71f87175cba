use kestrel_host::HostError;
use thiserror::Error;

/// Errors a node can raise from `execute()`.
///
/// Any of these aborts the current run.
#[derive(Debug, Error)]
pub enum NodeError {
  #[error("node '{node_id}' is missing required input '{slot}'")]
  MissingInput { node_id: String, slot: String },

  #[error("node '{node_id}' has an invalid value in input '{slot}': {message}")]
  InvalidInput {
    node_id: String,
    slot: String,
    message: String,
  },

  #[error("node '{node_id}' is missing required setting '{field}'")]
  MissingConfig { node_id: String, field: String },

  #[error("node '{node_id}' has invalid settings: {message}")]
  InvalidConfig { node_id: String, message: String },

  #[error("node '{node_id}' needs signing credentials but none were provided")]
  MissingCredentials { node_id: String },

  #[error("node '{node_id}' rejected execution: {reason}")]
  Rejected { node_id: String, reason: String },

  #[error("node '{node_id}' failed: {message}")]
  Failed { node_id: String, message: String },

  #[error("host call failed for node '{node_id}': {source}")]
  Host {
    node_id: String,
    #[source]
    source: HostError,
  },
}

impl NodeError {
  pub fn missing_input(node_id: &str, slot: &str) -> Self {
    Self::MissingInput {
      node_id: node_id.to_string(),
      slot: slot.to_string(),
    }
  }

  pub fn invalid_input(node_id: &str, slot: &str, message: impl Into<String>) -> Self {
    Self::InvalidInput {
      node_id: node_id.to_string(),
      slot: slot.to_string(),
      message: message.into(),
    }
  }

  pub fn missing_config(node_id: &str, field: &str) -> Self {
    Self::MissingConfig {
      node_id: node_id.to_string(),
      field: field.to_string(),
    }
  }

  pub fn invalid_config(node_id: &str, message: impl Into<String>) -> Self {
    Self::InvalidConfig {
      node_id: node_id.to_string(),
      message: message.into(),
    }
  }

  pub fn rejected(node_id: &str, reason: impl Into<String>) -> Self {
    Self::Rejected {
      node_id: node_id.to_string(),
      reason: reason.into(),
    }
  }

  /// Generic failure, for nodes implemented outside this crate.
  pub fn failed(node_id: &str, message: impl Into<String>) -> Self {
    Self::Failed {
      node_id: node_id.to_string(),
      message: message.into(),
    }
  }

  pub fn host(node_id: &str, source: HostError) -> Self {
    Self::Host {
      node_id: node_id.to_string(),
      source,
    }
  }

  /// The node that raised the error.
  pub fn node_id(&self) -> &str {
    match self {
      Self::MissingInput { node_id, .. }
      | Self::InvalidInput { node_id, .. }
      | Self::MissingConfig { node_id, .. }
      | Self::InvalidConfig { node_id, .. }
      | Self::MissingCredentials { node_id }
      | Self::Rejected { node_id, .. }
      | Self::Failed { node_id, .. }
      | Self::Host { node_id, .. } => node_id,
    }
  }
}
