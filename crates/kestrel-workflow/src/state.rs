use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a workflow is in its lifecycle.
///
/// `Ready → Running → Completed | Failed`, with `Cancelled` once a repeating
/// schedule has been stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
  #[default]
  Ready,
  Running,
  Completed,
  Failed,
  Cancelled,
}

impl RunState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Ready => "ready",
      Self::Running => "running",
      Self::Completed => "completed",
      Self::Failed => "failed",
      Self::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
