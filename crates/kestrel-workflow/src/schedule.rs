use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::log::DEFAULT_LOG_CAPACITY;

const DEFAULT_INTERVAL_MS: u64 = 5_000;

/// What a repeating schedule does when a cycle fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
  /// Log the failure and keep scheduling cycles.
  #[default]
  Continue,
  /// End the schedule and return the error.
  Abort,
}

/// Settings for `Workflow::start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
  /// Pause between repeat cycles, used when the caller has no interval of
  /// its own.
  pub interval_ms: u64,
  /// Entries kept in the execution log between repeat cycles.
  pub log_capacity: usize,
  pub failure_policy: FailurePolicy,
}

impl Default for ScheduleConfig {
  fn default() -> Self {
    Self {
      interval_ms: DEFAULT_INTERVAL_MS,
      log_capacity: DEFAULT_LOG_CAPACITY,
      failure_policy: FailurePolicy::default(),
    }
  }
}

impl ScheduleConfig {
  pub fn interval(&self) -> Duration {
    Duration::from_millis(self.interval_ms)
  }
}

/// Stops a repeating schedule from another task.
///
/// Stopping never interrupts a node in flight. The schedule notices at its
/// next cycle boundary, including while it sleeps between cycles.
#[derive(Debug, Clone)]
pub struct StopHandle {
  token: CancellationToken,
}

impl StopHandle {
  pub(crate) fn new(token: CancellationToken) -> Self {
    Self { token }
  }

  pub fn stop(&self) {
    self.token.cancel();
  }

  pub fn is_stopped(&self) -> bool {
    self.token.is_cancelled()
  }
}
