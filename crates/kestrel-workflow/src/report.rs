use serde::{Deserialize, Serialize};

/// Outcome of one completed pass over the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
  pub run_id: String,
  /// 1-based cycle number within this workflow's lifetime.
  pub cycle: u64,
  /// Node ids in execution order.
  pub executed: Vec<String>,
  /// Node ids never reached: pruned branches, cycles, or targets of edges from
  /// nodes that do not exist.
  pub never_executed: Vec<String>,
}

impl RunReport {
  pub fn was_executed(&self, node_id: &str) -> bool {
    self.executed.iter().any(|id| id == node_id)
  }
}

/// Outcome of `Workflow::start`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
  pub cycles: u64,
  pub failed_cycles: u64,
  /// Report of the last cycle that completed.
  pub last_report: Option<RunReport>,
  /// Message of the last failure, if any cycle failed.
  pub last_error: Option<String>,
  /// Whether the schedule ended because it was stopped.
  pub stopped: bool,
}
