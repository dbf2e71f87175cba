use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use kestrel_config::{EdgeSet, WorkflowType};
use kestrel_node::{Node, NodeKind, NodeMap, ReportKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::error::WorkflowError;
use crate::events::{ExecutionNotifier, NoopNotifier};
use crate::graph::InDegrees;
use crate::log::{ExecutionLog, LogKind};
use crate::report::{RunReport, ScheduleSummary};
use crate::schedule::{FailurePolicy, ScheduleConfig, StopHandle};
use crate::state::RunState;
use crate::wiring;

/// A graph of nodes plus everything needed to run it once or on a timer.
///
/// # Usage
///
/// ```ignore
/// let mut workflow = Workflow::new(WorkflowType::Repeat, nodes, edges);
/// let stop = workflow.stop_handle();
///
/// // Elsewhere: stop.stop();
/// let summary = workflow.start(Duration::from_secs(5)).await?;
/// ```
pub struct Workflow<N: ExecutionNotifier = NoopNotifier> {
  workflow_type: WorkflowType,
  nodes: NodeMap,
  edges: EdgeSet,
  log: ExecutionLog,
  config: ScheduleConfig,
  notifier: N,
  stop: CancellationToken,
  state: RunState,
  cycle: u64,
}

impl Workflow<NoopNotifier> {
  pub fn new(workflow_type: WorkflowType, nodes: NodeMap, edges: EdgeSet) -> Self {
    Self {
      workflow_type,
      nodes,
      edges,
      log: ExecutionLog::new(),
      config: ScheduleConfig::default(),
      notifier: NoopNotifier,
      stop: CancellationToken::new(),
      state: RunState::Ready,
      cycle: 0,
    }
  }
}

impl<N: ExecutionNotifier> Workflow<N> {
  /// Replace the notifier that receives every log entry.
  pub fn with_notifier<M: ExecutionNotifier>(self, notifier: M) -> Workflow<M> {
    Workflow {
      workflow_type: self.workflow_type,
      nodes: self.nodes,
      edges: self.edges,
      log: self.log,
      config: self.config,
      notifier,
      stop: self.stop,
      state: self.state,
      cycle: self.cycle,
    }
  }

  pub fn with_config(mut self, config: ScheduleConfig) -> Self {
    self.config = config;
    self
  }

  pub fn workflow_type(&self) -> WorkflowType {
    self.workflow_type
  }

  pub fn state(&self) -> RunState {
    self.state
  }

  /// Number of runs started so far.
  pub fn cycle(&self) -> u64 {
    self.cycle
  }

  pub fn config(&self) -> &ScheduleConfig {
    &self.config
  }

  pub fn log(&self) -> &ExecutionLog {
    &self.log
  }

  pub fn nodes(&self) -> &NodeMap {
    &self.nodes
  }

  pub fn node(&self, id: &str) -> Option<&dyn Node> {
    self.nodes.get(id)
  }

  pub fn node_mut(&mut self, id: &str) -> Option<&mut (dyn Node + 'static)> {
    self.nodes.get_mut(id)
  }

  /// Add a node, or replace the one with the same id in place.
  pub fn add_node(&mut self, node: impl Node + 'static) {
    self.nodes.insert(Box::new(node));
  }

  pub fn edges(&self) -> &EdgeSet {
    &self.edges
  }

  /// A handle that can stop a running schedule from another task.
  pub fn stop_handle(&self) -> StopHandle {
    StopHandle::new(self.stop.clone())
  }

  /// Request that no further cycles start. A run in flight finishes.
  pub fn stop(&mut self) {
    self.stop.cancel();
    self.workflow_type = WorkflowType::Once;
  }

  /// Execute the graph once in dependency order.
  ///
  /// In-degrees are recomputed from the edges on every call. Nodes whose
  /// in-degree never reaches zero are not executed and are listed in the
  /// report. The first node failure ends the run.
  #[instrument(name = "workflow_run", skip(self), fields(cycle = self.cycle + 1))]
  pub async fn run(&mut self) -> Result<RunReport, WorkflowError> {
    self.cycle += 1;
    let cycle = self.cycle;
    let run_id = uuid::Uuid::new_v4().to_string();
    self.state = RunState::Running;

    info!(run_id = %run_id, cycle, nodes = self.nodes.len(), "workflow_started");
    self.record(LogKind::Info, None, format!("Run {} started", cycle));

    let mut degrees = InDegrees::compute(&self.nodes, &self.edges);
    let mut queue: VecDeque<String> = degrees.roots(&self.nodes).map(String::from).collect();
    let mut executed: Vec<String> = Vec::new();

    while let Some(node_id) = queue.pop_front() {
      let Some(label) = self.nodes.get(&node_id).map(|n| n.label().to_string()) else {
        continue;
      };
      self.record(LogKind::Info, Some(&node_id), format!("Executing {}", label));

      let Some(node) = self.nodes.get_mut(&node_id) else {
        continue;
      };
      match node.execute().await {
        Ok(report) => {
          match report {
            Some(report) if report.kind == ReportKind::Success => {
              self.record(LogKind::Success, Some(&node_id), report.message);
            }
            Some(report) => {
              self.record(report.kind.into(), Some(&node_id), report.message);
              self.record(LogKind::Success, Some(&node_id), format!("{} completed", label));
            }
            None => {
              self.record(LogKind::Success, Some(&node_id), format!("{} completed", label));
            }
          }
          debug!(run_id = %run_id, node_id = %node_id, "node_completed");
        }
        Err(e) => {
          error!(run_id = %run_id, node_id = %node_id, error = %e, "node_failed");
          self.record(LogKind::Error, Some(&node_id), format!("{} failed: {}", label, e));
          self.state = RunState::Failed;
          return Err(WorkflowError::NodeFailed { node_id, source: e });
        }
      }

      self.propagate(&node_id, &mut degrees, &mut queue);
      executed.push(node_id);
    }

    let done: HashSet<&str> = executed.iter().map(String::as_str).collect();
    let never_executed: Vec<String> = self
      .nodes
      .ids()
      .filter(|id| !done.contains(id))
      .map(String::from)
      .collect();

    info!(
      run_id = %run_id,
      executed = executed.len(),
      never_executed = never_executed.len(),
      "workflow_completed"
    );
    self.record(
      LogKind::Info,
      None,
      format!(
        "Run {} finished: {} executed, {} never executed",
        cycle,
        executed.len(),
        never_executed.len()
      ),
    );
    self.state = RunState::Completed;

    Ok(RunReport {
      run_id,
      cycle,
      executed,
      never_executed,
    })
  }

  /// Run once, then keep running every `interval` while the workflow repeats
  /// and nobody has stopped it.
  ///
  /// Between cycles the log is trimmed to the configured capacity and every
  /// non-conditional node's inputs are reset to the default trigger.
  /// Conditional nodes keep their inputs across cycles.
  #[instrument(name = "workflow_start", skip(self), fields(workflow_type = ?self.workflow_type))]
  pub async fn start(&mut self, interval: Duration) -> Result<ScheduleSummary, WorkflowError> {
    let stop = self.stop.clone();
    let mut summary = ScheduleSummary::default();

    self.run_cycle(&mut summary).await?;

    while self.workflow_type == WorkflowType::Repeat && !stop.is_cancelled() {
      let trimmed = self.log.trim_to(self.config.log_capacity);
      if trimmed > 0 {
        debug!(trimmed, capacity = self.config.log_capacity, "execution log trimmed");
      }

      tokio::select! {
        _ = tokio::time::sleep(interval) => {}
        _ = stop.cancelled() => {}
      }
      if stop.is_cancelled() {
        break;
      }

      self.reset_inputs();
      self.run_cycle(&mut summary).await?;
    }

    if stop.is_cancelled() {
      self.workflow_type = WorkflowType::Once;
      self.state = RunState::Cancelled;
      summary.stopped = true;
      info!(cycles = summary.cycles, "workflow schedule stopped");
      self.record(
        LogKind::Info,
        None,
        format!("Schedule stopped after {} cycles", summary.cycles),
      );
    }

    Ok(summary)
  }

  async fn run_cycle(&mut self, summary: &mut ScheduleSummary) -> Result<(), WorkflowError> {
    summary.cycles += 1;
    match self.run().await {
      Ok(report) => {
        summary.last_report = Some(report);
        Ok(())
      }
      Err(e)
        if self.workflow_type == WorkflowType::Repeat
          && self.config.failure_policy == FailurePolicy::Continue =>
      {
        warn!(cycle = self.cycle, error = %e, "cycle failed, continuing schedule");
        summary.failed_cycles += 1;
        summary.last_error = Some(e.to_string());
        Ok(())
      }
      Err(e) => Err(e),
    }
  }

  /// Wire and release the targets of a just-executed node.
  fn propagate(&mut self, source_id: &str, degrees: &mut InDegrees, queue: &mut VecDeque<String>) {
    let Some(source) = self.nodes.get(source_id) else {
      return;
    };
    let source_kind = source.kind();
    let outputs = source.outputs().clone();

    for edge in self.edges.outgoing(source_id) {
      if !wiring::is_active(source_kind, &outputs, edge.wiring) {
        debug!(from = edge.from, to = edge.to, "branch not taken");
        continue;
      }
      let Some(target) = self.nodes.get_mut(edge.to) else {
        continue;
      };
      wiring::wire(source_kind, &outputs, target, edge.wiring);
      if degrees.satisfy(edge.to) {
        queue.push_back(edge.to.to_string());
      }
    }
  }

  fn reset_inputs(&mut self) {
    for node in self.nodes.values_mut() {
      if node.kind() != NodeKind::Conditional {
        node.reset_inputs();
      }
    }
  }

  fn record(&mut self, kind: LogKind, node_id: Option<&str>, message: impl Into<String>) {
    let entry = self.log.push(kind, node_id, message);
    debug!(kind = %entry.kind, node_id = ?entry.node_id, "{}", entry.message);
    self.notifier.notify(entry);
  }
}

impl<N: ExecutionNotifier> std::fmt::Debug for Workflow<N> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Workflow")
      .field("workflow_type", &self.workflow_type)
      .field("state", &self.state)
      .field("cycle", &self.cycle)
      .field("nodes", &self.nodes)
      .field("log_len", &self.log.len())
      .finish_non_exhaustive()
  }
}
