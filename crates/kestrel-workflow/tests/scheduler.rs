//! Scheduling behavior exercised with probe nodes.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kestrel_config::{EdgeSet, WorkflowType};
use kestrel_node::kinds::{ConditionalConfig, ConditionalNode};
use kestrel_node::{Node, NodeBase, NodeError, NodeKind, NodeMap, NodeReport, Slots};
use kestrel_workflow::{
  FailurePolicy, LogKind, RunState, ScheduleConfig, StopHandle, Workflow, WorkflowError,
};
use serde_json::{Value, json};
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Visit {
  node_id: String,
  inputs: Slots,
  at: Instant,
}

type Visits = Arc<Mutex<Vec<Visit>>>;

/// Records every execution and emits a fixed output bag.
struct Probe {
  base: NodeBase,
  outputs: Slots,
  visits: Visits,
  fail: bool,
  stop_after: Option<(usize, StopHandle)>,
  runs: usize,
}

impl Probe {
  fn new(id: &str, visits: &Visits) -> Self {
    Self {
      base: NodeBase::new(id, id),
      outputs: Slots::new(),
      visits: visits.clone(),
      fail: false,
      stop_after: None,
      runs: 0,
    }
  }

  fn emitting(mut self, outputs: Value) -> Self {
    if let Value::Object(map) = outputs {
      self.outputs = map;
    }
    self
  }

  fn failing(mut self) -> Self {
    self.fail = true;
    self
  }

  fn stopping_after(mut self, runs: usize, handle: StopHandle) -> Self {
    self.stop_after = Some((runs, handle));
    self
  }
}

#[async_trait]
impl Node for Probe {
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
    self.runs += 1;
    self.visits.lock().unwrap().push(Visit {
      node_id: self.base.id.clone(),
      inputs: self.base.inputs.clone(),
      at: Instant::now(),
    });
    if let Some((runs, handle)) = &self.stop_after {
      if self.runs >= *runs {
        handle.stop();
      }
    }
    if self.fail {
      return Err(NodeError::failed(&self.base.id, "probe failure"));
    }
    self.base.outputs = self.outputs.clone();
    Ok(None)
  }
}

fn visits() -> Visits {
  Arc::new(Mutex::new(Vec::new()))
}

fn order(visits: &Visits) -> Vec<String> {
  visits
    .lock()
    .unwrap()
    .iter()
    .map(|v| v.node_id.clone())
    .collect()
}

fn position(order: &[String], id: &str) -> usize {
  order.iter().position(|n| n == id).unwrap()
}

#[tokio::test]
async fn test_diamond_runs_in_dependency_order() {
  let seen = visits();
  // Inserted in reverse so insertion order alone cannot produce a valid order.
  let nodes = NodeMap::new()
    .with(Probe::new("d", &seen))
    .with(Probe::new("c", &seen))
    .with(Probe::new("b", &seen))
    .with(Probe::new("a", &seen));
  let edges = EdgeSet::new()
    .with("a", "b", &[])
    .with("a", "c", &[])
    .with("b", "d", &[])
    .with("c", "d", &[]);
  let mut workflow = Workflow::new(WorkflowType::Once, nodes, edges);

  let report = workflow.run().await.unwrap();
  assert_eq!(report.executed, vec!["a", "b", "c", "d"]);
  assert!(report.never_executed.is_empty());

  let order = order(&seen);
  for (from, to) in [("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")] {
    assert!(position(&order, from) < position(&order, to));
  }
}

#[tokio::test]
async fn test_independent_roots_follow_insertion_order() {
  let seen = visits();
  let nodes = NodeMap::new()
    .with(Probe::new("z", &seen))
    .with(Probe::new("y", &seen))
    .with(Probe::new("x", &seen));
  let mut workflow = Workflow::new(WorkflowType::Once, nodes, EdgeSet::new());

  workflow.run().await.unwrap();
  assert_eq!(order(&seen), vec!["z", "y", "x"]);
}

#[tokio::test]
async fn test_outputs_are_wired_before_target_runs() {
  let seen = visits();
  let nodes = NodeMap::new()
    .with(Probe::new("src", &seen).emitting(json!({ "amount": 2, "note": null })))
    .with(Probe::new("dst", &seen));
  let edges = EdgeSet::new().with("src", "dst", &[]);
  let mut workflow = Workflow::new(WorkflowType::Once, nodes, edges);

  workflow.run().await.unwrap();
  let dst = workflow.node("dst").unwrap();
  assert_eq!(dst.inputs()["amount"], json!(2));
  assert_eq!(dst.inputs()["trigger"], json!(true));
  assert!(!dst.inputs().contains_key("note"));
}

#[tokio::test]
async fn test_cycles_and_self_edges_never_execute() {
  let seen = visits();
  let nodes = NodeMap::new()
    .with(Probe::new("a", &seen))
    .with(Probe::new("b", &seen))
    .with(Probe::new("loop", &seen))
    .with(Probe::new("free", &seen));
  let edges = EdgeSet::new()
    .with("a", "b", &[])
    .with("b", "a", &[])
    .with("loop", "loop", &[]);
  let mut workflow = Workflow::new(WorkflowType::Once, nodes, edges);

  let report = workflow.run().await.unwrap();
  assert_eq!(report.executed, vec!["free"]);
  assert_eq!(report.never_executed, vec!["a", "b", "loop"]);
  assert_eq!(workflow.state(), RunState::Completed);
}

#[tokio::test]
async fn test_edges_naming_missing_nodes_are_tolerated() {
  let seen = visits();
  let nodes = NodeMap::new()
    .with(Probe::new("a", &seen))
    .with(Probe::new("blocked", &seen));
  let edges = EdgeSet::new()
    .with("a", "ghost", &[])
    .with("ghost", "blocked", &[]);
  let mut workflow = Workflow::new(WorkflowType::Once, nodes, edges);

  let report = workflow.run().await.unwrap();
  assert_eq!(report.executed, vec!["a"]);
  assert_eq!(report.never_executed, vec!["blocked"]);
}

#[tokio::test]
async fn test_failing_node_ends_run_with_error_entry() {
  let seen = visits();
  let nodes = NodeMap::new()
    .with(Probe::new("a", &seen))
    .with(Probe::new("bad", &seen).failing())
    .with(Probe::new("after", &seen));
  let edges = EdgeSet::new()
    .with("a", "bad", &[])
    .with("bad", "after", &[]);
  let mut workflow = Workflow::new(WorkflowType::Once, nodes, edges);

  let err = workflow.run().await.unwrap_err();
  assert!(matches!(&err, WorkflowError::NodeFailed { node_id, .. } if node_id == "bad"));
  assert_eq!(order(&seen), vec!["a", "bad"]);

  let bad: Vec<LogKind> = workflow
    .log()
    .entries()
    .filter(|e| e.node_id.as_deref() == Some("bad"))
    .map(|e| e.kind)
    .collect();
  assert!(bad.contains(&LogKind::Error));
  assert!(!bad.contains(&LogKind::Success));
  assert_eq!(workflow.state(), RunState::Failed);
}

#[tokio::test]
async fn test_once_mode_runs_exactly_once() {
  let seen = visits();
  let nodes = NodeMap::new().with(Probe::new("a", &seen));
  let mut workflow = Workflow::new(WorkflowType::Once, nodes, EdgeSet::new());

  let summary = workflow.start(Duration::from_millis(10)).await.unwrap();
  assert_eq!(summary.cycles, 1);
  assert!(!summary.stopped);
  assert_eq!(order(&seen).len(), 1);
}

/// A repeating workflow whose probe stops it after a number of runs.
fn repeating(probe: impl FnOnce(StopHandle) -> Probe) -> Workflow {
  repeating_with(EdgeSet::new(), probe)
}

fn repeating_with(edges: EdgeSet, probe: impl FnOnce(StopHandle) -> Probe) -> Workflow {
  let mut workflow = Workflow::new(WorkflowType::Repeat, NodeMap::new(), edges);
  let handle = workflow.stop_handle();
  workflow.add_node(probe(handle));
  workflow
}

#[tokio::test(start_paused = true)]
async fn test_repeat_cycles_are_spaced_by_interval() {
  let seen = visits();
  let mut workflow = repeating(|stop| Probe::new("tick", &seen).stopping_after(3, stop));
  let interval = Duration::from_millis(250);

  let summary = workflow.start(interval).await.unwrap();
  assert_eq!(summary.cycles, 3);
  assert!(summary.stopped);
  assert_eq!(workflow.cycle(), 3);
  assert_eq!(workflow.state(), RunState::Cancelled);
  assert_eq!(workflow.workflow_type(), WorkflowType::Once);

  let times: Vec<Instant> = seen.lock().unwrap().iter().map(|v| v.at).collect();
  assert_eq!(times.len(), 3);
  for pair in times.windows(2) {
    assert!(pair[1] - pair[0] >= interval);
  }
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_cycle_prevents_next_cycle() {
  let seen = visits();
  let mut workflow = repeating(|stop| Probe::new("once", &seen).stopping_after(1, stop));

  let summary = workflow.start(Duration::from_secs(60)).await.unwrap();
  assert_eq!(summary.cycles, 1);
  assert_eq!(order(&seen), vec!["once"]);
}

#[tokio::test(start_paused = true)]
async fn test_stop_from_another_task_interrupts_sleep() {
  let seen = visits();
  let mut workflow = Workflow::new(
    WorkflowType::Repeat,
    NodeMap::new().with(Probe::new("tick", &seen)),
    EdgeSet::new(),
  );
  let stop = workflow.stop_handle();

  let schedule = tokio::spawn(async move {
    let summary = workflow.start(Duration::from_secs(3600)).await;
    (workflow, summary)
  });
  tokio::time::sleep(Duration::from_secs(1)).await;
  stop.stop();

  let (workflow, summary) = schedule.await.unwrap();
  let summary = summary.unwrap();
  assert_eq!(summary.cycles, 1);
  assert!(summary.stopped);
  assert_eq!(workflow.state(), RunState::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn test_inputs_reset_between_cycles_except_conditionals() {
  let seen = visits();
  let mut workflow = repeating(|stop| Probe::new("root", &seen).stopping_after(2, stop));
  workflow.add_node(ConditionalNode::new(
    NodeBase::empty("check", "Check"),
    ConditionalConfig {
      threshold: Some(100.0),
      ..Default::default()
    },
  ));
  workflow
    .node_mut("root")
    .unwrap()
    .inputs_mut()
    .insert("extra".into(), json!(1));
  workflow
    .node_mut("check")
    .unwrap()
    .inputs_mut()
    .insert("price".into(), json!(150));

  let summary = workflow.start(Duration::from_millis(10)).await.unwrap();
  assert_eq!(summary.cycles, 2);
  assert_eq!(summary.failed_cycles, 0);

  let visits = seen.lock().unwrap();
  assert_eq!(visits[0].inputs["extra"], json!(1));
  assert_eq!(Value::Object(visits[1].inputs.clone()), json!({ "trigger": true }));
  assert_eq!(workflow.node("check").unwrap().inputs()["price"], json!(150));
}

#[tokio::test(start_paused = true)]
async fn test_failed_cycles_continue_by_default() {
  let seen = visits();
  let edges = EdgeSet::new().with("root", "bad", &[]);
  let mut workflow = repeating_with(edges, |stop| {
    Probe::new("root", &seen).stopping_after(3, stop)
  });
  workflow.add_node(Probe::new("bad", &seen).failing());

  let summary = workflow.start(Duration::from_millis(10)).await.unwrap();
  assert_eq!(summary.cycles, 3);
  assert_eq!(summary.failed_cycles, 3);
  assert!(summary.last_report.is_none());
  assert!(summary.last_error.unwrap().contains("bad"));
}

#[tokio::test(start_paused = true)]
async fn test_abort_policy_ends_schedule_on_failure() {
  let seen = visits();
  let edges = EdgeSet::new().with("root", "bad", &[]);
  let workflow = repeating_with(edges, |stop| {
    Probe::new("root", &seen).stopping_after(3, stop)
  });
  let mut workflow = workflow.with_config(ScheduleConfig {
    failure_policy: FailurePolicy::Abort,
    ..Default::default()
  });
  workflow.add_node(Probe::new("bad", &seen).failing());

  let err = workflow.start(Duration::from_millis(10)).await.unwrap_err();
  assert_eq!(err.node_id(), "bad");
  assert_eq!(workflow.cycle(), 1);
  assert_eq!(workflow.state(), RunState::Failed);
}

#[tokio::test]
async fn test_once_mode_returns_failure_from_start() {
  let seen = visits();
  let nodes = NodeMap::new().with(Probe::new("bad", &seen).failing());
  let mut workflow = Workflow::new(WorkflowType::Once, nodes, EdgeSet::new());

  assert!(workflow.start(Duration::from_millis(10)).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_log_is_trimmed_between_cycles() {
  let seen = visits();
  let workflow = repeating(|stop| Probe::new("tick", &seen).stopping_after(3, stop));
  let mut workflow = workflow.with_config(ScheduleConfig {
    log_capacity: 3,
    ..Default::default()
  });

  workflow.start(Duration::from_millis(10)).await.unwrap();

  // Each cycle logs four entries: run started, executing, completed, finished.
  // The last trim happens before cycle 3, which then adds its own four plus
  // the stop notice.
  assert_eq!(workflow.log().len(), 3 + 4 + 1);
  let first = workflow.log().entries().next().unwrap();
  assert_eq!(first.seq, 5);
  assert!(matches!(workflow.log().last(), Some(e) if e.message.contains("stopped")));
}
