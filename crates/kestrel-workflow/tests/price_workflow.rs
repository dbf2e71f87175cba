//! Built workflows running against in-memory capabilities.

use std::sync::Arc;

use kestrel_builder::{Builder, StandardBuilder};
use kestrel_config::{ExecutionContext, WalletCredentials};
use kestrel_host::{Capabilities, MemoryLedger, StaticPriceOracle};
use kestrel_workflow::{ChannelNotifier, LogKind, Workflow};
use serde_json::{Value, json};

fn price_branch(price: f64) -> (Workflow, Arc<StaticPriceOracle>) {
  let prices = Arc::new(StaticPriceOracle::new().with_price("ETH", price));
  let capabilities = Capabilities::in_memory().with_prices(prices.clone());
  let description = json!({
    "type": "once",
    "nodes": {
      "A": { "type": "price_feed", "label": "ETH price", "config": { "symbol": "ETH" } },
      "B": { "type": "conditional", "config": { "operator": ">", "threshold": 100 } },
      "C": { "type": "printer", "label": "High", "config": { "message": "high at {price}" } },
      "D": { "type": "printer", "label": "Low", "config": { "message": "low at {price}" } }
    },
    "edges": {
      "A": { "B": {} },
      "B": { "C": { "true": "price" }, "D": { "false": "price" } }
    }
  });

  let graph = StandardBuilder::new(capabilities)
    .build_json(&description.to_string())
    .unwrap();
  assert!(graph.diagnostics.is_empty(), "{:?}", graph.diagnostics);
  let workflow = Workflow::new(graph.workflow_type, graph.nodes, graph.edges);
  (workflow, prices)
}

fn messages(workflow: &Workflow, kind: LogKind) -> Vec<String> {
  workflow
    .log()
    .entries()
    .filter(|e| e.kind == kind)
    .map(|e| e.message.clone())
    .collect()
}

#[tokio::test]
async fn test_high_price_takes_true_branch() {
  let (mut workflow, _) = price_branch(150.0);

  let report = workflow.run().await.unwrap();
  assert_eq!(report.executed, vec!["A", "B", "C"]);
  assert_eq!(report.never_executed, vec!["D"]);

  let c = workflow.node("C").unwrap();
  assert_eq!(c.inputs()["price"], json!(150.0));
  assert_eq!(messages(&workflow, LogKind::Console), vec!["High: high at 150.0"]);
}

#[tokio::test]
async fn test_low_price_takes_false_branch() {
  let (mut workflow, _) = price_branch(50.0);

  let report = workflow.run().await.unwrap();
  assert_eq!(report.executed, vec!["A", "B", "D"]);
  assert_eq!(report.never_executed, vec!["C"]);
  assert!(workflow.node("D").unwrap().inputs().contains_key("price"));
}

#[tokio::test]
async fn test_price_feed_auto_wires_only_price_into_conditional() {
  let (mut workflow, _) = price_branch(150.0);

  workflow.run().await.unwrap();
  let b = workflow.node("B").unwrap();
  assert_eq!(b.inputs().len(), 1);
  assert_eq!(b.inputs()["price"], json!(150.0));
}

#[tokio::test]
async fn test_each_run_recomputes_the_branch() {
  let (mut workflow, prices) = price_branch(150.0);

  let first = workflow.run().await.unwrap();
  prices.set_price("ETH", 50.0).await;
  let second = workflow.run().await.unwrap();

  assert!(first.was_executed("C"));
  assert!(second.was_executed("D"));
  assert!(!second.was_executed("C"));
  assert_eq!(second.cycle, 2);
  assert_ne!(first.run_id, second.run_id);
}

#[tokio::test]
async fn test_explicit_wiring_overrides_auto_wire() {
  let capabilities = Capabilities::in_memory()
    .with_prices(Arc::new(StaticPriceOracle::new().with_price("ETH", 42.0)));
  let description = json!({
    "nodes": {
      "feed": { "type": "price_feed" },
      "check": { "type": "conditional", "config": { "input": "value", "threshold": 10 } }
    },
    "edges": { "feed": { "check": { "price": "value" } } }
  });
  let graph = StandardBuilder::new(capabilities)
    .build_json(&description.to_string())
    .unwrap();
  let mut workflow = Workflow::new(graph.workflow_type, graph.nodes, graph.edges);

  workflow.run().await.unwrap();
  let check = workflow.node("check").unwrap();
  assert_eq!(check.inputs()["value"], json!(42.0));
  assert!(!check.inputs().contains_key("price"));
  assert_eq!(check.outputs()["path"], json!("true"));
}

#[tokio::test]
async fn test_gated_transfer_pays_once_and_logs_payment() {
  let ledger = Arc::new(MemoryLedger::new().with_balance("0xme", None, 10.0));
  let capabilities = Capabilities::in_memory().with_ledger(ledger.clone());
  let context =
    ExecutionContext::default().with_wallet(WalletCredentials::new("0xme").with_private_key("k"));
  let description = json!({
    "nodes": {
      "balance": { "type": "balance" },
      "gate": { "type": "safety_gate", "min_balance": 5 },
      "pay": { "type": "transfer", "config": { "to": "0xyou", "amount": 2 } }
    },
    "edges": {
      "balance": { "gate": {} },
      "gate": { "pay": {} }
    }
  });
  let graph = StandardBuilder::with_context(capabilities, context)
    .build_json(&description.to_string())
    .unwrap();
  assert!(!graph.has_errors(), "{:?}", graph.diagnostics);

  let (notifier, mut rx) = ChannelNotifier::channel();
  let mut workflow =
    Workflow::new(graph.workflow_type, graph.nodes, graph.edges).with_notifier(notifier);

  let report = workflow.run().await.unwrap();
  assert_eq!(report.executed, vec!["balance", "gate", "pay"]);

  let receipts = ledger.receipts().await;
  assert_eq!(receipts.len(), 1);
  assert_eq!(receipts[0].request.to, "0xyou");

  let mut payments = 0;
  while let Ok(entry) = rx.try_recv() {
    if entry.kind == LogKind::Payment {
      assert_eq!(entry.node_id.as_deref(), Some("pay"));
      payments += 1;
    }
  }
  assert_eq!(payments, 1);

  let pay = workflow.node("pay").unwrap();
  assert_eq!(pay.inputs()["approved"], json!(true));
  assert!(matches!(pay.outputs().get("tx_hash"), Some(Value::String(h)) if h.starts_with("0x")));
}

#[tokio::test]
async fn test_rejected_gate_stops_transfer() {
  let ledger = Arc::new(MemoryLedger::new().with_balance("0xme", None, 1.0));
  let capabilities = Capabilities::in_memory().with_ledger(ledger.clone());
  let context =
    ExecutionContext::default().with_wallet(WalletCredentials::new("0xme").with_private_key("k"));
  let description = json!({
    "nodes": {
      "balance": { "type": "balance" },
      "gate": { "type": "safety_gate", "min_balance": 5 },
      "pay": { "type": "transfer", "to": "0xyou", "amount": 2 }
    },
    "edges": { "balance": { "gate": {} }, "gate": { "pay": {} } }
  });
  let graph = StandardBuilder::with_context(capabilities, context)
    .build_json(&description.to_string())
    .unwrap();
  let mut workflow = Workflow::new(graph.workflow_type, graph.nodes, graph.edges);

  let err = workflow.run().await.unwrap_err();
  assert_eq!(err.node_id(), "gate");
  assert!(ledger.receipts().await.is_empty());
  assert!(messages(&workflow, LogKind::Error)[0].contains("below minimum"));
}

#[tokio::test]
async fn test_join_behind_untaken_branch_never_executes() {
  let capabilities = Capabilities::in_memory()
    .with_prices(Arc::new(StaticPriceOracle::new().with_price("ETH", 50.0)));
  let description = json!({
    "nodes": {
      "A": { "type": "price_feed" },
      "B": { "type": "conditional", "threshold": 100 },
      "C": { "type": "printer", "message": "high" },
      "J": { "type": "printer", "message": "joined at {price}" }
    },
    "edges": {
      "A": { "B": {}, "J": {} },
      "B": { "C": { "true": "price" }, "J": { "true": "price" } }
    }
  });
  let graph = StandardBuilder::new(capabilities)
    .build_json(&description.to_string())
    .unwrap();
  let mut workflow = Workflow::new(graph.workflow_type, graph.nodes, graph.edges);

  let report = workflow.run().await.unwrap();
  assert_eq!(report.executed, vec!["A", "B"]);
  assert_eq!(report.never_executed, vec!["C", "J"]);
  // The edge from A still wired its outputs before J was pruned.
  assert_eq!(workflow.node("J").unwrap().inputs()["price"], json!(50.0));
  assert!(messages(&workflow, LogKind::Console).is_empty());
}

#[tokio::test]
async fn test_malformed_conditional_fails_the_run() {
  let capabilities = Capabilities::in_memory()
    .with_prices(Arc::new(StaticPriceOracle::new().with_price("ETH", 50.0)));
  let description = json!({
    "nodes": {
      "A": { "type": "price_feed" },
      "B": { "type": "conditional", "operator": "above", "threshold": 100 },
      "C": { "type": "printer", "message": "high" },
      "D": { "type": "printer", "message": "low" }
    },
    "edges": {
      "A": { "B": {} },
      "B": { "C": { "true": "price" }, "D": { "false": "price" } }
    }
  });
  let graph = StandardBuilder::new(capabilities)
    .build_json(&description.to_string())
    .unwrap();
  assert!(graph.has_errors());
  let mut workflow = Workflow::new(graph.workflow_type, graph.nodes, graph.edges);

  let err = workflow.run().await.unwrap_err();
  assert_eq!(err.node_id(), "B");
  assert!(err.to_string().contains("invalid settings"), "{err}");
  assert!(messages(&workflow, LogKind::Console).is_empty());
  assert!(workflow.node("B").unwrap().outputs().get("path").is_none());
}
