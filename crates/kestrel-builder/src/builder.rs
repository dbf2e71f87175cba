use kestrel_config::{EdgeSet, ExecutionContext, NodeDef, NodeKind, WorkflowDef, WorkflowType};
use kestrel_host::Capabilities;
use kestrel_node::kinds::{
  AiSignalConfig, AiSignalNode, BalanceConfig, BalanceNode, ConditionalConfig, ConditionalNode,
  PriceFeedConfig, PriceFeedNode, PrinterConfig, PrinterNode, SafetyGateConfig, SafetyGateNode,
  TransferConfig, TransferNode,
};
use kestrel_node::{MisconfiguredNode, Node, NodeBase, NodeMap};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use crate::error::BuildError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Warning,
  Error,
}

/// A problem noticed while building one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildDiagnostic {
  pub node_id: String,
  pub severity: Severity,
  pub message: String,
}

/// The builder's output: everything the scheduler needs.
#[derive(Debug)]
pub struct BuiltGraph {
  pub workflow_type: WorkflowType,
  pub interval_ms: Option<u64>,
  pub nodes: NodeMap,
  /// Edges exactly as described, including ones naming skipped nodes.
  pub edges: EdgeSet,
  pub diagnostics: Vec<BuildDiagnostic>,
}

impl BuiltGraph {
  pub fn has_errors(&self) -> bool {
    self
      .diagnostics
      .iter()
      .any(|d| d.severity == Severity::Error)
  }
}

/// Builder transforms a WorkflowDef into executable nodes.
pub trait Builder: Send + Sync {
  /// Build every node the description names, dispatching on its type.
  fn build(&self, def: WorkflowDef) -> BuiltGraph;

  /// Parse a JSON description and build it.
  fn build_json(&self, raw: &str) -> Result<BuiltGraph, BuildError> {
    Ok(self.build(WorkflowDef::from_json(raw)?))
  }
}

/// Builder for the built-in node kinds.
///
/// Holds the execution context (wallet, network) and the capabilities handed
/// to every node it constructs.
#[derive(Debug, Clone)]
pub struct StandardBuilder {
  context: ExecutionContext,
  capabilities: Capabilities,
}

impl StandardBuilder {
  pub fn new(capabilities: Capabilities) -> Self {
    Self::with_context(capabilities, ExecutionContext::default())
  }

  pub fn with_context(capabilities: Capabilities, context: ExecutionContext) -> Self {
    Self {
      context,
      capabilities,
    }
  }

  pub fn context(&self) -> &ExecutionContext {
    &self.context
  }

  /// Build one node. Returns `None` when the type is unknown.
  fn build_node(
    &self,
    node_id: &str,
    def: &NodeDef,
    diagnostics: &mut Vec<BuildDiagnostic>,
  ) -> Option<Box<dyn Node>> {
    let Some(kind) = def.kind() else {
      warn!(node_id, node_type = %def.node_type, "unknown node type, skipping node");
      diagnostics.push(BuildDiagnostic {
        node_id: node_id.to_string(),
        severity: Severity::Warning,
        message: format!("unknown node type '{}', node skipped", def.node_type),
      });
      return None;
    };

    let label = def.label.clone().unwrap_or_else(|| node_id.to_string());
    let mut ctx = NodeBuild {
      node_id,
      kind,
      diagnostics,
    };

    let node = match self.construct(&mut ctx, &label, def.merged_config()) {
      Ok(node) => node,
      Err(message) => {
        ctx.error(&message);
        let base = match kind {
          NodeKind::Conditional => NodeBase::empty(node_id, label),
          _ => NodeBase::new(node_id, label),
        };
        Box::new(MisconfiguredNode::new(base, kind, message))
      }
    };

    debug!(node_id, %kind, "built node");
    Some(node)
  }

  /// Decode the typed config for `ctx.kind` and construct the node.
  ///
  /// Fails with a message when the settings cannot be decoded.
  fn construct(
    &self,
    ctx: &mut NodeBuild<'_>,
    label: &str,
    merged: Map<String, Value>,
  ) -> Result<Box<dyn Node>, String> {
    let node_id = ctx.node_id;
    let caps = &self.capabilities;

    let node: Box<dyn Node> = match ctx.kind {
      NodeKind::PriceFeed => {
        let config: PriceFeedConfig = ctx.parse(merged)?;
        Box::new(PriceFeedNode::new(
          NodeBase::new(node_id, label),
          config,
          caps.prices.clone(),
        ))
      }
      NodeKind::Conditional => {
        let config: ConditionalConfig = ctx.parse(merged)?;
        if config.threshold.is_none() {
          ctx.warning("no threshold configured, comparing against 0");
        }
        Box::new(ConditionalNode::new(NodeBase::empty(node_id, label), config))
      }
      NodeKind::Balance => {
        let mut config: BalanceConfig = ctx.parse(merged)?;
        if config.address.is_none() {
          config.address = self.context.wallet_address().map(String::from);
        }
        if config.address.is_none() {
          ctx.error("no address configured and no wallet in context");
        }
        Box::new(BalanceNode::new(
          NodeBase::new(node_id, label),
          config,
          caps.ledger.clone(),
        ))
      }
      NodeKind::Transfer => {
        let config: TransferConfig = ctx.parse(merged)?;
        if config.to.as_deref().is_none_or(|to| to.trim().is_empty()) {
          ctx.error("missing destination address 'to'");
        }
        let wallet = self.context.wallet.clone();
        if !wallet.as_ref().is_some_and(|w| w.can_sign()) {
          ctx.error("no signing credentials in execution context");
        }
        Box::new(TransferNode::new(
          NodeBase::new(node_id, label),
          config,
          wallet,
          self.context.network_name().map(String::from),
          caps.ledger.clone(),
        ))
      }
      NodeKind::AiSignal => {
        let config: AiSignalConfig = ctx.parse(merged)?;
        Box::new(AiSignalNode::new(
          NodeBase::new(node_id, label),
          config,
          caps.predictor.clone(),
        ))
      }
      NodeKind::SafetyGate => {
        let config: SafetyGateConfig = ctx.parse(merged)?;
        Box::new(SafetyGateNode::new(NodeBase::new(node_id, label), config))
      }
      NodeKind::Printer => {
        let config: PrinterConfig = ctx.parse(merged)?;
        Box::new(PrinterNode::new(NodeBase::new(node_id, label), config))
      }
    };
    Ok(node)
  }
}

impl Builder for StandardBuilder {
  fn build(&self, def: WorkflowDef) -> BuiltGraph {
    let mut diagnostics = Vec::new();
    let mut nodes = NodeMap::new();

    for (node_id, node_def) in def.nodes.iter() {
      if let Some(node) = self.build_node(node_id, node_def, &mut diagnostics) {
        nodes.insert(node);
      }
    }

    for edge in def.edges.iter() {
      for end in [edge.from, edge.to] {
        if !nodes.contains(end) {
          debug!(from = edge.from, to = edge.to, missing = end, "edge references unknown node");
        }
      }
    }

    BuiltGraph {
      workflow_type: def.workflow_type,
      interval_ms: def.interval_ms,
      nodes,
      edges: def.edges,
      diagnostics,
    }
  }
}

/// Per-node state while constructing one node.
struct NodeBuild<'a> {
  node_id: &'a str,
  kind: NodeKind,
  diagnostics: &'a mut Vec<BuildDiagnostic>,
}

impl NodeBuild<'_> {
  /// Decode the typed config.
  fn parse<T: DeserializeOwned>(&self, merged: Map<String, Value>) -> Result<T, String> {
    serde_json::from_value(Value::Object(merged))
      .map_err(|e| format!("invalid {} settings: {}", self.kind, e))
  }

  fn warning(&mut self, message: &str) {
    warn!(node_id = self.node_id, kind = %self.kind, "{}", message);
    self.push(Severity::Warning, message);
  }

  fn error(&mut self, message: &str) {
    error!(node_id = self.node_id, kind = %self.kind, "{}", message);
    self.push(Severity::Error, message);
  }

  fn push(&mut self, severity: Severity, message: &str) {
    self.diagnostics.push(BuildDiagnostic {
      node_id: self.node_id.to_string(),
      severity,
      message: message.to_string(),
    });
  }
}
