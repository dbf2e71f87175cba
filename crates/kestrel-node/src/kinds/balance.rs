use std::sync::Arc;

use async_trait::async_trait;
use kestrel_config::NodeKind;
use kestrel_host::Ledger;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::NodeError;
use crate::node::{Node, NodeBase, NodeReport};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
  /// Account to query. The builder falls back to the context wallet.
  pub address: Option<String>,
  /// Token to query; `None` is the native asset.
  pub token: Option<String>,
}

/// Reads an account balance from the ledger.
pub struct BalanceNode {
  base: NodeBase,
  config: BalanceConfig,
  ledger: Arc<dyn Ledger>,
}

impl BalanceNode {
  pub fn new(base: NodeBase, config: BalanceConfig, ledger: Arc<dyn Ledger>) -> Self {
    Self {
      base,
      config,
      ledger,
    }
  }
}

#[async_trait]
impl Node for BalanceNode {
  fn kind(&self) -> NodeKind {
    NodeKind::Balance
  }

  fn base(&self) -> &NodeBase {
    &self.base
  }

  fn base_mut(&mut self) -> &mut NodeBase {
    &mut self.base
  }

  async fn execute(&mut self) -> Result<Option<NodeReport>, NodeError> {
    let id = self.base.id.as_str();
    let address = self
      .config
      .address
      .as_deref()
      .ok_or_else(|| NodeError::missing_config(id, "address"))?;
    let token = self.config.token.as_deref();

    let balance = self
      .ledger
      .balance(address, token)
      .await
      .map_err(|e| NodeError::host(id, e))?;

    let outputs = &mut self.base.outputs;
    outputs.insert("balance".to_string(), json!(balance));
    outputs.insert("address".to_string(), Value::String(address.to_string()));
    outputs.insert(
      "token".to_string(),
      token.map_or(Value::Null, |t| Value::String(t.to_string())),
    );

    Ok(Some(NodeReport::success(format!(
      "{} holds {} {}",
      address,
      balance,
      token.unwrap_or("native")
    ))))
  }
}
