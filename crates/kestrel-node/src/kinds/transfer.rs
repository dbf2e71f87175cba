use std::sync::Arc;

use async_trait::async_trait;
use kestrel_config::{NodeKind, WalletCredentials};
use kestrel_host::{Ledger, TransferRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::NodeError;
use crate::node::{Node, NodeBase, NodeReport};
use crate::slots::{NumberSlot, flexible_number, number_slot};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
  /// Destination address. Required.
  pub to: Option<String>,
  /// Amount to send when no upstream node wires an `amount` input.
  #[serde(deserialize_with = "flexible_number")]
  pub amount: Option<f64>,
  pub token: Option<String>,
}

/// Sends value from the context wallet.
pub struct TransferNode {
  base: NodeBase,
  config: TransferConfig,
  wallet: Option<WalletCredentials>,
  network: Option<String>,
  ledger: Arc<dyn Ledger>,
}

impl TransferNode {
  pub fn new(
    base: NodeBase,
    config: TransferConfig,
    wallet: Option<WalletCredentials>,
    network: Option<String>,
    ledger: Arc<dyn Ledger>,
  ) -> Self {
    Self {
      base,
      config,
      wallet,
      network,
      ledger,
    }
  }

  fn amount(&self) -> Result<f64, NodeError> {
    let id = self.base.id.as_str();
    match number_slot(&self.base.inputs, "amount") {
      NumberSlot::Present(amount) => Ok(amount),
      NumberSlot::Invalid(raw) => Err(NodeError::invalid_input(
        id,
        "amount",
        format!("expected a number, got {}", raw),
      )),
      NumberSlot::Missing => self
        .config
        .amount
        .ok_or_else(|| NodeError::missing_input(id, "amount")),
    }
  }
}

#[async_trait]
impl Node for TransferNode {
  fn kind(&self) -> NodeKind {
    NodeKind::Transfer
  }

  fn base(&self) -> &NodeBase {
    &self.base
  }

  fn base_mut(&mut self) -> &mut NodeBase {
    &mut self.base
  }

  async fn execute(&mut self) -> Result<Option<NodeReport>, NodeError> {
    let id = self.base.id.clone();
    let to = self
      .config
      .to
      .clone()
      .ok_or_else(|| NodeError::missing_config(&id, "to"))?;
    let wallet = self
      .wallet
      .as_ref()
      .filter(|w| w.can_sign())
      .ok_or_else(|| NodeError::MissingCredentials {
        node_id: id.clone(),
      })?;
    let amount = self.amount()?;

    let request = TransferRequest {
      from: wallet.address.clone(),
      to,
      amount,
      token: self.config.token.clone(),
      network: self.network.clone(),
    };
    let receipt = self
      .ledger
      .transfer(request)
      .await
      .map_err(|e| NodeError::host(&id, e))?;

    let token = receipt.request.token.as_deref().unwrap_or("native");
    let outputs = &mut self.base.outputs;
    outputs.insert(
      "tx_hash".to_string(),
      Value::String(receipt.tx_hash.clone()),
    );
    outputs.insert("amount".to_string(), json!(receipt.request.amount));
    outputs.insert("to".to_string(), Value::String(receipt.request.to.clone()));
    outputs.insert("token".to_string(), Value::String(token.to_string()));

    Ok(Some(NodeReport::payment(format!(
      "sent {} {} to {} (tx {})",
      receipt.request.amount, token, receipt.request.to, receipt.tx_hash
    ))))
  }
}
