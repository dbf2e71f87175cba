use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::error::HostError;

/// A transfer the caller has already decided to make.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
  pub from: String,
  pub to: String,
  pub amount: f64,
  /// Token contract or ticker. `None` is the native asset.
  pub token: Option<String>,
  pub network: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferReceipt {
  pub tx_hash: String,
  pub request: TransferRequest,
}

/// Balance reads and value transfers.
#[async_trait]
pub trait Ledger: Send + Sync {
  async fn balance(&self, address: &str, token: Option<&str>) -> Result<f64, HostError>;

  async fn transfer(&self, request: TransferRequest) -> Result<TransferReceipt, HostError>;
}

type AccountKey = (String, Option<String>);

/// A ledger held in memory. Unknown accounts have a zero balance.
#[derive(Debug, Default)]
pub struct MemoryLedger {
  balances: RwLock<HashMap<AccountKey, f64>>,
  receipts: RwLock<Vec<TransferReceipt>>,
}

fn account(address: &str, token: Option<&str>) -> AccountKey {
  (address.to_ascii_lowercase(), token.map(str::to_ascii_uppercase))
}

impl MemoryLedger {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_balance(mut self, address: &str, token: Option<&str>, amount: f64) -> Self {
    self.balances.get_mut().insert(account(address, token), amount);
    self
  }

  pub async fn set_balance(&self, address: &str, token: Option<&str>, amount: f64) {
    self
      .balances
      .write()
      .await
      .insert(account(address, token), amount);
  }

  /// Every transfer executed so far, oldest first.
  pub async fn receipts(&self) -> Vec<TransferReceipt> {
    self.receipts.read().await.clone()
  }
}

#[async_trait]
impl Ledger for MemoryLedger {
  async fn balance(&self, address: &str, token: Option<&str>) -> Result<f64, HostError> {
    Ok(
      self
        .balances
        .read()
        .await
        .get(&account(address, token))
        .copied()
        .unwrap_or(0.0),
    )
  }

  async fn transfer(&self, request: TransferRequest) -> Result<TransferReceipt, HostError> {
    if !request.amount.is_finite() || request.amount <= 0.0 {
      return Err(HostError::invalid_transfer(format!(
        "amount must be positive, got {}",
        request.amount
      )));
    }
    if request.to.trim().is_empty() {
      return Err(HostError::invalid_transfer("missing destination address"));
    }

    let token = request.token.as_deref();
    let from = account(&request.from, token);
    let to = account(&request.to, token);

    let mut balances = self.balances.write().await;
    let available = balances.get(&from).copied().unwrap_or(0.0);
    if available < request.amount {
      return Err(HostError::InsufficientBalance {
        address: request.from.clone(),
        available,
        requested: request.amount,
      });
    }
    balances.insert(from, available - request.amount);
    *balances.entry(to).or_insert(0.0) += request.amount;
    drop(balances);

    let receipt = TransferReceipt {
      tx_hash: format!("0x{}", uuid::Uuid::new_v4().simple()),
      request,
    };
    info!(
      tx_hash = %receipt.tx_hash,
      from = %receipt.request.from,
      to = %receipt.request.to,
      amount = receipt.request.amount,
      "transfer recorded"
    );
    self.receipts.write().await.push(receipt.clone());
    Ok(receipt)
  }
}
