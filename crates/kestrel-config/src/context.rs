use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Global execution context forwarded to node constructors.
///
/// Only transaction-issuing kinds look at the wallet; everything else passes
/// the context through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub wallet: Option<WalletCredentials>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub network: Option<NetworkParams>,
  /// Anything else the caller wants to hand to nodes.
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

impl ExecutionContext {
  pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::parse("execution context", e))
  }

  pub fn with_wallet(mut self, wallet: WalletCredentials) -> Self {
    self.wallet = Some(wallet);
    self
  }

  pub fn wallet_address(&self) -> Option<&str> {
    self.wallet.as_ref().map(|w| w.address.as_str())
  }

  pub fn network_name(&self) -> Option<&str> {
    self.network.as_ref().and_then(|n| n.name.as_deref())
  }
}

/// Signing credentials for a wallet.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletCredentials {
  pub address: String,
  #[serde(default, skip_serializing)]
  pub private_key: Option<String>,
}

impl WalletCredentials {
  pub fn new(address: impl Into<String>) -> Self {
    Self {
      address: address.into(),
      private_key: None,
    }
  }

  pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
    self.private_key = Some(key.into());
    self
  }

  pub fn can_sign(&self) -> bool {
    self.private_key.as_deref().is_some_and(|k| !k.is_empty())
  }
}

// Never print key material, not even in debug logs.
impl fmt::Debug for WalletCredentials {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("WalletCredentials")
      .field("address", &self.address)
      .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
      .finish()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkParams {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub chain_id: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rpc_url: Option<String>,
}
