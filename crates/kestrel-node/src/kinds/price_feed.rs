use std::sync::Arc;

use async_trait::async_trait;
use kestrel_config::NodeKind;
use kestrel_host::PriceOracle;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::NodeError;
use crate::node::{Node, NodeBase, NodeReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceFeedConfig {
  pub symbol: String,
}

impl Default for PriceFeedConfig {
  fn default() -> Self {
    Self {
      symbol: "ETH".to_string(),
    }
  }
}

/// Looks up the current price of one symbol.
pub struct PriceFeedNode {
  base: NodeBase,
  config: PriceFeedConfig,
  prices: Arc<dyn PriceOracle>,
}

impl PriceFeedNode {
  pub fn new(base: NodeBase, config: PriceFeedConfig, prices: Arc<dyn PriceOracle>) -> Self {
    Self {
      base,
      config,
      prices,
    }
  }
}

#[async_trait]
impl Node for PriceFeedNode {
  fn kind(&self) -> NodeKind {
    NodeKind::PriceFeed
  }

  fn base(&self) -> &NodeBase {
    &self.base
  }

  fn base_mut(&mut self) -> &mut NodeBase {
    &mut self.base
  }

  async fn execute(&mut self) -> Result<Option<NodeReport>, NodeError> {
    let symbol = self.config.symbol.as_str();
    let price = self
      .prices
      .price(symbol)
      .await
      .map_err(|e| NodeError::host(&self.base.id, e))?;

    let outputs = &mut self.base.outputs;
    outputs.insert("price".to_string(), json!(price));
    outputs.insert("symbol".to_string(), Value::String(symbol.to_string()));
    outputs.insert(
      "timestamp".to_string(),
      Value::String(chrono::Utc::now().to_rfc3339()),
    );

    Ok(Some(NodeReport::success(format!("{} price: {}", symbol, price))))
  }
}
