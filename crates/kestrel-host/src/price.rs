use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use crate::error::HostError;

/// Source of spot prices.
#[async_trait]
pub trait PriceOracle: Send + Sync {
  /// Current price of `symbol`, quoted in the oracle's unit of account.
  async fn price(&self, symbol: &str) -> Result<f64, HostError>;
}

/// In-memory prices, keyed by upper-cased symbol.
#[derive(Debug, Default)]
pub struct StaticPriceOracle {
  prices: RwLock<HashMap<String, f64>>,
}

impl StaticPriceOracle {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_price(mut self, symbol: &str, price: f64) -> Self {
    self
      .prices
      .get_mut()
      .insert(symbol.to_ascii_uppercase(), price);
    self
  }

  /// Change a price while workflows are running.
  pub async fn set_price(&self, symbol: &str, price: f64) {
    self
      .prices
      .write()
      .await
      .insert(symbol.to_ascii_uppercase(), price);
  }
}

#[async_trait]
impl PriceOracle for StaticPriceOracle {
  async fn price(&self, symbol: &str) -> Result<f64, HostError> {
    self
      .prices
      .read()
      .await
      .get(&symbol.to_ascii_uppercase())
      .copied()
      .ok_or_else(|| HostError::PriceUnavailable {
        symbol: symbol.to_string(),
      })
  }
}

/// Prices fetched over HTTP.
///
/// The URL template may contain `{symbol}`. The response must be a JSON
/// object whose `price_field` holds a number or a numeric string.
#[derive(Debug, Clone)]
pub struct HttpPriceOracle {
  client: reqwest::Client,
  url_template: String,
  price_field: String,
}

impl HttpPriceOracle {
  pub fn new(url_template: impl Into<String>) -> Result<Self, HostError> {
    let url_template = url_template.into();
    // Validate the template once with a placeholder symbol.
    Url::parse(&url_template.replace("{symbol}", "ETH"))?;
    Ok(Self {
      client: reqwest::Client::new(),
      url_template,
      price_field: "price".to_string(),
    })
  }

  pub fn with_price_field(mut self, field: impl Into<String>) -> Self {
    self.price_field = field.into();
    self
  }

  fn url_for(&self, symbol: &str) -> Result<Url, HostError> {
    Ok(Url::parse(&self.url_template.replace("{symbol}", symbol))?)
  }
}

#[async_trait]
impl PriceOracle for HttpPriceOracle {
  async fn price(&self, symbol: &str) -> Result<f64, HostError> {
    let url = self.url_for(symbol)?;
    debug!(%url, symbol, "fetching price");

    let body: serde_json::Value = self
      .client
      .get(url)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    let field = body
      .get(&self.price_field)
      .ok_or_else(|| HostError::response(format!("missing field '{}'", self.price_field)))?;

    match field {
      serde_json::Value::Number(n) => n.as_f64(),
      serde_json::Value::String(s) => s.parse().ok(),
      _ => None,
    }
    .ok_or_else(|| HostError::response(format!("field '{}' is not numeric", self.price_field)))
  }
}
