use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::error::HostError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
  Buy,
  Sell,
  Hold,
}

impl Signal {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Buy => "buy",
      Self::Sell => "sell",
      Self::Hold => "hold",
    }
  }
}

impl fmt::Display for Signal {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
  pub symbol: String,
  pub model: String,
  /// Latest known price, when an upstream node provided one.
  pub price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
  pub signal: Signal,
  /// In `[0, 1]`.
  pub confidence: f64,
}

/// A scoring service that turns market data into a trading signal.
#[async_trait]
pub trait Predictor: Send + Sync {
  async fn predict(&self, request: PredictionRequest) -> Result<Prediction, HostError>;
}

/// Deterministic predictor comparing each price with the previous one seen
/// for the same symbol.
///
/// A move larger than `threshold` (relative) yields buy/sell, anything else is
/// hold. Confidence grows with the size of the move.
#[derive(Debug)]
pub struct MomentumPredictor {
  threshold: f64,
  last_seen: Mutex<HashMap<String, f64>>,
}

impl Default for MomentumPredictor {
  fn default() -> Self {
    Self::new(0.01)
  }
}

impl MomentumPredictor {
  pub fn new(threshold: f64) -> Self {
    Self {
      threshold,
      last_seen: Mutex::new(HashMap::new()),
    }
  }
}

#[async_trait]
impl Predictor for MomentumPredictor {
  async fn predict(&self, request: PredictionRequest) -> Result<Prediction, HostError> {
    let Some(price) = request.price else {
      return Ok(Prediction {
        signal: Signal::Hold,
        confidence: 0.0,
      });
    };
    if !price.is_finite() || price <= 0.0 {
      return Err(HostError::Prediction {
        message: format!("price must be positive, got {}", price),
      });
    }

    let key = request.symbol.to_ascii_uppercase();
    let previous = self.last_seen.lock().await.insert(key, price);

    let Some(previous) = previous else {
      return Ok(Prediction {
        signal: Signal::Hold,
        confidence: 0.5,
      });
    };

    let change = (price - previous) / previous;
    let signal = if change > self.threshold {
      Signal::Buy
    } else if change < -self.threshold {
      Signal::Sell
    } else {
      Signal::Hold
    };
    let confidence = (0.5 + change.abs() * 5.0).min(0.99);

    Ok(Prediction { signal, confidence })
  }
}
