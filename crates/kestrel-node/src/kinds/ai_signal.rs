use std::sync::Arc;

use async_trait::async_trait;
use kestrel_config::NodeKind;
use kestrel_host::{PredictionRequest, Predictor, Signal};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::NodeError;
use crate::node::{Node, NodeBase, NodeReport};
use crate::slots::{NumberSlot, number_slot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSignalConfig {
  pub symbol: String,
  pub model: String,
  /// Predictions below this confidence are reported as `hold`.
  pub min_confidence: f64,
}

impl Default for AiSignalConfig {
  fn default() -> Self {
    Self {
      symbol: "ETH".to_string(),
      model: "default".to_string(),
      min_confidence: 0.5,
    }
  }
}

/// Asks the predictor for a buy/sell/hold signal.
pub struct AiSignalNode {
  base: NodeBase,
  config: AiSignalConfig,
  predictor: Arc<dyn Predictor>,
}

impl AiSignalNode {
  pub fn new(base: NodeBase, config: AiSignalConfig, predictor: Arc<dyn Predictor>) -> Self {
    Self {
      base,
      config,
      predictor,
    }
  }
}

#[async_trait]
impl Node for AiSignalNode {
  fn kind(&self) -> NodeKind {
    NodeKind::AiSignal
  }

  fn base(&self) -> &NodeBase {
    &self.base
  }

  fn base_mut(&mut self) -> &mut NodeBase {
    &mut self.base
  }

  async fn execute(&mut self) -> Result<Option<NodeReport>, NodeError> {
    let id = self.base.id.as_str();
    // The price is optional context for the model.
    let price = match number_slot(&self.base.inputs, "price") {
      NumberSlot::Present(price) => Some(price),
      NumberSlot::Missing => None,
      NumberSlot::Invalid(raw) => {
        return Err(NodeError::invalid_input(
          id,
          "price",
          format!("expected a number, got {}", raw),
        ));
      }
    };

    let prediction = self
      .predictor
      .predict(PredictionRequest {
        symbol: self.config.symbol.clone(),
        model: self.config.model.clone(),
        price,
      })
      .await
      .map_err(|e| NodeError::host(id, e))?;

    let signal = if prediction.confidence < self.config.min_confidence {
      Signal::Hold
    } else {
      prediction.signal
    };

    let outputs = &mut self.base.outputs;
    outputs.insert("signal".to_string(), Value::String(signal.to_string()));
    outputs.insert(
      "raw_signal".to_string(),
      Value::String(prediction.signal.to_string()),
    );
    outputs.insert("confidence".to_string(), json!(prediction.confidence));
    outputs.insert(
      "symbol".to_string(),
      Value::String(self.config.symbol.clone()),
    );

    Ok(Some(NodeReport::success(format!(
      "{} signal for {}: {} ({:.2})",
      self.config.model, self.config.symbol, signal, prediction.confidence
    ))))
  }
}
