use thiserror::Error;

/// Errors surfaced by host capabilities.
#[derive(Debug, Error)]
pub enum HostError {
  #[error("no price available for '{symbol}'")]
  PriceUnavailable { symbol: String },

  #[error("insufficient balance: {address} holds {available}, needs {requested}")]
  InsufficientBalance {
    address: String,
    available: f64,
    requested: f64,
  },

  #[error("invalid transfer: {message}")]
  InvalidTransfer { message: String },

  #[error("prediction failed: {message}")]
  Prediction { message: String },

  #[error("invalid url: {0}")]
  InvalidUrl(#[from] url::ParseError),

  #[error("http request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("unexpected response: {message}")]
  Response { message: String },
}

impl HostError {
  pub fn invalid_transfer(message: impl Into<String>) -> Self {
    Self::InvalidTransfer {
      message: message.into(),
    }
  }

  pub fn response(message: impl Into<String>) -> Self {
    Self::Response {
      message: message.into(),
    }
  }
}
