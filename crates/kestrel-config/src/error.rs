use thiserror::Error;

/// Errors raised while reading a description or execution context.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to parse {what}: {source}")]
  Parse {
    what: &'static str,
    #[source]
    source: serde_json::Error,
  },
}

impl ConfigError {
  pub(crate) fn parse(what: &'static str, source: serde_json::Error) -> Self {
    Self::Parse { what, source }
  }
}
