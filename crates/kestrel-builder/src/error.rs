use thiserror::Error;

/// Errors that prevent a graph from being built at all.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The description itself could not be read.
  #[error(transparent)]
  Config(#[from] kestrel_config::ConfigError),
}
