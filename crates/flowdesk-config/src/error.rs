use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid config file {path}: {message}")]
  Parse { path: PathBuf, message: String },
}
