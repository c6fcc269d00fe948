use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Settings for reaching the remote workflow store.
///
/// Loaded from `<config_dir>/flowdesk/config.toml` when present. Every field
/// is optional in the file; missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
  /// Base URL of the store API, e.g. `http://localhost:8080/api`.
  pub api_url: String,

  /// Request timeout in seconds, applied by the transport.
  pub timeout_secs: u64,

  /// Page size used for paged list requests.
  pub page_size: u32,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      api_url: DEFAULT_API_URL.to_string(),
      timeout_secs: DEFAULT_TIMEOUT_SECS,
      page_size: DEFAULT_PAGE_SIZE,
    }
  }
}

impl ClientConfig {
  /// Load configuration.
  ///
  /// An explicit `path` must exist. Without one, the default location is
  /// tried and a missing file yields the defaults.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    match path {
      Some(path) => Self::from_file(path),
      None => match Self::default_path() {
        Some(path) if path.exists() => Self::from_file(&path),
        _ => Ok(Self::default()),
      },
    }
  }

  /// Parse configuration from a TOML file.
  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
      path: path.to_path_buf(),
      source,
    })?;

    toml::from_str(&contents).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      message: e.to_string(),
    })
  }

  /// Default configuration file location.
  pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flowdesk").join("config.toml"))
  }

  /// Request timeout as a [`Duration`].
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}
