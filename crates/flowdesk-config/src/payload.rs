//! Opaque JSON payloads.
//!
//! Node configuration and instance context are free-form JSON that the
//! designer and the backend exchange as strings. They are carried verbatim
//! and only parsed when a caller asks for a concrete shape, so malformed
//! content fails at that call instead of somewhere deeper.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error raised when an opaque payload does not parse into the requested shape.
#[derive(Debug, Error)]
#[error("invalid payload: {0}")]
pub struct PayloadError(#[from] serde_json::Error);

/// A JSON document kept as its raw string encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaquePayload(String);

impl OpaquePayload {
  /// Wrap raw JSON text without checking it.
  pub fn new(raw: impl Into<String>) -> Self {
    Self(raw.into())
  }

  /// The empty object, `{}`.
  pub fn empty() -> Self {
    Self("{}".to_string())
  }

  /// Encode a JSON value.
  pub fn from_value(value: &serde_json::Value) -> Self {
    Self(value.to_string())
  }

  /// Raw JSON text.
  pub fn as_str(&self) -> &str {
    &self.0
  }

  pub fn into_string(self) -> String {
    self.0
  }

  /// Parse the payload as an untyped JSON value.
  pub fn as_value(&self) -> Result<serde_json::Value, PayloadError> {
    Ok(serde_json::from_str(&self.0)?)
  }

  /// Parse the payload strictly into `T`.
  pub fn parse<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
    Ok(serde_json::from_str(&self.0)?)
  }
}

impl Default for OpaquePayload {
  fn default() -> Self {
    Self::empty()
  }
}

impl fmt::Display for OpaquePayload {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<String> for OpaquePayload {
  fn from(raw: String) -> Self {
    Self(raw)
  }
}

impl From<&str> for OpaquePayload {
  fn from(raw: &str) -> Self {
    Self(raw.to_string())
  }
}
