use std::fmt;

use serde::Serialize;

use crate::error::ConsoleError;

/// A dismissible, user-visible report of a failed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
  /// What the user tried to do, e.g. "Failed to activate workflow definition".
  pub summary: String,
  /// The underlying error.
  pub detail: String,
}

impl Notice {
  pub fn new(summary: impl Into<String>, error: &ConsoleError) -> Self {
    Self {
      summary: summary.into(),
      detail: error.to_string(),
    }
  }
}

impl fmt::Display for Notice {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.summary, self.detail)
  }
}
