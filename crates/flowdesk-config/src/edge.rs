use serde::{Deserialize, Serialize};

/// An edge entry in the persisted graph payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDef {
  pub id: String,
  pub source: String,
  pub target: String,
  /// Rendering hint set by the designer surface, passed through untouched.
  #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
  pub edge_type: Option<String>,
}
