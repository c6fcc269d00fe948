use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a node as written in the persisted payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
  HumanTask,
  Automated,
  Gateway,
}

impl NodeType {
  /// Wire name of the node type.
  pub fn as_str(&self) -> &'static str {
    match self {
      NodeType::HumanTask => "HUMAN_TASK",
      NodeType::Automated => "AUTOMATED",
      NodeType::Gateway => "GATEWAY",
    }
  }
}

impl fmt::Display for NodeType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
