use serde::{Deserialize, Serialize};

use crate::enums::NodeType;

/// A node entry in the persisted graph payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDef {
  pub id: String,
  #[serde(rename = "type")]
  pub node_type: NodeType,
  pub position: PositionDef,
  pub data: NodeData,
}

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionDef {
  pub x: f64,
  pub y: f64,
}

/// Display and configuration data of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
  pub label: String,
  /// JSON-encoded configuration, kept as the raw string the designer wrote.
  pub configuration: String,
}
