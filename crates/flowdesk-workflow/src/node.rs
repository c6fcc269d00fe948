use flowdesk_config::{NodeType, OpaquePayload, PositionDef};
use serde::{Deserialize, Serialize};

/// The kind of work a node stands for.
///
/// Gateways are meant to branch, but the graph model only tracks
/// connectivity; branching semantics belong to the execution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
  HumanTask,
  Automated,
  Gateway,
}

impl From<NodeType> for NodeKind {
  fn from(node_type: NodeType) -> Self {
    match node_type {
      NodeType::HumanTask => NodeKind::HumanTask,
      NodeType::Automated => NodeKind::Automated,
      NodeType::Gateway => NodeKind::Gateway,
    }
  }
}

impl From<NodeKind> for NodeType {
  fn from(kind: NodeKind) -> Self {
    match kind {
      NodeKind::HumanTask => NodeType::HumanTask,
      NodeKind::Automated => NodeType::Automated,
      NodeKind::Gateway => NodeType::Gateway,
    }
  }
}

/// Canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
  pub x: f64,
  pub y: f64,
}

impl Position {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

impl From<PositionDef> for Position {
  fn from(def: PositionDef) -> Self {
    Self { x: def.x, y: def.y }
  }
}

impl From<Position> for PositionDef {
  fn from(position: Position) -> Self {
    Self {
      x: position.x,
      y: position.y,
    }
  }
}

/// A node in a graph being authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
  pub id: String,
  pub kind: NodeKind,
  pub label: String,
  pub position: Position,
  /// Free-form configuration; never interpreted by the graph model.
  pub configuration: OpaquePayload,
}

/// A directed edge between two nodes of the same graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
  pub id: String,
  pub source: String,
  pub target: String,
  /// Rendering hint carried through from the designer surface.
  pub edge_type: Option<String>,
}

impl Edge {
  /// Whether either endpoint is `node_id`.
  pub fn touches(&self, node_id: &str) -> bool {
    self.source == node_id || self.target == node_id
  }
}
