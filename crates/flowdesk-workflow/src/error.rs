use thiserror::Error;

/// Errors raised by graph mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
  /// An edge endpoint does not name a node in the graph.
  #[error("invalid reference: node '{node_id}' is not in the graph")]
  InvalidReference { node_id: String },

  #[error("node not found: {0}")]
  NodeNotFound(String),
}

/// Errors raised while loading a graph from its persisted payload.
#[derive(Debug, Error)]
pub enum CodecError {
  /// The payload is missing fields, names an unknown node type, or breaks a
  /// graph invariant.
  #[error("malformed payload: {0}")]
  MalformedPayload(String),

  #[error("failed to encode payload: {0}")]
  Encode(#[source] serde_json::Error),
}

/// A structural problem found by [`WorkflowGraph::validate`](crate::WorkflowGraph::validate).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
  #[error("edge '{edge_id}' references unknown node '{node_id}'")]
  DanglingEdge { edge_id: String, node_id: String },

  #[error("duplicate node id: {node_id}")]
  DuplicateNodeId { node_id: String },

  #[error("duplicate edge id: {edge_id}")]
  DuplicateEdgeId { edge_id: String },
}
