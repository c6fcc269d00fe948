//! Mapping between [`WorkflowGraph`] and the persisted payload.
//!
//! The payload is stored as a JSON string inside the definition record's
//! `definition` field, so a record on the wire carries it double-encoded.
//! [`encode`] and [`decode`] produce and consume that inner string.

use flowdesk_config::{EdgeDef, GraphDef, NodeData, NodeDef, OpaquePayload};

use crate::error::CodecError;
use crate::model::WorkflowGraph;
use crate::node::{Edge, Node};

/// Map a graph to its payload form.
pub fn serialize(graph: &WorkflowGraph) -> GraphDef {
  let nodes = graph
    .nodes()
    .iter()
    .map(|node| NodeDef {
      id: node.id.clone(),
      node_type: node.kind.into(),
      position: node.position.into(),
      data: NodeData {
        label: node.label.clone(),
        configuration: node.configuration.as_str().to_string(),
      },
    })
    .collect();

  let edges = graph
    .edges()
    .iter()
    .map(|edge| EdgeDef {
      id: edge.id.clone(),
      source: edge.source.clone(),
      target: edge.target.clone(),
      edge_type: edge.edge_type.clone(),
    })
    .collect();

  GraphDef { nodes, edges }
}

/// Load a graph from its payload form.
///
/// Payloads may come from an untrusted store, so the graph invariants are
/// checked again: duplicate ids and edges pointing at nodes missing from
/// `nodes` are rejected.
pub fn deserialize(def: GraphDef) -> Result<WorkflowGraph, CodecError> {
  let nodes = def
    .nodes
    .into_iter()
    .map(|node| Node {
      id: node.id,
      kind: node.node_type.into(),
      label: node.data.label,
      position: node.position.into(),
      configuration: OpaquePayload::new(node.data.configuration),
    })
    .collect();

  let edges = def
    .edges
    .into_iter()
    .map(|edge| Edge {
      id: edge.id,
      source: edge.source,
      target: edge.target,
      edge_type: edge.edge_type,
    })
    .collect();

  let graph = WorkflowGraph::from_parts(nodes, edges);
  let violations = graph.validate();
  if let Some(first) = violations.first() {
    return Err(CodecError::MalformedPayload(first.to_string()));
  }

  Ok(graph)
}

/// Encode a graph as the JSON text stored in a definition record.
pub fn encode(graph: &WorkflowGraph) -> Result<String, CodecError> {
  serialize(graph).to_json().map_err(CodecError::Encode)
}

/// Decode the JSON text stored in a definition record.
///
/// Missing fields and unrecognized node types surface as
/// [`CodecError::MalformedPayload`].
pub fn decode(definition: &str) -> Result<WorkflowGraph, CodecError> {
  let def =
    GraphDef::from_json(definition).map_err(|e| CodecError::MalformedPayload(e.to_string()))?;
  deserialize(def)
}
