use std::collections::HashSet;

use flowdesk_config::OpaquePayload;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{GraphError, Violation};
use crate::node::{Edge, Node, NodeKind, Position};
use crate::topology::Topology;

/// Upper bound (exclusive) of randomly assigned canvas coordinates.
const CANVAS_EXTENT: f64 = 400.0;

/// An editable workflow graph.
///
/// Nodes and edges keep insertion order. Every mutation keeps edges attached
/// to existing nodes: edges are only created between present nodes and
/// removing a node drops the edges touching it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkflowGraph {
  nodes: Vec<Node>,
  edges: Vec<Edge>,
}

impl WorkflowGraph {
  /// Create an empty graph.
  pub fn new() -> Self {
    Self::default()
  }

  /// Assemble a graph from already-built parts without checking them.
  ///
  /// Use [`validate`](Self::validate) afterwards when the parts come from an
  /// untrusted source.
  pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
    Self { nodes, edges }
  }

  pub fn nodes(&self) -> &[Node] {
    &self.nodes
  }

  pub fn edges(&self) -> &[Edge] {
    &self.edges
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }

  /// Get a node by ID.
  pub fn node(&self, node_id: &str) -> Option<&Node> {
    self.nodes.iter().find(|n| n.id == node_id)
  }

  pub fn contains_node(&self, node_id: &str) -> bool {
    self.node(node_id).is_some()
  }

  /// Add a node at a random canvas position.
  pub fn add_node(
    &mut self,
    kind: NodeKind,
    label: impl Into<String>,
    configuration: OpaquePayload,
  ) -> Node {
    let mut rng = rand::thread_rng();
    let position = Position::new(
      rng.gen_range(0.0..CANVAS_EXTENT),
      rng.gen_range(0.0..CANVAS_EXTENT),
    );
    self.add_node_at(kind, label, configuration, position)
  }

  /// Add a node at the given canvas position.
  pub fn add_node_at(
    &mut self,
    kind: NodeKind,
    label: impl Into<String>,
    configuration: OpaquePayload,
    position: Position,
  ) -> Node {
    let node = Node {
      id: format!("node-{}", Uuid::new_v4()),
      kind,
      label: label.into(),
      position,
      configuration,
    };
    self.nodes.push(node.clone());
    node
  }

  /// Remove a node and every edge touching it. Absent ids are ignored.
  pub fn remove_node(&mut self, node_id: &str) {
    self.nodes.retain(|n| n.id != node_id);
    self.edges.retain(|e| !e.touches(node_id));
  }

  /// Replace a node's label and configuration.
  pub fn update_node(
    &mut self,
    node_id: &str,
    label: impl Into<String>,
    configuration: OpaquePayload,
  ) -> Result<&Node, GraphError> {
    let node = self.node_mut(node_id)?;
    node.label = label.into();
    node.configuration = configuration;
    Ok(node)
  }

  /// Move a node on the canvas.
  pub fn move_node(&mut self, node_id: &str, position: Position) -> Result<(), GraphError> {
    self.node_mut(node_id)?.position = position;
    Ok(())
  }

  /// Connect two nodes with a new edge.
  ///
  /// Self-loops and parallel edges are accepted; only the endpoints'
  /// existence is checked.
  pub fn connect(&mut self, source: &str, target: &str) -> Result<Edge, GraphError> {
    for node_id in [source, target] {
      if !self.contains_node(node_id) {
        return Err(GraphError::InvalidReference {
          node_id: node_id.to_string(),
        });
      }
    }

    let edge = Edge {
      id: format!("edge-{}", Uuid::new_v4()),
      source: source.to_string(),
      target: target.to_string(),
      edge_type: None,
    };
    self.edges.push(edge.clone());
    Ok(edge)
  }

  /// Remove an edge by ID. Absent ids are ignored.
  pub fn disconnect(&mut self, edge_id: &str) {
    self.edges.retain(|e| e.id != edge_id);
  }

  /// Check the graph's structural invariants.
  ///
  /// An empty graph is valid.
  pub fn validate(&self) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut node_ids = HashSet::new();
    for node in &self.nodes {
      if !node_ids.insert(node.id.as_str()) {
        violations.push(Violation::DuplicateNodeId {
          node_id: node.id.clone(),
        });
      }
    }

    let mut edge_ids = HashSet::new();
    for edge in &self.edges {
      if !edge_ids.insert(edge.id.as_str()) {
        violations.push(Violation::DuplicateEdgeId {
          edge_id: edge.id.clone(),
        });
      }
      for endpoint in [&edge.source, &edge.target] {
        if !node_ids.contains(endpoint.as_str()) {
          violations.push(Violation::DanglingEdge {
            edge_id: edge.id.clone(),
            node_id: endpoint.clone(),
          });
        }
      }
    }

    violations
  }

  pub fn is_valid(&self) -> bool {
    self.validate().is_empty()
  }

  /// Build the traversal view of the graph.
  pub fn topology(&self) -> Topology {
    Topology::new(&self.nodes, &self.edges)
  }

  fn node_mut(&mut self, node_id: &str) -> Result<&mut Node, GraphError> {
    self
      .nodes
      .iter_mut()
      .find(|n| n.id == node_id)
      .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn task(graph: &mut WorkflowGraph, label: &str) -> String {
    graph
      .add_node(NodeKind::HumanTask, label, OpaquePayload::empty())
      .id
  }

  #[test]
  fn test_empty_graph_is_valid() {
    let graph = WorkflowGraph::new();
    assert!(graph.is_empty());
    assert!(graph.validate().is_empty());
  }

  #[test]
  fn test_add_node_assigns_unique_ids_and_canvas_position() {
    let mut graph = WorkflowGraph::new();
    let a = graph.add_node(NodeKind::Automated, "Fetch", OpaquePayload::empty());
    let b = graph.add_node(NodeKind::Automated, "Fetch", OpaquePayload::empty());

    assert_ne!(a.id, b.id);
    assert_eq!(graph.nodes().len(), 2);
    for node in graph.nodes() {
      assert!((0.0..CANVAS_EXTENT).contains(&node.position.x));
      assert!((0.0..CANVAS_EXTENT).contains(&node.position.y));
    }
  }

  #[test]
  fn test_add_node_at_keeps_position() {
    let mut graph = WorkflowGraph::new();
    let node = graph.add_node_at(
      NodeKind::Gateway,
      "Branch",
      OpaquePayload::empty(),
      Position::new(12.5, 80.0),
    );
    assert_eq!(graph.node(&node.id).unwrap().position, Position::new(12.5, 80.0));
  }

  #[test]
  fn test_connect_rejects_unknown_nodes() {
    let mut graph = WorkflowGraph::new();
    let a = task(&mut graph, "a");

    let err = graph.connect(&a, "missing").unwrap_err();
    assert_eq!(
      err,
      GraphError::InvalidReference {
        node_id: "missing".to_string()
      }
    );

    let err = graph.connect("missing", &a).unwrap_err();
    assert!(matches!(err, GraphError::InvalidReference { .. }));
    assert!(graph.edges().is_empty());
  }

  #[test]
  fn test_connect_allows_self_loops_and_parallel_edges() {
    let mut graph = WorkflowGraph::new();
    let a = task(&mut graph, "a");
    let b = task(&mut graph, "b");

    graph.connect(&a, &a).unwrap();
    let first = graph.connect(&a, &b).unwrap();
    let second = graph.connect(&a, &b).unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(graph.edges().len(), 3);
    assert!(graph.is_valid());
  }

  #[test]
  fn test_remove_node_cascades_edges() {
    let mut graph = WorkflowGraph::new();
    let a = task(&mut graph, "a");
    let b = task(&mut graph, "b");
    let c = task(&mut graph, "c");
    graph.connect(&a, &b).unwrap();
    graph.connect(&b, &c).unwrap();
    let kept = graph.connect(&a, &c).unwrap();

    graph.remove_node(&b);

    assert!(!graph.contains_node(&b));
    assert_eq!(graph.edges(), &[kept]);
    assert!(graph.is_valid());
  }

  #[test]
  fn test_remove_absent_node_is_noop() {
    let mut graph = WorkflowGraph::new();
    let a = task(&mut graph, "a");
    graph.connect(&a, &a).unwrap();
    let before = graph.clone();

    graph.remove_node("nope");
    assert_eq!(graph, before);
  }

  #[test]
  fn test_update_and_move_node() {
    let mut graph = WorkflowGraph::new();
    let a = task(&mut graph, "a");

    graph
      .update_node(&a, "Approve", OpaquePayload::new(r#"{"role":"lead"}"#))
      .unwrap();
    graph.move_node(&a, Position::new(1.0, 2.0)).unwrap();

    let node = graph.node(&a).unwrap();
    assert_eq!(node.label, "Approve");
    assert_eq!(node.configuration.as_str(), r#"{"role":"lead"}"#);
    assert_eq!(node.position, Position::new(1.0, 2.0));

    assert_eq!(
      graph.move_node("nope", Position::default()),
      Err(GraphError::NodeNotFound("nope".to_string()))
    );
  }

  #[test]
  fn test_disconnect() {
    let mut graph = WorkflowGraph::new();
    let a = task(&mut graph, "a");
    let edge = graph.connect(&a, &a).unwrap();

    graph.disconnect("unknown");
    assert_eq!(graph.edges().len(), 1);
    graph.disconnect(&edge.id);
    assert!(graph.edges().is_empty());
  }

  #[test]
  fn test_validate_reports_dangling_and_duplicates() {
    let node = Node {
      id: "a".to_string(),
      kind: NodeKind::HumanTask,
      label: "a".to_string(),
      position: Position::default(),
      configuration: OpaquePayload::empty(),
    };
    let edge = Edge {
      id: "e".to_string(),
      source: "a".to_string(),
      target: "ghost".to_string(),
      edge_type: None,
    };
    let graph = WorkflowGraph::from_parts(vec![node.clone(), node], vec![edge.clone(), edge]);

    let violations = graph.validate();
    assert!(violations.contains(&Violation::DuplicateNodeId {
      node_id: "a".to_string()
    }));
    assert!(violations.contains(&Violation::DuplicateEdgeId {
      edge_id: "e".to_string()
    }));
    assert!(violations.contains(&Violation::DanglingEdge {
      edge_id: "e".to_string(),
      node_id: "ghost".to_string()
    }));
  }
}
