use std::collections::{HashMap, HashSet};

use crate::node::{Edge, Node};

/// Where a graph starts and where its branches meet.
///
/// Computed once from a [`WorkflowGraph`](crate::WorkflowGraph); later edits
/// to the graph are not reflected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Topology {
  entry_points: Vec<String>,
  join_points: Vec<String>,
}

impl Topology {
  pub fn new(nodes: &[Node], edges: &[Edge]) -> Self {
    // Parallel edges count once: a join needs two distinct sources.
    let mut sources: HashMap<&str, HashSet<&str>> = HashMap::new();
    for edge in edges {
      sources
        .entry(edge.target.as_str())
        .or_default()
        .insert(edge.source.as_str());
    }

    let upstream = |id: &str| sources.get(id).map_or(0, HashSet::len);

    let entry_points = nodes
      .iter()
      .filter(|n| upstream(&n.id) == 0)
      .map(|n| n.id.clone())
      .collect();
    let join_points = nodes
      .iter()
      .filter(|n| upstream(&n.id) > 1)
      .map(|n| n.id.clone())
      .collect();

    Self {
      entry_points,
      join_points,
    }
  }

  /// Nodes with no incoming edges, in node order.
  pub fn entry_points(&self) -> &[String] {
    &self.entry_points
  }

  /// Nodes reached from more than one distinct node, in node order.
  pub fn join_points(&self) -> &[String] {
    &self.join_points
  }
}

#[cfg(test)]
mod tests {
  use flowdesk_config::OpaquePayload;

  use crate::{NodeKind, WorkflowGraph};

  #[test]
  fn test_entry_and_join_points() {
    let mut graph = WorkflowGraph::new();
    let start = graph.add_node(NodeKind::HumanTask, "start", OpaquePayload::empty()).id;
    let left = graph.add_node(NodeKind::Automated, "left", OpaquePayload::empty()).id;
    let right = graph.add_node(NodeKind::Automated, "right", OpaquePayload::empty()).id;
    let merge = graph.add_node(NodeKind::Gateway, "merge", OpaquePayload::empty()).id;
    graph.connect(&start, &left).unwrap();
    graph.connect(&start, &right).unwrap();
    graph.connect(&left, &merge).unwrap();
    graph.connect(&right, &merge).unwrap();

    let topology = graph.topology();
    assert_eq!(topology.entry_points(), &[start]);
    assert_eq!(topology.join_points(), &[merge]);
  }

  #[test]
  fn test_parallel_edges_do_not_make_a_join() {
    let mut graph = WorkflowGraph::new();
    let a = graph.add_node(NodeKind::HumanTask, "a", OpaquePayload::empty()).id;
    let b = graph.add_node(NodeKind::Automated, "b", OpaquePayload::empty()).id;
    graph.connect(&a, &b).unwrap();
    graph.connect(&a, &b).unwrap();
    assert_eq!(graph.edges().len(), 2);

    let topology = graph.topology();
    assert_eq!(topology.entry_points(), &[a]);
    assert!(topology.join_points().is_empty());
  }

  #[test]
  fn test_self_loop_node_is_not_an_entry_point() {
    let mut graph = WorkflowGraph::new();
    let a = graph.add_node(NodeKind::HumanTask, "a", OpaquePayload::empty()).id;
    graph.connect(&a, &a).unwrap();

    assert!(graph.topology().entry_points().is_empty());
  }
}
