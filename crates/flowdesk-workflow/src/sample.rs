use flowdesk_config::OpaquePayload;

use crate::model::WorkflowGraph;
use crate::node::{Edge, Node, NodeKind, Position};

/// Name given to the sample workflow.
pub const SAMPLE_NAME: &str = "Sample Approval Workflow";

/// Description given to the sample workflow.
pub const SAMPLE_DESCRIPTION: &str = "A simple approval workflow for demonstration";

/// A four step approval workflow used as a starting point in the designer.
pub fn sample() -> WorkflowGraph {
  let steps = [
    ("start", NodeKind::HumanTask, "Start Process", "{}", 100.0),
    (
      "review",
      NodeKind::HumanTask,
      "Review Request",
      r#"{"assignee": "manager@company.com"}"#,
      300.0,
    ),
    (
      "approve",
      NodeKind::Automated,
      "Auto Approve",
      r#"{"service": "approval-service"}"#,
      500.0,
    ),
    ("end", NodeKind::HumanTask, "Complete", "{}", 700.0),
  ];

  let nodes = steps
    .iter()
    .map(|(id, kind, label, configuration, x)| Node {
      id: id.to_string(),
      kind: *kind,
      label: label.to_string(),
      position: Position::new(*x, 100.0),
      configuration: OpaquePayload::new(*configuration),
    })
    .collect();

  let edges = [
    ("e1-2", "start", "review"),
    ("e2-3", "review", "approve"),
    ("e3-4", "approve", "end"),
  ]
  .iter()
  .map(|(id, source, target)| Edge {
    id: id.to_string(),
    source: source.to_string(),
    target: target.to_string(),
    edge_type: None,
  })
  .collect();

  WorkflowGraph::from_parts(nodes, edges)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_sample_is_a_valid_chain() {
    let graph = sample();
    assert!(graph.is_valid());
    assert_eq!(graph.nodes().len(), 4);

    let topology = graph.topology();
    assert_eq!(topology.entry_points(), &["start".to_string()]);
    assert!(topology.join_points().is_empty());
  }
}
