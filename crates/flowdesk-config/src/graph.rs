use serde::{Deserialize, Serialize};

use crate::edge::EdgeDef;
use crate::node::NodeDef;

/// The persisted graph payload.
///
/// Field order on the wire is `nodes` then `edges`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphDef {
  pub nodes: Vec<NodeDef>,
  pub edges: Vec<EdgeDef>,
}

impl GraphDef {
  /// Parse a payload from its JSON text.
  pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
    serde_json::from_str(json)
  }

  /// Encode the payload as compact JSON text.
  pub fn to_json(&self) -> Result<String, serde_json::Error> {
    serde_json::to_string(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{NodeData, NodeType, PositionDef};

  #[test]
  fn test_parse_designer_payload() {
    let json = r#"{
      "nodes": [
        {
          "id": "review",
          "type": "HUMAN_TASK",
          "position": { "x": 300, "y": 100 },
          "data": { "label": "Review Request", "configuration": "{\"assignee\": \"manager@company.com\"}" }
        }
      ],
      "edges": [
        { "id": "e1-2", "source": "review", "target": "review", "type": "smoothstep" }
      ]
    }"#;

    let graph = GraphDef::from_json(json).unwrap();
    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.nodes[0].node_type, NodeType::HumanTask);
    assert_eq!(graph.nodes[0].position, PositionDef { x: 300.0, y: 100.0 });
    assert_eq!(graph.edges[0].edge_type.as_deref(), Some("smoothstep"));
  }

  #[test]
  fn test_edge_type_is_optional() {
    let json = r#"{ "nodes": [], "edges": [{ "id": "e", "source": "a", "target": "b" }] }"#;
    let graph = GraphDef::from_json(json).unwrap();
    assert!(graph.edges[0].edge_type.is_none());

    let encoded = graph.to_json().unwrap();
    assert!(!encoded.contains("\"type\""));
  }

  #[test]
  fn test_unknown_node_type_rejected() {
    let json = r#"{
      "nodes": [{ "id": "a", "type": "SCRIPT", "position": { "x": 0, "y": 0 },
                  "data": { "label": "a", "configuration": "{}" } }],
      "edges": []
    }"#;
    let err = GraphDef::from_json(json).unwrap_err();
    assert!(err.to_string().contains("SCRIPT"));
  }

  #[test]
  fn test_nodes_serialized_before_edges() {
    let graph = GraphDef {
      nodes: vec![NodeDef {
        id: "a".to_string(),
        node_type: NodeType::Gateway,
        position: PositionDef { x: 1.5, y: 2.0 },
        data: NodeData {
          label: "Branch".to_string(),
          configuration: "{}".to_string(),
        },
      }],
      edges: vec![],
    };

    let encoded = graph.to_json().unwrap();
    let nodes_at = encoded.find("\"nodes\"").unwrap();
    let edges_at = encoded.find("\"edges\"").unwrap();
    assert!(nodes_at < edges_at);
    assert!(encoded.contains("\"type\":\"GATEWAY\""));
  }
}
