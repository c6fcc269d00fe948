//! Flowdesk Config
//!
//! This crate contains the serializable types that cross the boundary to the
//! remote workflow store:
//!
//! - The persisted graph payload (`{ "nodes": [...], "edges": [...] }`) that
//!   the designer produces and that is stored, string-encoded, inside a
//!   definition record's `definition` field.
//! - The opaque JSON payloads (node configuration, instance context) that
//!   travel as raw strings.
//! - The client configuration used to reach the store.
//!
//! The payload types mirror the wire format exactly. They carry no graph
//! invariants; `flowdesk-workflow` validates them when loading a graph.

mod client;
mod edge;
mod enums;
mod error;
mod graph;
mod node;
mod payload;

pub use client::ClientConfig;
pub use edge::EdgeDef;
pub use enums::NodeType;
pub use error::ConfigError;
pub use graph::GraphDef;
pub use node::{NodeData, NodeDef, PositionDef};
pub use payload::{OpaquePayload, PayloadError};
