//! Flowdesk Workflow
//!
//! This crate provides the in-memory workflow graph that the designer edits,
//! and its mapping to the persisted payload defined in `flowdesk-config`.
//!
//! - [`WorkflowGraph`] owns nodes and edges. Edges only ever connect present
//!   nodes; removing a node removes the edges touching it.
//! - [`codec`] converts a graph to and from the payload, re-validating the
//!   graph invariants on load.
//! - [`Topology`] finds a graph's entry points and join points.
//!
//! Nodes and edges have no identity outside the graph they belong to.

pub mod codec;
mod error;
mod model;
mod node;
mod sample;
mod topology;

pub use error::{CodecError, GraphError, Violation};
pub use model::WorkflowGraph;
pub use node::{Edge, Node, NodeKind, Position};
pub use sample::{SAMPLE_DESCRIPTION, SAMPLE_NAME, sample};
pub use topology::Topology;
