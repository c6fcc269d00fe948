//! Flowdesk Lifecycle
//!
//! Closed status enumerations for workflow definitions and instances, and the
//! transition tables that decide which user operations are legal from each
//! status. Every status check in the workspace goes through this crate.
//!
//! The tables describe what a user may request. The remote store remains the
//! authority: an instance can move to `Failed` (or anywhere else) between two
//! reloads without any local transition, so cached status is always replaced
//! by the next reload.

mod definition;
mod error;
mod instance;

pub use definition::{DefinitionOperation, DefinitionStatus, Transition};
pub use error::{LifecycleError, ParseStatusError};
pub use instance::{InstanceOperation, InstanceStatus};
