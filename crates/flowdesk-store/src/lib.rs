//! Flowdesk Store
//!
//! This crate provides the client-side view of the remote workflow store, the
//! authoritative holder of definition and instance records.
//!
//! The [`Store`] trait lists every request/response operation the rest of the
//! workspace consumes. Components receive it as an injected `Arc<dyn Store>`:
//! - [`HttpStore`] talks to the backend's REST API.
//! - [`MemoryStore`] keeps records in memory with the backend's rules, for
//!   tests and local experiments.
//!
//! Calls are never retried and carry no idempotency keys. Two sessions acting
//! on the same record are not coordinated; whichever reload happens last wins.

mod http;
mod memory;
mod types;

pub use http::HttpStore;
pub use memory::MemoryStore;
pub use types::{
  DefinitionDraft, DefinitionRef, InstanceDraft, Page, PageRequest, WorkflowDefinition,
  WorkflowInstance,
};

use async_trait::async_trait;
use flowdesk_config::OpaquePayload;
use flowdesk_lifecycle::{DefinitionStatus, InstanceStatus};

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
  /// The requested record was not found.
  #[error("not found: {0}")]
  NotFound(String),

  /// The call failed in transport or was refused by the store.
  #[error("{operation} failed: {message}")]
  RemoteOperationFailed {
    operation: &'static str,
    /// HTTP status when the store answered.
    status: Option<u16>,
    message: String,
  },
}

impl Error {
  pub(crate) fn remote(operation: &'static str, message: impl Into<String>) -> Self {
    Error::RemoteOperationFailed {
      operation,
      status: None,
      message: message.into(),
    }
  }
}

/// Operations offered by the remote workflow store.
#[async_trait]
pub trait Store: Send + Sync {
  /// List definitions, one page at a time.
  async fn list_definitions(&self, page: PageRequest) -> Result<Page<WorkflowDefinition>, Error>;

  /// Get a definition by ID.
  async fn get_definition(&self, id: &str) -> Result<WorkflowDefinition, Error>;

  /// Get a specific version of a named definition.
  async fn get_definition_by_name_and_version(
    &self,
    name: &str,
    version: u32,
  ) -> Result<WorkflowDefinition, Error>;

  /// Get the highest version of a named definition.
  async fn get_latest_definition(&self, name: &str) -> Result<WorkflowDefinition, Error>;

  /// List every version of a named definition.
  async fn list_definitions_by_name(&self, name: &str) -> Result<Vec<WorkflowDefinition>, Error>;

  /// List definitions in a status.
  async fn list_definitions_by_status(
    &self,
    status: DefinitionStatus,
  ) -> Result<Vec<WorkflowDefinition>, Error>;

  /// Create a definition.
  async fn create_definition(&self, draft: &DefinitionDraft) -> Result<WorkflowDefinition, Error>;

  /// Replace a definition's name, description and graph.
  async fn update_definition(
    &self,
    id: &str,
    draft: &DefinitionDraft,
  ) -> Result<WorkflowDefinition, Error>;

  /// Delete a definition.
  async fn delete_definition(&self, id: &str) -> Result<(), Error>;

  /// Set a definition's status to `ACTIVE`.
  async fn activate_definition(&self, id: &str) -> Result<WorkflowDefinition, Error>;

  /// Set a definition's status to `INACTIVE`.
  async fn deactivate_definition(&self, id: &str) -> Result<WorkflowDefinition, Error>;

  /// List instances, one page at a time.
  async fn list_instances(&self, page: PageRequest) -> Result<Page<WorkflowInstance>, Error>;

  /// Get an instance by ID.
  async fn get_instance(&self, id: &str) -> Result<WorkflowInstance, Error>;

  /// List instances started from a definition.
  async fn list_instances_by_definition(
    &self,
    definition_id: &str,
  ) -> Result<Vec<WorkflowInstance>, Error>;

  /// List instances in a status.
  async fn list_instances_by_status(
    &self,
    status: InstanceStatus,
  ) -> Result<Vec<WorkflowInstance>, Error>;

  /// List running instances.
  async fn list_running_instances(&self) -> Result<Vec<WorkflowInstance>, Error>;

  /// Create an instance record directly.
  async fn create_instance(&self, draft: &InstanceDraft) -> Result<WorkflowInstance, Error>;

  /// Start a new running instance of an active definition.
  async fn start_instance(
    &self,
    definition_id: &str,
    instance_name: &str,
    context: Option<&OpaquePayload>,
  ) -> Result<WorkflowInstance, Error>;

  /// Overwrite an instance's status without any transition check.
  async fn update_instance_status(
    &self,
    id: &str,
    status: InstanceStatus,
  ) -> Result<WorkflowInstance, Error>;

  async fn complete_instance(&self, id: &str) -> Result<WorkflowInstance, Error>;

  async fn cancel_instance(&self, id: &str) -> Result<WorkflowInstance, Error>;

  async fn suspend_instance(&self, id: &str) -> Result<WorkflowInstance, Error>;

  async fn resume_instance(&self, id: &str) -> Result<WorkflowInstance, Error>;
}
