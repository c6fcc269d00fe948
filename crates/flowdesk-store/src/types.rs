use chrono::NaiveDateTime;
use flowdesk_config::OpaquePayload;
use flowdesk_lifecycle::{DefinitionStatus, InstanceStatus};
use flowdesk_workflow::{CodecError, WorkflowGraph, codec};
use serde::{Deserialize, Serialize};

/// A workflow definition as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  pub version: u32,
  pub status: DefinitionStatus,
  /// The graph payload, JSON-encoded into a string.
  pub definition: String,
  #[serde(default)]
  pub created_at: Option<NaiveDateTime>,
  #[serde(default)]
  pub updated_at: Option<NaiveDateTime>,
  #[serde(default)]
  pub created_by: Option<String>,
  #[serde(default)]
  pub updated_by: Option<String>,
}

impl WorkflowDefinition {
  /// Decode the stored graph.
  pub fn graph(&self) -> Result<WorkflowGraph, CodecError> {
    codec::decode(&self.definition)
  }

  /// Full-record replacement body carrying this definition's current fields.
  pub fn to_draft(&self) -> DefinitionDraft {
    DefinitionDraft {
      name: self.name.clone(),
      description: self.description.clone(),
      version: Some(self.version),
      status: Some(self.status),
      definition: self.definition.clone(),
      updated_by: self.updated_by.clone(),
    }
  }
}

/// Request body for creating or replacing a definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionDraft {
  pub name: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
  /// Defaults to 1 on the store when absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<u32>,
  /// Defaults to `DRAFT` on the store when absent.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<DefinitionStatus>,
  pub definition: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub updated_by: Option<String>,
}

impl DefinitionDraft {
  /// Build a draft from an authored graph, encoding it into the
  /// `definition` field.
  pub fn from_graph(
    name: impl Into<String>,
    description: Option<String>,
    graph: &WorkflowGraph,
  ) -> Result<Self, CodecError> {
    Ok(Self {
      name: name.into(),
      description,
      version: None,
      status: Some(DefinitionStatus::Draft),
      definition: codec::encode(graph)?,
      updated_by: None,
    })
  }
}

/// Identity of the definition an instance was started from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRef {
  pub id: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<u32>,
}

impl DefinitionRef {
  pub fn new(id: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      name: None,
      version: None,
    }
  }
}

impl From<&WorkflowDefinition> for DefinitionRef {
  fn from(definition: &WorkflowDefinition) -> Self {
    Self {
      id: definition.id.clone(),
      name: Some(definition.name.clone()),
      version: Some(definition.version),
    }
  }
}

/// A workflow instance as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInstance {
  pub id: String,
  pub name: String,
  /// The store may omit the reference when it does not load it.
  #[serde(default)]
  pub workflow_definition: Option<DefinitionRef>,
  pub status: InstanceStatus,
  #[serde(default)]
  pub current_step: Option<String>,
  #[serde(default)]
  pub context: Option<OpaquePayload>,
  #[serde(default)]
  pub started_at: Option<NaiveDateTime>,
  #[serde(default)]
  pub completed_at: Option<NaiveDateTime>,
  #[serde(default)]
  pub created_by: Option<String>,
  #[serde(default)]
  pub updated_by: Option<String>,
}

impl WorkflowInstance {
  /// ID of the definition this instance was started from.
  pub fn definition_id(&self) -> Option<&str> {
    self.workflow_definition.as_ref().map(|d| d.id.as_str())
  }
}

/// Request body for creating an instance record directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceDraft {
  pub name: String,
  pub workflow_definition: DefinitionRef,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status: Option<InstanceStatus>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub context: Option<OpaquePayload>,
}

/// One page of a paged listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub content: Vec<T>,
  #[serde(default)]
  pub total_elements: u64,
  #[serde(default)]
  pub total_pages: u32,
  /// Zero-based page index.
  #[serde(default)]
  pub number: u32,
  #[serde(default)]
  pub size: u32,
}

impl<T> Page<T> {
  /// Wrap a complete, unpaged listing as a single page.
  pub fn single(content: Vec<T>) -> Self {
    let len = content.len();
    Self {
      content,
      total_elements: len as u64,
      total_pages: 1,
      number: 0,
      size: len as u32,
    }
  }
}

/// Page request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page: u32,
  pub size: u32,
}

impl PageRequest {
  pub fn new(page: u32, size: u32) -> Self {
    Self { page, size }
  }
}

impl Default for PageRequest {
  fn default() -> Self {
    Self { page: 0, size: 20 }
  }
}
