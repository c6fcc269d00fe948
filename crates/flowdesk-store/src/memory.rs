use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use flowdesk_config::OpaquePayload;
use flowdesk_lifecycle::{DefinitionStatus, InstanceStatus};
use tracing::debug;
use uuid::Uuid;

use crate::types::{
  DefinitionDraft, DefinitionRef, InstanceDraft, Page, PageRequest, WorkflowDefinition,
  WorkflowInstance,
};
use crate::{Error, Store};

#[derive(Default)]
struct Records {
  definitions: Vec<WorkflowDefinition>,
  instances: Vec<WorkflowInstance>,
  failing: HashSet<&'static str>,
}

/// [`Store`] that keeps records in memory.
///
/// It applies the same rules as the workflow backend: new definitions default
/// to version 1 and `DRAFT`, a name and version pair is unique, only `ACTIVE`
/// definitions start instances, only running instances suspend, only
/// suspended ones resume, and finished instances stay finished. Status
/// overrides and injected failures let tests
/// play the part of the remote executor.
#[derive(Default)]
pub struct MemoryStore {
  records: Mutex<Records>,
}

fn now() -> NaiveDateTime {
  Utc::now().naive_utc()
}

fn page_of<T: Clone>(items: &[T], page: PageRequest) -> Page<T> {
  let size = page.size.max(1);
  let start = (page.page as usize).saturating_mul(size as usize);
  let content = items
    .iter()
    .skip(start)
    .take(size as usize)
    .cloned()
    .collect();
  Page {
    content,
    total_elements: items.len() as u64,
    total_pages: items.len().div_ceil(size as usize) as u32,
    number: page.page,
    size,
  }
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Make every later call of `operation` fail until [`heal`](Self::heal).
  ///
  /// Operation names match the ones carried by
  /// [`Error::RemoteOperationFailed`], e.g. `"activate definition"`.
  pub fn fail(&self, operation: &'static str) {
    self.lock().failing.insert(operation);
  }

  /// Stop failing `operation`.
  pub fn heal(&self, operation: &'static str) {
    self.lock().failing.remove(operation);
  }

  /// Insert a definition record as-is.
  pub fn insert_definition(&self, definition: WorkflowDefinition) {
    self.lock().definitions.push(definition);
  }

  /// Insert an instance record as-is.
  pub fn insert_instance(&self, instance: WorkflowInstance) {
    self.lock().instances.push(instance);
  }

  /// Change an instance's status behind the client's back, the way the
  /// executor does when a run fails.
  pub fn set_instance_status(&self, id: &str, status: InstanceStatus) {
    let mut records = self.lock();
    if let Some(instance) = records.instances.iter_mut().find(|i| i.id == id) {
      instance.status = status;
      if status.is_terminal() && instance.completed_at.is_none() {
        instance.completed_at = Some(now());
      }
    }
  }

  fn lock(&self) -> MutexGuard<'_, Records> {
    // A poisoned lock only means a test panicked mid-call; the records are
    // still usable.
    self
      .records
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner())
  }

  fn begin(&self, operation: &'static str) -> Result<MutexGuard<'_, Records>, Error> {
    debug!(operation, "memory store call");
    let records = self.lock();
    if records.failing.contains(operation) {
      return Err(Error::RemoteOperationFailed {
        operation,
        status: Some(500),
        message: "injected failure".to_string(),
      });
    }
    Ok(records)
  }

  fn update_definition_status(
    &self,
    operation: &'static str,
    id: &str,
    status: DefinitionStatus,
  ) -> Result<WorkflowDefinition, Error> {
    let mut records = self.begin(operation)?;
    let definition = records
      .definitions
      .iter_mut()
      .find(|d| d.id == id)
      .ok_or_else(|| Error::NotFound(format!("definition {}", id)))?;
    definition.status = status;
    definition.updated_at = Some(now());
    Ok(definition.clone())
  }

  fn update_instance<F>(
    &self,
    operation: &'static str,
    id: &str,
    apply: F,
  ) -> Result<WorkflowInstance, Error>
  where
    F: FnOnce(&mut WorkflowInstance) -> Result<(), String>,
  {
    let mut records = self.begin(operation)?;
    let instance = records
      .instances
      .iter_mut()
      .find(|i| i.id == id)
      .ok_or_else(|| Error::NotFound(format!("instance {}", id)))?;
    apply(instance).map_err(|message| Error::RemoteOperationFailed {
      operation,
      status: Some(500),
      message,
    })?;
    Ok(instance.clone())
  }
}

/// Label of the first entry node of a definition's graph.
fn first_step(definition: &WorkflowDefinition) -> Option<String> {
  let graph = definition.graph().ok()?;
  let topology = graph.topology();
  let first = topology.entry_points().first()?;
  graph.node(first).map(|n| n.label.clone())
}

#[async_trait]
impl Store for MemoryStore {
  async fn list_definitions(&self, page: PageRequest) -> Result<Page<WorkflowDefinition>, Error> {
    let records = self.begin("list definitions")?;
    Ok(page_of(&records.definitions, page))
  }

  async fn get_definition(&self, id: &str) -> Result<WorkflowDefinition, Error> {
    let records = self.begin("get definition")?;
    records
      .definitions
      .iter()
      .find(|d| d.id == id)
      .cloned()
      .ok_or_else(|| Error::NotFound(format!("definition {}", id)))
  }

  async fn get_definition_by_name_and_version(
    &self,
    name: &str,
    version: u32,
  ) -> Result<WorkflowDefinition, Error> {
    let records = self.begin("get definition version")?;
    records
      .definitions
      .iter()
      .find(|d| d.name == name && d.version == version)
      .cloned()
      .ok_or_else(|| Error::NotFound(format!("definition {} v{}", name, version)))
  }

  async fn get_latest_definition(&self, name: &str) -> Result<WorkflowDefinition, Error> {
    let records = self.begin("get latest definition")?;
    records
      .definitions
      .iter()
      .filter(|d| d.name == name)
      .max_by_key(|d| d.version)
      .cloned()
      .ok_or_else(|| Error::NotFound(format!("definition {}", name)))
  }

  async fn list_definitions_by_name(&self, name: &str) -> Result<Vec<WorkflowDefinition>, Error> {
    let records = self.begin("list definitions by name")?;
    let mut versions: Vec<_> = records
      .definitions
      .iter()
      .filter(|d| d.name == name)
      .cloned()
      .collect();
    versions.sort_by(|a, b| b.version.cmp(&a.version));
    Ok(versions)
  }

  async fn list_definitions_by_status(
    &self,
    status: DefinitionStatus,
  ) -> Result<Vec<WorkflowDefinition>, Error> {
    let records = self.begin("list definitions by status")?;
    Ok(
      records
        .definitions
        .iter()
        .filter(|d| d.status == status)
        .cloned()
        .collect(),
    )
  }

  async fn create_definition(&self, draft: &DefinitionDraft) -> Result<WorkflowDefinition, Error> {
    let mut records = self.begin("create definition")?;
    let version = draft.version.unwrap_or(1);

    if records
      .definitions
      .iter()
      .any(|d| d.name == draft.name && d.version == version)
    {
      return Err(Error::RemoteOperationFailed {
        operation: "create definition",
        status: Some(400),
        message: format!(
          "Workflow definition with name '{}' and version {} already exists",
          draft.name, version
        ),
      });
    }

    let created = WorkflowDefinition {
      id: Uuid::new_v4().to_string(),
      name: draft.name.clone(),
      description: draft.description.clone(),
      version,
      status: draft.status.unwrap_or(DefinitionStatus::Draft),
      definition: draft.definition.clone(),
      created_at: Some(now()),
      updated_at: Some(now()),
      created_by: None,
      updated_by: draft.updated_by.clone(),
    };
    records.definitions.push(created.clone());
    Ok(created)
  }

  async fn update_definition(
    &self,
    id: &str,
    draft: &DefinitionDraft,
  ) -> Result<WorkflowDefinition, Error> {
    let mut records = self.begin("update definition")?;
    let definition = records
      .definitions
      .iter_mut()
      .find(|d| d.id == id)
      .ok_or_else(|| Error::NotFound(format!("definition {}", id)))?;

    // The backend replaces these fields only; version and status keep their
    // own endpoints.
    definition.name = draft.name.clone();
    definition.description = draft.description.clone();
    definition.definition = draft.definition.clone();
    definition.updated_by = draft.updated_by.clone();
    definition.updated_at = Some(now());
    Ok(definition.clone())
  }

  async fn delete_definition(&self, id: &str) -> Result<(), Error> {
    let mut records = self.begin("delete definition")?;
    let before = records.definitions.len();
    records.definitions.retain(|d| d.id != id);
    if records.definitions.len() == before {
      return Err(Error::NotFound(format!("definition {}", id)));
    }
    Ok(())
  }

  async fn activate_definition(&self, id: &str) -> Result<WorkflowDefinition, Error> {
    self.update_definition_status("activate definition", id, DefinitionStatus::Active)
  }

  async fn deactivate_definition(&self, id: &str) -> Result<WorkflowDefinition, Error> {
    self.update_definition_status("deactivate definition", id, DefinitionStatus::Inactive)
  }

  async fn list_instances(&self, page: PageRequest) -> Result<Page<WorkflowInstance>, Error> {
    let records = self.begin("list instances")?;
    Ok(page_of(&records.instances, page))
  }

  async fn get_instance(&self, id: &str) -> Result<WorkflowInstance, Error> {
    let records = self.begin("get instance")?;
    records
      .instances
      .iter()
      .find(|i| i.id == id)
      .cloned()
      .ok_or_else(|| Error::NotFound(format!("instance {}", id)))
  }

  async fn list_instances_by_definition(
    &self,
    definition_id: &str,
  ) -> Result<Vec<WorkflowInstance>, Error> {
    let records = self.begin("list instances by definition")?;
    Ok(
      records
        .instances
        .iter()
        .filter(|i| i.definition_id() == Some(definition_id))
        .cloned()
        .collect(),
    )
  }

  async fn list_instances_by_status(
    &self,
    status: InstanceStatus,
  ) -> Result<Vec<WorkflowInstance>, Error> {
    let records = self.begin("list instances by status")?;
    Ok(
      records
        .instances
        .iter()
        .filter(|i| i.status == status)
        .cloned()
        .collect(),
    )
  }

  async fn list_running_instances(&self) -> Result<Vec<WorkflowInstance>, Error> {
    let records = self.begin("list running instances")?;
    Ok(
      records
        .instances
        .iter()
        .filter(|i| i.status == InstanceStatus::Running)
        .cloned()
        .collect(),
    )
  }

  async fn create_instance(&self, draft: &InstanceDraft) -> Result<WorkflowInstance, Error> {
    let mut records = self.begin("create instance")?;
    let created = WorkflowInstance {
      id: Uuid::new_v4().to_string(),
      name: draft.name.clone(),
      workflow_definition: Some(draft.workflow_definition.clone()),
      status: draft.status.unwrap_or(InstanceStatus::Running),
      current_step: None,
      context: draft.context.clone(),
      started_at: Some(now()),
      completed_at: None,
      created_by: None,
      updated_by: None,
    };
    records.instances.push(created.clone());
    Ok(created)
  }

  async fn start_instance(
    &self,
    definition_id: &str,
    instance_name: &str,
    context: Option<&OpaquePayload>,
  ) -> Result<WorkflowInstance, Error> {
    let mut records = self.begin("start instance")?;
    let definition = records
      .definitions
      .iter()
      .find(|d| d.id == definition_id)
      .ok_or_else(|| Error::NotFound(format!("definition {}", definition_id)))?;

    if !definition.status.can_start_instances() {
      return Err(Error::RemoteOperationFailed {
        operation: "start instance",
        status: Some(500),
        message: "Cannot start instance from inactive workflow definition".to_string(),
      });
    }

    let started = WorkflowInstance {
      id: Uuid::new_v4().to_string(),
      name: instance_name.to_string(),
      workflow_definition: Some(DefinitionRef::from(definition)),
      status: InstanceStatus::Running,
      current_step: first_step(definition),
      context: context.cloned(),
      started_at: Some(now()),
      completed_at: None,
      created_by: None,
      updated_by: None,
    };
    records.instances.push(started.clone());
    Ok(started)
  }

  async fn update_instance_status(
    &self,
    id: &str,
    status: InstanceStatus,
  ) -> Result<WorkflowInstance, Error> {
    self.update_instance("update instance status", id, |instance| {
      instance.status = status;
      if status == InstanceStatus::Completed {
        instance.completed_at = Some(now());
      }
      Ok(())
    })
  }

  async fn complete_instance(&self, id: &str) -> Result<WorkflowInstance, Error> {
    self.update_instance("complete instance", id, |instance| {
      if instance.status.is_terminal() {
        return Err(format!("Instance in status {} cannot be completed", instance.status));
      }
      instance.status = InstanceStatus::Completed;
      instance.completed_at = Some(now());
      Ok(())
    })
  }

  async fn cancel_instance(&self, id: &str) -> Result<WorkflowInstance, Error> {
    self.update_instance("cancel instance", id, |instance| {
      if instance.status.is_terminal() {
        return Err(format!("Instance in status {} cannot be cancelled", instance.status));
      }
      instance.status = InstanceStatus::Cancelled;
      instance.completed_at = Some(now());
      Ok(())
    })
  }

  async fn suspend_instance(&self, id: &str) -> Result<WorkflowInstance, Error> {
    self.update_instance("suspend instance", id, |instance| {
      if instance.status != InstanceStatus::Running {
        return Err("Only running instances can be suspended".to_string());
      }
      instance.status = InstanceStatus::Suspended;
      Ok(())
    })
  }

  async fn resume_instance(&self, id: &str) -> Result<WorkflowInstance, Error> {
    self.update_instance("resume instance", id, |instance| {
      if instance.status != InstanceStatus::Suspended {
        return Err("Only suspended instances can be resumed".to_string());
      }
      instance.status = InstanceStatus::Running;
      Ok(())
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draft(name: &str) -> DefinitionDraft {
    DefinitionDraft::from_graph(name, None, &flowdesk_workflow::sample()).unwrap()
  }

  #[tokio::test]
  async fn test_create_defaults_and_unique_versions() {
    let store = MemoryStore::new();
    let created = store
      .create_definition(&DefinitionDraft {
        status: None,
        ..draft("Expenses")
      })
      .await
      .unwrap();
    assert_eq!(created.version, 1);
    assert_eq!(created.status, DefinitionStatus::Draft);

    let err = store.create_definition(&draft("Expenses")).await.unwrap_err();
    assert!(matches!(err, Error::RemoteOperationFailed { status: Some(400), .. }));

    let v2 = store
      .create_definition(&DefinitionDraft {
        version: Some(2),
        ..draft("Expenses")
      })
      .await
      .unwrap();
    let latest = store.get_latest_definition("Expenses").await.unwrap();
    assert_eq!(latest.id, v2.id);
  }

  #[tokio::test]
  async fn test_start_requires_active_definition() {
    let store = MemoryStore::new();
    let definition = store.create_definition(&draft("Expenses")).await.unwrap();

    let err = store
      .start_instance(&definition.id, "run", None)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::RemoteOperationFailed { .. }));

    store.activate_definition(&definition.id).await.unwrap();
    let instance = store
      .start_instance(&definition.id, "run", Some(&OpaquePayload::new(r#"{"amount":5}"#)))
      .await
      .unwrap();
    assert_eq!(instance.status, InstanceStatus::Running);
    assert_eq!(instance.definition_id(), Some(definition.id.as_str()));
    assert_eq!(instance.current_step.as_deref(), Some("Start Process"));
    assert!(instance.started_at.is_some());
  }

  #[tokio::test]
  async fn test_paging() {
    let store = MemoryStore::new();
    for i in 0..5 {
      store
        .create_definition(&draft(&format!("flow-{}", i)))
        .await
        .unwrap();
    }

    let page = store
      .list_definitions(PageRequest::new(1, 2))
      .await
      .unwrap();
    assert_eq!(page.content.len(), 2);
    assert_eq!(page.content[0].name, "flow-2");
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages, 3);
  }

  #[tokio::test]
  async fn test_finished_instances_stay_finished() {
    let store = MemoryStore::new();
    let definition = store.create_definition(&draft("Expenses")).await.unwrap();
    store.activate_definition(&definition.id).await.unwrap();
    let instance = store
      .start_instance(&definition.id, "run", None)
      .await
      .unwrap();

    store.set_instance_status(&instance.id, InstanceStatus::Failed);
    let err = store.complete_instance(&instance.id).await.unwrap_err();
    assert!(matches!(
      err,
      Error::RemoteOperationFailed { operation: "complete instance", .. }
    ));
    assert!(store.cancel_instance(&instance.id).await.is_err());
    assert_eq!(
      store.get_instance(&instance.id).await.unwrap().status,
      InstanceStatus::Failed
    );
  }

  #[tokio::test]
  async fn test_injected_failure() {
    let store = MemoryStore::new();
    store.fail("list instances");
    assert!(store.list_instances(PageRequest::default()).await.is_err());

    store.heal("list instances");
    assert!(store.list_instances(PageRequest::default()).await.is_ok());
  }
}
