use std::sync::Arc;

use flowdesk_config::OpaquePayload;
use flowdesk_lifecycle::{InstanceOperation, InstanceStatus};
use flowdesk_store::{PageRequest, Store, WorkflowDefinition, WorkflowInstance};
use tracing::{debug, info, warn};

use crate::error::ConsoleError;
use crate::events::{ConsoleEvent, ConsoleNotifier, NoopNotifier};
use crate::notice::Notice;

/// Reloadable list of workflow instances, with the definitions they can be
/// started from.
///
/// Operations are checked against the instance transition table before the
/// store is called, using the store's current status. The cached list only
/// drives what is shown: the executor may have moved an instance since the
/// last reload.
pub struct InstanceBoard<N: ConsoleNotifier = NoopNotifier> {
  store: Arc<dyn Store>,
  notifier: N,
  page: PageRequest,
  definition_page: PageRequest,
  instances: Vec<WorkflowInstance>,
  definitions: Vec<WorkflowDefinition>,
  total: u64,
  notice: Option<Notice>,
}

impl InstanceBoard<NoopNotifier> {
  pub fn new(store: Arc<dyn Store>, page: PageRequest) -> Self {
    Self::with_notifier(store, page, NoopNotifier)
  }
}

impl<N: ConsoleNotifier> InstanceBoard<N> {
  pub fn with_notifier(store: Arc<dyn Store>, page: PageRequest, notifier: N) -> Self {
    Self {
      store,
      notifier,
      page,
      definition_page: PageRequest::new(0, page.size),
      instances: Vec::new(),
      definitions: Vec::new(),
      total: 0,
      notice: None,
    }
  }

  pub fn instances(&self) -> &[WorkflowInstance] {
    &self.instances
  }

  pub fn get(&self, id: &str) -> Option<&WorkflowInstance> {
    self.instances.iter().find(|i| i.id == id)
  }

  /// Definitions loaded alongside the instances.
  pub fn definitions(&self) -> &[WorkflowDefinition] {
    &self.definitions
  }

  /// Total number of instances in the store, across pages.
  pub fn total(&self) -> u64 {
    self.total
  }

  /// Switch to another page of instances. The definitions page is kept.
  pub fn set_page(&mut self, page: PageRequest) {
    self.page = page;
  }

  pub fn notice(&self) -> Option<&Notice> {
    self.notice.as_ref()
  }

  pub fn dismiss_notice(&mut self) {
    self.notice = None;
  }

  /// Operations to offer for an instance, based on its cached status.
  pub fn available_operations(&self, id: &str) -> &'static [InstanceOperation] {
    self
      .get(id)
      .map(|i| i.status.available_operations())
      .unwrap_or(&[])
  }

  /// Replace the cached instances and definitions with the store's current
  /// pages. Neither is replaced unless both load.
  pub async fn reload(&mut self) -> Result<(), ConsoleError> {
    let loaded = async {
      let instances = self.store.list_instances(self.page).await?;
      let definitions = self.store.list_definitions(self.definition_page).await?;
      Ok::<_, flowdesk_store::Error>((instances, definitions))
    }
    .await;

    match loaded {
      Ok((instances, definitions)) => {
        debug!(
          instances = instances.content.len(),
          definitions = definitions.content.len(),
          "reloaded instances"
        );
        self.total = instances.total_elements;
        self.instances = instances.content;
        self.definitions = definitions.content;
        Ok(())
      }
      Err(e) => Err(self.raise("Failed to load data", e.into())),
    }
  }

  /// Start a new instance of an active definition.
  ///
  /// The definition's current status is fetched and checked first. A
  /// context, when given, must be valid JSON.
  pub async fn start(
    &mut self,
    definition_id: &str,
    name: &str,
    context: Option<OpaquePayload>,
  ) -> Result<WorkflowInstance, ConsoleError> {
    match self.try_start(definition_id, name, context.as_ref()).await {
      Ok(instance) => {
        info!(
          instance_id = %instance.id,
          definition_id = %definition_id,
          "started instance"
        );
        self.notifier.notify(ConsoleEvent::InstanceStarted {
          instance_id: instance.id.clone(),
          definition_id: definition_id.to_string(),
        });
        self.refresh().await;
        Ok(instance)
      }
      Err(e) => Err(self.raise("Failed to start workflow instance", e)),
    }
  }

  async fn try_start(
    &self,
    definition_id: &str,
    name: &str,
    context: Option<&OpaquePayload>,
  ) -> Result<WorkflowInstance, ConsoleError> {
    if name.trim().is_empty() {
      return Err(ConsoleError::MissingName);
    }

    let status = self.store.get_definition(definition_id).await?.status;
    status.ensure_startable(definition_id)?;

    if let Some(context) = context {
      context.as_value()?;
    }

    Ok(
      self
        .store
        .start_instance(definition_id, name.trim(), context)
        .await?,
    )
  }

  pub async fn complete(&mut self, id: &str) -> Result<WorkflowInstance, ConsoleError> {
    self.apply(id, InstanceOperation::Complete).await
  }

  pub async fn cancel(&mut self, id: &str) -> Result<WorkflowInstance, ConsoleError> {
    self.apply(id, InstanceOperation::Cancel).await
  }

  pub async fn suspend(&mut self, id: &str) -> Result<WorkflowInstance, ConsoleError> {
    self.apply(id, InstanceOperation::Suspend).await
  }

  pub async fn resume(&mut self, id: &str) -> Result<WorkflowInstance, ConsoleError> {
    self.apply(id, InstanceOperation::Resume).await
  }

  /// Run a user operation on an instance, checked against the status the
  /// store holds now.
  pub async fn apply(
    &mut self,
    id: &str,
    operation: InstanceOperation,
  ) -> Result<WorkflowInstance, ConsoleError> {
    let summary = match operation {
      InstanceOperation::Complete => "Failed to complete instance",
      InstanceOperation::Suspend => "Failed to suspend instance",
      InstanceOperation::Cancel => "Failed to cancel instance",
      InstanceOperation::Resume => "Failed to resume instance",
    };

    let from = match self.store.get_instance(id).await {
      Ok(instance) => instance.status,
      Err(e) => return Err(self.raise(summary, e.into())),
    };

    if let Err(e) = from.apply(operation) {
      return Err(self.raise(summary, e.into()));
    }

    let result = match operation {
      InstanceOperation::Complete => self.store.complete_instance(id).await,
      InstanceOperation::Suspend => self.store.suspend_instance(id).await,
      InstanceOperation::Cancel => self.store.cancel_instance(id).await,
      InstanceOperation::Resume => self.store.resume_instance(id).await,
    };
    let instance = match result {
      Ok(instance) => instance,
      Err(e) => return Err(self.raise(summary, e.into())),
    };

    info!(instance_id = %id, %operation, %from, to = %instance.status, "instance transitioned");
    self.notifier.notify(ConsoleEvent::InstanceTransitioned {
      instance_id: id.to_string(),
      from,
      to: instance.status,
    });
    self.refresh().await;
    Ok(instance)
  }

  /// Instances of one definition, straight from the store.
  pub async fn for_definition(
    &mut self,
    definition_id: &str,
  ) -> Result<Vec<WorkflowInstance>, ConsoleError> {
    match self.store.list_instances_by_definition(definition_id).await {
      Ok(instances) => Ok(instances),
      Err(e) => Err(self.raise("Failed to load instances", e.into())),
    }
  }

  /// Instances in one status, straight from the store.
  pub async fn with_status(
    &mut self,
    status: InstanceStatus,
  ) -> Result<Vec<WorkflowInstance>, ConsoleError> {
    let result = match status {
      InstanceStatus::Running => self.store.list_running_instances().await,
      other => self.store.list_instances_by_status(other).await,
    };
    match result {
      Ok(instances) => Ok(instances),
      Err(e) => Err(self.raise("Failed to load instances", e.into())),
    }
  }

  async fn refresh(&mut self) {
    let _ = self.reload().await;
  }

  fn raise(&mut self, summary: &str, error: ConsoleError) -> ConsoleError {
    warn!(error = %error, "{}", summary);
    let notice = Notice::new(summary, &error);
    self.notifier.notify(ConsoleEvent::NoticeRaised(notice.clone()));
    self.notice = Some(notice);
    error
  }
}
