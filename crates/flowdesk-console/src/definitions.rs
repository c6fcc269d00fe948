use std::sync::Arc;

use flowdesk_lifecycle::{DefinitionOperation, DefinitionStatus, Transition};
use flowdesk_store::{DefinitionDraft, PageRequest, Store, WorkflowDefinition};
use tracing::{debug, info, warn};

use crate::error::ConsoleError;
use crate::events::{ConsoleEvent, ConsoleNotifier, NoopNotifier};
use crate::notice::Notice;

/// Reloadable list of workflow definitions.
///
/// Every successful change is followed by a full reload; the cached list is
/// never patched in place. A failed operation raises a [`Notice`] and leaves
/// the cache as it was.
pub struct DefinitionBoard<N: ConsoleNotifier = NoopNotifier> {
  store: Arc<dyn Store>,
  notifier: N,
  page: PageRequest,
  definitions: Vec<WorkflowDefinition>,
  total: u64,
  notice: Option<Notice>,
}

impl DefinitionBoard<NoopNotifier> {
  pub fn new(store: Arc<dyn Store>, page: PageRequest) -> Self {
    Self::with_notifier(store, page, NoopNotifier)
  }
}

impl<N: ConsoleNotifier> DefinitionBoard<N> {
  pub fn with_notifier(store: Arc<dyn Store>, page: PageRequest, notifier: N) -> Self {
    Self {
      store,
      notifier,
      page,
      definitions: Vec::new(),
      total: 0,
      notice: None,
    }
  }

  pub fn definitions(&self) -> &[WorkflowDefinition] {
    &self.definitions
  }

  pub fn get(&self, id: &str) -> Option<&WorkflowDefinition> {
    self.definitions.iter().find(|d| d.id == id)
  }

  /// Total number of definitions in the store, across pages.
  pub fn total(&self) -> u64 {
    self.total
  }

  pub fn page(&self) -> PageRequest {
    self.page
  }

  /// Switch to another page. Takes effect on the next reload.
  pub fn set_page(&mut self, page: PageRequest) {
    self.page = page;
  }

  pub fn notice(&self) -> Option<&Notice> {
    self.notice.as_ref()
  }

  pub fn dismiss_notice(&mut self) {
    self.notice = None;
  }

  /// Replace the cached list with the store's current page.
  pub async fn reload(&mut self) -> Result<(), ConsoleError> {
    match self.store.list_definitions(self.page).await {
      Ok(page) => {
        debug!(count = page.content.len(), total = page.total_elements, "reloaded definitions");
        self.definitions = page.content;
        self.total = page.total_elements;
        Ok(())
      }
      Err(e) => Err(self.raise("Failed to load workflow definitions", e.into())),
    }
  }

  /// Create a definition from a full draft.
  pub async fn create(&mut self, draft: &DefinitionDraft) -> Result<WorkflowDefinition, ConsoleError> {
    let result = self.store.create_definition(draft).await;
    self.finish_save(result).await
  }

  /// Replace a definition's record.
  pub async fn update(
    &mut self,
    id: &str,
    draft: &DefinitionDraft,
  ) -> Result<WorkflowDefinition, ConsoleError> {
    let result = self.store.update_definition(id, draft).await;
    self.finish_save(result).await
  }

  pub async fn delete(&mut self, id: &str) -> Result<(), ConsoleError> {
    if let Err(e) = self.store.delete_definition(id).await {
      return Err(self.raise("Failed to delete workflow definition", e.into()));
    }

    info!(definition_id = %id, "deleted definition");
    self.notifier.notify(ConsoleEvent::DefinitionDeleted {
      definition_id: id.to_string(),
    });
    self.refresh().await;
    Ok(())
  }

  pub async fn activate(&mut self, id: &str) -> Result<Transition<DefinitionStatus>, ConsoleError> {
    self.transition(id, DefinitionOperation::Activate).await
  }

  pub async fn deactivate(
    &mut self,
    id: &str,
  ) -> Result<Transition<DefinitionStatus>, ConsoleError> {
    self.transition(id, DefinitionOperation::Deactivate).await
  }

  /// Check the operation against the store's current status, then ask the
  /// store to apply it. A no-op transition makes no further call.
  async fn transition(
    &mut self,
    id: &str,
    operation: DefinitionOperation,
  ) -> Result<Transition<DefinitionStatus>, ConsoleError> {
    let summary = match operation {
      DefinitionOperation::Activate => "Failed to activate workflow definition",
      DefinitionOperation::Deactivate => "Failed to deactivate workflow definition",
    };

    let status = match self.store.get_definition(id).await {
      Ok(definition) => definition.status,
      Err(e) => return Err(self.raise(summary, e.into())),
    };

    let transition = match status.apply(operation) {
      Ok(transition) => transition,
      Err(e) => return Err(self.raise(summary, e.into())),
    };

    let Transition::Changed { from, to } = transition else {
      debug!(definition_id = %id, %operation, %status, "transition is a no-op");
      return Ok(transition);
    };

    if from == DefinitionStatus::Archived {
      warn!(definition_id = %id, "activating an archived definition");
    }

    let result = match operation {
      DefinitionOperation::Activate => self.store.activate_definition(id).await,
      DefinitionOperation::Deactivate => self.store.deactivate_definition(id).await,
    };
    if let Err(e) = result {
      return Err(self.raise(summary, e.into()));
    }

    info!(definition_id = %id, %from, %to, "definition transitioned");
    self.notifier.notify(ConsoleEvent::DefinitionTransitioned {
      definition_id: id.to_string(),
      from,
      to,
    });
    self.refresh().await;
    Ok(transition)
  }

  async fn finish_save(
    &mut self,
    result: Result<WorkflowDefinition, flowdesk_store::Error>,
  ) -> Result<WorkflowDefinition, ConsoleError> {
    let definition = match result {
      Ok(definition) => definition,
      Err(e) => return Err(self.raise("Failed to save workflow definition", e.into())),
    };

    info!(definition_id = %definition.id, name = %definition.name, "saved definition");
    self.notifier.notify(ConsoleEvent::DefinitionSaved {
      definition_id: definition.id.clone(),
      name: definition.name.clone(),
    });
    self.refresh().await;
    Ok(definition)
  }

  /// Reload after a successful change. A failure here leaves its own notice
  /// but does not undo the change.
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
