use std::sync::Arc;

use flowdesk_store::{DefinitionDraft, Store, WorkflowDefinition};
use flowdesk_workflow::{SAMPLE_DESCRIPTION, SAMPLE_NAME, WorkflowGraph};
use tracing::{info, warn};

use crate::error::ConsoleError;
use crate::events::{ConsoleEvent, ConsoleNotifier, NoopNotifier};
use crate::notice::Notice;

/// An authoring session over one workflow graph.
///
/// The graph lives only in the session until [`save`](Self::save) submits it;
/// dropping the session discards unsaved edits. A session opened on an
/// existing definition saves by replacing that record, a fresh session
/// creates a new draft and keeps editing it afterwards.
pub struct DesignerSession<N: ConsoleNotifier = NoopNotifier> {
  store: Arc<dyn Store>,
  notifier: N,
  name: String,
  description: Option<String>,
  graph: WorkflowGraph,
  saved: Option<WorkflowDefinition>,
  notice: Option<Notice>,
}

impl DesignerSession<NoopNotifier> {
  /// Start an empty session.
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self::with_notifier(store, NoopNotifier)
  }

  /// Open an existing definition for editing.
  pub async fn open(store: Arc<dyn Store>, definition_id: &str) -> Result<Self, ConsoleError> {
    Self::open_with_notifier(store, definition_id, NoopNotifier).await
  }
}

impl<N: ConsoleNotifier> DesignerSession<N> {
  pub fn with_notifier(store: Arc<dyn Store>, notifier: N) -> Self {
    Self {
      store,
      notifier,
      name: String::new(),
      description: None,
      graph: WorkflowGraph::new(),
      saved: None,
      notice: None,
    }
  }

  pub async fn open_with_notifier(
    store: Arc<dyn Store>,
    definition_id: &str,
    notifier: N,
  ) -> Result<Self, ConsoleError> {
    let definition = store.get_definition(definition_id).await?;
    let graph = definition.graph()?;

    let mut session = Self::with_notifier(store, notifier);
    session.name = definition.name.clone();
    session.description = definition.description.clone();
    session.graph = graph;
    session.saved = Some(definition);
    Ok(session)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn set_name(&mut self, name: impl Into<String>) {
    self.name = name.into();
  }

  pub fn description(&self) -> Option<&str> {
    self.description.as_deref()
  }

  pub fn set_description(&mut self, description: Option<String>) {
    self.description = description;
  }

  pub fn graph(&self) -> &WorkflowGraph {
    &self.graph
  }

  /// Mutable access for node and edge edits.
  pub fn graph_mut(&mut self) -> &mut WorkflowGraph {
    &mut self.graph
  }

  /// Replace the graph with the sample approval workflow, filling in the
  /// sample's name and description when none is set.
  pub fn load_sample(&mut self) {
    self.graph = flowdesk_workflow::sample();
    if self.name.trim().is_empty() {
      self.name = SAMPLE_NAME.to_string();
    }
    if self.description.is_none() {
      self.description = Some(SAMPLE_DESCRIPTION.to_string());
    }
  }

  /// Discard every node and edge.
  pub fn clear(&mut self) {
    self.graph = WorkflowGraph::new();
  }

  /// The stored record this session edits, once it has been saved or opened.
  pub fn saved(&self) -> Option<&WorkflowDefinition> {
    self.saved.as_ref()
  }

  pub fn notice(&self) -> Option<&Notice> {
    self.notice.as_ref()
  }

  pub fn dismiss_notice(&mut self) {
    self.notice = None;
  }

  /// Submit the graph to the store.
  pub async fn save(&mut self) -> Result<WorkflowDefinition, ConsoleError> {
    match self.submit().await {
      Ok(definition) => Ok(definition),
      Err(e) => Err(self.raise("Failed to save workflow", e)),
    }
  }

  /// Save, then activate the saved definition.
  ///
  /// The two calls are not atomic. When activation fails the saved draft
  /// stays in the store and the session keeps pointing at it.
  pub async fn save_and_activate(&mut self) -> Result<WorkflowDefinition, ConsoleError> {
    let saved = self.save().await?;

    match self.store.activate_definition(&saved.id).await {
      Ok(activated) => {
        info!(definition_id = %activated.id, "activated definition after save");
        self.notifier.notify(ConsoleEvent::DefinitionTransitioned {
          definition_id: activated.id.clone(),
          from: saved.status,
          to: activated.status,
        });
        self.saved = Some(activated.clone());
        Ok(activated)
      }
      Err(source) => Err(self.raise(
        "Workflow saved as draft but not activated",
        ConsoleError::ActivationFailed {
          definition_id: saved.id,
          source,
        },
      )),
    }
  }

  async fn submit(&mut self) -> Result<WorkflowDefinition, ConsoleError> {
    let name = self.name.trim();
    if name.is_empty() {
      return Err(ConsoleError::MissingName);
    }
    if let Some(violation) = self.graph.validate().into_iter().next() {
      return Err(ConsoleError::InvalidGraph(violation));
    }

    let mut draft = DefinitionDraft::from_graph(name, self.description.clone(), &self.graph)?;

    let definition = match &self.saved {
      Some(existing) => {
        // Full-record replacement keeps the stored version and status.
        draft.version = Some(existing.version);
        draft.status = Some(existing.status);
        draft.updated_by = existing.updated_by.clone();
        self.store.update_definition(&existing.id, &draft).await?
      }
      None => self.store.create_definition(&draft).await?,
    };

    info!(
      definition_id = %definition.id,
      name = %definition.name,
      nodes = self.graph.nodes().len(),
      edges = self.graph.edges().len(),
      "saved workflow definition"
    );
    self.notifier.notify(ConsoleEvent::DefinitionSaved {
      definition_id: definition.id.clone(),
      name: definition.name.clone(),
    });
    self.saved = Some(definition.clone());
    Ok(definition)
  }

  fn raise(&mut self, summary: &str, error: ConsoleError) -> ConsoleError {
    warn!(error = %error, "{}", summary);
    let notice = Notice::new(summary, &error);
    self.notifier.notify(ConsoleEvent::NoticeRaised(notice.clone()));
    self.notice = Some(notice);
    error
  }
}
