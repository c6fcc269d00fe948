use flowdesk_analytics::AnalyticsError;
use flowdesk_config::PayloadError;
use flowdesk_lifecycle::LifecycleError;
use flowdesk_workflow::{CodecError, GraphError, Violation};
use thiserror::Error;

/// Errors surfaced by console components.
#[derive(Debug, Error)]
pub enum ConsoleError {
  #[error(transparent)]
  Graph(#[from] GraphError),

  #[error(transparent)]
  Codec(#[from] CodecError),

  #[error(transparent)]
  Payload(#[from] PayloadError),

  #[error(transparent)]
  Lifecycle(#[from] LifecycleError),

  #[error(transparent)]
  Store(#[from] flowdesk_store::Error),

  #[error(transparent)]
  Analytics(#[from] AnalyticsError),

  #[error("a name is required")]
  MissingName,

  #[error("workflow graph is invalid: {0}")]
  InvalidGraph(Violation),

  /// The draft was created but could not be activated. It stays in the store
  /// as a draft.
  #[error("saved definition {definition_id} as a draft but activation failed: {source}")]
  ActivationFailed {
    definition_id: String,
    #[source]
    source: flowdesk_store::Error,
  },
}
