use thiserror::Error;

use crate::definition::DefinitionStatus;
use crate::instance::{InstanceOperation, InstanceStatus};

/// Errors raised by the transition tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
  /// A new instance was requested from a definition that is not active.
  #[error("definition {definition_id} is {status}, only ACTIVE definitions can start instances")]
  DefinitionNotActive {
    definition_id: String,
    status: DefinitionStatus,
  },

  /// An operation was requested on an instance in a terminal status.
  #[error("cannot {operation} an instance that is {status}")]
  TerminalStateViolation {
    status: InstanceStatus,
    operation: InstanceOperation,
  },

  /// The operation is not legal from the current, non-terminal status.
  #[error("cannot {operation} from {status}")]
  InvalidTransition { status: String, operation: String },
}

/// Error returned when a status name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} status: {value}")]
pub struct ParseStatusError {
  pub kind: &'static str,
  pub value: String,
}
