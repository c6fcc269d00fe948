use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LifecycleError, ParseStatusError};

/// Publication status of a workflow definition.
///
/// `Draft -> Active -> Inactive -> (Active | Archived)`. Archival is imposed
/// by the backend; no user operation leads into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefinitionStatus {
  Draft,
  Active,
  Inactive,
  Archived,
}

impl DefinitionStatus {
  pub const ALL: [DefinitionStatus; 4] = [
    DefinitionStatus::Draft,
    DefinitionStatus::Active,
    DefinitionStatus::Inactive,
    DefinitionStatus::Archived,
  ];

  /// Wire name of the status.
  pub fn as_str(&self) -> &'static str {
    match self {
      DefinitionStatus::Draft => "DRAFT",
      DefinitionStatus::Active => "ACTIVE",
      DefinitionStatus::Inactive => "INACTIVE",
      DefinitionStatus::Archived => "ARCHIVED",
    }
  }

  /// Only active definitions may start new instances.
  pub fn can_start_instances(&self) -> bool {
    *self == DefinitionStatus::Active
  }

  /// Fail with [`LifecycleError::DefinitionNotActive`] unless instances can be
  /// started from a definition in this status.
  pub fn ensure_startable(&self, definition_id: &str) -> Result<(), LifecycleError> {
    if self.can_start_instances() {
      Ok(())
    } else {
      Err(LifecycleError::DefinitionNotActive {
        definition_id: definition_id.to_string(),
        status: *self,
      })
    }
  }

  /// Apply a user operation.
  ///
  /// | operation  | from                        | result                     |
  /// |------------|-----------------------------|----------------------------|
  /// | activate   | Active                      | unchanged                  |
  /// | activate   | Draft, Inactive, Archived   | Active                     |
  /// | deactivate | Active                      | Inactive                   |
  /// | deactivate | Inactive                    | unchanged                  |
  /// | deactivate | Draft, Archived             | rejected                   |
  pub fn apply(
    self,
    operation: DefinitionOperation,
  ) -> Result<Transition<DefinitionStatus>, LifecycleError> {
    use DefinitionOperation::*;
    use DefinitionStatus::*;

    match (self, operation) {
      (Active, Activate) | (Inactive, Deactivate) => Ok(Transition::Unchanged(self)),
      (_, Activate) => Ok(Transition::Changed {
        from: self,
        to: Active,
      }),
      (Active, Deactivate) => Ok(Transition::Changed {
        from: self,
        to: Inactive,
      }),
      (Draft | Archived, Deactivate) => Err(LifecycleError::InvalidTransition {
        status: self.to_string(),
        operation: operation.to_string(),
      }),
    }
  }
}

impl fmt::Display for DefinitionStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for DefinitionStatus {
  type Err = ParseStatusError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|status| status.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| ParseStatusError {
        kind: "definition",
        value: s.to_string(),
      })
  }
}

/// User operations on a definition's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionOperation {
  Activate,
  Deactivate,
}

impl fmt::Display for DefinitionOperation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DefinitionOperation::Activate => f.write_str("activate"),
      DefinitionOperation::Deactivate => f.write_str("deactivate"),
    }
  }
}

/// Outcome of applying an operation to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
  /// The operation moves the status.
  Changed { from: S, to: S },
  /// The operation is legal but has no effect.
  Unchanged(S),
}

impl<S: Copy> Transition<S> {
  /// Status after the operation.
  pub fn status(&self) -> S {
    match self {
      Transition::Changed { to, .. } => *to,
      Transition::Unchanged(status) => *status,
    }
  }

  pub fn is_noop(&self) -> bool {
    matches!(self, Transition::Unchanged(_))
  }
}
