use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LifecycleError, ParseStatusError};

/// Execution status of a workflow instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
  Running,
  Completed,
  Failed,
  Suspended,
  Cancelled,
}

impl InstanceStatus {
  pub const ALL: [InstanceStatus; 5] = [
    InstanceStatus::Running,
    InstanceStatus::Completed,
    InstanceStatus::Failed,
    InstanceStatus::Suspended,
    InstanceStatus::Cancelled,
  ];

  /// Wire name of the status.
  pub fn as_str(&self) -> &'static str {
    match self {
      InstanceStatus::Running => "RUNNING",
      InstanceStatus::Completed => "COMPLETED",
      InstanceStatus::Failed => "FAILED",
      InstanceStatus::Suspended => "SUSPENDED",
      InstanceStatus::Cancelled => "CANCELLED",
    }
  }

  /// Completed, failed and cancelled instances accept no further operations.
  pub fn is_terminal(&self) -> bool {
    matches!(
      self,
      InstanceStatus::Completed | InstanceStatus::Failed | InstanceStatus::Cancelled
    )
  }

  /// Operations a user may request from this status.
  pub fn available_operations(&self) -> &'static [InstanceOperation] {
    match self {
      InstanceStatus::Running => &[
        InstanceOperation::Suspend,
        InstanceOperation::Complete,
        InstanceOperation::Cancel,
      ],
      InstanceStatus::Suspended => &[InstanceOperation::Resume, InstanceOperation::Cancel],
      InstanceStatus::Completed | InstanceStatus::Failed | InstanceStatus::Cancelled => &[],
    }
  }

  /// Apply a user operation.
  ///
  /// | operation | legal from          | result    |
  /// |-----------|---------------------|-----------|
  /// | complete  | Running             | Completed |
  /// | suspend   | Running             | Suspended |
  /// | cancel    | Running, Suspended  | Cancelled |
  /// | resume    | Suspended           | Running   |
  ///
  /// `Failed` is never the result of a user operation; it is only reported by
  /// the executor.
  pub fn apply(self, operation: InstanceOperation) -> Result<InstanceStatus, LifecycleError> {
    use InstanceOperation::*;
    use InstanceStatus::*;

    if self.is_terminal() {
      return Err(LifecycleError::TerminalStateViolation {
        status: self,
        operation,
      });
    }

    match (self, operation) {
      (Running, Complete) => Ok(Completed),
      (Running, Suspend) => Ok(Suspended),
      (Running | Suspended, Cancel) => Ok(Cancelled),
      (Suspended, Resume) => Ok(Running),
      _ => Err(LifecycleError::InvalidTransition {
        status: self.to_string(),
        operation: operation.to_string(),
      }),
    }
  }
}

impl fmt::Display for InstanceStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for InstanceStatus {
  type Err = ParseStatusError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|status| status.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| ParseStatusError {
        kind: "instance",
        value: s.to_string(),
      })
  }
}

/// User operations on an instance's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceOperation {
  Complete,
  Suspend,
  Cancel,
  Resume,
}

impl InstanceOperation {
  pub const ALL: [InstanceOperation; 4] = [
    InstanceOperation::Complete,
    InstanceOperation::Suspend,
    InstanceOperation::Cancel,
    InstanceOperation::Resume,
  ];

  /// Path segment of the store endpoint for this operation.
  pub fn as_str(&self) -> &'static str {
    match self {
      InstanceOperation::Complete => "complete",
      InstanceOperation::Suspend => "suspend",
      InstanceOperation::Cancel => "cancel",
      InstanceOperation::Resume => "resume",
    }
  }
}

impl fmt::Display for InstanceOperation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
