//! Per-status counts and completion statistics.

use flowdesk_lifecycle::InstanceStatus;
use flowdesk_store::{WorkflowDefinition, WorkflowInstance};
use serde::Serialize;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Instance counts for each of the five statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
  pub running: usize,
  pub completed: usize,
  pub failed: usize,
  pub suspended: usize,
  pub cancelled: usize,
}

impl StatusCounts {
  pub fn get(&self, status: InstanceStatus) -> usize {
    match status {
      InstanceStatus::Running => self.running,
      InstanceStatus::Completed => self.completed,
      InstanceStatus::Failed => self.failed,
      InstanceStatus::Suspended => self.suspended,
      InstanceStatus::Cancelled => self.cancelled,
    }
  }

  fn slot(&mut self, status: InstanceStatus) -> &mut usize {
    match status {
      InstanceStatus::Running => &mut self.running,
      InstanceStatus::Completed => &mut self.completed,
      InstanceStatus::Failed => &mut self.failed,
      InstanceStatus::Suspended => &mut self.suspended,
      InstanceStatus::Cancelled => &mut self.cancelled,
    }
  }

  pub fn total(&self) -> usize {
    InstanceStatus::ALL.iter().map(|s| self.get(*s)).sum()
  }
}

/// One bar of the status distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSlice {
  pub status: InstanceStatus,
  pub count: usize,
}

pub fn count_by_status(instances: &[WorkflowInstance]) -> StatusCounts {
  let mut counts = StatusCounts::default();
  for instance in instances {
    *counts.slot(instance.status) += 1;
  }
  counts
}

/// Share of a definition's instances that completed, as a whole percentage.
///
/// Rounds half up. A definition with no instances has a rate of 0.
pub fn completion_rate(definition: &WorkflowDefinition, instances: &[WorkflowInstance]) -> u32 {
  let (completed, total) = completion_tally(&definition.id, instances);
  percentage(completed, total)
}

pub(crate) fn completion_tally(definition_id: &str, instances: &[WorkflowInstance]) -> (usize, usize) {
  instances
    .iter()
    .filter(|i| i.definition_id() == Some(definition_id))
    .fold((0, 0), |(completed, total), i| {
      let done = usize::from(i.status == InstanceStatus::Completed);
      (completed + done, total + 1)
    })
}

pub(crate) fn percentage(part: usize, total: usize) -> u32 {
  if total == 0 {
    return 0;
  }
  // (2 * 100 * part + total) / (2 * total) rounds half up without floats.
  ((200 * part + total) / (2 * total)) as u32
}

/// Mean wall-clock duration of completed instances, in whole hours.
///
/// Only completed instances carrying both timestamps count. Returns 0 when
/// there are none.
pub fn average_completion_time_hours(instances: &[WorkflowInstance]) -> u64 {
  let durations: Vec<i64> = instances
    .iter()
    .filter(|i| i.status == InstanceStatus::Completed)
    .filter_map(|i| match (i.started_at, i.completed_at) {
      (Some(started), Some(completed)) => Some((completed - started).num_milliseconds()),
      _ => None,
    })
    .collect();

  if durations.is_empty() {
    return 0;
  }

  let mean = durations.iter().map(|ms| *ms as f64).sum::<f64>() / durations.len() as f64;
  (mean / MILLIS_PER_HOUR).round().max(0.0) as u64
}

/// Counts for every status, in a fixed order.
pub fn status_distribution(instances: &[WorkflowInstance]) -> Vec<StatusSlice> {
  let counts = count_by_status(instances);
  InstanceStatus::ALL
    .iter()
    .map(|status| StatusSlice {
      status: *status,
      count: counts.get(*status),
    })
    .collect()
}
