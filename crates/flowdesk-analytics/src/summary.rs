//! Aggregate views for the dashboard and analytics pages.

use std::cmp::Reverse;

use flowdesk_store::{WorkflowDefinition, WorkflowInstance};
use serde::Serialize;

use crate::stats::{average_completion_time_hours, completion_tally, count_by_status, percentage};

/// Number of instances listed on the dashboard.
pub const RECENT_INSTANCES: usize = 10;

/// Completion figures for one definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRateRow {
  pub definition_id: String,
  pub name: String,
  pub completion_rate: u32,
  pub total: usize,
  pub completed: usize,
}

/// One completion row per definition, in definition order.
pub fn completion_rates(
  definitions: &[WorkflowDefinition],
  instances: &[WorkflowInstance],
) -> Vec<CompletionRateRow> {
  definitions
    .iter()
    .map(|definition| {
      let (completed, total) = completion_tally(&definition.id, instances);
      CompletionRateRow {
        definition_id: definition.id.clone(),
        name: definition.name.clone(),
        completion_rate: percentage(completed, total),
        total,
        completed,
      }
    })
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
  pub total: usize,
  pub running: usize,
  pub completed: usize,
  pub failed: usize,
  pub average_completion_hours: u64,
}

impl PerformanceMetrics {
  pub fn from_instances(instances: &[WorkflowInstance]) -> Self {
    let counts = count_by_status(instances);
    Self {
      total: instances.len(),
      running: counts.running,
      completed: counts.completed,
      failed: counts.failed,
      average_completion_hours: average_completion_time_hours(instances),
    }
  }
}

/// Headline numbers and the most recently started instances.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
  pub total_definitions: usize,
  pub total_instances: usize,
  pub running: usize,
  pub completed: usize,
  pub recent: Vec<WorkflowInstance>,
}

impl DashboardSummary {
  pub fn new(definitions: &[WorkflowDefinition], instances: &[WorkflowInstance]) -> Self {
    let counts = count_by_status(instances);

    // Newest first; instances without a start time go last, keeping their
    // listing order.
    let mut recent: Vec<_> = instances.iter().collect();
    recent.sort_by_key(|i| Reverse(i.started_at));
    let recent = recent
      .into_iter()
      .take(RECENT_INSTANCES)
      .cloned()
      .collect();

    Self {
      total_definitions: definitions.len(),
      total_instances: instances.len(),
      running: counts.running,
      completed: counts.completed,
      recent,
    }
  }
}
