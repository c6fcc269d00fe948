use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta, Utc};
use flowdesk_lifecycle::InstanceStatus;
use flowdesk_store::{PageRequest, Store, WorkflowInstance};
use serde::Serialize;
use tracing::debug;

use crate::AnalyticsError;

const FETCH_PAGE_SIZE: u32 = 100;

/// Instances started on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
  pub day: NaiveDate,
  pub instances: usize,
  /// How many of those have since completed.
  pub completed: usize,
}

/// Supplies the instance trend over recent days.
#[async_trait]
pub trait TrendSource: Send + Sync {
  /// One point per day, oldest first, ending today.
  async fn instance_trend(&self, days: u32) -> Result<Vec<TrendPoint>, AnalyticsError>;
}

/// Bucket instances by the day they started, for the `days` days ending on
/// `last_day`. Instances outside the window or without a start time are
/// ignored.
pub fn daily_trend(instances: &[WorkflowInstance], last_day: NaiveDate, days: u32) -> Vec<TrendPoint> {
  let mut points: Vec<TrendPoint> = (0..days)
    .rev()
    .map(|back| TrendPoint {
      day: last_day - TimeDelta::days(i64::from(back)),
      instances: 0,
      completed: 0,
    })
    .collect();

  let Some(first_day) = points.first().map(|p| p.day) else {
    return points;
  };

  for instance in instances {
    let Some(started) = instance.started_at else {
      continue;
    };
    let offset = (started.date() - first_day).num_days();
    if offset < 0 {
      continue;
    }
    if let Some(point) = points.get_mut(offset as usize) {
      point.instances += 1;
      if instance.status == InstanceStatus::Completed {
        point.completed += 1;
      }
    }
  }

  points
}

/// [`TrendSource`] that reads every instance from the store and buckets them
/// by start date.
pub struct StoreTrendSource {
  store: Arc<dyn Store>,
}

impl StoreTrendSource {
  pub fn new(store: Arc<dyn Store>) -> Self {
    Self { store }
  }

  async fn all_instances(&self) -> Result<Vec<WorkflowInstance>, AnalyticsError> {
    let mut instances = Vec::new();
    let mut page = PageRequest::new(0, FETCH_PAGE_SIZE);
    loop {
      let listing = self.store.list_instances(page).await?;
      let fetched = listing.content.len();
      instances.extend(listing.content);
      page.page += 1;
      if fetched == 0 || page.page >= listing.total_pages {
        break;
      }
    }
    debug!(count = instances.len(), "loaded instances for trend");
    Ok(instances)
  }
}

#[async_trait]
impl TrendSource for StoreTrendSource {
  async fn instance_trend(&self, days: u32) -> Result<Vec<TrendPoint>, AnalyticsError> {
    let instances = self.all_instances().await?;
    let today = Utc::now().date_naive();
    Ok(daily_trend(&instances, today, days))
  }
}
