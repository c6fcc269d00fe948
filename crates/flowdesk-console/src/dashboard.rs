use std::sync::Arc;

use flowdesk_analytics::{
  CompletionRateRow, DashboardSummary, PerformanceMetrics, StatusSlice, StoreTrendSource,
  TrendPoint, TrendSource, completion_rates, status_distribution,
};
use flowdesk_store::{PageRequest, Store, WorkflowDefinition, WorkflowInstance};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ConsoleError;
use crate::notice::Notice;

/// Days covered by the instance trend.
pub const TREND_DAYS: u32 = 7;

/// Everything the analytics view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
  pub instance_trend: Vec<TrendPoint>,
  pub completion_rates: Vec<CompletionRateRow>,
  pub performance: PerformanceMetrics,
  pub status_distribution: Vec<StatusSlice>,
}

/// Loads snapshots from the store and reduces them for the dashboard and
/// analytics views.
pub struct Dashboard {
  store: Arc<dyn Store>,
  trend: Arc<dyn TrendSource>,
  page: PageRequest,
  notice: Option<Notice>,
}

impl Dashboard {
  /// Dashboard whose trend is derived from the store's instances.
  pub fn new(store: Arc<dyn Store>, page: PageRequest) -> Self {
    let trend = Arc::new(StoreTrendSource::new(store.clone()));
    Self::with_trend_source(store, trend, page)
  }

  pub fn with_trend_source(
    store: Arc<dyn Store>,
    trend: Arc<dyn TrendSource>,
    page: PageRequest,
  ) -> Self {
    Self {
      store,
      trend,
      page,
      notice: None,
    }
  }

  pub fn notice(&self) -> Option<&Notice> {
    self.notice.as_ref()
  }

  pub fn dismiss_notice(&mut self) {
    self.notice = None;
  }

  pub async fn summary(&mut self) -> Result<DashboardSummary, ConsoleError> {
    match self.snapshot().await {
      Ok((definitions, instances)) => Ok(DashboardSummary::new(&definitions, &instances)),
      Err(e) => Err(self.raise("Failed to load dashboard data", e)),
    }
  }

  pub async fn analytics(&mut self, days: u32) -> Result<AnalyticsReport, ConsoleError> {
    let loaded = async {
      let (definitions, instances) = self.snapshot().await?;
      let instance_trend = self.trend.instance_trend(days).await?;
      Ok::<_, ConsoleError>(AnalyticsReport {
        instance_trend,
        completion_rates: completion_rates(&definitions, &instances),
        performance: PerformanceMetrics::from_instances(&instances),
        status_distribution: status_distribution(&instances),
      })
    }
    .await;

    loaded.map_err(|e| self.raise("Failed to load analytics data", e))
  }

  async fn snapshot(&self) -> Result<(Vec<WorkflowDefinition>, Vec<WorkflowInstance>), ConsoleError> {
    let definitions = self.store.list_definitions(self.page).await?;
    let instances = self.store.list_instances(self.page).await?;
    debug!(
      definitions = definitions.content.len(),
      instances = instances.content.len(),
      "loaded snapshot"
    );
    Ok((definitions.content, instances.content))
  }

  fn raise(&mut self, summary: &str, error: ConsoleError) -> ConsoleError {
    warn!(error = %error, "{}", summary);
    self.notice = Some(Notice::new(summary, &error));
    error
  }
}
