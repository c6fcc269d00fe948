//! Flowdesk Analytics
//!
//! Reducers that turn snapshots of definitions and instances into the
//! numbers shown on the dashboard and analytics views.
//!
//! Everything in [`stats`] and [`summary`] is pure: the same snapshot always
//! yields the same result, and nothing here talks to the store. The one
//! exception is [`TrendSource`], the collaborator that supplies the
//! trend-over-time series.

pub mod stats;
pub mod summary;
mod trend;

pub use stats::{
  StatusCounts, StatusSlice, average_completion_time_hours, completion_rate, count_by_status,
  status_distribution,
};
pub use summary::{CompletionRateRow, DashboardSummary, PerformanceMetrics, completion_rates};
pub use trend::{StoreTrendSource, TrendPoint, TrendSource, daily_trend};

/// Error type for analytics that need the store.
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
  #[error("failed to load instances: {0}")]
  Store(#[from] flowdesk_store::Error),
}
