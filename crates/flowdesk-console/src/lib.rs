//! Flowdesk Console
//!
//! The session layer between a user surface and the store. Each component
//! owns a cache of remote records and follows the same discipline:
//!
//! 1. check a requested operation locally (names, graph validity, the
//!    lifecycle tables),
//! 2. call the store,
//! 3. on success reload the affected collection in full,
//! 4. on failure raise a dismissible [`Notice`] and leave the cache as it
//!    was.
//!
//! Nothing is retried. Concurrent sessions are not coordinated; the latest
//! reload wins.

mod dashboard;
mod definitions;
mod designer;
mod error;
mod events;
mod instances;
mod notice;

pub use dashboard::{AnalyticsReport, Dashboard, TREND_DAYS};
pub use definitions::DefinitionBoard;
pub use designer::DesignerSession;
pub use error::ConsoleError;
pub use events::{ChannelNotifier, ConsoleEvent, ConsoleNotifier, NoopNotifier};
pub use instances::InstanceBoard;
pub use notice::Notice;
