use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::types::{ScrapeReport, Source, SourceId};

/// Persistence for sources and their run reports.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// All active sources due for a run at `now`.
    async fn load_due_sources(&self, now: DateTime<Utc>) -> Result<Vec<Source>>;

    /// Persist a source, replacing any existing source with the same id.
    async fn save_source(&self, source: Source) -> Result<Source>;

    /// Record the outcome of one extraction run.
    async fn save_report(&self, source_id: SourceId, report: &ScrapeReport) -> Result<()>;
}
