//! Domain types: sources, configuration, records, reports.

pub mod config;
pub mod event;
pub mod report;
pub mod source;

pub use config::{FieldSelector, Pagination, PaginationMode, SourceConfig};
pub use event::{EventRecord, EventStatus};
pub use report::ScrapeReport;
pub use source::{Source, SourceId, SourceType};
