use async_trait::async_trait;

use crate::types::{ScrapeReport, Source, SourceConfig};

/// An extraction strategy. Implementations never return `Err` from
/// [`scrape`](Scraper::scrape): every failure mode is reported through
/// the [`ScrapeReport`] error and warning lists so callers get one
/// uniform result shape.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Human-readable strategy name.
    fn name(&self) -> &str;

    /// Strategy version, surfaced in report metadata.
    fn version(&self) -> &str {
        "1.0"
    }

    /// Whether this strategy can service the given source.
    fn can_handle(&self, source: &Source) -> bool;

    /// Run a full extraction pass for the source.
    async fn scrape(&self, source: &Source) -> ScrapeReport;

    /// Cheap reachability probe, used before activating a source.
    /// Implementations must not run a full extraction (in particular,
    /// no completion calls); a fetch plus at most a structural check.
    async fn test_source(&self, source: &Source) -> bool;

    /// Validate a configuration, returning human-readable problems.
    /// An empty list means the configuration is usable.
    fn validate_configuration(&self, config: &SourceConfig) -> Vec<String>;

    /// Describe the configuration fields this strategy understands,
    /// for administrative UIs and config tooling.
    fn configuration_schema(&self) -> Vec<ConfigField> {
        Vec::new()
    }
}

/// One entry in a strategy's configuration schema.
#[derive(Debug, Clone)]
pub struct ConfigField {
    pub key: &'static str,
    pub kind: ConfigKind,
    pub required: bool,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Text,
    Integer,
    Boolean,
    Map,
    List,
}

impl ConfigField {
    pub fn new(key: &'static str, kind: ConfigKind, description: &'static str) -> Self {
        Self {
            key,
            kind,
            required: false,
            description,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}
