//! Extraction strategies and the registry that routes sources to them.

pub mod html;
pub mod intelligent;
pub mod prompts;
pub mod response;

pub use html::HtmlScraper;
pub use intelligent::IntelligentScraper;

use std::sync::Arc;

use tracing::debug;

use crate::traits::Scraper;
use crate::types::Source;

/// Holds the available strategies and picks one per source.
#[derive(Default)]
pub struct ScraperRegistry {
    scrapers: Vec<Arc<dyn Scraper>>,
}

impl ScraperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, scraper: Arc<dyn Scraper>) {
        debug!(scraper = scraper.name(), "registered scraper");
        self.scrapers.push(scraper);
    }

    pub fn with_scraper(mut self, scraper: Arc<dyn Scraper>) -> Self {
        self.register(scraper);
        self
    }

    /// First registered strategy that can handle the source.
    pub fn for_source(&self, source: &Source) -> Option<Arc<dyn Scraper>> {
        self.scrapers
            .iter()
            .find(|s| s.can_handle(source))
            .cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.scrapers.iter().map(|s| s.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCompletion, MockFetcher};
    use crate::types::SourceType;

    #[test]
    fn routes_sources_by_type() {
        let fetcher = Arc::new(MockFetcher::new());
        let completion = Arc::new(MockCompletion::new());
        let registry = ScraperRegistry::new()
            .with_scraper(Arc::new(HtmlScraper::new(fetcher.clone())))
            .with_scraper(Arc::new(IntelligentScraper::new(fetcher, completion)));

        let deterministic = Source::new(
            "City Calendar",
            "https://example.org/events",
            SourceType::Deterministic,
        );
        let adaptive = Source::new(
            "Neighborhood Blog",
            "https://example.org/blog",
            SourceType::Adaptive,
        );

        assert_eq!(registry.for_source(&deterministic).unwrap().name(), "html");
        assert_eq!(registry.for_source(&adaptive).unwrap().name(), "intelligent");
        assert_eq!(registry.names(), vec!["html", "intelligent"]);
    }
}
