//! Adaptive Content-Extraction Engine for Event Listings
//!
//! Pulls structured event records out of arbitrary community websites
//! using two complementary strategies:
//!
//! - **Deterministic** ([`HtmlScraper`]): runs a stored selector
//!   configuration against a source's pages, with pagination, fallback
//!   selector chains, and field-aware attribute extraction.
//! - **Adaptive** ([`IntelligentScraper`]): asks a completion model to
//!   discover a page's event structure, extracts what it found, then
//!   codifies the structure into a selector configuration so future
//!   runs can be deterministic.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use eventscrape::{HtmlScraper, IntelligentScraper, ScraperRegistry};
//! use eventscrape::fetchers::HttpFetcher;
//! use eventscrape::ai::SegmindClient;
//!
//! let fetcher = Arc::new(HttpFetcher::new()?);
//! let model = Arc::new(SegmindClient::new(api_key)?);
//!
//! let registry = ScraperRegistry::new()
//!     .with_scraper(Arc::new(HtmlScraper::new(fetcher.clone())))
//!     .with_scraper(Arc::new(IntelligentScraper::new(fetcher, model)));
//!
//! if let Some(scraper) = registry.for_source(&source) {
//!     let report = scraper.scrape(&source).await;
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams (Scraper, PageFetcher, CompletionClient, SourceStore)
//! - [`types`] - Sources, configurations, event records, run reports
//! - [`strategies`] - The extraction strategies and their registry
//! - [`fetchers`] - HTTP page fetching
//! - [`ai`] - Completion endpoint client
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod dates;
pub mod dom;
pub mod error;
pub mod fetchers;
pub mod postprocess;
pub mod strategies;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{CompletionError, FetchError, ScrapeError};
pub use strategies::{HtmlScraper, IntelligentScraper, ScraperRegistry};
pub use traits::{CompletionClient, PageFetcher, Scraper, SourceStore};
pub use types::{
    EventRecord, EventStatus, FieldSelector, Pagination, PaginationMode, ScrapeReport, Source,
    SourceConfig, SourceId, SourceType,
};
