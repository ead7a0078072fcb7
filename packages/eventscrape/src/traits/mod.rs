//! Collaborator seams. Everything with side effects sits behind a trait
//! so strategies can be exercised against in-memory fakes.

pub mod completion;
pub mod fetcher;
pub mod scraper;
pub mod store;

pub use completion::CompletionClient;
pub use fetcher::PageFetcher;
pub use scraper::{ConfigField, ConfigKind, Scraper};
pub use store::SourceStore;
