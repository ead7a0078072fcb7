//! Typed errors for the extraction engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Note that the
//! [`Scraper`](crate::traits::Scraper) contract never surfaces these across
//! its boundary; strategies convert every failure into report data. These
//! types exist for the collaborator seams (fetching, completion, storage).

use thiserror::Error;

/// Errors from the engine's fallible internals.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Page fetch failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Completion service call failed
    #[error("completion service error: {0}")]
    Completion(#[from] CompletionError),

    /// Source configuration is unusable for this strategy
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (DNS, connect, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Request exceeded its bounded timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors from the external completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Transport-level failure or timeout
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success status from the service
    #[error("completion API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response carried no recognizable text content
    #[error("completion response had no text content")]
    EmptyResponse,
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for completion calls.
pub type CompletionResult<T> = std::result::Result<T, CompletionError>;
