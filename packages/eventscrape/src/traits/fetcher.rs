use async_trait::async_trait;

use crate::error::FetchResult;

/// Retrieves page content for a URL. The production implementation is
/// [`HttpFetcher`](crate::fetchers::HttpFetcher); tests substitute
/// [`MockFetcher`](crate::testing::MockFetcher).
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<String>;
}
