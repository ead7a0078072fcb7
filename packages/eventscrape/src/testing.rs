//! Testing utilities including mock implementations.
//!
//! These let callers exercise strategies and scheduling without real
//! network or model calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};

use crate::error::{CompletionError, CompletionResult, FetchError, FetchResult, Result};
use crate::traits::{CompletionClient, PageFetcher, SourceStore};
use crate::types::{ScrapeReport, Source, SourceId};

/// A page fetcher serving canned bodies from memory.
///
/// Unregistered URLs and URLs marked as failing return errors, and
/// every fetch is recorded for ordering assertions.
#[derive(Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, String>>>,
    failures: Arc<RwLock<HashSet<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.write().unwrap().insert(url.into(), body.into());
        self
    }

    /// Make fetches of `url` fail with a status error.
    pub fn with_failure(self, url: impl Into<String>) -> Self {
        self.failures.write().unwrap().insert(url.into());
        self
    }

    /// URLs fetched so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        self.calls.write().unwrap().push(url.to_string());

        if self.failures.read().unwrap().contains(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 500,
            });
        }
        self.pages
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

/// A completion client replaying queued responses in order.
#[derive(Default)]
pub struct MockCompletion {
    responses: Arc<RwLock<VecDeque<String>>>,
    fail_all: Arc<RwLock<bool>>,
    calls: Arc<RwLock<Vec<MockCompletionCall>>>,
}

/// Record of a call made to the mock completion client.
#[derive(Debug, Clone)]
pub struct MockCompletionCall {
    pub instruction: String,
    pub prompt: String,
    pub temperature: f32,
}

impl MockCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response; responses are consumed first in, first out.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses.write().unwrap().push_back(response.into());
        self
    }

    /// Make every completion fail at the transport level.
    pub fn failing(self) -> Self {
        *self.fail_all.write().unwrap() = true;
        self
    }

    pub fn calls(&self) -> Vec<MockCompletionCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletion {
    async fn complete(
        &self,
        instruction: &str,
        prompt: &str,
        temperature: f32,
    ) -> CompletionResult<String> {
        self.calls.write().unwrap().push(MockCompletionCall {
            instruction: instruction.to_string(),
            prompt: prompt.to_string(),
            temperature,
        });

        if *self.fail_all.read().unwrap() {
            return Err(CompletionError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        self.responses
            .write()
            .unwrap()
            .pop_front()
            .ok_or(CompletionError::EmptyResponse)
    }
}

/// An in-memory source store.
#[derive(Default)]
pub struct MemoryStore {
    sources: Arc<RwLock<HashMap<SourceId, Source>>>,
    reports: Arc<RwLock<Vec<(SourceId, ScrapeReport)>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, source: Source) -> Self {
        let source = match source.id {
            Some(_) => source,
            None => Source {
                id: Some(SourceId::new()),
                ..source
            },
        };
        if let Some(id) = source.id {
            self.sources.write().unwrap().insert(id, source);
        }
        self
    }

    pub fn reports(&self) -> Vec<(SourceId, ScrapeReport)> {
        self.reports.read().unwrap().clone()
    }

    pub fn get(&self, id: SourceId) -> Option<Source> {
        self.sources.read().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl SourceStore for MemoryStore {
    async fn load_due_sources(&self, now: DateTime<Utc>) -> Result<Vec<Source>> {
        Ok(self
            .sources
            .read()
            .unwrap()
            .values()
            .filter(|s| s.is_due_at(now))
            .cloned()
            .collect())
    }

    async fn save_source(&self, source: Source) -> Result<Source> {
        let source = match source.id {
            Some(_) => source,
            None => Source {
                id: Some(SourceId::new()),
                ..source
            },
        };
        if let Some(id) = source.id {
            self.sources.write().unwrap().insert(id, source.clone());
        }
        Ok(source)
    }

    async fn save_report(&self, source_id: SourceId, report: &ScrapeReport) -> Result<()> {
        self.reports
            .write()
            .unwrap()
            .push((source_id, report.clone()));
        Ok(())
    }
}
