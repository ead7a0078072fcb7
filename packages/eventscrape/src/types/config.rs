//! Source configuration: selectors, field map, pagination.
//!
//! The configuration a source carries is typed rather than an ad hoc
//! key-value bag. Keys the engine does not recognize survive round-trips
//! in the `extra` bucket.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A field's selector: a single expression or an ordered fallback chain
/// evaluated first-match-wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSelector {
    One(String),
    Fallback(Vec<String>),
}

impl FieldSelector {
    /// The selectors to try, in order.
    pub fn candidates(&self) -> &[String] {
        match self {
            FieldSelector::One(s) => std::slice::from_ref(s),
            FieldSelector::Fallback(list) => list,
        }
    }
}

impl From<&str> for FieldSelector {
    fn from(s: &str) -> Self {
        FieldSelector::One(s.to_string())
    }
}

/// How pagination URLs are derived from the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaginationMode {
    /// Append `?param=N` or `&param=N` depending on the base URL
    #[serde(rename = "query_param")]
    QueryParam,

    /// Append `/N` to the trailing-slash-stripped base URL
    #[serde(rename = "path")]
    PathSegment,

    /// Substitute `{page}` into a template string
    #[serde(rename = "template")]
    Template,
}

fn default_param() -> String {
    "page".to_string()
}

fn default_start_page() -> u32 {
    2
}

fn default_max_pages() -> u32 {
    5
}

/// Multi-page fetch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub enabled: bool,
    #[serde(rename = "type")]
    pub mode: PaginationMode,
    #[serde(default = "default_param")]
    pub param: String,
    #[serde(default = "default_start_page")]
    pub start_page: u32,
    /// Highest page number to fetch (inclusive)
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Template with a `{page}` placeholder, for `Template` mode
    #[serde(default)]
    pub template: Option<String>,
}

impl Pagination {
    /// Generate the fetch sequence beyond the base URL.
    ///
    /// Pages run from `start_page` through `max_pages` inclusive; the base
    /// URL itself is page one and is not repeated here.
    pub fn page_urls(&self, base_url: &str) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        (self.start_page..=self.max_pages)
            .map(|page| match self.mode {
                PaginationMode::QueryParam => {
                    let separator = if base_url.contains('?') { '&' } else { '?' };
                    format!("{base_url}{separator}{}={page}", self.param)
                }
                PaginationMode::PathSegment => {
                    format!("{}/{page}", base_url.trim_end_matches('/'))
                }
                PaginationMode::Template => self
                    .template
                    .as_deref()
                    .unwrap_or_default()
                    .replace("{page}", &page.to_string()),
            })
            .collect()
    }
}

fn default_wait_time_ms() -> u64 {
    1000
}

/// Extraction configuration for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Selector for the repeating record blocks. Required for a
    /// deterministic run; adaptive discovery fills it in lazily.
    #[serde(default)]
    pub container: Option<String>,

    /// Field name -> selector(s), evaluated against each container.
    /// Order is preserved.
    #[serde(default)]
    pub fields: IndexMap<String, FieldSelector>,

    #[serde(default)]
    pub pagination: Option<Pagination>,

    /// Delay between page fetches in milliseconds
    #[serde(default = "default_wait_time_ms")]
    pub wait_time_ms: u64,

    /// Optional strftime-style hint recorded by method generation
    #[serde(default)]
    pub date_format: Option<String>,

    /// Apply keyword-based default times to date-only records
    #[serde(default, rename = "intelligent_time")]
    pub infer_times: bool,

    /// Unrecognized keys, preserved verbatim
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            container: None,
            fields: IndexMap::new(),
            pagination: None,
            wait_time_ms: default_wait_time_ms(),
            date_format: None,
            infer_times: false,
            extra: HashMap::new(),
        }
    }
}

impl SourceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the container selector.
    pub fn with_container(mut self, selector: impl Into<String>) -> Self {
        self.container = Some(selector.into());
        self
    }

    /// Add a field selector.
    pub fn with_field(mut self, name: impl Into<String>, selector: impl Into<FieldSelector>) -> Self {
        self.fields.insert(name.into(), selector.into());
        self
    }

    /// Set pagination.
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Set the per-page delay.
    pub fn with_wait_time_ms(mut self, ms: u64) -> Self {
        self.wait_time_ms = ms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pagination(mode: PaginationMode) -> Pagination {
        Pagination {
            enabled: true,
            mode,
            param: "page".to_string(),
            start_page: 2,
            max_pages: 3,
            template: None,
        }
    }

    #[test]
    fn query_param_pagination_appends_question_mark() {
        let urls = pagination(PaginationMode::QueryParam).page_urls("https://x.test/events");
        assert_eq!(
            urls,
            vec![
                "https://x.test/events?page=2".to_string(),
                "https://x.test/events?page=3".to_string(),
            ]
        );
    }

    #[test]
    fn query_param_pagination_respects_existing_query() {
        let urls =
            pagination(PaginationMode::QueryParam).page_urls("https://x.test/events?cat=music");
        assert_eq!(
            urls,
            vec![
                "https://x.test/events?cat=music&page=2".to_string(),
                "https://x.test/events?cat=music&page=3".to_string(),
            ]
        );
    }

    #[test]
    fn path_pagination_strips_trailing_slash() {
        let urls = pagination(PaginationMode::PathSegment).page_urls("https://x.test/events/");
        assert_eq!(
            urls,
            vec![
                "https://x.test/events/2".to_string(),
                "https://x.test/events/3".to_string(),
            ]
        );
    }

    #[test]
    fn template_pagination_substitutes_placeholder() {
        let mut p = pagination(PaginationMode::Template);
        p.template = Some("https://x.test/events/p/{page}?view=list".to_string());
        let urls = p.page_urls("https://x.test/events");
        assert_eq!(
            urls,
            vec![
                "https://x.test/events/p/2?view=list".to_string(),
                "https://x.test/events/p/3?view=list".to_string(),
            ]
        );
    }

    #[test]
    fn disabled_pagination_yields_nothing() {
        let mut p = pagination(PaginationMode::QueryParam);
        p.enabled = false;
        assert!(p.page_urls("https://x.test/events").is_empty());
    }

    #[test]
    fn field_selector_deserializes_both_shapes() {
        let config: SourceConfig = serde_json::from_value(serde_json::json!({
            "container": ".event",
            "fields": {
                "title": "h2",
                "date": [".date", ".when"]
            }
        }))
        .unwrap();

        assert_eq!(config.container.as_deref(), Some(".event"));
        assert_eq!(
            config.fields.get("title").unwrap().candidates(),
            &["h2".to_string()]
        );
        assert_eq!(
            config.fields.get("date").unwrap().candidates(),
            &[".date".to_string(), ".when".to_string()]
        );
    }

    #[test]
    fn unknown_keys_land_in_extra() {
        let config: SourceConfig = serde_json::from_value(serde_json::json!({
            "container": ".event",
            "timezone": "America/Los_Angeles"
        }))
        .unwrap();
        assert_eq!(
            config.extra.get("timezone"),
            Some(&serde_json::json!("America/Los_Angeles"))
        );
    }
}
