//! Model response shapes and tolerant JSON recovery.
//!
//! Completion models wrap JSON in prose, code fences, or both. The
//! recovery ladder here tries progressively harsher cleanups before
//! giving up, and never errors: an unrecoverable response is `None`.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{FieldSelector, Pagination, SourceConfig};

/// Phase A output: what the model found on the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatternAnalysis {
    #[serde(default)]
    pub has_events: bool,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub events_found: Vec<CandidateEvent>,
    #[serde(default)]
    pub event_links: Vec<String>,
    #[serde(default)]
    pub selectors: Option<SelectorSet>,
    #[serde(default)]
    pub patterns: Option<String>,
}

/// One event the model read directly off the page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateEvent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

/// Selectors the model proposes for the page's event structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelectorSet {
    #[serde(default)]
    pub event_container: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl SelectorSet {
    /// Convert the proposed selectors into a usable configuration.
    /// Returns `None` when the model gave nothing to work with.
    pub fn to_config(&self) -> Option<SourceConfig> {
        let container = self.event_container.clone()?;
        let mut config = SourceConfig::default().with_container(container);
        if let Some(title) = &self.title {
            config = config.with_field("title", FieldSelector::from(title.as_str()));
        }
        if let Some(date) = &self.date {
            config = config.with_field("date", FieldSelector::from(date.as_str()));
        }
        if let Some(location) = &self.location {
            config = config.with_field("location", FieldSelector::from(location.as_str()));
        }
        if let Some(link) = &self.link {
            config = config.with_field("url", FieldSelector::from(link.as_str()));
        }
        if config.fields.is_empty() {
            return None;
        }
        Some(config)
    }
}

/// Phase B output: a complete generated extraction method.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedMethod {
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub fields: IndexMap<String, FieldSelector>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub date_format: Option<String>,
    #[serde(default)]
    pub url_template: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl GeneratedMethod {
    /// Whether the method is complete enough to run deterministically.
    pub fn is_usable(&self) -> bool {
        self.container.is_some() && self.fields.contains_key("title")
    }

    pub fn to_config(&self) -> Option<SourceConfig> {
        if !self.is_usable() {
            return None;
        }
        let mut config = SourceConfig {
            container: self.container.clone(),
            fields: self.fields.clone(),
            date_format: self.date_format.clone(),
            ..SourceConfig::default()
        };
        if let Some(pagination) = &self.pagination {
            config.pagination = Some(pagination.clone());
        }
        Some(config)
    }
}

/// Recover a JSON value of type `T` from raw model output.
///
/// Ladder: strip code fences, then locate the first balanced `{...}`
/// or `[...]` span (string-aware), parse, and on failure retry once
/// with whitespace normalized. `None` when nothing parses.
pub fn parse_llm_json<T: DeserializeOwned>(text: &str) -> Option<T> {
    let stripped = strip_code_fences(text);
    let candidate = balanced_json_span(&stripped).unwrap_or(stripped.as_str());

    if let Ok(value) = serde_json::from_str::<T>(candidate) {
        return Some(value);
    }

    // Models occasionally emit literal newlines inside string values.
    let normalized: String = candidate
        .chars()
        .map(|c| if c == '\n' || c == '\r' || c == '\t' { ' ' } else { c })
        .collect();
    match serde_json::from_str::<T>(&normalized) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(error = %err, "model response did not contain recoverable JSON");
            None
        }
    }
}

fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.contains("```") {
        return trimmed.to_string();
    }
    // Take the contents of the first fenced block.
    let after_open = match trimmed.split_once("```") {
        Some((_, rest)) => rest,
        None => trimmed,
    };
    // Drop a language tag like `json` on the fence line.
    let after_tag = match after_open.split_once('\n') {
        Some((first, rest)) if first.trim().chars().all(|c| c.is_ascii_alphanumeric()) => rest,
        _ => after_open,
    };
    match after_tag.split_once("```") {
        Some((inner, _)) => inner.trim().to_string(),
        None => after_tag.trim().to_string(),
    }
}

/// Find the first balanced top-level `{...}` or `[...]` span, skipping
/// brackets inside JSON string literals.
fn balanced_json_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let start = text.find(['{', '['])?;
    let open = bytes[start];
    let close = if open == b'{' { b'}' } else { b']' };

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            _ if b == open => depth += 1,
            _ if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}
