//! Scrape source entity: configuration plus operational health state.
//!
//! A [`Source`] is an immutable snapshot. All mutation goes through explicit
//! transition methods (`record_success`, `record_error`, ...) that return a
//! new snapshot, so health and scheduling invariants hold independent of
//! call order. The orchestrator owns the current snapshot between ticks;
//! strategies only ever see `&Source`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::types::config::SourceConfig;

/// Unique identifier for a source, assigned at persistence time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId(pub Uuid);

impl SourceId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for SourceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Which extraction strategy a source is routed to.
///
/// The serde tags match the stored `scrape_type` column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceType {
    /// Selector/configuration-driven extraction.
    #[serde(rename = "html")]
    Deterministic,

    /// AI-assisted pattern discovery and method generation.
    #[serde(rename = "intelligent")]
    Adaptive,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Deterministic => write!(f, "html"),
            SourceType::Adaptive => write!(f, "intelligent"),
        }
    }
}

/// Minutes between runs when the schedule expression is absent or opaque.
const DEFAULT_INTERVAL_MINUTES: i64 = 360;

/// Success-rate floor (percent) below which an active source is unhealthy.
const HEALTHY_RATE_THRESHOLD: f64 = 80.0;

/// A configured scrape origin with its operational state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// None until the store assigns one
    pub id: Option<SourceId>,
    pub name: String,
    pub url: String,
    pub source_type: SourceType,
    pub config: SourceConfig,
    pub active: bool,
    /// Ordering hint for the orchestrator; 5 is mid-range
    pub priority: u8,
    /// Interval expression; see [`Source::interval_minutes`]
    pub schedule: String,
    pub last_attempted: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub success_count: u32,
    pub error_count: u32,
    pub last_error: Option<String>,
    /// Diagnostic data: duration history, last record count, ...
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Source {
    /// Create a source with defaults: active, mid priority, empty config.
    pub fn new(name: impl Into<String>, url: impl Into<String>, source_type: SourceType) -> Self {
        Self {
            id: None,
            name: name.into(),
            url: url.into(),
            source_type,
            config: SourceConfig::default(),
            active: true,
            priority: 5,
            schedule: String::new(),
            last_attempted: None,
            last_success: None,
            success_count: 0,
            error_count: 0,
            last_error: None,
            metadata: HashMap::new(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Set the configuration on a fresh source.
    pub fn with_config(mut self, config: SourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the schedule expression on a fresh source.
    pub fn with_schedule(mut self, schedule: impl Into<String>) -> Self {
        self.schedule = schedule.into();
        self
    }

    /// Success rate in percent. A source with no attempts yet is at 100.
    pub fn success_rate(&self) -> f64 {
        let total = self.success_count + self.error_count;
        if total == 0 {
            return 100.0;
        }
        (self.success_count as f64 / total as f64) * 100.0
    }

    /// Active and succeeding at least 80% of the time (vacuously healthy
    /// with zero attempts).
    pub fn is_healthy(&self) -> bool {
        self.active && self.success_rate() >= HEALTHY_RATE_THRESHOLD
    }

    /// Whether a run is due as of `now`.
    pub fn is_due_at(&self, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }
        match self.last_attempted {
            None => true,
            Some(last) => now >= last + Duration::minutes(self.interval_minutes()),
        }
    }

    /// Whether a run is due right now.
    pub fn needs_scraping(&self) -> bool {
        self.is_due_at(Utc::now())
    }

    /// Minutes between runs, parsed from the schedule expression.
    ///
    /// Accepted forms: a plain integer (minutes), `@hourly`/`@daily`, and
    /// cron expressions with a step in the minute (`*/N * * * *`) or hour
    /// (`m */N * * *`) field. Anything else falls back to six hours.
    pub fn interval_minutes(&self) -> i64 {
        parse_interval_minutes(&self.schedule).unwrap_or(DEFAULT_INTERVAL_MINUTES)
    }

    /// Record a successful scrape attempt.
    pub fn record_success(&self, records_found: usize) -> Self {
        let now = Utc::now();
        let mut next = self.clone();
        next.last_attempted = Some(now);
        next.last_success = Some(now);
        next.success_count = self.success_count + 1;
        next.last_error = None;
        next.metadata.insert(
            "last_records_found".to_string(),
            serde_json::json!(records_found),
        );
        next.updated_at = Some(now);
        next
    }

    /// Record a failed scrape attempt.
    pub fn record_error(&self, error: impl Into<String>) -> Self {
        let now = Utc::now();
        let mut next = self.clone();
        next.last_attempted = Some(now);
        next.error_count = self.error_count + 1;
        next.last_error = Some(error.into());
        next.updated_at = Some(now);
        next
    }

    /// Record scrape timing, keeping a running average in metadata.
    pub fn update_timing(&self, duration_secs: f64) -> Self {
        let mut next = self.clone();
        let current_avg = self
            .metadata
            .get("avg_duration_secs")
            .and_then(|v| v.as_f64())
            .unwrap_or(duration_secs);
        let total = (self.success_count + self.error_count) as f64 + 1.0;
        let avg = ((current_avg * (total - 1.0)) + duration_secs) / total;
        next.metadata.insert(
            "last_duration_secs".to_string(),
            serde_json::json!(duration_secs),
        );
        next.metadata
            .insert("avg_duration_secs".to_string(), serde_json::json!(avg));
        next.updated_at = Some(Utc::now());
        next
    }

    /// Activate the source.
    pub fn activate(&self) -> Self {
        let mut next = self.clone();
        next.active = true;
        next.updated_at = Some(Utc::now());
        next
    }

    /// Deactivate the source. Deactivated sources are never due.
    pub fn deactivate(&self) -> Self {
        let mut next = self.clone();
        next.active = false;
        next.updated_at = Some(Utc::now());
        next
    }

    /// Replace the extraction configuration (e.g. with a generated one).
    pub fn with_configuration(&self, config: SourceConfig) -> Self {
        let mut next = self.clone();
        next.config = config;
        next.updated_at = Some(Utc::now());
        next
    }

    /// Switch the strategy routing, used by the orchestrator when a
    /// deterministic source needs adaptive re-discovery.
    pub fn with_source_type(&self, source_type: SourceType) -> Self {
        let mut next = self.clone();
        next.source_type = source_type;
        next.updated_at = Some(Utc::now());
        next
    }
}

/// Parse a schedule expression into minutes between runs.
fn parse_interval_minutes(schedule: &str) -> Option<i64> {
    let schedule = schedule.trim();
    if schedule.is_empty() {
        return None;
    }
    if let Ok(minutes) = schedule.parse::<i64>() {
        return (minutes > 0).then_some(minutes);
    }
    match schedule {
        "@hourly" => return Some(60),
        "@daily" | "@midnight" => return Some(1440),
        "@weekly" => return Some(10_080),
        _ => {}
    }
    // Cron: look for a step in the minute or hour field.
    let fields: Vec<&str> = schedule.split_whitespace().collect();
    if fields.len() == 5 {
        if let Some(step) = fields[0].strip_prefix("*/") {
            if let Ok(n) = step.parse::<i64>() {
                if n > 0 {
                    return Some(n);
                }
            }
        }
        if let Some(step) = fields[1].strip_prefix("*/") {
            if let Ok(n) = step.parse::<i64>() {
                if n > 0 {
                    return Some(n * 60);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Source {
        Source::new("Test", "https://example.test/events", SourceType::Deterministic)
    }

    #[test]
    fn fresh_source_is_healthy_with_full_rate() {
        let s = source();
        assert_eq!(s.success_rate(), 100.0);
        assert!(s.is_healthy());
        assert!(s.needs_scraping());
    }

    #[test]
    fn success_rate_reflects_counts() {
        let mut s = source();
        for _ in 0..8 {
            s = s.record_success(3);
        }
        for _ in 0..2 {
            s = s.record_error("boom");
        }
        assert_eq!(s.success_rate(), 80.0);
        assert!(s.is_healthy());

        let s = s.record_error("boom again");
        assert!(s.success_rate() < 80.0);
        assert!(!s.is_healthy());
        assert_eq!(s.last_error.as_deref(), Some("boom again"));
    }

    #[test]
    fn success_clears_last_error() {
        let s = source().record_error("transient").record_success(1);
        assert!(s.last_error.is_none());
        assert!(s.last_success.is_some());
    }

    #[test]
    fn inactive_source_is_never_due() {
        let s = source().deactivate();
        assert!(!s.needs_scraping());
        assert!(!s.is_due_at(Utc::now() + Duration::days(365)));
    }

    #[test]
    fn due_respects_interval() {
        let s = source().with_schedule("30").record_success(0);
        let last = s.last_attempted.unwrap();
        assert!(!s.is_due_at(last + Duration::minutes(29)));
        assert!(s.is_due_at(last + Duration::minutes(30)));
    }

    #[test]
    fn interval_parsing() {
        assert_eq!(parse_interval_minutes("30"), Some(30));
        assert_eq!(parse_interval_minutes("@hourly"), Some(60));
        assert_eq!(parse_interval_minutes("@daily"), Some(1440));
        assert_eq!(parse_interval_minutes("*/15 * * * *"), Some(15));
        assert_eq!(parse_interval_minutes("0 */6 * * *"), Some(360));
        assert_eq!(parse_interval_minutes("not a schedule"), None);
        assert_eq!(parse_interval_minutes(""), None);

        let s = source(); // empty schedule
        assert_eq!(s.interval_minutes(), 360);
    }

    #[test]
    fn transitions_return_new_snapshots() {
        let s = source();
        let after = s.record_success(5);
        assert_eq!(s.success_count, 0);
        assert_eq!(after.success_count, 1);
        assert!(after.updated_at.is_some());
        assert_eq!(
            after.metadata.get("last_records_found"),
            Some(&serde_json::json!(5))
        );
    }

    #[test]
    fn timing_average_accumulates() {
        let s = source().update_timing(2.0);
        assert_eq!(
            s.metadata.get("avg_duration_secs").and_then(|v| v.as_f64()),
            Some(2.0)
        );
        let s = s.record_success(0).update_timing(4.0);
        let avg = s
            .metadata
            .get("avg_duration_secs")
            .and_then(|v| v.as_f64())
            .unwrap();
        assert!(avg > 2.0 && avg < 4.0);
    }
}
