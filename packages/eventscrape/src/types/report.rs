//! Accumulated outcome of one scrape attempt.
//!
//! A [`ScrapeReport`] is built per page, merged into a per-source report,
//! and handed to the orchestrator. Errors are hard failures and flip the
//! success flag; warnings are soft ("looked and found nothing") and never
//! do.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::event::EventRecord;
use crate::types::source::SourceType;

/// Mergeable result of a scrape attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub success: bool,
    pub source_type: SourceType,
    #[serde(default)]
    pub message: Option<String>,
    /// Accumulated wall-clock seconds
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ScrapeReport {
    /// A fresh successful (so far) report.
    pub fn success(source_type: SourceType) -> Self {
        Self {
            success: true,
            source_type,
            message: None,
            duration: 0.0,
            events: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    /// A report that failed outright.
    pub fn failure(source_type: SourceType, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            source_type,
            message: Some(message.clone()),
            duration: 0.0,
            events: Vec::new(),
            errors: vec![message],
            warnings: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn add_event(&mut self, event: EventRecord) {
        self.events.push(event);
    }

    /// Record a hard failure. Errors mark the attempt unsuccessful.
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.success = false;
    }

    /// Record a soft issue. Warnings never affect the success flag.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn insert_metadata(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata.insert(key.into(), value);
    }

    pub fn set_duration(&mut self, seconds: f64) {
        self.duration = seconds;
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Fold another report into this one.
    ///
    /// Records, errors and warnings concatenate in call order; duration
    /// sums; success is the logical AND; metadata is last-write-wins per
    /// key.
    pub fn merge(&mut self, other: ScrapeReport) {
        self.events.extend(other.events);
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.metadata.extend(other.metadata);
        self.duration += other.duration;
        self.success = self.success && other.success;
    }

    /// Summary figures for logging and the admin surface.
    pub fn statistics(&self) -> serde_json::Value {
        serde_json::json!({
            "success": self.success,
            "events_found": self.events.len(),
            "errors": self.errors.len(),
            "warnings": self.warnings.len(),
            "duration": self.duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn report(
        success: bool,
        events: &[&str],
        errors: &[&str],
        warnings: &[&str],
        duration: f64,
    ) -> ScrapeReport {
        let mut r = ScrapeReport::success(SourceType::Deterministic);
        r.success = success;
        for title in events {
            r.events
                .push(EventRecord::new(*title, "https://x.test/events"));
        }
        r.errors = errors.iter().map(|s| s.to_string()).collect();
        r.warnings = warnings.iter().map(|s| s.to_string()).collect();
        r.duration = duration;
        r
    }

    #[test]
    fn merge_concatenates_and_sums() {
        let mut a = report(true, &["A"], &["e1"], &["w1"], 1.5);
        let b = report(true, &["B", "C"], &[], &["w2"], 2.5);
        a.merge(b);

        assert!(a.success);
        assert_eq!(
            a.events.iter().map(|e| e.title.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
        assert_eq!(a.errors, vec!["e1"]);
        assert_eq!(a.warnings, vec!["w1", "w2"]);
        assert_eq!(a.duration, 4.0);
    }

    #[test]
    fn merge_ands_success() {
        let mut a = report(true, &[], &[], &[], 0.0);
        a.merge(report(false, &[], &["boom"], &[], 0.0));
        assert!(!a.success);

        let mut b = report(false, &[], &["boom"], &[], 0.0);
        b.merge(report(true, &[], &[], &[], 0.0));
        assert!(!b.success);
    }

    #[test]
    fn add_error_flips_success() {
        let mut r = ScrapeReport::success(SourceType::Deterministic);
        r.add_warning("empty page");
        assert!(r.success);
        r.add_error("fetch failed");
        assert!(!r.success);
    }

    #[test]
    fn metadata_merge_is_last_write_wins() {
        let mut a = ScrapeReport::success(SourceType::Deterministic);
        a.insert_metadata("k", serde_json::json!("old"));
        let mut b = ScrapeReport::success(SourceType::Deterministic);
        b.insert_metadata("k", serde_json::json!("new"));
        a.merge(b);
        assert_eq!(a.metadata.get("k"), Some(&serde_json::json!("new")));
    }

    fn arb_report() -> impl Strategy<Value = ScrapeReport> {
        (
            any::<bool>(),
            prop::collection::vec("[a-z]{1,8}", 0..4),
            prop::collection::vec("[a-z]{1,8}", 0..4),
            prop::collection::vec("[a-z]{1,8}", 0..4),
            0.0f64..100.0,
        )
            .prop_map(|(success, events, errors, warnings, duration)| {
                let events: Vec<&str> = events.iter().map(|s| s.as_str()).collect();
                let errors: Vec<&str> = errors.iter().map(|s| s.as_str()).collect();
                let warnings: Vec<&str> = warnings.iter().map(|s| s.as_str()).collect();
                report(success, &events, &errors, &warnings, duration)
            })
    }

    proptest! {
        #[test]
        fn merge_is_associative(a in arb_report(), b in arb_report(), c in arb_report()) {
            let mut left = a.clone();
            left.merge(b.clone());
            left.merge(c.clone());

            let mut bc = b.clone();
            bc.merge(c.clone());
            let mut right = a.clone();
            right.merge(bc);

            prop_assert_eq!(left.success, right.success);
            prop_assert_eq!(left.errors, right.errors);
            prop_assert_eq!(left.warnings, right.warnings);
            let left_titles: Vec<_> = left.events.iter().map(|e| &e.title).collect();
            let right_titles: Vec<_> = right.events.iter().map(|e| &e.title).collect();
            prop_assert_eq!(left_titles, right_titles);
        }
    }
}
