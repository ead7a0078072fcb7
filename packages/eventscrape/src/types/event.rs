//! The normalized record extracted from a page.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Review status of an extracted record. Everything the engine produces
/// starts out pending moderation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for EventStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// One extracted event listing.
///
/// Start and end times are naive: they record what the page said, which
/// almost never carries a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start: Option<NaiveDateTime>,
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    /// The page this record was extracted from
    pub source_url: String,
    #[serde(default)]
    pub status: EventStatus,
}

impl EventRecord {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            start: None,
            end: None,
            location: None,
            venue: None,
            address: None,
            url: None,
            image_url: None,
            price: None,
            contact_phone: None,
            contact_email: None,
            source_url: source_url.into(),
            status: EventStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_pending() {
        let record = EventRecord::new("Jazz Night", "https://x.test/events");
        assert_eq!(record.status, EventStatus::Pending);
        assert!(record.start.is_none());
    }

    #[test]
    fn status_serializes_lowercase() {
        let record = EventRecord::new("Jazz Night", "https://x.test/events");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "pending");
    }
}
