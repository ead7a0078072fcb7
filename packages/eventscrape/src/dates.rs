//! Best-effort parsing of scraped date/time text.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Datetime formats tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%B %d, %Y %I:%M %p",
    "%b %d, %Y %I:%M %p",
    "%B %d, %Y %H:%M",
];

/// Date-only formats tried in order; these parse to midnight.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%A, %B %d, %Y",
];

/// Parse a scraped date/time string into a naive timestamp.
///
/// Tries RFC 3339 first (the `datetime` attribute form), then a fixed list
/// of datetime formats, then date-only formats (which land on midnight).
/// Returns `None` when nothing matches; callers treat that as a missing
/// field, never an error.
pub fn parse_event_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    None
}

/// True when a timestamp sits exactly on midnight, the marker for a
/// date-only source string.
pub fn is_date_only(dt: &NaiveDateTime) -> bool {
    use chrono::Timelike;
    dt.hour() == 0 && dt.minute() == 0 && dt.second() == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_forms() {
        assert_eq!(
            parse_event_datetime("2026-09-12 19:30:00").unwrap().to_string(),
            "2026-09-12 19:30:00"
        );
        assert_eq!(
            parse_event_datetime("2026-09-12T19:30").unwrap().to_string(),
            "2026-09-12 19:30:00"
        );
        assert_eq!(
            parse_event_datetime("2026-09-12T19:30:00-07:00")
                .unwrap()
                .to_string(),
            "2026-09-12 19:30:00"
        );
    }

    #[test]
    fn parses_human_forms() {
        assert_eq!(
            parse_event_datetime("September 12, 2026 7:30 PM")
                .unwrap()
                .to_string(),
            "2026-09-12 19:30:00"
        );
        assert_eq!(
            parse_event_datetime("Sep 12, 2026").unwrap().to_string(),
            "2026-09-12 00:00:00"
        );
        assert_eq!(
            parse_event_datetime("09/12/2026").unwrap().to_string(),
            "2026-09-12 00:00:00"
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_event_datetime("every other Tuesday").is_none());
        assert!(parse_event_datetime("").is_none());
        assert!(parse_event_datetime("   ").is_none());
    }

    #[test]
    fn date_only_detection() {
        let midnight = parse_event_datetime("2026-09-12").unwrap();
        let evening = parse_event_datetime("2026-09-12 19:00:00").unwrap();
        assert!(is_date_only(&midnight));
        assert!(!is_date_only(&evening));
    }
}
