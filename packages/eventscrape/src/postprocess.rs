//! Time inference for date-only events.
//!
//! Listing pages frequently publish a date with no time. When a source
//! opts in, a start time is inferred from keywords in the title and
//! description, and an end time from the time of day.

use chrono::{NaiveDateTime, NaiveTime, Timelike};

use crate::dates::is_date_only;
use crate::types::EventRecord;

/// Keyword to start-hour table, checked in order. First match wins,
/// so more specific phrases come before generic ones.
const START_TIMES: &[(&str, u32, u32)] = &[
    ("farmers market", 8, 0),
    ("breakfast", 8, 0),
    ("sunrise", 6, 0),
    ("brunch", 10, 0),
    ("morning", 9, 0),
    ("lunch", 12, 0),
    ("matinee", 14, 0),
    ("afternoon", 14, 0),
    ("happy hour", 17, 0),
    ("dinner", 18, 0),
    ("trivia", 19, 0),
    ("bingo", 19, 0),
    ("comedy", 20, 0),
    ("live music", 19, 0),
    ("concert", 19, 0),
    ("show", 19, 0),
    ("nightlife", 20, 0),
    ("night", 20, 0),
    ("party", 20, 0),
    ("market", 9, 0),
    ("festival", 10, 0),
    ("fair", 10, 0),
    ("tasting", 12, 0),
    ("wine", 12, 0),
    ("brewery", 14, 0),
    ("brewing", 14, 0),
    ("tour", 10, 0),
];

const DEFAULT_START: (u32, u32) = (10, 0);
const LATEST_END_HOUR: u32 = 23;

/// Fill in start and end times for records that only carried a date.
pub fn infer_times(record: &mut EventRecord) {
    let needs_inference = match record.start {
        Some(start) => is_date_only(&start),
        None => return,
    };
    if !needs_inference {
        return;
    }

    let haystack = format!(
        "{} {}",
        record.title.to_lowercase(),
        record.description.as_deref().unwrap_or("").to_lowercase()
    );

    let (hour, minute) = START_TIMES
        .iter()
        .find(|(keyword, _, _)| haystack.contains(keyword))
        .map(|&(_, h, m)| (h, m))
        .unwrap_or(DEFAULT_START);

    if let Some(start) = record.start {
        let date = start.date();
        if let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) {
            let start = NaiveDateTime::new(date, time);
            record.start = Some(start);
            if record.end.is_none() || record.end.map(|e| is_date_only(&e)).unwrap_or(false) {
                record.end = Some(default_end(start));
            }
        }
    }
}

/// Morning events run three hours, afternoon four, evening three,
/// never past 23:00 the same day.
fn default_end(start: NaiveDateTime) -> NaiveDateTime {
    let duration_hours = match start.hour() {
        h if h < 12 => 3,
        h if h < 17 => 4,
        _ => 3,
    };
    let end_hour = (start.hour() + duration_hours).min(LATEST_END_HOUR);
    start
        .with_hour(end_hour)
        .unwrap_or(start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date_only_record(title: &str) -> EventRecord {
        let mut record = EventRecord::new(title, "https://example.org/events");
        record.start = NaiveDate::from_ymd_opt(2026, 9, 12)
            .and_then(|d| d.and_hms_opt(0, 0, 0));
        record
    }

    #[test]
    fn concert_gets_evening_times() {
        let mut record = date_only_record("Jazz Concert in the Park");
        infer_times(&mut record);
        assert_eq!(record.start.unwrap().hour(), 19);
        assert_eq!(record.end.unwrap().hour(), 22);
    }

    #[test]
    fn breakfast_gets_morning_times() {
        let mut record = date_only_record("Pancake Breakfast Fundraiser");
        infer_times(&mut record);
        assert_eq!(record.start.unwrap().hour(), 8);
        assert_eq!(record.end.unwrap().hour(), 11);
    }

    #[test]
    fn afternoon_runs_four_hours() {
        let mut record = date_only_record("Matinee Performance");
        infer_times(&mut record);
        assert_eq!(record.start.unwrap().hour(), 14);
        assert_eq!(record.end.unwrap().hour(), 18);
    }

    #[test]
    fn unknown_keywords_use_the_default() {
        let mut record = date_only_record("Quarterly Gathering");
        infer_times(&mut record);
        assert_eq!(record.start.unwrap().hour(), 10);
        assert_eq!(record.end.unwrap().hour(), 13);
    }

    #[test]
    fn end_time_is_capped() {
        let mut record = date_only_record("Late Night Party");
        infer_times(&mut record);
        assert_eq!(record.start.unwrap().hour(), 20);
        assert_eq!(record.end.unwrap().hour(), 23);
    }

    #[test]
    fn explicit_times_are_untouched() {
        let mut record = EventRecord::new("Concert", "https://example.org");
        record.start = NaiveDate::from_ymd_opt(2026, 9, 12)
            .and_then(|d| d.and_hms_opt(18, 30, 0));
        infer_times(&mut record);
        assert_eq!(record.start.unwrap().hour(), 18);
        assert_eq!(record.start.unwrap().minute(), 30);
        assert!(record.end.is_none());
    }

    #[test]
    fn description_keywords_count() {
        let mut record = date_only_record("Annual Event");
        record.description = Some("Join us for a community farmers market".into());
        infer_times(&mut record);
        assert_eq!(record.start.unwrap().hour(), 8);
    }
}
