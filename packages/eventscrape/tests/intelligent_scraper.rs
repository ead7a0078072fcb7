//! Integration tests for the adaptive discovery strategy.
//!
//! These drive the full two-phase flow against a mock completion
//! client: discovery, inline event extraction, selector fallback
//! extraction, and codification into a reusable configuration.

use std::sync::Arc;

use eventscrape::testing::{MockCompletion, MockFetcher};
use eventscrape::types::SourceConfig;
use eventscrape::{IntelligentScraper, Scraper, Source, SourceType};

const PAGE_URL: &str = "https://example.org/happenings";

const PAGE: &str = r#"
    <html><body>
        <div class="happening">
            <h2>Fall Festival</h2>
            <span class="when">2026-09-12</span>
            <a href="/events/fall-festival">More</a>
        </div>
        <div class="happening">
            <h2>Harvest Dinner</h2>
            <span class="when">2026-09-19</span>
            <a href="/events/harvest-dinner">More</a>
        </div>
    </body></html>
"#;

fn adaptive_source() -> Source {
    Source::new("Community Page", PAGE_URL, SourceType::Adaptive)
}

fn scraper_with(responses: MockCompletion) -> (IntelligentScraper, Arc<MockCompletion>) {
    let fetcher = Arc::new(MockFetcher::new().with_page(PAGE_URL, PAGE));
    let completion = Arc::new(responses);
    (
        IntelligentScraper::new(fetcher, completion.clone()),
        completion,
    )
}

const DISCOVERY_WITH_EVENTS: &str = r#"```json
{
  "has_events": true,
  "event_type": "community festival",
  "events_found": [
    {"title": "Fall Festival", "date": "2026-09-12", "time": "10:00", "link": "/events/fall-festival"},
    {"title": "Harvest Dinner", "date": "2026-09-19", "time": null, "link": "/events/harvest-dinner"}
  ],
  "event_links": [],
  "selectors": {
    "event_container": ".happening",
    "title": "h2",
    "date": ".when",
    "link": "a"
  },
  "patterns": "one .happening block per event"
}
```"#;

const CODIFICATION: &str = r#"{
  "container": ".happening",
  "fields": {
    "title": "h2",
    "date": ".when",
    "url": "a"
  },
  "pagination": null,
  "date_format": null,
  "url_template": null,
  "notes": "dates are ISO formatted"
}"#;

#[tokio::test]
async fn full_two_phase_flow() {
    let (scraper, completion) = scraper_with(
        MockCompletion::new()
            .with_response(DISCOVERY_WITH_EVENTS)
            .with_response(CODIFICATION),
    );

    let report = scraper.scrape(&adaptive_source()).await;

    assert!(report.success);
    assert_eq!(report.event_count(), 2);
    assert_eq!(report.events[0].title, "Fall Festival");
    assert_eq!(
        report.events[0].url.as_deref(),
        Some("https://example.org/events/fall-festival")
    );

    // Codified configuration is ready for a deterministic rerun.
    let config: SourceConfig =
        serde_json::from_value(report.metadata["generated_config"].clone()).unwrap();
    assert_eq!(config.container.as_deref(), Some(".happening"));
    assert!(config.fields.contains_key("title"));
    assert_eq!(report.metadata["ai_generated"], serde_json::json!(true));
    assert_eq!(
        report.metadata["generated_by"],
        serde_json::json!("intelligent/1.0")
    );
    assert_eq!(
        report.metadata["pattern_type"],
        serde_json::json!("community festival")
    );

    // Two completion calls at the documented temperatures, and the
    // codification prompt carries the discovered events.
    let calls = completion.calls();
    assert_eq!(calls.len(), 2);
    assert!((calls[0].temperature - 0.3).abs() < f32::EPSILON);
    assert!((calls[1].temperature - 0.2).abs() < f32::EPSILON);
    assert!(calls[1].prompt.contains("Fall Festival"));
    assert!(calls[1].prompt.contains("Harvest Dinner"));
}

#[tokio::test]
async fn test_source_fetches_without_completion_calls() {
    let fetcher = Arc::new(MockFetcher::new().with_page(PAGE_URL, PAGE));
    let completion = Arc::new(MockCompletion::new());
    let scraper = IntelligentScraper::new(fetcher.clone(), completion.clone());

    assert!(scraper.test_source(&adaptive_source()).await);
    assert_eq!(fetcher.calls(), vec![PAGE_URL]);
    assert!(completion.calls().is_empty());

    let failing = Arc::new(MockFetcher::new().with_failure(PAGE_URL));
    let scraper = IntelligentScraper::new(failing, completion.clone());
    assert!(!scraper.test_source(&adaptive_source()).await);
    assert!(completion.calls().is_empty());
}

#[tokio::test]
async fn selectors_are_run_when_no_inline_events_are_given() {
    let discovery = r#"{
        "has_events": true,
        "event_type": "community festival",
        "events_found": [],
        "selectors": {"event_container": ".happening", "title": "h2", "date": ".when", "link": "a"}
    }"#;
    let (scraper, _) = scraper_with(
        MockCompletion::new()
            .with_response(discovery)
            .with_response(CODIFICATION),
    );

    let report = scraper.scrape(&adaptive_source()).await;

    assert!(report.success);
    assert_eq!(report.event_count(), 2);
    assert_eq!(report.events[1].title, "Harvest Dinner");
}

#[tokio::test]
async fn unparseable_discovery_is_a_warning_not_a_failure() {
    let (scraper, completion) = scraper_with(
        MockCompletion::new().with_response("I'm sorry, I can't see any structure here."),
    );

    let report = scraper.scrape(&adaptive_source()).await;

    assert!(report.success);
    assert_eq!(report.event_count(), 0);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("no usable event pattern"));
    // Phase B never runs when discovery yields nothing.
    assert_eq!(completion.calls().len(), 1);
}

#[tokio::test]
async fn no_events_on_page_is_a_clean_success() {
    let (scraper, completion) =
        scraper_with(MockCompletion::new().with_response(r#"{"has_events": false}"#));

    let report = scraper.scrape(&adaptive_source()).await;

    assert!(report.success);
    assert_eq!(report.event_count(), 0);
    assert_eq!(report.metadata["has_events"], serde_json::json!(false));
    assert_eq!(completion.calls().len(), 1);
}

#[tokio::test]
async fn codification_failure_falls_back_to_discovery_selectors() {
    let (scraper, _) = scraper_with(
        MockCompletion::new()
            .with_response(DISCOVERY_WITH_EVENTS)
            .with_response("sorry, no JSON today"),
    );

    let report = scraper.scrape(&adaptive_source()).await;

    assert!(report.success);
    assert_eq!(report.event_count(), 2);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("codification produced no usable method")));

    let config: SourceConfig =
        serde_json::from_value(report.metadata["generated_config"].clone()).unwrap();
    assert_eq!(config.container.as_deref(), Some(".happening"));
}

#[tokio::test]
async fn completion_transport_failure_fails_the_run() {
    let (scraper, _) = scraper_with(MockCompletion::new().failing());

    let report = scraper.scrape(&adaptive_source()).await;

    assert!(!report.success);
    assert!(report.errors[0].contains("discovery request failed"));
}

#[tokio::test]
async fn fetch_failure_fails_the_run() {
    let fetcher = Arc::new(MockFetcher::new().with_failure(PAGE_URL));
    let completion = Arc::new(MockCompletion::new());
    let scraper = IntelligentScraper::new(fetcher, completion.clone());

    let report = scraper.scrape(&adaptive_source()).await;

    assert!(!report.success);
    assert!(report.errors[0].contains(PAGE_URL));
    assert!(completion.calls().is_empty());
}
