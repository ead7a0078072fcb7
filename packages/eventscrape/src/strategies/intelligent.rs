//! Adaptive model-assisted extraction.
//!
//! Phase A asks a completion model what events the page contains and
//! how they are structured. Phase B asks it to codify that structure
//! into a selector configuration a deterministic run can use next time.
//! Model failures degrade, never crash: an unusable response becomes a
//! warning on an otherwise successful report, and only transport-level
//! failures (fetch, completion endpoint) make the run fail.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::dates::parse_event_datetime;
use crate::strategies::html::{extract_from_page, resolve_url};
use crate::strategies::prompts;
use crate::strategies::response::{parse_llm_json, CandidateEvent, GeneratedMethod, PatternAnalysis};
use crate::traits::{CompletionClient, ConfigField, ConfigKind, PageFetcher, Scraper};
use crate::types::{EventRecord, ScrapeReport, Source, SourceConfig, SourceType};

const DISCOVERY_TEMPERATURE: f32 = 0.3;
const CODIFICATION_TEMPERATURE: f32 = 0.2;

/// Two-phase discovery and codification strategy.
pub struct IntelligentScraper {
    fetcher: Arc<dyn PageFetcher>,
    completion: Arc<dyn CompletionClient>,
}

impl IntelligentScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>, completion: Arc<dyn CompletionClient>) -> Self {
        Self { fetcher, completion }
    }

    async fn discover(&self, url: &str, html: &str) -> Result<Option<PatternAnalysis>, String> {
        let prompt = prompts::discovery_prompt(url, html);
        let response = self
            .completion
            .complete(prompts::discovery_instruction(), &prompt, DISCOVERY_TEMPERATURE)
            .await
            .map_err(|e| format!("discovery request failed: {e}"))?;

        Ok(parse_llm_json::<PatternAnalysis>(&response))
    }

    async fn codify(
        &self,
        url: &str,
        html: &str,
        analysis: &PatternAnalysis,
    ) -> Result<Option<GeneratedMethod>, String> {
        let notes = analysis
            .patterns
            .clone()
            .or_else(|| analysis.event_type.clone())
            .unwrap_or_else(|| "no prior notes".to_string());
        let found_events = serde_json::to_string(&analysis.events_found)
            .unwrap_or_else(|_| "[]".to_string());
        let prompt = prompts::codification_prompt(url, html, &notes, &found_events);
        let response = self
            .completion
            .complete(
                prompts::codification_instruction(),
                &prompt,
                CODIFICATION_TEMPERATURE,
            )
            .await
            .map_err(|e| format!("codification request failed: {e}"))?;

        Ok(parse_llm_json::<GeneratedMethod>(&response))
    }
}

#[async_trait]
impl Scraper for IntelligentScraper {
    fn name(&self) -> &str {
        "intelligent"
    }

    fn can_handle(&self, source: &Source) -> bool {
        source.source_type == SourceType::Adaptive
    }

    async fn scrape(&self, source: &Source) -> ScrapeReport {
        let started = Instant::now();
        let mut report = ScrapeReport::success(SourceType::Adaptive);

        let html = match self.fetcher.fetch(&source.url).await {
            Ok(html) => html,
            Err(err) => {
                warn!(url = %source.url, error = %err, "page fetch failed");
                let mut report = ScrapeReport::failure(
                    SourceType::Adaptive,
                    format!("failed to fetch {}: {err}", source.url),
                );
                report.set_duration(started.elapsed().as_secs_f64());
                return report;
            }
        };

        // Phase A: what does the page contain?
        let analysis = match self.discover(&source.url, &html).await {
            Ok(Some(analysis)) => analysis,
            Ok(None) => {
                report.add_warning("no usable event pattern found in model response".to_string());
                report.message = Some("discovery produced no usable pattern".to_string());
                report.set_duration(started.elapsed().as_secs_f64());
                return report;
            }
            Err(err) => {
                let mut report = ScrapeReport::failure(SourceType::Adaptive, err);
                report.set_duration(started.elapsed().as_secs_f64());
                return report;
            }
        };

        if !analysis.has_events {
            report.message = Some("page does not appear to contain events".to_string());
            report.insert_metadata("has_events", serde_json::json!(false));
            report.set_duration(started.elapsed().as_secs_f64());
            return report;
        }

        // Events the model read directly off the page.
        for candidate in &analysis.events_found {
            match candidate_to_record(candidate, &source.url) {
                Some(record) => report.add_event(record),
                None => report.add_warning("skipped a candidate event with no title".to_string()),
            }
        }

        // No inline events but proposed selectors: run them ourselves.
        if report.event_count() == 0 {
            if let Some(config) = analysis.selectors.as_ref().and_then(|s| s.to_config()) {
                debug!(url = %source.url, "running discovered selectors");
                report.merge(extract_from_page(&source.url, &html, &config));
            }
        }

        // Phase B: codify into a reusable configuration.
        match self.codify(&source.url, &html, &analysis).await {
            Ok(Some(method)) if method.is_usable() => {
                if let Some(config) = method.to_config() {
                    if let Ok(value) = serde_json::to_value(&config) {
                        report.insert_metadata("generated_config", value);
                    }
                    if let Some(notes) = &method.notes {
                        report.insert_metadata("generated_notes", serde_json::json!(notes));
                    }
                }
            }
            Ok(_) => {
                // Fall back to the Phase A selectors if codification
                // produced nothing usable.
                if let Some(config) = analysis.selectors.as_ref().and_then(|s| s.to_config()) {
                    if let Ok(value) = serde_json::to_value(&config) {
                        report.insert_metadata("generated_config", value);
                    }
                }
                report.add_warning("codification produced no usable method".to_string());
            }
            Err(err) => {
                report.add_error(err);
            }
        }

        if report.metadata.contains_key("generated_config") {
            report.insert_metadata("ai_generated", serde_json::json!(true));
            report.insert_metadata(
                "generated_by",
                serde_json::json!(format!("{}/{}", self.name(), self.version())),
            );
            report.insert_metadata("discovery_url", serde_json::json!(source.url));
            if let Some(event_type) = &analysis.event_type {
                report.insert_metadata("pattern_type", serde_json::json!(event_type));
            }
        }

        report.set_duration(started.elapsed().as_secs_f64());
        report.message = Some(format!("discovered {} events", report.event_count()));

        info!(
            source = %source.name,
            events = report.event_count(),
            codified = report.metadata.contains_key("generated_config"),
            success = report.success,
            "adaptive scrape finished"
        );
        report
    }

    async fn test_source(&self, source: &Source) -> bool {
        self.fetcher.fetch(&source.url).await.is_ok()
    }

    fn validate_configuration(&self, _config: &SourceConfig) -> Vec<String> {
        // Adaptive sources need no stored selectors; the configuration
        // is produced, not consumed.
        Vec::new()
    }

    fn configuration_schema(&self) -> Vec<ConfigField> {
        vec![ConfigField::new(
            "intelligent_time",
            ConfigKind::Boolean,
            "infer times for date-only events",
        )]
    }
}

/// Normalize one model-reported event. Title is mandatory; date and
/// time strings are combined before parsing; links resolve against
/// the listing page.
fn candidate_to_record(candidate: &CandidateEvent, page_url: &str) -> Option<EventRecord> {
    let title = candidate
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    let mut record = EventRecord::new(title, page_url);
    record.description = candidate.description.clone();
    record.location = candidate.location.clone();

    if let Some(link) = &candidate.link {
        record.url = resolve_url(page_url, link);
    }

    let date_text = match (&candidate.date, &candidate.time) {
        (Some(date), Some(time)) => Some(format!("{} {}", date.trim(), time.trim())),
        (Some(date), None) => Some(date.trim().to_string()),
        _ => None,
    };
    if let Some(text) = date_text {
        record.start = parse_event_datetime(&text).or_else(|| {
            // Retry with the date alone when the time fragment does not parse.
            candidate
                .date
                .as_deref()
                .and_then(parse_event_datetime)
        });
    }

    Some(record)
}
