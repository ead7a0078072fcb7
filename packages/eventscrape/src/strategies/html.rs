//! Deterministic selector-driven extraction.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use regex::Regex;
use scraper::ElementRef;
use std::sync::OnceLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::dates::parse_event_datetime;
use crate::dom::{clean_text, compile_selector, parse_document, select_in};
use crate::postprocess::infer_times;
use crate::traits::{ConfigField, ConfigKind, PageFetcher, Scraper};
use crate::types::{EventRecord, ScrapeReport, Source, SourceConfig, SourceType};

/// Runs a stored selector configuration against a source's pages.
pub struct HtmlScraper {
    fetcher: Arc<dyn PageFetcher>,
}

impl HtmlScraper {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl Scraper for HtmlScraper {
    fn name(&self) -> &str {
        "html"
    }

    fn can_handle(&self, source: &Source) -> bool {
        source.source_type == SourceType::Deterministic
    }

    async fn scrape(&self, source: &Source) -> ScrapeReport {
        let started = Instant::now();
        let mut report = ScrapeReport::success(SourceType::Deterministic);

        let problems = self.validate_configuration(&source.config);
        if !problems.is_empty() {
            let mut report = ScrapeReport::failure(
                SourceType::Deterministic,
                format!("invalid configuration: {}", problems.join("; ")),
            );
            report.set_duration(started.elapsed().as_secs_f64());
            return report;
        }

        let mut urls = vec![source.url.clone()];
        if let Some(pagination) = &source.config.pagination {
            urls.extend(pagination.page_urls(&source.url));
        }

        let wait = source.config.wait_time_ms;
        let page_count = urls.len();
        let mut pages_fetched = 0u32;

        for (index, url) in urls.iter().enumerate() {
            match self.fetcher.fetch(url).await {
                Ok(html) => {
                    pages_fetched += 1;
                    let page_report = extract_from_page(url, &html, &source.config);
                    report.merge(page_report);
                }
                Err(err) => {
                    warn!(url = %url, error = %err, "page fetch failed");
                    report.add_error(format!("failed to fetch {url}: {err}"));
                }
            }
            // Politeness delay between pages, skipped after the last.
            if wait > 0 && index + 1 < page_count {
                tokio::time::sleep(std::time::Duration::from_millis(wait)).await;
            }
        }

        report.insert_metadata("pages_fetched", serde_json::json!(pages_fetched));
        report.set_duration(started.elapsed().as_secs_f64());
        report.message = Some(format!(
            "extracted {} events from {} of {} pages",
            report.event_count(),
            pages_fetched,
            page_count
        ));

        info!(
            source = %source.name,
            events = report.event_count(),
            pages = pages_fetched,
            success = report.success,
            "deterministic scrape finished"
        );
        report
    }

    async fn test_source(&self, source: &Source) -> bool {
        match self.fetcher.fetch(&source.url).await {
            Ok(html) => match source.config.container.as_deref().and_then(compile_selector) {
                Some(selector) => parse_document(&html).select(&selector).next().is_some(),
                None => true,
            },
            Err(err) => {
                debug!(url = %source.url, error = %err, "source probe failed");
                false
            }
        }
    }

    fn validate_configuration(&self, config: &SourceConfig) -> Vec<String> {
        let mut problems = Vec::new();
        if config.container.as_deref().map_or(true, |c| c.trim().is_empty()) {
            problems.push("container selector is required".to_string());
        }
        if !config.fields.contains_key("title") {
            problems.push("a title field selector is required".to_string());
        }
        if let Some(pagination) = &config.pagination {
            if pagination.enabled
                && pagination.mode == crate::types::PaginationMode::Template
                && pagination.template.is_none()
            {
                problems.push("template pagination requires a template".to_string());
            }
        }
        problems
    }

    fn configuration_schema(&self) -> Vec<ConfigField> {
        vec![
            ConfigField::new("container", ConfigKind::Text, "selector matching one event's wrapper")
                .required(),
            ConfigField::new("fields", ConfigKind::Map, "field name to selector, or fallback list")
                .required(),
            ConfigField::new("pagination", ConfigKind::Map, "how listing pages continue"),
            ConfigField::new("wait_time_ms", ConfigKind::Integer, "delay between page fetches"),
            ConfigField::new("date_format", ConfigKind::Text, "strftime format of date text"),
            ConfigField::new(
                "intelligent_time",
                ConfigKind::Boolean,
                "infer times for date-only events",
            ),
        ]
    }
}

/// Extract events from one fetched page. Shared with the adaptive
/// strategy, which runs it over model-proposed configurations.
pub fn extract_from_page(url: &str, html: &str, config: &SourceConfig) -> ScrapeReport {
    let mut report = ScrapeReport::success(SourceType::Deterministic);
    let document = parse_document(html);

    let container_raw = match &config.container {
        Some(c) => c.as_str(),
        None => {
            report.add_error("no container selector configured".to_string());
            return report;
        }
    };
    let container = match compile_selector(container_raw) {
        Some(selector) => selector,
        None => {
            report.add_warning(format!(
                "container selector could not be compiled: {container_raw}"
            ));
            return report;
        }
    };

    let containers: Vec<ElementRef> = document.select(&container).collect();
    if containers.is_empty() {
        report.add_warning(format!(
            "no event containers found with selector: {container_raw}"
        ));
        return report;
    }
    debug!(url = %url, containers = containers.len(), "matched event containers");

    for element in containers {
        let mut values: Vec<(String, String)> = Vec::new();
        for (field, selector) in &config.fields {
            let mut found = None;
            for candidate in selector.candidates() {
                if let Some(compiled) = compile_selector(candidate) {
                    if let Some(target) = select_in(element, &compiled).into_iter().next() {
                        if let Some(value) = extract_field_value(field, target) {
                            if !value.is_empty() {
                                found = Some(value);
                                break;
                            }
                        }
                    }
                }
            }
            if let Some(value) = found {
                values.push((field.clone(), value));
            }
        }

        match build_record(url, config, &values) {
            Some(mut record) => {
                if config.infer_times {
                    infer_times(&mut record);
                }
                report.add_event(record);
            }
            None => {
                report.add_warning("skipped an item with no extractable title".to_string());
            }
        }
    }

    report
}

/// Field-aware value extraction. Images and links live in attributes,
/// dates prefer machine-readable attributes over display text.
fn extract_field_value(field: &str, element: ElementRef<'_>) -> Option<String> {
    let name = field.to_lowercase();

    if name.contains("image") || name.contains("thumbnail") {
        return element
            .value()
            .attr("src")
            .or_else(|| element.value().attr("data-src"))
            .map(str::to_string)
            .or_else(|| background_image_url(element.value().attr("style")?));
    }

    if name == "url" || name == "link" {
        return element
            .value()
            .attr("href")
            .or_else(|| element.value().attr("data-href"))
            .or_else(|| element.value().attr("data-url"))
            .map(str::to_string);
    }

    if name.contains("date") || name.contains("time") {
        if let Some(attr) = element
            .value()
            .attr("datetime")
            .or_else(|| element.value().attr("data-date"))
            .or_else(|| element.value().attr("data-datetime"))
        {
            return Some(attr.to_string());
        }
    }

    let text = clean_text(&element.text().collect::<String>());
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn background_image_url(style: &str) -> Option<String> {
    static BG: OnceLock<Regex> = OnceLock::new();
    let bg = BG.get_or_init(|| {
        Regex::new(r#"background-image\s*:\s*url\(\s*['"]?([^'")]+)['"]?\s*\)"#).unwrap()
    });
    bg.captures(style).map(|c| c[1].to_string())
}

/// Assemble extracted field values into a record. Title is mandatory.
fn build_record(page_url: &str, config: &SourceConfig, values: &[(String, String)]) -> Option<EventRecord> {
    let get = |key: &str| {
        values
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.clone())
    };

    let title = get("title").filter(|t| !t.trim().is_empty())?;
    let mut record = EventRecord::new(title, page_url);

    record.description = get("description");
    record.location = get("location");
    record.venue = get("venue");
    record.address = get("address");
    record.price = get("price").or_else(|| get("cost"));
    record.contact_phone = get("phone").or_else(|| get("contact_phone"));
    record.contact_email = get("email").or_else(|| get("contact_email"));

    if let Some(link) = get("url").or_else(|| get("link")) {
        record.url = resolve_url(page_url, &link);
    }
    if let Some(image) = get("image").or_else(|| get("thumbnail")) {
        record.image_url = resolve_url(page_url, &image);
    }

    if let Some(date_text) = get("date").or_else(|| get("start_date")).or_else(|| get("start")) {
        record.start = parse_with_format(&date_text, config.date_format.as_deref());
    }
    if let Some(end_text) = get("end_date").or_else(|| get("end")) {
        record.end = parse_with_format(&end_text, config.date_format.as_deref());
    }

    Some(record)
}

fn parse_with_format(text: &str, format: Option<&str>) -> Option<chrono::NaiveDateTime> {
    if let Some(fmt) = format {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(text.trim(), fmt) {
            return Some(dt);
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(text.trim(), fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    parse_event_datetime(text)
}

/// Resolve a possibly relative URL against the page it came from.
pub fn resolve_url(base: &str, candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    if let Ok(absolute) = Url::parse(candidate) {
        return Some(absolute.to_string());
    }
    Url::parse(base)
        .ok()
        .and_then(|b| b.join(candidate).ok())
        .map(|u| u.to_string())
}
