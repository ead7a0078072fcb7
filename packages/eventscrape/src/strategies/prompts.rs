//! Prompt builders for the two-phase adaptive strategy.

/// Cap on page content sent to the model. Pages are truncated, not
/// rejected, past this point.
pub const MAX_CONTENT_LEN: usize = 30_000;

pub fn truncate_content(html: &str) -> &str {
    if html.len() <= MAX_CONTENT_LEN {
        return html;
    }
    // Cut on a char boundary at or below the cap.
    let mut end = MAX_CONTENT_LEN;
    while !html.is_char_boundary(end) {
        end -= 1;
    }
    &html[..end]
}

pub fn discovery_instruction() -> &'static str {
    "You are an expert at analyzing web pages to find event listings. \
     Cast a wide net: calendars, concerts, classes, meetings, markets, \
     festivals, fundraisers, and community gatherings all count as events. \
     Respond with JSON only, no commentary."
}

/// Phase A: describe the page and ask whether it lists events, what
/// they look like, and which selectors would extract them.
pub fn discovery_prompt(url: &str, html: &str) -> String {
    format!(
        "Analyze this web page and determine whether it contains event listings.\n\
         \n\
         URL: {url}\n\
         \n\
         Respond with JSON in exactly this shape:\n\
         {{\n\
         \x20 \"has_events\": true or false,\n\
         \x20 \"event_type\": \"short description of the kind of events\",\n\
         \x20 \"events_found\": [\n\
         \x20   {{\"title\": \"...\", \"date\": \"...\", \"time\": \"...\", \"location\": \"...\", \"description\": \"...\", \"link\": \"...\"}}\n\
         \x20 ],\n\
         \x20 \"event_links\": [\"URLs of individual event detail pages\"],\n\
         \x20 \"selectors\": {{\n\
         \x20   \"event_container\": \"CSS selector for one event's wrapper\",\n\
         \x20   \"title\": \"...\", \"date\": \"...\", \"location\": \"...\", \"link\": \"...\"\n\
         \x20 }},\n\
         \x20 \"patterns\": \"free-text notes on how events are structured\"\n\
         }}\n\
         \n\
         List every event you can read directly from the page in events_found. \
         Use null for anything you cannot determine.\n\
         \n\
         PAGE CONTENT:\n{content}",
        url = url,
        content = truncate_content(html),
    )
}

pub fn codification_instruction() -> &'static str {
    "You are an expert at writing CSS selectors for web scraping. \
     Given a page and a prior structural analysis, produce a reusable \
     extraction method. Respond with JSON only, no commentary."
}

/// Phase B: turn the Phase A analysis into a reusable selector config.
/// `found_events` is the JSON-serialized candidate events from the
/// discovery phase, so the generated selectors must reproduce them.
pub fn codification_prompt(url: &str, html: &str, analysis_notes: &str, found_events: &str) -> String {
    format!(
        "Write a reusable extraction method for the events on this page.\n\
         \n\
         URL: {url}\n\
         Prior analysis: {notes}\n\
         Events already identified on this page: {events}\n\
         \n\
         Respond with JSON in exactly this shape:\n\
         {{\n\
         \x20 \"container\": \"CSS selector matching one event's wrapper\",\n\
         \x20 \"fields\": {{\n\
         \x20   \"title\": \"selector or [\\\"primary\\\", \\\"fallback\\\"]\",\n\
         \x20   \"date\": \"...\", \"location\": \"...\", \"description\": \"...\",\n\
         \x20   \"url\": \"...\", \"image\": \"...\"\n\
         \x20 }},\n\
         \x20 \"pagination\": {{\"enabled\": false, \"type\": \"query_param\", \"param\": \"page\"}} or null,\n\
         \x20 \"date_format\": \"strftime format of the date text, or null\",\n\
         \x20 \"url_template\": null,\n\
         \x20 \"notes\": \"anything the operator should know\"\n\
         }}\n\
         \n\
         The container and a title selector are mandatory. The selectors \
         must reproduce the identified events above. Prefer stable class \
         names over positional selectors. Give fallback arrays where the \
         page is inconsistent.\n\
         \n\
         PAGE CONTENT:\n{content}",
        url = url,
        notes = analysis_notes,
        events = found_events,
        content = truncate_content(html),
    )
}
