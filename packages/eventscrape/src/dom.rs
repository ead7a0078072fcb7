//! Markup handling: tolerant parsing, selector translation, tree queries.
//!
//! The tree-query language is the `scraper` crate's CSS [`Selector`].
//! Configured selectors arrive in two dialects:
//!
//! - A simplified syntax: class-contains (`.name`), id equality (`#name`),
//!   attribute equality (`[attr="value"]`), descendant combination via
//!   whitespace. Class selectors deliberately use substring matching, since
//!   scraped sites pack several tokens into one class attribute.
//! - Raw path expressions with a leading `//` or `./` marker, the XPath
//!   dialect older and AI-generated configurations carry. The bounded
//!   subset those configurations ever contain is rewritten to CSS.
//!
//! Malformed selectors never raise: they are logged and compile to `None`,
//! which surfaces downstream as the "no containers found" warning path.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use tracing::warn;

/// Parse markup into a traversable tree. `scraper` is tolerant of
/// malformed input and always produces a best-effort tree.
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}

/// Translate and compile a configured selector.
///
/// Returns `None` (after logging) for anything unrecognized or malformed.
pub fn compile_selector(raw: &str) -> Option<Selector> {
    let translated = translate_selector(raw)?;
    let parsed = Selector::parse(&translated).ok();
    if parsed.is_none() {
        warn!(selector = %raw, translated = %translated, "selector failed to compile");
    }
    parsed
}

/// Translate a configured selector into a CSS expression.
pub fn translate_selector(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("//") || raw.starts_with("./") {
        match xpath_subset_to_css(raw) {
            Some(css) => Some(css),
            None => {
                warn!(selector = %raw, "unsupported path expression");
                None
            }
        }
    } else {
        Some(simplified_to_css(raw))
    }
}

/// Query all matches under an element.
pub fn select_in<'a>(element: ElementRef<'a>, selector: &Selector) -> Vec<ElementRef<'a>> {
    element.select(selector).collect()
}

/// Query all matches in a document.
pub fn select_all<'a>(document: &'a Html, selector: &Selector) -> Vec<ElementRef<'a>> {
    document.select(selector).collect()
}

/// Trim and collapse whitespace in extracted text.
pub fn clean_text(text: &str) -> String {
    static WS: OnceLock<Regex> = OnceLock::new();
    let ws = WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    ws.replace_all(text.trim(), " ").into_owned()
}

/// Rewrite the simplified dialect into CSS.
fn simplified_to_css(selector: &str) -> String {
    static CLASS: OnceLock<Regex> = OnceLock::new();
    static ID: OnceLock<Regex> = OnceLock::new();
    let class = CLASS.get_or_init(|| Regex::new(r"\.([A-Za-z0-9_-]+)").unwrap());
    let id = ID.get_or_init(|| Regex::new(r"#([A-Za-z0-9_-]+)").unwrap());

    let css = class.replace_all(selector, "[class*=\"$1\"]");
    id.replace_all(&css, "[id=\"$1\"]").into_owned()
}

/// Rewrite the XPath subset legacy configurations carry into CSS.
///
/// Handled: `//`/`.//` descendant steps, tag names, `*`, and the
/// predicate forms `contains(@attr, "v")`, `@attr="v"`, `@attr`.
/// Anything else (axes, positional predicates, boolean logic) is
/// unsupported and yields `None`.
fn xpath_subset_to_css(expr: &str) -> Option<String> {
    let expr = expr.trim().trim_start_matches('.');
    let expr = expr.strip_prefix("//").unwrap_or(expr);

    let mut css_steps = Vec::new();
    for step in split_steps(expr)? {
        let step = step.trim();
        if step.is_empty() {
            return None;
        }
        css_steps.push(xpath_step_to_css(step)?);
    }
    if css_steps.is_empty() {
        return None;
    }
    Some(css_steps.join(" "))
}

/// Split an expression into descendant steps on `//`, ignoring slashes
/// inside quoted strings and bracketed predicates (attribute values are
/// frequently URLs). A single `/` outside both, a child or parent axis,
/// is unsupported and yields `None`.
fn split_steps(expr: &str) -> Option<Vec<&str>> {
    let bytes = expr.as_bytes();
    let mut steps = Vec::new();
    let mut start = 0usize;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'[' if !in_string => depth += 1,
            b']' if !in_string => depth = depth.checked_sub(1)?,
            b'/' if !in_string && depth == 0 => {
                if bytes.get(i + 1) != Some(&b'/') {
                    return None;
                }
                steps.push(&expr[start..i]);
                i += 2;
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    steps.push(&expr[start..]);
    Some(steps)
}

/// Translate one XPath step (`tag[pred][pred]`) into a CSS compound.
fn xpath_step_to_css(step: &str) -> Option<String> {
    static STEP: OnceLock<Regex> = OnceLock::new();
    static CONTAINS: OnceLock<Regex> = OnceLock::new();
    static EQUALS: OnceLock<Regex> = OnceLock::new();
    static PRESENT: OnceLock<Regex> = OnceLock::new();

    let step_re =
        STEP.get_or_init(|| Regex::new(r"^([A-Za-z0-9*_-]*)((?:\[[^\]]*\])*)$").unwrap());
    let contains_re = CONTAINS.get_or_init(|| {
        Regex::new(r#"^contains\(\s*@([A-Za-z0-9_-]+)\s*,\s*"([^"]*)"\s*\)$"#).unwrap()
    });
    let equals_re =
        EQUALS.get_or_init(|| Regex::new(r#"^@([A-Za-z0-9_-]+)\s*=\s*"([^"]*)"$"#).unwrap());
    let present_re = PRESENT.get_or_init(|| Regex::new(r"^@([A-Za-z0-9_-]+)$").unwrap());

    let caps = step_re.captures(step)?;
    let tag = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let predicates = caps.get(2).map(|m| m.as_str()).unwrap_or("");

    let mut css = if tag.is_empty() || tag == "*" {
        String::new()
    } else {
        tag.to_string()
    };

    for predicate in predicates
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split("][")
        .filter(|p| !p.is_empty())
    {
        let predicate = predicate.trim();
        if let Some(c) = contains_re.captures(predicate) {
            css.push_str(&format!("[{}*=\"{}\"]", &c[1], &c[2]));
        } else if let Some(c) = equals_re.captures(predicate) {
            css.push_str(&format!("[{}=\"{}\"]", &c[1], &c[2]));
        } else if let Some(c) = present_re.captures(predicate) {
            css.push_str(&format!("[{}]", &c[1]));
        } else {
            return None;
        }
    }

    if css.is_empty() {
        // `//*` alone: match any element.
        css.push('*');
    }
    Some(css)
}
