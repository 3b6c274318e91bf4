//! Field-level extraction shared by every entity kind.

use std::sync::OnceLock;

use regex::Regex;
use scraper::ElementRef;
use url::Url;

use crate::extractor::urls::normalize_url;
use crate::extractor::Strategy;

fn count_phrase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\s*(?:replies|reply|posts|post)\b").expect("count regex is valid")
    })
}

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("number regex is valid"))
}

/// Visible text of an element with whitespace collapsed.
pub fn element_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// First element under `scope` matched by the earliest strategy that matches.
pub fn first_match<'a>(scope: &ElementRef<'a>, strategies: &[Strategy]) -> Option<ElementRef<'a>> {
    strategies
        .iter()
        .find_map(|strategy| scope.select(&strategy.selector).next())
}

/// Text of the first non-empty element, trying strategies in order.
pub fn first_text(scope: &ElementRef<'_>, strategies: &[Strategy]) -> Option<String> {
    strategies.iter().find_map(|strategy| {
        scope
            .select(&strategy.selector)
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
    })
}

/// First run of digits in the first attribute that has one.
pub fn id_from_attributes(el: &ElementRef<'_>, attributes: &[String]) -> Option<String> {
    attributes.iter().find_map(|attr| {
        el.value()
            .attr(attr)
            .and_then(|value| number_re().find(value))
            .map(|m| m.as_str().to_string())
    })
}

/// Absolute image URL from `src`, then `data-src`; empty when there is none.
pub fn image_url(scope: &ElementRef<'_>, strategies: &[Strategy], base: &Url) -> String {
    strategies
        .iter()
        .flat_map(|strategy| scope.select(&strategy.selector))
        .find_map(|img| {
            ["src", "data-src"]
                .iter()
                .filter_map(|attr| img.value().attr(attr))
                .map(str::trim)
                .find(|value| !value.is_empty())
                .map(|value| normalize_url(base, value))
        })
        .unwrap_or_default()
}

/// Reply count from a dedicated counter, else from `N replies|posts` in the
/// element's text, else 0.
pub fn reply_count(scope: &ElementRef<'_>, strategies: &[Strategy]) -> u32 {
    let counted = strategies
        .iter()
        .flat_map(|strategy| scope.select(&strategy.selector))
        .find_map(|el| {
            number_re()
                .find(&element_text(&el))
                .and_then(|m| m.as_str().parse::<u32>().ok())
        });

    counted
        .or_else(|| parse_count_phrase(&element_text(scope)))
        .unwrap_or(0)
}

/// `"37 posts so far"` → 37
pub fn parse_count_phrase(text: &str) -> Option<u32> {
    count_phrase_re()
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Whether `el` sits inside (or is) an element matched by any strategy.
pub fn is_within(el: &ElementRef<'_>, strategies: &[Strategy]) -> bool {
    std::iter::once(*el)
        .chain(el.ancestors().filter_map(ElementRef::wrap))
        .any(|node| strategies.iter().any(|s| s.selector.matches(&node)))
}
