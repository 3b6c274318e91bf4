use std::collections::HashSet;

use scraper::{ElementRef, Html};
use tracing::{debug, info};

use crate::domain::{SearchResult, ThreadDetail};
use crate::extractor::fields::{element_text, first_text};
use crate::extractor::urls::{board_id_from_href, normalize_url, thread_ref};
use crate::extractor::{first_strategy, Extractor};

pub(super) fn extract(ex: &Extractor, document: &Html) -> Vec<SearchResult> {
    let root = document.root_element();
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    if let Some((_, elements)) = first_strategy(root, &ex.strategies.search_results, "search") {
        for el in elements {
            let Some(result) = from_element(ex, &el) else {
                debug!("Skipping search result without a link");
                continue;
            };
            if seen.insert(result.url.clone()) {
                results.push(result);
            }
        }
    }

    if results.is_empty() {
        info!("No search result elements matched, scanning thread links");
        for result in from_links(ex, root) {
            if seen.insert(result.url.clone()) {
                results.push(result);
            }
        }
    }

    results
}

fn link<'a>(ex: &Extractor, el: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    if el.value().name() == "a" && el.value().attr("href").is_some() {
        return Some(*el);
    }
    ex.strategies
        .links
        .iter()
        .find_map(|strategy| el.select(&strategy.selector).next())
}

/// Board and thread ids named by a result URL, when it follows the site's
/// URL patterns.
fn ids_from_url(url: &str) -> (Option<String>, Option<String>) {
    match thread_ref(url) {
        Some((board, thread)) => (Some(board), Some(thread)),
        None => (board_id_from_href(url), None),
    }
}

fn from_element(ex: &Extractor, el: &ElementRef<'_>) -> Option<SearchResult> {
    let anchor = link(ex, el)?;
    let href = anchor.value().attr("href")?;
    let url = normalize_url(&ex.base, href);
    let (board_id, thread_id) = ids_from_url(&url);

    let title = first_text(el, &ex.strategies.search_titles)
        .unwrap_or_else(|| element_text(&anchor));
    let snippet = first_text(el, &ex.strategies.search_snippets)
        .filter(|s| *s != title)
        .unwrap_or_default();

    Some(SearchResult {
        title,
        snippet,
        url,
        board_id,
        thread_id,
    })
}

fn from_links<'a>(ex: &'a Extractor, root: ElementRef<'a>) -> impl Iterator<Item = SearchResult> + 'a {
    ex.strategies
        .links
        .iter()
        .flat_map(move |strategy| root.select(&strategy.selector))
        .filter_map(move |a| {
            let (board, thread) = thread_ref(a.value().attr("href")?)?;
            let text = element_text(&a);
            Some(SearchResult {
                title: if text.is_empty() {
                    ThreadDetail::placeholder_title(&thread)
                } else {
                    text
                },
                snippet: String::new(),
                url: normalize_url(&ex.base, a.value().attr("href")?),
                board_id: Some(board),
                thread_id: Some(thread),
            })
        })
}
