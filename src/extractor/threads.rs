use std::collections::HashSet;

use scraper::{ElementRef, Html};
use tracing::{debug, info};

use crate::domain::{Thread, ThreadDetail};
use crate::extractor::fields::{
    element_text, first_text, id_from_attributes, image_url, reply_count,
};
use crate::extractor::urls::{normalize_url, thread_path, thread_ref};
use crate::extractor::{first_strategy, Extractor};

pub(super) fn extract(ex: &Extractor, document: &Html, board: &str) -> Vec<Thread> {
    let root = document.root_element();
    let mut seen = HashSet::new();
    let mut threads = Vec::new();

    if let Some((_, elements)) = first_strategy(root, &ex.strategies.threads, "thread") {
        for el in elements {
            let Some(thread) = from_element(ex, &el, board) else {
                debug!("Skipping thread element without an id");
                continue;
            };
            if seen.insert(thread.id.clone()) {
                threads.push(thread);
            }
        }
    }

    if threads.is_empty() {
        info!("No thread elements matched on /{}/, scanning hyperlinks", board);
        for thread in from_links(ex, root, board) {
            if seen.insert(thread.id.clone()) {
                threads.push(thread);
            }
        }
    }

    debug!("Extracted {} threads from /{}/", threads.len(), board);
    threads
}

/// Thread links inside `el` (or `el` itself), as `(href, board, id)`.
fn thread_links<'a>(
    ex: &'a Extractor,
    el: ElementRef<'a>,
) -> impl Iterator<Item = (ElementRef<'a>, String, String)> + 'a {
    std::iter::once(el)
        .filter(|e| e.value().name() == "a")
        .chain(
            ex.strategies
                .links
                .iter()
                .flat_map(move |strategy| el.select(&strategy.selector)),
        )
        .filter_map(|a| {
            let (board, id) = thread_ref(a.value().attr("href")?)?;
            Some((a, board, id))
        })
}

fn from_element(ex: &Extractor, el: &ElementRef<'_>, board: &str) -> Option<Thread> {
    let link = thread_links(ex, *el).next();

    let id = id_from_attributes(el, &ex.config.thread_id_attributes)
        .or_else(|| link.as_ref().map(|(_, _, id)| id.clone()))?;

    let url = link
        .as_ref()
        .filter(|(_, _, link_id)| *link_id == id)
        .and_then(|(a, _, _)| a.value().attr("href"))
        .map(|href| normalize_url(&ex.base, href))
        .unwrap_or_else(|| normalize_url(&ex.base, &thread_path(board, &id)));

    let title = first_text(el, &ex.strategies.titles)
        .unwrap_or_else(|| ThreadDetail::placeholder_title(&id));

    Some(Thread {
        text: first_text(el, &ex.strategies.texts).unwrap_or_default(),
        reply_count: reply_count(el, &ex.strategies.reply_counts),
        image_url: image_url(el, &ex.strategies.images, &ex.base),
        board: board.to_string(),
        url,
        title,
        id,
    })
}

/// Minimal threads from `/board/{board}/thread/{id}` links on the page.
fn from_links<'a>(
    ex: &'a Extractor,
    root: ElementRef<'a>,
    board: &'a str,
) -> impl Iterator<Item = Thread> + 'a {
    thread_links(ex, root)
        .filter(move |(_, link_board, _)| link_board == board)
        .map(move |(a, link_board, id)| {
            let text = element_text(&a);
            let title = if text.is_empty() {
                ThreadDetail::placeholder_title(&id)
            } else {
                text
            };
            Thread {
                url: normalize_url(&ex.base, &thread_path(&link_board, &id)),
                title,
                text: String::new(),
                reply_count: 0,
                image_url: String::new(),
                board: link_board,
                id,
            }
        })
}
