//! Multi-strategy HTML extraction.
//!
//! Every entity kind has an ordered list of CSS selector strategies. The
//! first strategy that matches anything decides which elements are parsed,
//! and each field is then read with its own ordered selector list.
//!
//! ```text
//! markup → strategies (in order) → fields (in order) → entity
//!        ↘ no match → hyperlink pass → built-in defaults
//! ```
//!
//! Extraction never fails: an unrecognisable page yields an empty or
//! fallback result. The output depends only on the markup, the selector
//! configuration and the base origin.
//!
//! All entry points are synchronous; `scraper` documents are `!Send`, so
//! parse only after the response body has been fully received.

mod boards;
mod config;
pub mod fields;
mod forms;
mod search;
mod thread_detail;
mod threads;
pub mod urls;

pub use config::{KnownBoard, SelectorConfig};

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::domain::{Board, SearchResult, Thread, ThreadDetail};

/// One compiled structural heuristic.
#[derive(Debug, Clone)]
pub struct Strategy {
    pub source: String,
    pub selector: Selector,
}

/// Compile a selector list, dropping entries that do not parse.
pub(crate) fn compile(list: &[String]) -> Vec<Strategy> {
    list.iter()
        .filter_map(|source| match Selector::parse(source) {
            Ok(selector) => Some(Strategy {
                source: source.clone(),
                selector,
            }),
            Err(e) => {
                warn!("Ignoring invalid selector {:?}: {:?}", source, e);
                None
            }
        })
        .collect()
}

/// Elements matched by the first strategy that matches at least one.
pub(crate) fn first_strategy<'a, 's>(
    scope: ElementRef<'a>,
    strategies: &'s [Strategy],
    kind: &str,
) -> Option<(&'s Strategy, Vec<ElementRef<'a>>)> {
    strategies.iter().find_map(|strategy| {
        let matches: Vec<_> = scope.select(&strategy.selector).collect();
        if matches.is_empty() {
            None
        } else {
            debug!(
                "{} strategy {:?} matched {} elements",
                kind,
                strategy.source,
                matches.len()
            );
            Some((strategy, matches))
        }
    })
}

struct Strategies {
    boards: Vec<Strategy>,
    board_names: Vec<Strategy>,
    board_descriptions: Vec<Strategy>,
    threads: Vec<Strategy>,
    titles: Vec<Strategy>,
    texts: Vec<Strategy>,
    reply_counts: Vec<Strategy>,
    images: Vec<Strategy>,
    ops: Vec<Strategy>,
    replies: Vec<Strategy>,
    containers: Vec<Strategy>,
    excluded_regions: Vec<Strategy>,
    search_results: Vec<Strategy>,
    search_titles: Vec<Strategy>,
    search_snippets: Vec<Strategy>,
    token: Vec<Strategy>,
    errors: Vec<Strategy>,
    links: Vec<Strategy>,
    page_title: Vec<Strategy>,
}

impl Strategies {
    fn compile(config: &SelectorConfig) -> Self {
        Self {
            boards: compile(&config.board_selectors),
            board_names: compile(&config.board_name_selectors),
            board_descriptions: compile(&config.board_description_selectors),
            threads: compile(&config.thread_selectors),
            titles: compile(&config.title_selectors),
            texts: compile(&config.text_selectors),
            reply_counts: compile(&config.reply_count_selectors),
            images: compile(&config.image_selectors),
            ops: compile(&config.op_selectors),
            replies: compile(&config.reply_selectors),
            containers: compile(&config.heuristic_container_selectors),
            excluded_regions: compile(&config.excluded_region_selectors),
            search_results: compile(&config.search_result_selectors),
            search_titles: compile(&config.search_title_selectors),
            search_snippets: compile(&config.search_snippet_selectors),
            token: compile(std::slice::from_ref(&config.token_selector)),
            errors: compile(&config.error_selectors),
            links: compile(&["a[href]".to_string()]),
            page_title: compile(&["title".to_string()]),
        }
    }
}

/// Turns raw pages into domain entities for one site origin.
pub struct Extractor {
    base: Url,
    config: SelectorConfig,
    strategies: Strategies,
}

impl Extractor {
    /// Extractor resolving links against `base`, the same URL the transport
    /// resolves request paths against.
    pub fn new(base: Url, config: SelectorConfig) -> Self {
        let strategies = Strategies::compile(&config);
        Self {
            base,
            config,
            strategies,
        }
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    /// Boards listed on the homepage, unioned with the known boards.
    pub fn boards(&self, html: &str) -> Vec<Board> {
        let document = Html::parse_document(html);
        boards::extract(self, &document)
    }

    /// Threads on a board page or catalog.
    pub fn threads(&self, html: &str, board: &str) -> Vec<Thread> {
        let document = Html::parse_document(html);
        threads::extract(self, &document, board)
    }

    /// A single thread page with its replies.
    pub fn thread_detail(&self, html: &str, board: &str, thread_id: &str) -> ThreadDetail {
        let document = Html::parse_document(html);
        thread_detail::extract(self, &document, board, thread_id)
    }

    pub fn search_results(&self, html: &str) -> Vec<SearchResult> {
        let document = Html::parse_document(html);
        search::extract(self, &document)
    }

    /// Anti-forgery token as `(field name, value)`, if the page carries one.
    pub fn form_token(&self, html: &str) -> Option<(String, String)> {
        let document = Html::parse_document(html);
        forms::token(self, &document)
    }

    /// Error message rendered by the site after a rejected submission.
    pub fn error_message(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        forms::error_message(self, &document)
    }
}
