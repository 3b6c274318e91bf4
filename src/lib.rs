//! # chanscrape
//!
//! A resilient scraping and session engine for imageboard-style sites whose
//! markup changes without notice.
//!
//! ## Architecture
//!
//! ```text
//! ChanClient → ResponseCache → Fetcher (RateLimiter, CookieJar) → Extractor
//!            ↘ ActionPipeline → Fetcher (priming page, multipart submit)
//! ```
//!
//! Reads never fail: transport errors degrade to built-in boards, empty
//! listings or a thread carrying an error. Searches and writes return
//! [`ChanscrapeError`](app::ChanscrapeError).
//!
//! ## Quick Start
//!
//! ```bash
//! # List boards
//! chanscrape boards
//!
//! # Second page of a board's catalog, as JSON
//! chanscrape threads g --page 2 --catalog --json
//!
//! # Reply with an image
//! chanscrape reply g 123456 --text "pic related" --image cat.png
//! ```

/// Write operations: priming page, token, multipart submit, outcome.
pub mod actions;

/// Session context and error handling.
///
/// [`AppContext`](app::AppContext) wires config, transport, cache and client.
pub mod app;

/// Time-boxed memoization of read results, keyed by operation and parameters.
pub mod cache;

/// Command-line interface using clap.
///
/// - `boards`
/// - `threads <board> [--page N] [--catalog]`
/// - `thread <board> <id>`
/// - `search <query>`
/// - `post <board> --title --text [--image PATH]`
/// - `reply <board> <thread> --text [--image PATH]`
pub mod cli;

/// [`ChanClient`](client::ChanClient), the six operations exposed to callers.
pub mod client;

/// Configuration loaded from `~/.config/chanscrape/config.toml`.
pub mod config;

/// Boards, threads, posts, search results and write payloads.
pub mod domain;

/// Multi-strategy HTML extraction.
///
/// - [`Extractor`](extractor::Extractor): one entry point per entity kind
/// - [`SelectorConfig`](extractor::SelectorConfig): ordered selector lists
pub mod extractor;

/// HTTP session transport.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for GET and multipart POST
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`RateLimiter`](fetcher::rate_limit::RateLimiter): request spacing and 429 backoff
/// - [`CookieJar`](fetcher::cookies::CookieJar): session cookies
pub mod fetcher;
