//! The call surface for consumers: read operations that never fail and write
//! operations that report why they failed.

use std::sync::Arc;

use tracing::{debug, warn};
use url::Url;

use crate::actions::ActionPipeline;
use crate::app::Result;
use crate::cache::{CacheKey, CachePolicy, Cached, ResponseCache};
use crate::domain::{
    ActionResult, Board, BoardOrigin, NewReply, NewThread, SearchResult, Thread, ThreadDetail,
};
use crate::extractor::urls::{board_path, catalog_path, normalize_url, thread_path};
use crate::extractor::{Extractor, SelectorConfig};
use crate::fetcher::{Fetcher, Page};

pub const SEARCH_PATH: &str = "/search";

/// Which listing of a board to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadQuery {
    /// 1-based page number
    pub page: u32,
    /// Read the catalog instead of the paged index
    pub catalog: bool,
    pub policy: CachePolicy,
}

impl Default for ThreadQuery {
    fn default() -> Self {
        Self {
            page: 1,
            catalog: false,
            policy: CachePolicy::Use,
        }
    }
}

impl ThreadQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page,
            ..Self::default()
        }
    }
}

pub struct ChanClient {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    cache: ResponseCache,
    extractor: Arc<Extractor>,
    actions: ActionPipeline,
}

impl ChanClient {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        cache: ResponseCache,
        base_url: Url,
        selectors: SelectorConfig,
    ) -> Self {
        let extractor = Arc::new(Extractor::new(base_url, selectors));
        let actions = ActionPipeline::new(fetcher.clone(), extractor.clone());
        Self {
            fetcher,
            cache,
            extractor,
            actions,
        }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Fetch a page for a read operation. Every page the transport returns
    /// is handed to the extractor, 4xx bodies included.
    async fn read(&self, path: &str, query: &[(&str, String)]) -> Result<Page> {
        let page = self.fetcher.fetch(path, query).await?;
        if !page.is_success() {
            debug!("Extracting from {} page {}", page.status, page.url);
        }
        Ok(page)
    }

    /// Only 2xx pages are cached, so an error page is refetched next time.
    fn store(&self, page: &Page, key: CacheKey, data: Cached) {
        if page.is_success() {
            self.cache.set(key, data);
        }
    }

    fn cached(&self, key: &CacheKey, policy: CachePolicy) -> Option<Cached> {
        match policy {
            CachePolicy::Use => self.cache.get(key),
            CachePolicy::Bypass => None,
        }
    }

    /// Boards from the homepage plus the known boards. On transport failure
    /// only the known boards are returned.
    pub async fn get_boards(&self, policy: CachePolicy) -> Vec<Board> {
        let key = CacheKey::boards();
        if let Some(Cached::Boards(boards)) = self.cached(&key, policy) {
            return boards;
        }

        match self.read("/", &[]).await {
            Ok(page) => {
                let boards = self.extractor.boards(&page.body);
                self.store(&page, key, Cached::Boards(boards.clone()));
                boards
            }
            Err(e) => {
                warn!("Failed to load boards: {}", e);
                self.extractor
                    .config()
                    .known_boards
                    .iter()
                    .map(|known| Board::new(&known.id, &known.name, BoardOrigin::Builtin))
                    .collect()
            }
        }
    }

    /// Threads on one page of a board index or catalog; empty on failure.
    pub async fn get_threads(&self, board: &str, query: &ThreadQuery) -> Vec<Thread> {
        let key = CacheKey::threads(board, query.page, query.catalog);
        if let Some(Cached::Threads(threads)) = self.cached(&key, query.policy) {
            return threads;
        }

        let path = if query.catalog {
            catalog_path(board)
        } else {
            board_path(board)
        };

        match self.read(&path, &[("page", query.page.to_string())]).await {
            Ok(page) => {
                let threads = self.extractor.threads(&page.body, board);
                self.store(&page, key, Cached::Threads(threads.clone()));
                threads
            }
            Err(e) => {
                warn!("Failed to load threads for /{}/: {}", board, e);
                Vec::new()
            }
        }
    }

    /// A thread with its replies. On failure the result carries the error and
    /// placeholder content.
    pub async fn get_thread(
        &self,
        board: &str,
        thread_id: &str,
        policy: CachePolicy,
    ) -> ThreadDetail {
        let key = CacheKey::thread(board, thread_id);
        if let Some(Cached::Thread(detail)) = self.cached(&key, policy) {
            return *detail;
        }

        let path = thread_path(board, thread_id);
        match self.read(&path, &[]).await {
            Ok(page) => {
                let detail = self.extractor.thread_detail(&page.body, board, thread_id);
                self.store(&page, key, Cached::Thread(Box::new(detail.clone())));
                detail
            }
            Err(e) => {
                warn!("Failed to load thread /{}/{}: {}", board, thread_id, e);
                let url = normalize_url(self.extractor.base(), &path);
                ThreadDetail::unavailable(board, thread_id, url, e.to_string())
            }
        }
    }

    pub async fn search(&self, query: &str, policy: CachePolicy) -> Result<Vec<SearchResult>> {
        let key = CacheKey::search(query);
        if let Some(Cached::Search(results)) = self.cached(&key, policy) {
            return Ok(results);
        }

        let page = self.read(SEARCH_PATH, &[("q", query.to_string())]).await?;
        let results = self.extractor.search_results(&page.body);
        debug!("Search {:?} returned {} results", query, results.len());
        self.store(&page, key, Cached::Search(results.clone()));
        Ok(results)
    }

    pub async fn create_thread(&self, board: &str, data: &NewThread) -> Result<ActionResult> {
        self.actions.create_thread(board, data).await
    }

    pub async fn reply_to_thread(
        &self,
        board: &str,
        thread_id: &str,
        data: &NewReply,
    ) -> Result<ActionResult> {
        self.actions.reply_to_thread(board, thread_id, data).await
    }
}
