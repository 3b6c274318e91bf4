//! Time-boxed memoization of read operations.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::domain::{Board, SearchResult, Thread, ThreadDetail};

/// Whether a read may be answered from the cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    #[default]
    Use,
    Bypass,
}

/// Cached result of one read operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Cached {
    Boards(Vec<Board>),
    Threads(Vec<Thread>),
    Thread(Box<ThreadDetail>),
    Search(Vec<SearchResult>),
}

/// Deterministic key built from an operation name and all of its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// `:` separates parameters; a literal `:` or `\` inside one is
    /// backslash-escaped so distinct parameter lists never share a key.
    pub fn new(operation: &str, params: &[&str]) -> Self {
        let mut key = operation.to_string();
        for param in params {
            key.push(':');
            for c in param.chars() {
                if c == ':' || c == '\\' {
                    key.push('\\');
                }
                key.push(c);
            }
        }
        Self(key)
    }

    pub fn boards() -> Self {
        Self::new("boards", &[])
    }

    pub fn threads(board: &str, page: u32, catalog: bool) -> Self {
        let source = if catalog { "catalog" } else { "board" };
        Self::new("threads", &[board, source, &page.to_string()])
    }

    pub fn thread(board: &str, thread_id: &str) -> Self {
        Self::new("thread", &[board, thread_id])
    }

    pub fn search(query: &str) -> Self {
        Self::new("search", &[query])
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct CacheEntry {
    data: Cached,
    stored_at: Instant,
}

/// Entries are only ever replaced whole; a stale entry stays in place until
/// the next successful write for its key.
pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(enabled: bool, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            enabled,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &CacheKey) -> Option<Cached> {
        if !self.enabled {
            return None;
        }

        let entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                debug!("Cache hit for {}", key.as_str());
                Some(entry.data.clone())
            }
            Some(_) => {
                debug!("Cache entry for {} expired", key.as_str());
                None
            }
            None => {
                debug!("Cache miss for {}", key.as_str());
                None
            }
        }
    }

    pub fn set(&self, key: CacheKey, data: Cached) {
        if !self.enabled {
            return;
        }

        self.lock().insert(
            key,
            CacheEntry {
                data,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
