//! Transport, pacing and cache settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the HTTP session. Fixed once the client is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Site origin every path is resolved against
    pub base_url: String,

    /// Per-request timeout in seconds (default: 15)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Minimum spacing between requests in milliseconds (default: 1000)
    pub rate_limit_ms: u64,

    /// Ceiling for the 429 backoff in milliseconds (default: 30000)
    pub max_backoff_ms: u64,

    /// How many times a throttled request is re-issued (default: 1)
    pub throttle_retries: u32,

    /// Whether read operations are memoized (default: true)
    pub cache_enabled: bool,

    /// Cache entry lifetime in seconds (default: 300)
    pub cache_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://example-board.org".to_string(),
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            rate_limit_ms: 1000,
            max_backoff_ms: 30_000,
            throttle_retries: 1,
            cache_enabled: true,
            cache_ttl_secs: 300,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
