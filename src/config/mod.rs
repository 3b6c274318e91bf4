//! Configuration management for chanscrape.
//!
//! Configuration is read from `~/.config/chanscrape/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod client;

pub use client::ClientConfig;

use crate::extractor::SelectorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Main configuration struct.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub selectors: SelectorConfig,
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/chanscrape/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("chanscrape").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# chanscrape configuration
#
# Only the keys you set are overridden; everything else keeps its default.

[client]
# Site origin all paths are resolved against
base_url = "https://example-board.org"

# Request timeout in seconds
timeout_secs = 15

# Minimum spacing between requests (milliseconds)
rate_limit_ms = 1000

# Backoff ceiling when the site answers 429 (milliseconds)
max_backoff_ms = 30000

# How many times a throttled request is re-issued before giving up
throttle_retries = 1

# Memoize board, thread and search pages
cache_enabled = true
cache_ttl_secs = 300

[selectors]
# Strategy lists are tried in order; the first selector that matches wins.
thread_selectors = [
    ".catalog-thread",
    ".thread",
    "article.thread",
    "[data-thread-id]",
    ".thread-item",
    "div[id^='thread']",
]

reply_selectors = [
    ".reply",
    ".reply-post",
    "[data-reply-id]",
    ".post:not(.op)",
]

# Replies found by the generic fallback must have at least this much text
min_reply_text_len = 20

token_selector = 'input[name="csrf_token"]'
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
