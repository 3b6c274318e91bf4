use std::sync::Arc;

use url::Url;

use crate::app::error::Result;
use crate::cache::ResponseCache;
use crate::client::ChanClient;
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::Fetcher;

/// Owns one scraping session: transport, cookies, pacing and cache.
///
/// Everything mutable lives behind this value; dropping it discards the
/// session state.
pub struct AppContext {
    pub config: Config,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub client: ChanClient,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> =
            Arc::new(HttpFetcher::new(&config.client)?);
        Self::with_fetcher(config, fetcher)
    }

    /// Build a context around an existing transport, e.g. a test double.
    pub fn with_fetcher(config: Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Result<Self> {
        let base_url = Url::parse(&config.client.base_url)?;
        let cache = ResponseCache::new(config.client.cache_enabled, config.client.cache_ttl());
        let client = ChanClient::new(
            fetcher.clone(),
            cache,
            base_url,
            config.selectors.clone(),
        );

        Ok(Self {
            config,
            fetcher,
            client,
        })
    }
}
