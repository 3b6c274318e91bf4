use async_trait::async_trait;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, LOCATION, REFERER, SET_COOKIE,
};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};
use url::Url;

use crate::app::{ChanscrapeError, Result};
use crate::config::ClientConfig;
use crate::fetcher::cookies::CookieJar;
use crate::fetcher::rate_limit::RateLimiter;
use crate::fetcher::{Fetcher, MultipartForm, Page};

/// Result of one attempt at a request.
enum Attempt {
    /// 429; the request may be re-issued after backing off
    Throttled,
    Done(Page),
}

/// Hops a GET may take before the last redirect is returned as a page.
const MAX_READ_REDIRECTS: usize = 5;

pub struct HttpFetcher {
    /// Follows redirects; used for page reads
    reader: Client,
    /// Never follows redirects; used for form submissions
    submitter: Client,
    base_url: Url,
    cookies: CookieJar,
    limiter: RateLimiter,
    throttle_retries: u32,
}

impl HttpFetcher {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ChanscrapeError::Config(format!(
                "base_url must be an http(s) origin, got {}",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let build = |policy: Policy| {
            Client::builder()
                .timeout(config.timeout())
                .gzip(true)
                .brotli(true)
                .user_agent(config.user_agent.as_str())
                .default_headers(headers.clone())
                .redirect(policy)
                .build()
        };

        // A submission's redirect names the new thread or post, so the
        // submitter hands it back instead of following it.
        let reader = build(Policy::limited(MAX_READ_REDIRECTS))?;
        let submitter = build(Policy::none())?;

        Ok(Self {
            reader,
            submitter,
            base_url,
            cookies: CookieJar::new(),
            limiter: RateLimiter::new(config.rate_limit(), config.max_backoff()),
            throttle_retries: config.throttle_retries,
        })
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    fn resolve(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Send a request built by `build`, re-issuing it after a 429 up to
    /// `throttle_retries` times. Every 429 doubles the session interval.
    async fn send<F>(&self, client: &Client, url: &Url, build: F) -> Result<Page>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let mut attempts = 0u32;

        loop {
            self.limiter.throttle().await;
            attempts += 1;

            let mut request = build(client);
            if let Some(cookie) = self.cookies.header_value() {
                request = request.header(COOKIE, cookie);
            }

            debug!("Request #{} to {}", attempts, url);
            let response = request.send().await?;

            match self.interpret(url, response).await? {
                Attempt::Done(page) => return Ok(page),
                Attempt::Throttled => {
                    let delay = self.limiter.escalate().await;
                    if attempts > self.throttle_retries {
                        warn!("Still throttled by {} after {} attempts", url, attempts);
                        return Err(ChanscrapeError::RateLimited {
                            url: url.to_string(),
                            attempts,
                        });
                    }
                    warn!("Throttled by {}, backing off for {:?}", url, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn interpret(&self, url: &Url, response: Response) -> Result<Attempt> {
        let stored = self.cookies.absorb(
            response
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        );
        if stored > 0 {
            debug!("Stored {} cookies from {}", stored, url);
        }

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(Attempt::Throttled);
        }
        if status.is_server_error() {
            return Err(ChanscrapeError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let final_url = response.url().to_string();
        if final_url != url.as_str() {
            debug!("{} redirected to {}", url, final_url);
        }
        let body = response.text().await?;

        Ok(Attempt::Done(Page {
            url: final_url,
            status: status.as_u16(),
            body,
            location,
        }))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<Page> {
        let url = self.resolve(path, query)?;
        self.send(&self.reader, &url, |client| client.get(url.clone()))
            .await
    }

    async fn submit(&self, path: &str, form: &MultipartForm, referer: &str) -> Result<Page> {
        let url = self.resolve(path, &[])?;
        self.send(&self.submitter, &url, |client| {
            client
                .post(url.clone())
                .header(REFERER, referer)
                .multipart(form.to_reqwest())
        })
        .await
    }
}
