//! In-memory transport for exercising the layers above the network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::app::{ChanscrapeError, Result};
use crate::fetcher::{Fetcher, MultipartForm, Page};

/// A recorded submission: path, form and referer.
pub type Submission = (String, MultipartForm, String);

#[derive(Default)]
pub struct ScriptedFetcher {
    pages: Mutex<HashMap<String, Result<Page>>>,
    submit_response: Mutex<Option<Page>>,
    fetches: Mutex<Vec<String>>,
    submissions: Mutex<Vec<Submission>>,
}

pub fn html_page(path: &str, status: u16, body: &str) -> Page {
    Page {
        url: format!("https://boards.test{}", path),
        status,
        body: body.to_string(),
        location: None,
    }
}

pub fn redirect(location: &str) -> Page {
    Page {
        url: "https://boards.test/".to_string(),
        status: 302,
        body: String::new(),
        location: Some(location.to_string()),
    }
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 for `path` (query ignored).
    pub fn page(self, path: &str, body: &str) -> Self {
        self.page_with_status(path, 200, body)
    }

    pub fn page_with_status(self, path: &str, status: u16, body: &str) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(path.to_string(), Ok(html_page(path, status, body)));
        self
    }

    /// Fail every fetch of `path` with a 503.
    pub fn failing(self, path: &str) -> Self {
        self.pages.lock().unwrap().insert(
            path.to_string(),
            Err(ChanscrapeError::Status {
                status: 503,
                url: format!("https://boards.test{}", path),
            }),
        );
        self
    }

    pub fn on_submit(self, page: Page) -> Self {
        *self.submit_response.lock().unwrap() = Some(page);
        self
    }

    /// Every fetched path with its query, e.g. `/board/b?page=2`.
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

fn clone_result(result: &Result<Page>) -> Result<Page> {
    match result {
        Ok(page) => Ok(page.clone()),
        Err(ChanscrapeError::Status { status, url }) => Err(ChanscrapeError::Status {
            status: *status,
            url: url.clone(),
        }),
        Err(e) => Err(ChanscrapeError::Other(e.to_string())),
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<Page> {
        let query: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        let recorded = if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query.join("&"))
        };
        self.fetches.lock().unwrap().push(recorded);

        match self.pages.lock().unwrap().get(path) {
            Some(result) => clone_result(result),
            None => Ok(html_page(path, 404, "<html><body>Not found</body></html>")),
        }
    }

    async fn submit(&self, path: &str, form: &MultipartForm, referer: &str) -> Result<Page> {
        self.submissions
            .lock()
            .unwrap()
            .push((path.to_string(), form.clone(), referer.to_string()));

        match self.submit_response.lock().unwrap().clone() {
            Some(page) => Ok(page),
            None => Err(ChanscrapeError::Status {
                status: 500,
                url: format!("https://boards.test{}", path),
            }),
        }
    }
}
