//! State-changing requests: new threads and replies.
//!
//! Each action fetches a priming page for the session token, submits a
//! multipart form with the priming page as `Referer` and reads the outcome
//! from the status code and redirect target. Nothing is retried here;
//! throttling is handled by the transport.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::{ChanscrapeError, Result};
use crate::domain::{ActionResult, Attachment, NewReply, NewThread};
use crate::extractor::urls::{
    board_path, create_thread_path, normalize_url, post_id_from_location, reply_path,
    thread_path, thread_ref,
};
use crate::extractor::Extractor;
use crate::fetcher::{Fetcher, MultipartForm, Page};

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStage {
    Priming,
    TokenExtracted,
    Submitted,
    Succeeded,
    Failed,
}

impl fmt::Display for ActionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionStage::Priming => "priming",
            ActionStage::TokenExtracted => "token extracted",
            ActionStage::Submitted => "submitted",
            ActionStage::Succeeded => "succeeded",
            ActionStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy)]
enum ActionKind {
    CreateThread,
    Reply,
}

impl ActionKind {
    fn generic_failure(self) -> &'static str {
        match self {
            ActionKind::CreateThread => "Failed to create thread",
            ActionKind::Reply => "Failed to post reply",
        }
    }

    /// Replies may be acknowledged with a plain 2xx page; new threads must
    /// redirect to themselves.
    fn accepts_plain_success(self) -> bool {
        matches!(self, ActionKind::Reply)
    }
}

fn stage(kind: ActionKind, target: &str, reached: ActionStage) {
    debug!("{:?} {}: {}", kind, target, reached);
}

pub struct ActionPipeline {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    extractor: Arc<Extractor>,
}

impl ActionPipeline {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, extractor: Arc<Extractor>) -> Self {
        Self { fetcher, extractor }
    }

    pub async fn create_thread(&self, board: &str, data: &NewThread) -> Result<ActionResult> {
        let kind = ActionKind::CreateThread;
        let target = format!("/{}/", board);
        let priming = board_path(board);

        let form = self
            .prime(kind, &target, &priming)
            .await?
            .text("title", &data.title)
            .text("text", &data.text);
        let form = self.attach(form, data.image.as_ref());

        let page = self
            .submit(kind, &target, &create_thread_path(board), &form, &priming)
            .await?;

        let result = match self.interpret(kind, &page) {
            Outcome::Redirected(location) => {
                let (board, id) = match thread_ref(&location) {
                    Some((board, id)) => (board, Some(id)),
                    None => (board.to_string(), None),
                };
                ActionResult {
                    success: true,
                    id,
                    board,
                    url: Some(normalize_url(self.extractor.base(), &location)),
                }
            }
            Outcome::Accepted => ActionResult {
                success: true,
                id: None,
                board: board.to_string(),
                url: None,
            },
            Outcome::Rejected(reason) => return Err(self.fail(kind, &target, reason)),
        };

        Ok(self.succeed(kind, &target, result))
    }

    pub async fn reply_to_thread(
        &self,
        board: &str,
        thread_id: &str,
        data: &NewReply,
    ) -> Result<ActionResult> {
        let kind = ActionKind::Reply;
        let target = format!("/{}/{}", board, thread_id);
        let priming = thread_path(board, thread_id);

        let form = self
            .prime(kind, &target, &priming)
            .await?
            .text("text", &data.text);
        let form = self.attach(form, data.image.as_ref());

        let page = self
            .submit(kind, &target, &reply_path(board, thread_id), &form, &priming)
            .await?;

        let result = match self.interpret(kind, &page) {
            Outcome::Redirected(location) => ActionResult {
                success: true,
                id: post_id_from_location(&location),
                board: board.to_string(),
                url: Some(normalize_url(self.extractor.base(), &location)),
            },
            Outcome::Accepted => ActionResult {
                success: true,
                id: None,
                board: board.to_string(),
                url: Some(normalize_url(self.extractor.base(), &priming)),
            },
            Outcome::Rejected(reason) => return Err(self.fail(kind, &target, reason)),
        };

        Ok(self.succeed(kind, &target, result))
    }

    /// Fetch the priming page and start a form carrying its token, if any.
    async fn prime(&self, kind: ActionKind, target: &str, path: &str) -> Result<MultipartForm> {
        stage(kind, target, ActionStage::Priming);
        let page = self.fetcher.fetch(path, &[]).await?;
        if !page.is_success() {
            warn!("Priming page {} returned {}", page.url, page.status);
        }

        let mut form = MultipartForm::new();
        match self.extractor.form_token(&page.body) {
            Some((name, value)) => {
                stage(kind, target, ActionStage::TokenExtracted);
                form = form.text(&name, &value);
            }
            None => debug!("No form token on {}, submitting without one", page.url),
        }
        Ok(form)
    }

    fn attach(&self, form: MultipartForm, image: Option<&Attachment>) -> MultipartForm {
        match image {
            Some(image) => {
                let filename = image
                    .filename
                    .as_deref()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or(self.extractor.config().default_image_name.as_str());
                form.file(IMAGE_FIELD, filename, image.bytes.clone())
            }
            None => form,
        }
    }

    async fn submit(
        &self,
        kind: ActionKind,
        target: &str,
        path: &str,
        form: &MultipartForm,
        priming: &str,
    ) -> Result<Page> {
        let referer = normalize_url(self.extractor.base(), priming);
        let page = self.fetcher.submit(path, form, &referer).await?;
        stage(kind, target, ActionStage::Submitted);
        Ok(page)
    }

    fn interpret(&self, kind: ActionKind, page: &Page) -> Outcome {
        if page.is_redirect() {
            return match &page.location {
                Some(location) => Outcome::Redirected(location.clone()),
                None => Outcome::Accepted,
            };
        }
        if page.is_success() && kind.accepts_plain_success() {
            return Outcome::Accepted;
        }

        let reason = self
            .extractor
            .error_message(&page.body)
            .unwrap_or_else(|| kind.generic_failure().to_string());
        Outcome::Rejected(reason)
    }

    fn succeed(&self, kind: ActionKind, target: &str, result: ActionResult) -> ActionResult {
        stage(kind, target, ActionStage::Succeeded);
        info!("{:?} {} succeeded, id {:?}", kind, target, result.id);
        result
    }

    fn fail(&self, kind: ActionKind, target: &str, reason: String) -> ChanscrapeError {
        stage(kind, target, ActionStage::Failed);
        warn!("{:?} {} failed: {}", kind, target, reason);
        ChanscrapeError::Action(reason)
    }
}

/// How the site answered a submission.
enum Outcome {
    Redirected(String),
    Accepted,
    Rejected(String),
}
