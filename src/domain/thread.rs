use serde::{Deserialize, Serialize};

use crate::domain::Post;

/// A thread as listed on a board page or catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub title: String,
    /// Excerpt of the opening post
    pub text: String,
    pub reply_count: u32,
    /// Absolute URL or empty
    pub image_url: String,
    pub board: String,
    pub url: String,
}

/// A fully expanded thread page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadDetail {
    pub id: String,
    pub title: String,
    pub text: String,
    pub image_url: String,
    pub board: String,
    pub op_post_id: String,
    /// Replies in page order
    pub posts: Vec<Post>,
    pub reply_count: u32,
    pub url: String,
    /// Set when the page could not be fetched; the rest is placeholder data
    pub error: Option<String>,
}

impl ThreadDetail {
    pub fn placeholder_title(thread_id: &str) -> String {
        format!("Thread {}", thread_id)
    }

    /// Degraded result for a thread whose page could not be fetched.
    pub fn unavailable(board: &str, thread_id: &str, url: String, error: String) -> Self {
        Self {
            id: thread_id.to_string(),
            title: Self::placeholder_title(thread_id),
            text: String::new(),
            image_url: String::new(),
            board: board.to_string(),
            op_post_id: thread_id.to_string(),
            posts: Vec::new(),
            reply_count: 0,
            url,
            error: Some(error),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
