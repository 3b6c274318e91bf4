use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub snippet: String,
    /// Always absolute
    pub url: String,
    pub board_id: Option<String>,
    pub thread_id: Option<String>,
}
