use serde::{Deserialize, Serialize};

/// A file attached to a new thread or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Falls back to the configured default name when absent
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewThread {
    pub title: String,
    pub text: String,
    pub image: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReply {
    pub text: String,
    pub image: Option<Attachment>,
}

/// Outcome of a successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    /// New thread id, or new post id for replies when the redirect names one
    pub id: Option<String>,
    pub board: String,
    pub url: Option<String>,
}
