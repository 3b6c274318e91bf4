use serde::{Deserialize, Serialize};

/// Whether a post id was read from the markup or made up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdKind {
    Extracted,
    /// `{thread}_reply_{n}`; only meaningful within one fetch
    Synthesized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub image_url: String,
    pub id_kind: IdKind,
}

impl Post {
    pub fn synthesized_id(thread_id: &str, n: usize) -> String {
        format!("{}_reply_{}", thread_id, n)
    }

    pub fn has_stable_id(&self) -> bool {
        self.id_kind == IdKind::Extracted
    }
}
