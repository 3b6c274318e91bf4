pub mod action;
pub mod board;
pub mod post;
pub mod search;
pub mod thread;

pub use action::{ActionResult, Attachment, NewReply, NewThread};
pub use board::{Board, BoardOrigin};
pub use post::{IdKind, Post};
pub use search::SearchResult;
pub use thread::{Thread, ThreadDetail};
