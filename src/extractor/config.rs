use serde::{Deserialize, Serialize};

fn selectors(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// A board that is always offered, whatever the homepage looks like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownBoard {
    pub id: String,
    pub name: String,
}

impl KnownBoard {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Extraction strategies, one ordered list per entity kind and field.
///
/// Every list is tried front to back and the first selector that matches
/// anything wins. Reordering or extending a list changes behaviour without
/// touching the extraction code.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Containers for one board on the homepage
    pub board_selectors: Vec<String>,
    pub board_name_selectors: Vec<String>,
    pub board_description_selectors: Vec<String>,

    /// Boards unioned into every board listing
    pub known_boards: Vec<KnownBoard>,

    /// Containers for one thread in a board page or catalog
    pub thread_selectors: Vec<String>,

    /// Attributes holding a thread number, in priority order
    pub thread_id_attributes: Vec<String>,

    /// Attributes holding a post number, in priority order
    pub post_id_attributes: Vec<String>,

    pub title_selectors: Vec<String>,
    pub text_selectors: Vec<String>,

    /// Dedicated reply counter elements
    pub reply_count_selectors: Vec<String>,

    pub image_selectors: Vec<String>,

    /// Opening post of a thread page
    pub op_selectors: Vec<String>,

    /// Reply posts of a thread page
    pub reply_selectors: Vec<String>,

    /// Generic elements scanned when no reply selector matches
    pub heuristic_container_selectors: Vec<String>,

    /// Page regions never treated as replies
    pub excluded_region_selectors: Vec<String>,

    /// Minimum text length for a heuristic reply (default: 20)
    pub min_reply_text_len: usize,

    pub search_result_selectors: Vec<String>,
    pub search_title_selectors: Vec<String>,
    pub search_snippet_selectors: Vec<String>,

    /// Hidden form field carrying the anti-forgery token
    pub token_selector: String,

    /// Site-rendered error message containers
    pub error_selectors: Vec<String>,

    /// Filename used for attachments submitted without one
    pub default_image_name: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            board_selectors: selectors(&[
                ".board-list .board",
                ".boards .board",
                "[data-board-id]",
                "li.board",
                ".board-item",
                "a.board-link",
            ]),
            board_name_selectors: selectors(&[".board-name", ".board-title", ".name", "a"]),
            board_description_selectors: selectors(&[
                ".board-description",
                ".description",
                ".subtitle",
                "p",
            ]),
            known_boards: vec![
                KnownBoard::new("b", "Random"),
                KnownBoard::new("g", "Technology"),
                KnownBoard::new("a", "Anime & Manga"),
                KnownBoard::new("v", "Video Games"),
                KnownBoard::new("news", "News"),
            ],
            thread_selectors: selectors(&[
                ".catalog-thread",
                ".thread",
                "article.thread",
                "[data-thread-id]",
                ".thread-item",
                "div[id^='thread']",
            ]),
            thread_id_attributes: selectors(&["data-thread-id", "data-id", "id"]),
            post_id_attributes: selectors(&["data-post-id", "data-reply-id", "data-id", "id"]),
            title_selectors: selectors(&[".thread-title", ".subject", ".title", "h2", "h3"]),
            text_selectors: selectors(&[
                ".post-text",
                ".thread-text",
                ".message",
                ".comment",
                "blockquote",
                "p",
            ]),
            reply_count_selectors: selectors(&[
                ".reply-count",
                ".post-count",
                "span.replies",
                "small.replies",
            ]),
            image_selectors: selectors(&[
                "img.thread-image",
                ".thread-image img",
                "img.post-image",
                ".post-image img",
                ".file img",
                "img",
            ]),
            op_selectors: selectors(&[".op", ".original-post", ".thread-op", ".post"]),
            reply_selectors: selectors(&[
                ".reply",
                ".reply-post",
                "[data-reply-id]",
                ".post:not(.op)",
            ]),
            heuristic_container_selectors: selectors(&["div", "article", "section", "li"]),
            excluded_region_selectors: selectors(&["nav", "header", "footer"]),
            min_reply_text_len: 20,
            search_result_selectors: selectors(&[
                ".search-result",
                ".result",
                "li.result",
                "article.result",
            ]),
            search_title_selectors: selectors(&[".result-title", "h3", "h2", "a"]),
            search_snippet_selectors: selectors(&[".snippet", ".result-snippet", ".excerpt", "p"]),
            token_selector: "input[name=\"csrf_token\"]".to_string(),
            error_selectors: selectors(&[".error-message", ".error", ".alert-danger", "#errmsg"]),
            default_image_name: "image.jpg".to_string(),
        }
    }
}
