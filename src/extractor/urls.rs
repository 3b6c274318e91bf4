//! URL normalization and the site's known URL patterns.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

fn board_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/board/([A-Za-z0-9_-]+)/?$").expect("board path regex is valid"))
}

fn thread_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"/board/([A-Za-z0-9_-]+)/thread/(\d+)").expect("thread ref regex is valid")
    })
}

fn post_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:#p?|/post/)(\d+)").expect("post ref regex is valid"))
}

fn page_title_board_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/[A-Za-z0-9_-]+/$").expect("board tag regex is valid"))
}

/// Resolve `raw` against `base` the way a browser resolves an href.
///
/// Empty or unresolvable input yields an empty string.
pub fn normalize_url(base: &Url, raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return String::new();
    }
    base.join(raw).map(String::from).unwrap_or_default()
}

/// Path component of an absolute or relative href, without query or fragment.
fn href_path(href: &str) -> String {
    let href = href.trim();
    let path = match Url::parse(href) {
        Ok(url) => url.path().to_string(),
        Err(_) => href.split(['?', '#']).next().unwrap_or("").to_string(),
    };
    if path.starts_with('/') {
        path
    } else {
        format!("/{}", path)
    }
}

/// `/board/{id}` (board root only) → `id`
pub fn board_id_from_href(href: &str) -> Option<String> {
    let path = href_path(href);
    board_path_re()
        .captures(&path)
        .map(|caps| caps[1].to_string())
}

/// `/board/{board}/thread/{id}` anywhere in a URL → `(board, id)`
pub fn thread_ref(url: &str) -> Option<(String, String)> {
    thread_ref_re()
        .captures(url)
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
}

/// Post number named by a reply redirect, e.g. `…/thread/555#p777`.
pub fn post_id_from_location(location: &str) -> Option<String> {
    post_ref_re()
        .captures(location)
        .map(|caps| caps[1].to_string())
}

pub fn board_path(board: &str) -> String {
    format!("/board/{}", board)
}

pub fn catalog_path(board: &str) -> String {
    format!("/board/{}/catalog", board)
}

pub fn thread_path(board: &str, thread_id: &str) -> String {
    format!("/board/{}/thread/{}", board, thread_id)
}

pub fn create_thread_path(board: &str) -> String {
    format!("/board/{}/thread/create", board)
}

pub fn reply_path(board: &str, thread_id: &str) -> String {
    format!("/board/{}/thread/{}/reply", board, thread_id)
}

/// Pull a thread subject out of a `<title>` such as `/b/ - Subject - Site`.
///
/// Board tags are dropped and, when several segments remain, the last one
/// is taken to be the site name.
pub fn title_from_page_title(raw: &str) -> Option<String> {
    let mut segments: Vec<&str> = raw
        .split(" - ")
        .flat_map(|s| s.split(" | "))
        .map(str::trim)
        .filter(|s| !s.is_empty() && !page_title_board_re().is_match(s))
        .collect();

    if segments.len() > 1 {
        segments.pop();
    }

    let title = segments.join(" - ");
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_normalize_keeps_absolute() {
        let b = base("https://boards.test");
        assert_eq!(
            normalize_url(&b, "https://cdn.test/a.png"),
            "https://cdn.test/a.png"
        );
        assert_eq!(normalize_url(&b, "HTTP://cdn.test/a.png"), "http://cdn.test/a.png");
        assert_eq!(normalize_url(&b, "ftp://cdn.test/1.jpg"), "ftp://cdn.test/1.jpg");
        assert_eq!(normalize_url(&b, "data:image/png;base64,AAAA"), "data:image/png;base64,AAAA");
    }

    #[test]
    fn test_normalize_leading_slash() {
        assert_eq!(
            normalize_url(&base("https://boards.test"), "/img/1.jpg"),
            "https://boards.test/img/1.jpg"
        );
        assert_eq!(
            normalize_url(&base("https://boards.test/"), "/img/1.jpg"),
            "https://boards.test/img/1.jpg"
        );
    }

    #[test]
    fn test_normalize_relative() {
        let b = base("https://boards.test");
        assert_eq!(normalize_url(&b, "img/1.jpg"), "https://boards.test/img/1.jpg");
        assert_eq!(normalize_url(&b, "./img/1.jpg"), "https://boards.test/img/1.jpg");
        assert_eq!(normalize_url(&b, "../img/1.jpg"), "https://boards.test/img/1.jpg");
    }

    #[test]
    fn test_normalize_dot_segments_against_nested_base() {
        let b = base("https://boards.test/board/b/thread/5");
        assert_eq!(normalize_url(&b, "../x.jpg"), "https://boards.test/board/b/x.jpg");
        assert_eq!(normalize_url(&b, "img/x.jpg"), "https://boards.test/board/b/thread/img/x.jpg");
    }

    #[test]
    fn test_normalize_base_with_path() {
        let b = base("https://x.test/forum");
        assert_eq!(normalize_url(&b, "/img/1.jpg"), "https://x.test/img/1.jpg");
        assert_eq!(
            normalize_url(&base("https://x.test/forum/"), "img/1.jpg"),
            "https://x.test/forum/img/1.jpg"
        );
    }

    #[test]
    fn test_normalize_protocol_relative() {
        let b = base("https://boards.test");
        assert_eq!(normalize_url(&b, "//cdn.test/1.jpg"), "https://cdn.test/1.jpg");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_url(&base("https://boards.test"), "   "), "");
    }

    #[test]
    fn test_board_id_from_href() {
        assert_eq!(board_id_from_href("/board/tech").as_deref(), Some("tech"));
        assert_eq!(board_id_from_href("/board/tech/").as_deref(), Some("tech"));
        assert_eq!(
            board_id_from_href("https://boards.test/board/g?page=2").as_deref(),
            Some("g")
        );
        assert_eq!(board_id_from_href("board/a").as_deref(), Some("a"));
        assert_eq!(board_id_from_href("/board/b/thread/5"), None);
        assert_eq!(board_id_from_href("/about"), None);
    }

    #[test]
    fn test_thread_ref() {
        assert_eq!(
            thread_ref("https://boards.test/board/b/thread/555#p9"),
            Some(("b".to_string(), "555".to_string()))
        );
        assert_eq!(thread_ref("/board/b"), None);
    }

    #[test]
    fn test_post_id_from_location() {
        assert_eq!(
            post_id_from_location("/board/b/thread/555#p777").as_deref(),
            Some("777")
        );
        assert_eq!(post_id_from_location("/board/b/post/12").as_deref(), Some("12"));
        assert_eq!(post_id_from_location("/board/b/thread/555"), None);
    }

    #[test]
    fn test_title_from_page_title() {
        assert_eq!(
            title_from_page_title("/b/ - Cats are great - Example Board").as_deref(),
            Some("Cats are great")
        );
        assert_eq!(
            title_from_page_title("Cats | Example Board").as_deref(),
            Some("Cats")
        );
        assert_eq!(title_from_page_title("Lonely").as_deref(), Some("Lonely"));
        assert_eq!(title_from_page_title("/b/"), None);
        assert_eq!(title_from_page_title("  "), None);
    }
}
