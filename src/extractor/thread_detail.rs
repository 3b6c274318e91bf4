use scraper::{ElementRef, Html};
use tracing::{debug, info};

use crate::domain::{IdKind, Post, ThreadDetail};
use crate::extractor::fields::{
    element_text, first_match, first_text, id_from_attributes, image_url, is_within,
};
use crate::extractor::urls::{normalize_url, thread_path, title_from_page_title};
use crate::extractor::Extractor;

pub(super) fn extract(
    ex: &Extractor,
    document: &Html,
    board: &str,
    thread_id: &str,
) -> ThreadDetail {
    let root = document.root_element();
    let op = first_match(&root, &ex.strategies.ops);

    let title = op
        .and_then(|op| first_text(&op, &ex.strategies.titles))
        .or_else(|| first_text(&root, &ex.strategies.titles))
        .or_else(|| {
            first_text(&root, &ex.strategies.page_title)
                .and_then(|raw| title_from_page_title(&raw))
        })
        .unwrap_or_else(|| ThreadDetail::placeholder_title(thread_id));

    let text = op
        .map(|op| first_text(&op, &ex.strategies.texts).unwrap_or_else(|| element_text(&op)))
        .unwrap_or_default();

    let image = op
        .map(|op| image_url(&op, &ex.strategies.images, &ex.base))
        .unwrap_or_default();

    let op_post_id = op
        .and_then(|op| id_from_attributes(&op, &ex.config.post_id_attributes))
        .unwrap_or_else(|| thread_id.to_string());

    let mut posts = replies(ex, root, op, thread_id);
    if posts.is_empty() {
        info!(
            "No reply elements matched in thread {}, using heuristic scan",
            thread_id
        );
        posts = heuristic_replies(ex, root, op, &text, thread_id);
    }

    debug!("Thread {} has {} replies", thread_id, posts.len());

    ThreadDetail {
        id: thread_id.to_string(),
        title,
        text,
        image_url: image,
        board: board.to_string(),
        op_post_id,
        reply_count: posts.len() as u32,
        posts,
        url: normalize_url(&ex.base, &thread_path(board, thread_id)),
        error: None,
    }
}

fn is_op(el: &ElementRef<'_>, op: Option<ElementRef<'_>>) -> bool {
    op.is_some_and(|op| op.id() == el.id())
}

/// The OP element or anything nested in it.
fn within_op(el: &ElementRef<'_>, op: Option<ElementRef<'_>>) -> bool {
    op.is_some_and(|op| op.id() == el.id() || el.ancestors().any(|a| a.id() == op.id()))
}

fn post(ex: &Extractor, el: &ElementRef<'_>, text: String, thread_id: &str, n: usize) -> Post {
    let (id, id_kind) = match id_from_attributes(el, &ex.config.post_id_attributes) {
        Some(id) => (id, IdKind::Extracted),
        None => (Post::synthesized_id(thread_id, n), IdKind::Synthesized),
    };
    Post {
        id,
        text,
        image_url: image_url(el, &ex.strategies.images, &ex.base),
        id_kind,
    }
}

/// Replies from the first reply strategy that matches anything besides the OP.
fn replies(
    ex: &Extractor,
    root: ElementRef<'_>,
    op: Option<ElementRef<'_>>,
    thread_id: &str,
) -> Vec<Post> {
    ex.strategies
        .replies
        .iter()
        .find_map(|strategy| {
            let matches: Vec<_> = root
                .select(&strategy.selector)
                .filter(|el| !is_op(el, op))
                .collect();
            if matches.is_empty() {
                return None;
            }
            debug!(
                "reply strategy {:?} matched {} elements",
                strategy.source,
                matches.len()
            );
            Some(
                matches
                    .iter()
                    .enumerate()
                    .map(|(i, el)| {
                        let text = first_text(el, &ex.strategies.texts)
                            .unwrap_or_else(|| element_text(el));
                        post(ex, el, text, thread_id, i + 1)
                    })
                    .collect(),
            )
        })
        .unwrap_or_default()
}

/// Generic containers that look like standalone posts.
///
/// A candidate must sit outside navigation regions, carry enough text, not
/// overlap the OP, and not wrap another qualifying candidate.
fn heuristic_replies(
    ex: &Extractor,
    root: ElementRef<'_>,
    op: Option<ElementRef<'_>>,
    op_text: &str,
    thread_id: &str,
) -> Vec<Post> {
    let min_len = ex.config.min_reply_text_len;
    let is_container = |el: &ElementRef<'_>| {
        ex.strategies
            .containers
            .iter()
            .any(|s| s.selector.matches(el))
    };
    let qualifies = |el: &ElementRef<'_>| {
        is_container(el)
            && !within_op(el, op)
            && !is_within(el, &ex.strategies.excluded_regions)
            && element_text(el).chars().count() >= min_len
    };

    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| qualifies(el))
        .filter(|el| {
            !el.descendants()
                .skip(1)
                .filter_map(ElementRef::wrap)
                .any(|d| qualifies(&d))
        })
        .filter_map(|el| {
            let text = element_text(&el);
            let overlaps =
                !op_text.is_empty() && (text.contains(op_text) || op_text.contains(text.as_str()));
            (!overlaps).then_some((el, text))
        })
        .enumerate()
        .map(|(i, (el, text))| Post {
            id: Post::synthesized_id(thread_id, i + 1),
            text,
            image_url: image_url(&el, &ex.strategies.images, &ex.base),
            id_kind: IdKind::Synthesized,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::domain::IdKind;
    use url::Url;

    use crate::extractor::{Extractor, SelectorConfig};

    fn extractor() -> Extractor {
        Extractor::new(
            Url::parse("https://boards.test").unwrap(),
            SelectorConfig::default(),
        )
    }

    #[test]
    fn test_structured_thread_page() {
        let html = r#"
            <div class="thread">
              <div class="post op" data-post-id="500">
                <h2 class="subject">Keyboards</h2>
                <img src="/media/500.png">
                <div class="post-text">Post your setups</div>
              </div>
              <div class="post reply" data-post-id="501"><div class="post-text">Mine is loud</div></div>
              <div class="post reply" data-post-id="502">
                <img data-src="//cdn.boards.test/502.jpg">
                <div class="post-text">Mine is quiet</div>
              </div>
            </div>"#;
        let detail = extractor().thread_detail(html, "g", "500");

        assert_eq!(detail.title, "Keyboards");
        assert_eq!(detail.text, "Post your setups");
        assert_eq!(detail.image_url, "https://boards.test/media/500.png");
        assert_eq!(detail.op_post_id, "500");
        assert_eq!(detail.url, "https://boards.test/board/g/thread/500");
        assert_eq!(detail.reply_count, 2);
        assert!(detail.error.is_none());

        let ids: Vec<_> = detail.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["501", "502"]);
        assert!(detail.posts.iter().all(|p| p.has_stable_id()));
        assert_eq!(detail.posts[1].text, "Mine is quiet");
        assert_eq!(detail.posts[1].image_url, "https://cdn.boards.test/502.jpg");
    }

    #[test]
    fn test_op_matched_by_generic_post_selector_is_not_a_reply() {
        let html = r#"
            <div class="post" id="p1"><blockquote>Opening words of the thread</blockquote></div>
            <div class="post" id="p2"><blockquote>First answer</blockquote></div>"#;
        let detail = extractor().thread_detail(html, "b", "1");

        assert_eq!(detail.op_post_id, "1");
        assert_eq!(detail.posts.len(), 1);
        assert_eq!(detail.posts[0].id, "2");
        assert_eq!(detail.posts[0].text, "First answer");
    }

    #[test]
    fn test_replies_without_ids_are_synthesized() {
        let html = r#"
            <div class="op"><p>Opening post text</p></div>
            <div class="reply"><p>one</p></div>
            <div class="reply"><p>two</p></div>"#;
        let detail = extractor().thread_detail(html, "b", "77");

        let ids: Vec<_> = detail.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["77_reply_1", "77_reply_2"]);
        assert!(detail.posts.iter().all(|p| p.id_kind == IdKind::Synthesized));
    }

    #[test]
    fn test_heuristic_replies() {
        let html = r#"
            <html><body>
              <header><div>Site header with a long enough banner text</div></header>
              <nav><div>Home | Boards | Search | Rules | Contact us</div></nav>
              <div class="op"><h1>Question</h1><p>Does anyone still use film cameras?</p></div>
              <div class="wrapper">
                <div>Yes, I shoot medium format every weekend.</div>
                <div>short</div>
                <div>Digital is fine but film has a certain look.</div>
              </div>
              <footer><div>Copyright notice that is also quite long</div></footer>
            </body></html>"#;
        let detail = extractor().thread_detail(html, "p", "9");

        let texts: Vec<_> = detail.posts.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Yes, I shoot medium format every weekend.",
                "Digital is fine but film has a certain look.",
            ]
        );
        assert_eq!(detail.posts[0].id, "9_reply_1");
        assert_eq!(detail.posts[1].id, "9_reply_2");
        assert_eq!(detail.reply_count, 2);
    }

    #[test]
    fn test_heuristic_skips_op_children() {
        let html = r#"
            <html><body>
              <div class="op">
                <div class="post-meta">Anonymous 2024-01-01 No.9</div>
                <div class="post-text">Does anyone still use film cameras?</div>
              </div>
              <div class="wrapper">
                <div>Yes, I shoot medium format every weekend.</div>
              </div>
            </body></html>"#;
        let detail = extractor().thread_detail(html, "p", "9");

        let texts: Vec<_> = detail.posts.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["Yes, I shoot medium format every weekend."]);
    }

    #[test]
    fn test_heuristic_reply_images_are_absolute() {
        let html = r#"
            <html><body>
              <div class="op"><p>Show your desk setups please</p></div>
              <div class="wrapper">
                <div><img src="img/desk.jpg">Here is mine, very cluttered today.</div>
                <div><img data-src="../up/desk2.jpg">Minimalist corner desk in the attic.</div>
              </div>
            </body></html>"#;
        let ex = Extractor::new(
            Url::parse("https://boards.test/board/b/thread/9").unwrap(),
            SelectorConfig::default(),
        );
        let detail = ex.thread_detail(html, "b", "9");

        let images: Vec<_> = detail.posts.iter().map(|p| p.image_url.as_str()).collect();
        assert_eq!(
            images,
            vec![
                "https://boards.test/board/b/thread/img/desk.jpg",
                "https://boards.test/board/b/up/desk2.jpg",
            ]
        );
    }

    #[test]
    fn test_title_from_page_title() {
        let html = r#"<html><head><title>/b/ - Lost cat - Example Board</title></head><body></body></html>"#;
        let detail = extractor().thread_detail(html, "b", "3");
        assert_eq!(detail.title, "Lost cat");
    }

    #[test]
    fn test_placeholder_title_and_empty_thread() {
        let detail = extractor().thread_detail("<html><body></body></html>", "b", "3");
        assert_eq!(detail.title, "Thread 3");
        assert!(detail.posts.is_empty());
        assert_eq!(detail.op_post_id, "3");
        assert_eq!(detail.text, "");
    }

    #[test]
    fn test_thread_detail_is_deterministic() {
        let html = r#"<div class="op"><p>Opening post text</p></div><div class="reply"><p>hello</p></div>"#;
        let ex = extractor();
        assert_eq!(ex.thread_detail(html, "b", "1"), ex.thread_detail(html, "b", "1"));
    }
}
