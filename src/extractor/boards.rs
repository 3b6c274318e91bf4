use std::collections::HashSet;

use scraper::{ElementRef, Html};
use tracing::{debug, info, warn};

use crate::domain::{Board, BoardOrigin};
use crate::extractor::fields::{element_text, first_text};
use crate::extractor::urls::board_id_from_href;
use crate::extractor::{first_strategy, Extractor};

const BOARD_ID_ATTRIBUTES: [&str; 2] = ["data-board-id", "data-board"];

/// Keeps the first board seen for every id.
#[derive(Default)]
struct BoardSet {
    boards: Vec<Board>,
    seen: HashSet<String>,
}

impl BoardSet {
    fn insert(&mut self, board: Board) {
        if self.seen.insert(board.id.clone()) {
            self.boards.push(board);
        }
    }
}

pub(super) fn extract(ex: &Extractor, document: &Html) -> Vec<Board> {
    let root = document.root_element();
    let mut set = BoardSet::default();

    if let Some((_, elements)) = first_strategy(root, &ex.strategies.boards, "board") {
        for el in elements {
            match from_element(ex, &el) {
                Some(board) => set.insert(board),
                None => debug!("Board element without an id: {}", element_text(&el)),
            }
        }
    }

    if set.boards.is_empty() {
        info!("No board elements matched, scanning hyperlinks");
        for board in from_links(ex, root) {
            set.insert(board);
        }
    }

    if set.boards.is_empty() {
        warn!("No boards found in markup, falling back to the built-in list");
    }

    for known in &ex.config.known_boards {
        set.insert(Board::new(&known.id, &known.name, BoardOrigin::Builtin));
    }

    set.boards
}

fn from_element(ex: &Extractor, el: &ElementRef<'_>) -> Option<Board> {
    let id = board_id(ex, el)?;

    let name = first_text(el, &ex.strategies.board_names)
        .or_else(|| Some(element_text(el)).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| id.clone());

    let description = first_text(el, &ex.strategies.board_descriptions)
        .filter(|d| *d != name)
        .unwrap_or_default();

    Some(Board {
        id,
        name,
        description,
        origin: BoardOrigin::Markup,
    })
}

fn board_id(ex: &Extractor, el: &ElementRef<'_>) -> Option<String> {
    let from_attr = BOARD_ID_ATTRIBUTES
        .iter()
        .filter_map(|attr| el.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(String::from);

    from_attr
        .or_else(|| el.value().attr("href").and_then(board_id_from_href))
        .or_else(|| {
            ex.strategies.links.iter().find_map(|strategy| {
                el.select(&strategy.selector)
                    .filter_map(|a| a.value().attr("href"))
                    .find_map(board_id_from_href)
            })
        })
}

/// Minimal boards from every `/board/{id}` hyperlink on the page.
fn from_links<'a>(ex: &'a Extractor, root: ElementRef<'a>) -> impl Iterator<Item = Board> + 'a {
    ex.strategies.links.iter().flat_map(move |strategy| {
        root.select(&strategy.selector).filter_map(|a| {
            let id = a.value().attr("href").and_then(board_id_from_href)?;
            let text = element_text(&a);
            let name = if text.is_empty() { id.clone() } else { text };
            Some(Board::new(id, name, BoardOrigin::Link))
        })
    })
}

#[cfg(test)]
mod tests {
    use crate::domain::BoardOrigin;
    use url::Url;

    use crate::extractor::{Extractor, SelectorConfig};

    fn extractor() -> Extractor {
        Extractor::new(
            Url::parse("https://boards.test").unwrap(),
            SelectorConfig::default(),
        )
    }

    fn ids(boards: &[crate::domain::Board]) -> Vec<&str> {
        boards.iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_structured_board_list() {
        let html = r#"
            <ul class="board-list">
              <li class="board"><a href="/board/tech">Tech</a><p class="board-description">Computers</p></li>
              <li class="board"><a href="/board/art">Art</a></li>
            </ul>"#;
        let boards = extractor().boards(html);

        assert_eq!(boards[0].id, "tech");
        assert_eq!(boards[0].name, "Tech");
        assert_eq!(boards[0].description, "Computers");
        assert_eq!(boards[0].origin, BoardOrigin::Markup);
        assert_eq!(boards[1].id, "art");
        assert_eq!(boards[1].description, "");
    }

    #[test]
    fn test_data_attribute_id() {
        let html = r#"<div data-board-id="mu"><span class="board-name">Music</span></div>"#;
        let boards = extractor().boards(html);
        assert_eq!(boards[0].id, "mu");
        assert_eq!(boards[0].name, "Music");
    }

    #[test]
    fn test_link_fallback_plus_known_boards() {
        let html = r#"<html><body><p>Welcome</p><a href="/board/tech">Tech</a><a href="/rules">Rules</a></body></html>"#;
        let boards = extractor().boards(html);

        assert_eq!(boards[0].id, "tech");
        assert_eq!(boards[0].name, "Tech");
        assert_eq!(boards[0].origin, BoardOrigin::Link);
        for known in SelectorConfig::default().known_boards {
            assert!(boards.iter().any(|b| b.id == known.id));
        }
    }

    #[test]
    fn test_builtin_fallback_when_nothing_found() {
        let boards = extractor().boards("<html><body><p>maintenance</p></body></html>");
        let expected: Vec<String> = SelectorConfig::default()
            .known_boards
            .into_iter()
            .map(|b| b.id)
            .collect();

        assert_eq!(ids(&boards), expected.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(boards.iter().all(|b| b.is_fallback()));
    }

    #[test]
    fn test_ids_are_unique_and_first_occurrence_wins() {
        let html = r#"
            <div class="boards">
              <div class="board"><a href="/board/b">Random (main)</a></div>
              <div class="board"><a href="/board/b">Random (mirror)</a></div>
              <div class="board"><a href="/board/g">Gadgets</a></div>
            </div>"#;
        let boards = extractor().boards(html);

        let mut seen = std::collections::HashSet::new();
        assert!(boards.iter().all(|b| seen.insert(b.id.clone())));

        let random = boards.iter().find(|b| b.id == "b").unwrap();
        assert_eq!(random.name, "Random (main)");
        assert_eq!(random.origin, BoardOrigin::Markup);
        // known board "g" keeps the name from the markup
        let g = boards.iter().find(|b| b.id == "g").unwrap();
        assert_eq!(g.name, "Gadgets");
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let html = r#"<a href="/board/x">X</a><a href="/board/y">Y</a>"#;
        let ex = extractor();
        assert_eq!(ex.boards(html), ex.boards(html));
    }
}
