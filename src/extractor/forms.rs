use scraper::Html;

use crate::extractor::fields::first_text;
use crate::extractor::Extractor;

pub(super) fn token(ex: &Extractor, document: &Html) -> Option<(String, String)> {
    let root = document.root_element();
    ex.strategies.token.iter().find_map(|strategy| {
        root.select(&strategy.selector).find_map(|input| {
            let name = input.value().attr("name")?.trim();
            let value = input.value().attr("value")?.trim();
            if name.is_empty() || value.is_empty() {
                None
            } else {
                Some((name.to_string(), value.to_string()))
            }
        })
    })
}

pub(super) fn error_message(ex: &Extractor, document: &Html) -> Option<String> {
    first_text(&document.root_element(), &ex.strategies.errors)
}

#[cfg(test)]
mod tests {
    use url::Url;

    use crate::extractor::{Extractor, SelectorConfig};

    fn extractor() -> Extractor {
        Extractor::new(
            Url::parse("https://boards.test").unwrap(),
            SelectorConfig::default(),
        )
    }

    #[test]
    fn test_token_found() {
        let html = r#"<form><input type="hidden" name="csrf_token" value=" abc123 "><textarea name="text"></textarea></form>"#;
        assert_eq!(
            extractor().form_token(html),
            Some(("csrf_token".to_string(), "abc123".to_string()))
        );
    }

    #[test]
    fn test_empty_or_missing_token() {
        let ex = extractor();
        assert_eq!(ex.form_token(r#"<input name="csrf_token" value="">"#), None);
        assert_eq!(ex.form_token("<form></form>"), None);
    }

    #[test]
    fn test_custom_token_selector() {
        let config = SelectorConfig {
            token_selector: "input[name=\"_token\"]".to_string(),
            ..SelectorConfig::default()
        };
        let ex = Extractor::new(Url::parse("https://boards.test").unwrap(), config);
        let token = ex.form_token(r#"<input name="_token" value="xyz">"#);
        assert_eq!(token, Some(("_token".to_string(), "xyz".to_string())));
    }

    #[test]
    fn test_error_message() {
        let ex = extractor();
        let html = r#"<body><div class="error-message">Duplicate post</div></body>"#;
        assert_eq!(ex.error_message(html).as_deref(), Some("Duplicate post"));
        assert_eq!(ex.error_message("<body><p>ok</p></body>"), None);
    }
}
