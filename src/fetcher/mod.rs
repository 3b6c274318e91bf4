pub mod cookies;
pub mod http_fetcher;
#[cfg(test)]
pub mod mock;
pub mod rate_limit;

use async_trait::async_trait;

use crate::app::Result;

/// A response the transport considers non-exceptional (status below 500).
#[derive(Debug, Clone)]
pub struct Page {
    pub url: String,
    pub status: u16,
    pub body: String,
    /// `Location` header, present on redirects
    pub location: Option<String>,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }
}

/// A binary part of a multipart submission.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Multipart payload kept as plain data so a throttled submission can be
/// rebuilt and sent again.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub file: Option<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn file(mut self, field: &str, filename: &str, bytes: Vec<u8>) -> Self {
        self.file = Some(FilePart {
            field: field.to_string(),
            filename: filename.to_string(),
            bytes,
        });
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub(crate) fn to_reqwest(&self) -> reqwest::multipart::Form {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        if let Some(file) = &self.file {
            let part =
                reqwest::multipart::Part::bytes(file.bytes.clone()).file_name(file.filename.clone());
            form = form.part(file.field.clone(), part);
        }
        form
    }
}

/// Session transport: every request goes through pacing and the cookie jar.
#[async_trait]
pub trait Fetcher {
    /// GET `path` (relative to the site origin) with optional query pairs.
    async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<Page>;

    /// POST a multipart form to `path`. Redirects are returned, not followed.
    async fn submit(&self, path: &str, form: &MultipartForm, referer: &str) -> Result<Page>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(status: u16) -> Page {
        Page {
            url: "https://boards.test/".into(),
            status,
            body: String::new(),
            location: None,
        }
    }

    #[test]
    fn test_page_status_classes() {
        assert!(page(200).is_success());
        assert!(!page(200).is_redirect());
        assert!(page(302).is_redirect());
        assert!(!page(404).is_success());
        assert!(!page(404).is_redirect());
    }

    #[test]
    fn test_form_builder() {
        let form = MultipartForm::new()
            .text("title", "Hello")
            .text("text", "World")
            .file("image", "cat.png", vec![1, 2, 3]);

        assert_eq!(form.field("title"), Some("Hello"));
        assert_eq!(form.field("missing"), None);
        assert_eq!(form.file.as_ref().map(|f| f.filename.as_str()), Some("cat.png"));
    }
}
