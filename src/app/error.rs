use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChanscrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Rate limited by {url} after {attempts} attempts")]
    RateLimited { url: String, attempts: u32 },

    #[error("{0}")]
    Action(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ChanscrapeError>;
