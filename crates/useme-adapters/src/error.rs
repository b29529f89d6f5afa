use thiserror::Error;
use useme_storage::FetchError;

/// Failure of one extraction step. The top-level extractors turn it into an
/// empty list or `None`.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("missing element: {0}")]
    MissingElement(&'static str),
    #[error("invalid number `{text}` in {field}")]
    InvalidNumber { field: &'static str, text: String },
    #[error("invalid url `{href}`: {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },
    #[error("unexpected JSON shape: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
