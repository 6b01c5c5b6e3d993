use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Provider not configured: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(String),
    #[error("Unexpected data shape: {0}")]
    UnexpectedShape(String),
    #[error("Missing field: {0}")]
    MissingField(&'static str),
}
