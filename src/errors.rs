// errors.rs
use thiserror::Error;

use crate::fetcher::FetchError;

/// Errors originating from either the server logic
/// (routing, missing resources, etc.) or downstream layers (DB, providers).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Database Error: {0}")]
    DbError(String),
    /// The listing provider could not be reached or answered garbage.
    #[error("Upstream Error: {0}")]
    Upstream(String),
    #[error("Spreadsheet Error: {0}")]
    XlsxError(String),
    #[error("Internal Server Error")]
    InternalError,
}

impl ServerError {
    pub fn status(&self) -> u16 {
        match self {
            ServerError::NotFound => 404,
            ServerError::BadRequest(_) => 400,
            ServerError::Upstream(_) => 502,
            ServerError::DbError(_) | ServerError::XlsxError(_) | ServerError::InternalError => 500,
        }
    }
}

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        ServerError::DbError(e.to_string())
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(e: serde_json::Error) -> Self {
        ServerError::DbError(format!("document encoding failed: {e}"))
    }
}

impl From<FetchError> for ServerError {
    fn from(e: FetchError) -> Self {
        ServerError::Upstream(e.to_string())
    }
}
