//! Errors returned by the Routebook HTTP client.

use routebook_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the payload; carries every issue it reported.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("route {0} not found")]
    NotFound(i64),

    #[error("another saved route already uses these labels")]
    Conflict,

    #[error("unexpected response {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}
