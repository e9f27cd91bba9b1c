//! Error responses for the REST API.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use routebook_core::ValidationError;
use serde_json::json;
use std::any::Any;
use thiserror::Error;

/// Body returned for every unexpected failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound,

    #[error("route already exists")]
    Conflict,

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Invalid body",
                    "issues": err.issues,
                })),
            )
                .into_response(),
            ApiError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
            }
            ApiError::Conflict => (
                StatusCode::CONFLICT,
                Json(json!({ "error": "Route already exists" })),
            )
                .into_response(),
            ApiError::Internal(err) => {
                tracing::error!("Request failed: {:?}", err);
                internal_error_response()
            }
        }
    }
}

fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": INTERNAL_ERROR_MESSAGE })),
    )
        .into_response()
}

/// Turn a caught handler panic into the generic 500 response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!("Handler panicked: {}", detail);
    internal_error_response()
}
