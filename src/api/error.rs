use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::json_response;

/// Failure surfaced to HTTP and CLI callers.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Malformed JSON or a field that failed validation.
    InvalidPayload(String),
    /// Well-formed input the calculator cannot produce a result for.
    Unprocessable(String),
    NotFound,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InvalidPayload(msg) => write!(f, "Invalid payload: {msg}"),
            ApiError::Unprocessable(msg) => write!(f, "Cannot compute: {msg}"),
            ApiError::NotFound => write!(f, "Not found"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<String> for ApiError {
    fn from(msg: String) -> Self {
        ApiError::InvalidPayload(msg)
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        json_response(
            self.status(),
            ErrorResponse {
                error: self.to_string(),
            },
        )
    }
}
