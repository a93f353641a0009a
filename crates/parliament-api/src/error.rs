//! API error types — maps internal failures onto the admin surface's JSON
//! error envelope (spec §6).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::NotFound(message) => write!(f, "not found: {message}"),
            Self::BadRequest(message) => write!(f, "bad request: {message}"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", "missing or invalid X-Api-Key".to_string()),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, "bad_request", message),
            Self::Internal(message) => {
                tracing::error!(error = %message, "internal API error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "operation failed".to_string())
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

impl From<parliament_db::DbError> for ApiError {
    fn from(err: parliament_db::DbError) -> Self {
        match err {
            parliament_db::DbError::NotFound(message) => Self::NotFound(message),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<parliament_core::CoreError> for ApiError {
    fn from(err: parliament_core::CoreError) -> Self {
        Self::BadRequest(err.to_string())
    }
}
