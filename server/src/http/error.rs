use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::dto::ErrorResponse;
use crate::chat::ChatError;
use crate::storage::StoreError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    BadGateway(String),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "Version Conflict", msg),
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "Bad Gateway", msg),
            ApiError::InternalError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                msg,
            ),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details: Some(details),
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(msg) => ApiError::BadRequest(msg),
            StoreError::NotFound(msg) => ApiError::NotFound(format!("Story not found: {msg}")),
            StoreError::Conflict(msg) => ApiError::Conflict(format!(
                "Story changed since it was read, reload and retry: {msg}"
            )),
            StoreError::Auth(msg) => {
                warn!(error = %msg, "Content store rejected credentials");
                ApiError::BadGateway(format!("Content store rejected credentials: {msg}"))
            }
            StoreError::Parse(msg) => {
                ApiError::InternalError(format!("Stored story is malformed: {msg}"))
            }
            StoreError::Transport(msg) => {
                ApiError::BadGateway(format!("Content store unavailable: {msg}"))
            }
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::MissingApiKey => ApiError::InternalError(err.to_string()),
            ChatError::Transport(_) | ChatError::InvalidResponse(_) => {
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
