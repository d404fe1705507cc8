use thiserror::Error;

/// Classified failure of a story or content-store operation.
///
/// Each kind survives unchanged up to the HTTP layer, which owns the mapping
/// to status codes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Version conflict: {0}")]
    Conflict(String),

    #[error("Content store rejected credentials: {0}")]
    Auth(String),

    #[error("Stored content is malformed: {0}")]
    Parse(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Transport(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
