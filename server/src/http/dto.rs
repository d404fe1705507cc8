use serde::{Deserialize, Serialize};

/// Query string for `DELETE /api/stories/:filename`
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteStoryParams {
    /// Version token from a prior list or get. Required; a missing one is
    /// rejected by the repository.
    #[serde(default)]
    pub sha: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub chat_configured: bool,
    pub timestamp: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
}
