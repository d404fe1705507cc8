use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use shared_types::{
    DeleteStoryResponse, ListStoriesResponse, SaveStoryResponse, StoryDocument, StoryRecord,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    dto::{DeleteStoryParams, HealthResponse},
    error::ApiResult,
    state::AppState,
};

/// GET /api/stories
/// List every story in the stories folder
#[instrument(skip(state))]
pub async fn list_stories(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ListStoriesResponse>> {
    let stories = state.stories.list_stories().await?;
    info!(count = stories.len(), "Listed stories");

    Ok(Json(ListStoriesResponse { stories }))
}

/// GET /api/stories/:filename
/// Fetch one story; `.json` is optional in the path
#[instrument(skip(state))]
pub async fn get_story(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> ApiResult<Json<StoryDocument>> {
    info!("Getting story: {}", filename);

    let document = state.stories.get_story(&filename).await?;

    Ok(Json(document))
}

/// POST /api/stories
/// Create or overwrite the story named by the body's title
#[instrument(skip(state, payload))]
pub async fn save_story(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StoryRecord>, JsonRejection>,
) -> ApiResult<Json<SaveStoryResponse>> {
    let Json(record) = payload?;
    info!("Saving story: {}", record);

    let saved = state.stories.save_story(&record).await?;

    Ok(Json(saved))
}

/// DELETE /api/stories/:filename?sha=...
/// Delete a story at the version the caller last saw
#[instrument(skip(state))]
pub async fn delete_story(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
    params: Result<Query<DeleteStoryParams>, QueryRejection>,
) -> ApiResult<Json<DeleteStoryResponse>> {
    let Query(params) = params?;
    info!("Deleting story: {}", filename);

    let sha = params.sha.as_deref().unwrap_or_default();
    state.stories.delete_story(&filename, sha).await?;

    Ok(Json(DeleteStoryResponse { success: true }))
}

/// POST /api/chat
/// Forward a chat-completion request, keeping the upstream status
#[instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let Json(body) = payload?;
    let reply = state.chat.complete(&body).await?;
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);

    Ok((status, Json(reply.body)))
}

/// GET /health
/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "story-studio".to_string(),
        chat_configured: state.chat.has_api_key(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
