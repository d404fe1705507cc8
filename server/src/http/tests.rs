use super::dto::*;
use super::handlers;
use super::state::AppState;
use crate::chat::{ChatConfig, ChatProxy};
use crate::storage::{MemoryContentStore, RepositoryLocation, StoryRepository};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    routing::{get, post},
};
use std::sync::Arc;
use tower::util::ServiceExt;

fn create_test_app() -> Router {
    let store = Arc::new(MemoryContentStore::new());
    let stories = StoryRepository::new(store, RepositoryLocation::new("owner/tales"));
    let chat = ChatProxy::new(ChatConfig {
        api_url: "http://127.0.0.1:1/chat".to_string(),
        api_key: None,
    })
    .unwrap();
    let state = Arc::new(AppState {
        stories: Arc::new(stories),
        chat: Arc::new(chat),
    });

    Router::new()
        .route(
            "/api/stories",
            get(handlers::list_stories).post(handlers::save_story),
        )
        .route(
            "/api/stories/:filename",
            get(handlers::get_story).delete(handlers::delete_story),
        )
        .route("/api/chat", post(handlers::chat))
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let health: HealthResponse = serde_json::from_value(json).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "story-studio");
    assert!(!health.chat_configured);
}

#[tokio::test]
async fn test_save_and_get_story() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/stories",
            &serde_json::json!({"title": "The Dark Woods", "text": "It was late."}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let saved = json_body(response).await;
    assert_eq!(saved["success"], true);
    assert_eq!(saved["filename"], "the_dark_woods.json");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stories/the_dark_woods")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let doc = json_body(response).await;
    assert_eq!(doc["story"]["text"], "It was late.");
    assert_eq!(doc["sha"], saved["sha"]);
}

#[tokio::test]
async fn test_save_without_title_is_bad_request() {
    let app = create_test_app();

    let response = app
        .oneshot(post_json("/api/stories", &serde_json::json!({"text": "anon"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_value(json_body(response).await).unwrap();
    assert_eq!(error.error, "Bad Request");
}

#[tokio::test]
async fn test_get_missing_story() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stories/missing.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_with_stale_sha_conflicts() {
    let app = create_test_app();

    app.clone()
        .oneshot(post_json("/api/stories", &serde_json::json!({"title": "x"})))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/stories/x?sha=stale")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_empty() {
    let app = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/stories")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["stories"], serde_json::json!([]));
}

#[tokio::test]
async fn test_chat_without_key() {
    let app = create_test_app();

    let response = app
        .oneshot(post_json("/api/chat", &serde_json::json!({"messages": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = serde_json::from_value(json_body(response).await).unwrap();
    assert!(error.details.unwrap().contains("GROQ_API_KEY"));
}
