use anyhow::Result;
use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, path::Path, sync::Arc};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use super::{handlers, state::AppState};

/// Build the router. Files under `public_dir` are served for any path the
/// API does not claim.
pub fn router(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    let app_state = Arc::new(state);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Story CRUD operations
        .route(
            "/api/stories",
            get(handlers::list_stories).post(handlers::save_story),
        )
        .route(
            "/api/stories/:filename",
            get(handlers::get_story).delete(handlers::delete_story),
        )
        // LLM proxy
        .route("/api/chat", post(handlers::chat))
        // Add state
        .with_state(app_state)
        .fallback_service(ServeDir::new(public_dir.as_ref()))
        // Add middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn start_server(
    state: AppState,
    public_dir: impl AsRef<Path>,
    bind_address: SocketAddr,
) -> Result<()> {
    info!(public_dir = %public_dir.as_ref().display(), "Serving static files");
    let app = router(state, public_dir);

    info!("Server listening on {}", bind_address);

    // Run the server
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
