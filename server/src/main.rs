use anyhow::{Context, Result};
use server::chat::{ChatConfig, ChatProxy};
use server::http::{self, state::AppState};
use server::storage::{self, StorageConfig, StoryRepository};
use std::{net::SocketAddr, sync::Arc};
use tracing::{Level, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` is optional; real environment variables take precedence
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    info!("Starting Story Studio server");

    // Initialize storage backend
    let storage_config = StorageConfig::from_env()?;
    let location = storage_config.location().clone();
    info!(
        repo = %location.repo,
        branch = %location.branch,
        folder = %location.folder,
        "Using story location"
    );

    let store = storage::content_store_from_config(&storage_config)?;
    let stories = Arc::new(StoryRepository::new(store, location));

    let chat = ChatProxy::new(ChatConfig::from_env())?;
    if !chat.has_api_key() {
        warn!("GROQ_API_KEY is not set; /api/chat will fail");
    }

    let state = AppState {
        stories,
        chat: Arc::new(chat),
    };

    let public_dir = std::env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string());

    // Bind to address
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = std::env::var("BIND_ADDRESS")
        .unwrap_or_else(|_| format!("0.0.0.0:{port}"))
        .parse::<SocketAddr>()
        .context("Invalid BIND_ADDRESS or PORT")?;

    // Start the HTTP server
    http::start_server(state, public_dir, addr).await?;

    Ok(())
}
