//! Pass-through proxy for OpenAI-compatible chat completions.
//!
//! The API key stays on the server; browsers post the completion request
//! body here and get the upstream reply back unchanged.

use reqwest::Client as ReqwestClient;
use reqwest::header::AUTHORIZATION;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_CHAT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_url: String,
    pub api_key: Option<String>,
}

impl ChatConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_url: var("GROQ_API_URL").unwrap_or_else(|| DEFAULT_CHAT_API_URL.to_string()),
            api_key: var("GROQ_API_KEY"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("GROQ_API_KEY is not configured")]
    MissingApiKey,

    #[error("Chat API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Chat API returned a non-JSON body: {0}")]
    InvalidResponse(String),
}

/// Upstream status and JSON body
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub status: u16,
    pub body: serde_json::Value,
}

pub struct ChatProxy {
    client: ReqwestClient,
    config: ChatConfig,
}

impl ChatProxy {
    pub fn new(config: ChatConfig) -> anyhow::Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub async fn complete(&self, body: &serde_json::Value) -> Result<ChatReply, ChatError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ChatError::MissingApiKey)?;

        let response = self
            .client
            .post(&self.config.api_url)
            .header(AUTHORIZATION, format!("Bearer {api_key}"))
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        debug!(status, len = bytes.len(), "Chat API replied");

        let body = serde_json::from_slice(&bytes)
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        Ok(ChatReply { status, body })
    }
}
