use anyhow::Result;
use reqwest::{Client as ReqwestClient, Response, StatusCode};
use serde::Deserialize;
use shared_types::{
    DeleteStoryResponse, ListStoriesResponse, SaveStoryResponse, StoryDocument, StoryRecord,
    StorySummary,
};
use std::time::Duration;
use tracing::debug;

/// Client for the Story Studio HTTP API
pub struct StoryClient {
    client: ReqwestClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    details: Option<String>,
}

impl StoryClient {
    /// Create a new client instance
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn story_url(&self, name: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&format!("{}/api/stories", self.base_url))?;
        url.path_segments_mut()
            .map_err(|()| anyhow::anyhow!("Invalid base URL: {}", self.base_url))?
            .push(name);
        Ok(url)
    }

    /// List all stories
    pub async fn list_stories(&self) -> Result<Vec<StorySummary>> {
        let url = format!("{}/api/stories", self.base_url);

        let response = check(self.client.get(&url).send().await?, "stories").await?;
        let data: ListStoriesResponse = response.json().await?;

        Ok(data.stories)
    }

    /// Fetch one story by name, with or without `.json`
    pub async fn get_story(&self, name: &str) -> Result<StoryDocument> {
        let url = self.story_url(name)?;

        let response = check(self.client.get(url).send().await?, name).await?;

        Ok(response.json().await?)
    }

    /// Create or overwrite the story derived from the record's title
    pub async fn save_story(&self, record: &StoryRecord) -> Result<SaveStoryResponse> {
        let url = format!("{}/api/stories", self.base_url);
        debug!(title = ?record.title(), "Saving story");

        let response = self.client.post(&url).json(record).send().await?;
        let response = check(response, &record.to_string()).await?;

        Ok(response.json().await?)
    }

    /// Delete a story at the given version
    pub async fn delete_story(&self, name: &str, sha: &str) -> Result<()> {
        let url = self.story_url(name)?;

        let response = self
            .client
            .delete(url)
            .query(&[("sha", sha)])
            .send()
            .await?;
        let response = check(response, name).await?;

        let result: DeleteStoryResponse = response.json().await?;
        if !result.success {
            anyhow::bail!("Server reported failure deleting story: {}", name);
        }

        Ok(())
    }

    /// Send a chat-completion request through the server's proxy
    pub async fn chat(&self, request: &serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self.client.post(&url).json(request).send().await?;
        response.error_for_status_ref()?;

        Ok(response.json().await?)
    }

    /// Check if the service is healthy
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        let response = self.client.get(&url).send().await?;

        Ok(response.status() == StatusCode::OK)
    }
}

/// Map error statuses to readable errors; the server's `details` are kept
async fn check(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let details = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.details)
        .unwrap_or_default();

    match status {
        StatusCode::NOT_FOUND => anyhow::bail!("Story not found: {} {}", what, details),
        StatusCode::CONFLICT => {
            anyhow::bail!("Version conflict for {}: {}", what, details)
        }
        _ => anyhow::bail!("Request for {} failed with {}: {}", what, status, details),
    }
}
