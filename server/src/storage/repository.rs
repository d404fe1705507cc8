use shared_types::{SaveStoryResponse, StoryDocument, StoryRecord, StorySummary};
use std::sync::Arc;
use tracing::{debug, info};

use super::codec;
use super::config::RepositoryLocation;
use super::error::{StoreError, StoreResult};
use super::traits::ContentStore;

const STORY_SUFFIX: &str = ".json";

/// Filename a story is stored under.
///
/// Lower-cased, trimmed, whitespace runs collapsed to `_`, with `.json`
/// appended. Titles that differ only in case or spacing share a file and
/// overwrite each other.
pub fn derive_filename(title: &str) -> String {
    let stem = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace(['/', '\\'], "_");
    format!("{stem}{STORY_SUFFIX}")
}

/// Accepts `name` or `name.json`, refusing anything that could leave the
/// stories folder.
pub fn normalize_filename(name: &str) -> StoreResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Validation("story name is empty".to_string()));
    }
    if name.contains(['/', '\\']) {
        return Err(StoreError::Validation(format!("invalid story name: {name}")));
    }

    if name.ends_with(STORY_SUFFIX) {
        Ok(name.to_string())
    } else {
        Ok(format!("{name}{STORY_SUFFIX}"))
    }
}

/// Story operations over a [`ContentStore`]
pub struct StoryRepository {
    store: Arc<dyn ContentStore>,
    location: RepositoryLocation,
}

impl StoryRepository {
    pub fn new(store: Arc<dyn ContentStore>, location: RepositoryLocation) -> Self {
        Self { store, location }
    }

    /// All `.json` files in the stories folder. A missing folder lists as
    /// empty; every other failure is returned as-is.
    pub async fn list_stories(&self) -> StoreResult<Vec<StorySummary>> {
        let entries = match self.store.list_directory(&self.location).await {
            Ok(entries) => entries,
            Err(StoreError::NotFound(path)) => {
                debug!(%path, "Stories folder does not exist yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        Ok(entries
            .into_iter()
            .filter(|entry| entry.is_file())
            .filter_map(|entry| {
                let name = entry.name.strip_suffix(STORY_SUFFIX)?.to_string();
                Some(StorySummary {
                    name,
                    filename: entry.name,
                    sha: entry.sha,
                    url: entry.download_url,
                })
            })
            .collect())
    }

    pub async fn get_story(&self, name: &str) -> StoreResult<StoryDocument> {
        let filename = normalize_filename(name)?;
        let file = self.store.get_file(&self.location, &filename).await?;

        let content = file
            .content_base64
            .as_deref()
            .ok_or_else(|| StoreError::Parse(format!("{} has no inline content", file.path)))?;
        let story = codec::decode(content)?;

        Ok(StoryDocument {
            filename,
            sha: file.sha,
            story,
        })
    }

    /// Create or overwrite the story file derived from the record's title.
    ///
    /// The current sha is looked up first and sent with the write; if
    /// another writer gets in between, the store rejects it as a conflict.
    pub async fn save_story(&self, record: &StoryRecord) -> StoreResult<SaveStoryResponse> {
        let title = record
            .title()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| StoreError::Validation("title is required".to_string()))?;

        let filename = derive_filename(title);

        let existing_sha = match self.store.get_file(&self.location, &filename).await {
            Ok(file) => file.sha,
            Err(StoreError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let content = codec::encode(record)?;
        let message = format!("Save story: {title}");

        let outcome = self
            .store
            .put_file(
                &self.location,
                &filename,
                &content,
                &message,
                existing_sha.as_deref(),
            )
            .await?;

        info!(%filename, update = existing_sha.is_some(), "Story saved");

        Ok(SaveStoryResponse {
            success: true,
            filename,
            sha: outcome.sha,
        })
    }

    pub async fn delete_story(&self, name: &str, sha: &str) -> StoreResult<()> {
        let filename = normalize_filename(name)?;
        let sha = sha.trim();
        if sha.is_empty() {
            return Err(StoreError::Validation(
                "sha is required to delete a story".to_string(),
            ));
        }

        let message = format!("Delete story: {filename}");
        self.store
            .delete_file(&self.location, &filename, sha, &message)
            .await?;

        info!(%filename, "Story deleted");
        Ok(())
    }
}
