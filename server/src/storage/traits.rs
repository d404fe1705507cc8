use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::config::RepositoryLocation;
use super::error::StoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of the remote content store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub path: String,
    pub name: String,
    /// Version token; absent for files that do not exist yet
    pub sha: Option<String>,
    /// Raw base64 `content` field, only present on single-file fetches
    pub content_base64: Option<String>,
    pub download_url: Option<String>,
    pub kind: EntryKind,
}

impl StoredFile {
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Result of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOutcome {
    /// New version token, `None` if the store's reply could not be read
    pub sha: Option<String>,
}

/// Path-addressed, branch-scoped content store.
///
/// Implementations classify every failure into a [`StoreError`] kind and
/// never retry.
///
/// [`StoreError`]: super::error::StoreError
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// List the configured folder. A missing folder is `NotFound`, an empty
    /// one is an empty vector.
    async fn list_directory(&self, location: &RepositoryLocation) -> StoreResult<Vec<StoredFile>>;

    async fn get_file(
        &self,
        location: &RepositoryLocation,
        filename: &str,
    ) -> StoreResult<StoredFile>;

    /// Create or update a file.
    ///
    /// # Arguments
    /// * `content_base64` - File content, already base64-encoded
    /// * `message` - Commit message
    /// * `existing_sha` - The version being replaced:
    ///   - `None`: the file must not exist yet
    ///   - `Some(sha)`: the file's current sha must be `sha`
    ///
    /// # Errors
    /// Returns `StoreError::Conflict` if the version token is stale or missing
    async fn put_file(
        &self,
        location: &RepositoryLocation,
        filename: &str,
        content_base64: &str,
        message: &str,
        existing_sha: Option<&str>,
    ) -> StoreResult<PutOutcome>;

    async fn delete_file(
        &self,
        location: &RepositoryLocation,
        filename: &str,
        sha: &str,
        message: &str,
    ) -> StoreResult<()>;
}
