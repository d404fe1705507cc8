pub mod codec;
mod config;
mod error;
mod github;
mod memory;
mod repository;
mod traits;


pub use config::{RepositoryLocation, StorageConfig};
pub use error::{StoreError, StoreResult};
pub use github::GitHubContentStore;
pub use memory::MemoryContentStore;
pub use repository::{StoryRepository, derive_filename, normalize_filename};
pub use traits::{ContentStore, EntryKind, PutOutcome, StoredFile};

use std::sync::Arc;

/// Build the content store selected by `config`
pub fn content_store_from_config(config: &StorageConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
    let store: Arc<dyn ContentStore> = match config {
        StorageConfig::GitHub { api_url, token, .. } => {
            Arc::new(GitHubContentStore::new(api_url, token)?)
        }
        StorageConfig::Memory { .. } => Arc::new(MemoryContentStore::new()),
    };
    Ok(store)
}
