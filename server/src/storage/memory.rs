use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use super::config::RepositoryLocation;
use super::error::{StoreError, StoreResult};
use super::traits::{ContentStore, EntryKind, PutOutcome, StoredFile};

#[derive(Debug, Clone)]
struct MemoryFile {
    sha: String,
    content_base64: String,
}

/// In-process [`ContentStore`] with the same sha rules as GitHub.
///
/// Files are keyed by `(branch, path)`. As in git, a folder exists only while
/// it holds at least one file.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    files: RwLock<BTreeMap<(String, String), MemoryFile>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current sha of a file, if it exists
    pub async fn sha_of(&self, location: &RepositoryLocation, filename: &str) -> Option<String> {
        let key = (location.branch.clone(), location.file_path(filename));
        self.files.read().await.get(&key).map(|f| f.sha.clone())
    }

    fn new_sha() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn list_directory(&self, location: &RepositoryLocation) -> StoreResult<Vec<StoredFile>> {
        let prefix = location.file_path("");
        let files = self.files.read().await;

        let mut entries = Vec::new();
        let mut subdirs = BTreeSet::new();
        for ((branch, path), file) in files.iter() {
            if *branch != location.branch {
                continue;
            }
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((dir, _)) => {
                    subdirs.insert(dir.to_string());
                }
                None => entries.push(StoredFile {
                    path: path.clone(),
                    name: rest.to_string(),
                    sha: Some(file.sha.clone()),
                    content_base64: None,
                    download_url: None,
                    kind: EntryKind::File,
                }),
            }
        }

        if entries.is_empty() && subdirs.is_empty() && !location.folder.is_empty() {
            return Err(StoreError::NotFound(location.folder.clone()));
        }

        entries.extend(subdirs.into_iter().map(|dir| StoredFile {
            path: format!("{prefix}{dir}"),
            name: dir,
            sha: None,
            content_base64: None,
            download_url: None,
            kind: EntryKind::Dir,
        }));

        Ok(entries)
    }

    async fn get_file(
        &self,
        location: &RepositoryLocation,
        filename: &str,
    ) -> StoreResult<StoredFile> {
        let path = location.file_path(filename);
        let files = self.files.read().await;
        let file = files
            .get(&(location.branch.clone(), path.clone()))
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;

        Ok(StoredFile {
            path,
            name: filename.to_string(),
            sha: Some(file.sha.clone()),
            content_base64: Some(file.content_base64.clone()),
            download_url: None,
            kind: EntryKind::File,
        })
    }

    async fn put_file(
        &self,
        location: &RepositoryLocation,
        filename: &str,
        content_base64: &str,
        _message: &str,
        existing_sha: Option<&str>,
    ) -> StoreResult<PutOutcome> {
        let path = location.file_path(filename);
        let key = (location.branch.clone(), path.clone());

        // Compare and swap under one write lock
        let mut files = self.files.write().await;
        match (files.get(&key), existing_sha) {
            (None, None) => {}
            (Some(current), Some(expected)) if current.sha == expected => {}
            (Some(_), None) => {
                return Err(StoreError::Conflict(format!(
                    "{path} already exists and no sha was supplied"
                )));
            }
            (Some(current), Some(expected)) => {
                return Err(StoreError::Conflict(format!(
                    "{path}: expected sha {expected}, but found {}",
                    current.sha
                )));
            }
            (None, Some(expected)) => {
                return Err(StoreError::Conflict(format!(
                    "{path}: expected sha {expected}, but the file does not exist"
                )));
            }
        }

        let sha = Self::new_sha();
        files.insert(
            key,
            MemoryFile {
                sha: sha.clone(),
                content_base64: content_base64.to_string(),
            },
        );

        Ok(PutOutcome { sha: Some(sha) })
    }

    async fn delete_file(
        &self,
        location: &RepositoryLocation,
        filename: &str,
        sha: &str,
        _message: &str,
    ) -> StoreResult<()> {
        let path = location.file_path(filename);
        let key = (location.branch.clone(), path.clone());

        let mut files = self.files.write().await;
        let current = files
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(path.clone()))?;

        if current.sha != sha {
            return Err(StoreError::Conflict(format!(
                "{path}: expected sha {sha}, but found {}",
                current.sha
            )));
        }

        files.remove(&key);
        Ok(())
    }
}
