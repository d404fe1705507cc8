use serde::{Deserialize, Serialize};

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_FOLDER: &str = "stories";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Where stories live in the content store. Built once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryLocation {
    /// `owner/name`
    pub repo: String,
    pub branch: String,
    /// Folder inside the repository; empty means the repository root
    pub folder: String,
}

impl RepositoryLocation {
    pub fn new(repo: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: DEFAULT_BRANCH.to_string(),
            folder: DEFAULT_FOLDER.to_string(),
        }
    }

    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = folder.into().trim_matches('/').to_string();
        self
    }

    /// Non-empty segments of the folder path
    pub fn folder_segments(&self) -> impl Iterator<Item = &str> {
        self.folder.split('/').filter(|s| !s.is_empty())
    }

    /// Repository-relative path of a file inside the folder
    pub fn file_path(&self, filename: &str) -> String {
        if self.folder.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", self.folder, filename)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StorageConfig {
    GitHub {
        api_url: String,
        token: String,
        location: RepositoryLocation,
    },
    Memory {
        location: RepositoryLocation,
    },
}

impl StorageConfig {
    pub fn github(
        api_url: impl Into<String>,
        token: impl Into<String>,
        location: RepositoryLocation,
    ) -> Self {
        Self::GitHub {
            api_url: api_url.into(),
            token: token.into(),
            location,
        }
    }

    pub fn memory(location: RepositoryLocation) -> Self {
        Self::Memory { location }
    }

    pub fn location(&self) -> &RepositoryLocation {
        match self {
            Self::GitHub { location, .. } | Self::Memory { location } => location,
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests can avoid touching
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = var("STORAGE_BACKEND").unwrap_or_else(|| "github".to_string());
        let branch = var("GITHUB_BRANCH").unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        let folder = var("STORIES_PATH").unwrap_or_else(|| DEFAULT_FOLDER.to_string());

        match backend.as_str() {
            "github" => {
                let token = var("GITHUB_TOKEN")
                    .ok_or_else(|| anyhow::anyhow!("GITHUB_TOKEN is required for GitHub backend"))?;
                let repo = var("GITHUB_REPO")
                    .ok_or_else(|| anyhow::anyhow!("GITHUB_REPO is required for GitHub backend"))?;
                if repo.split('/').filter(|s| !s.is_empty()).count() != 2 {
                    anyhow::bail!("GITHUB_REPO must look like 'owner/name', got '{repo}'");
                }
                let api_url =
                    var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string());
                let location = RepositoryLocation::new(repo)
                    .with_branch(branch)
                    .with_folder(folder);

                Ok(Self::github(api_url, token, location))
            }
            "memory" => {
                let repo = var("GITHUB_REPO").unwrap_or_else(|| "local/stories".to_string());
                let location = RepositoryLocation::new(repo)
                    .with_branch(branch)
                    .with_folder(folder);
                Ok(Self::memory(location))
            }
            _ => anyhow::bail!(
                "Unknown storage backend: {}. Must be 'github' or 'memory'",
                backend
            ),
        }
    }
}
