use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client as ReqwestClient, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use super::config::RepositoryLocation;
use super::error::{StoreError, StoreResult};
use super::traits::{ContentStore, EntryKind, PutOutcome, StoredFile};

const API_VERSION: &str = "2022-11-28";
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// [`ContentStore`] backed by the GitHub Contents API
pub struct GitHubContentStore {
    client: ReqwestClient,
    api_url: Url,
}

/// Entry shape shared by directory listings and single-file responses
#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    sha: Option<String>,
    #[serde(rename = "type")]
    kind: EntryKind,
    download_url: Option<String>,
    content: Option<String>,
    encoding: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Directory(Vec<ContentEntry>),
    File(ContentEntry),
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: PutResponseContent,
}

#[derive(Debug, Deserialize)]
struct PutResponseContent {
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutRequest<'a> {
    message: &'a str,
    content: &'a str,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    message: &'a str,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Debug, Deserialize)]
struct GitHubErrorBody {
    message: Option<String>,
}

impl From<ContentEntry> for StoredFile {
    fn from(entry: ContentEntry) -> Self {
        Self {
            path: entry.path,
            name: entry.name,
            sha: entry.sha,
            content_base64: entry.content,
            download_url: entry.download_url,
            kind: entry.kind,
        }
    }
}

/// Which call a status is being classified for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Read,
    Write,
}

impl GitHubContentStore {
    pub fn new(api_url: &str, token: &str) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("story-studio/", env!("CARGO_PKG_VERSION"))),
        );

        let client = ReqwestClient::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        let api_url = Url::parse(api_url.trim_end_matches('/'))?;
        if api_url.cannot_be_a_base() {
            anyhow::bail!("GitHub API URL cannot be used as a base: {api_url}");
        }

        Ok(Self { client, api_url })
    }

    /// `{api}/repos/{owner}/{repo}/contents/{folder}[/{filename}]` with every
    /// segment percent-encoded
    fn contents_url(
        &self,
        location: &RepositoryLocation,
        filename: Option<&str>,
    ) -> StoreResult<Url> {
        let mut url = self.api_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                StoreError::Transport(format!("invalid GitHub API URL: {}", self.api_url))
            })?;
            segments.pop_if_empty().push("repos");
            segments.extend(location.repo.split('/').filter(|s| !s.is_empty()));
            segments.push("contents");
            segments.extend(location.folder_segments());
            if let Some(name) = filename {
                segments.push(name);
            }
        }
        Ok(url)
    }

    fn read_url(&self, location: &RepositoryLocation, filename: Option<&str>) -> StoreResult<Url> {
        let mut url = self.contents_url(location, filename)?;
        url.query_pairs_mut().append_pair("ref", &location.branch);
        Ok(url)
    }

    async fn get_contents(
        &self,
        location: &RepositoryLocation,
        filename: Option<&str>,
    ) -> StoreResult<ContentsResponse> {
        let url = self.read_url(location, filename)?;
        debug!(%url, "GET contents");

        let path = match filename {
            Some(name) => location.file_path(name),
            None => location.folder.clone(),
        };

        let response = self.client.get(url).send().await?;
        let response = check_status(response, Operation::Read, &path).await?;

        response
            .json::<ContentsResponse>()
            .await
            .map_err(|e| StoreError::Transport(format!("unexpected contents response: {e}")))
    }

    /// Files over 1 MB come back with `encoding: none` and no inline
    /// content. Their bytes are read from `download_url` instead.
    async fn fetch_raw(&self, entry: ContentEntry) -> StoreResult<StoredFile> {
        let Some(url) = entry.download_url.as_deref() else {
            return Err(StoreError::Parse(format!(
                "{} is too large to inline and has no download URL",
                entry.path
            )));
        };
        debug!(%url, "GET raw content");

        let response = self.client.get(url).send().await?;
        let response = check_status(response, Operation::Read, &entry.path).await?;
        let bytes = response.bytes().await?;

        let mut file = StoredFile::from(entry);
        file.content_base64 = Some(STANDARD.encode(&bytes));
        Ok(file)
    }
}

/// Turn a non-success status into the matching [`StoreError`] kind
async fn check_status(response: Response, op: Operation, path: &str) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let rate_limited = response
        .headers()
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        == Some("0");

    let message = response
        .json::<GitHubErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| status.to_string());

    Err(classify(status, op, path, message, rate_limited))
}

fn classify(
    status: StatusCode,
    op: Operation,
    path: &str,
    message: String,
    rate_limited: bool,
) -> StoreError {
    match status {
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate_limited => {
            StoreError::Transport(format!("GitHub rate limit exceeded for {path}: {message}"))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Auth(message),
        StatusCode::NOT_FOUND => StoreError::NotFound(path.to_string()),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY if op == Operation::Write => {
            StoreError::Conflict(format!("{path}: {message}"))
        }
        _ => StoreError::Transport(format!("GitHub returned {status} for {path}: {message}")),
    }
}

#[async_trait]
impl ContentStore for GitHubContentStore {
    async fn list_directory(&self, location: &RepositoryLocation) -> StoreResult<Vec<StoredFile>> {
        match self.get_contents(location, None).await? {
            ContentsResponse::Directory(entries) => {
                Ok(entries.into_iter().map(StoredFile::from).collect())
            }
            ContentsResponse::File(entry) => Err(StoreError::NotFound(format!(
                "{} is not a directory",
                entry.path
            ))),
        }
    }

    async fn get_file(
        &self,
        location: &RepositoryLocation,
        filename: &str,
    ) -> StoreResult<StoredFile> {
        match self.get_contents(location, Some(filename)).await? {
            ContentsResponse::File(entry) if entry.kind == EntryKind::File => {
                if entry.encoding.as_deref() == Some("none") {
                    return self.fetch_raw(entry).await;
                }
                Ok(entry.into())
            }
            _ => Err(StoreError::NotFound(format!(
                "{} is not a file",
                location.file_path(filename)
            ))),
        }
    }

    async fn put_file(
        &self,
        location: &RepositoryLocation,
        filename: &str,
        content_base64: &str,
        message: &str,
        existing_sha: Option<&str>,
    ) -> StoreResult<PutOutcome> {
        let url = self.contents_url(location, Some(filename))?;
        let path = location.file_path(filename);
        debug!(%url, update = existing_sha.is_some(), "PUT contents");

        let body = PutRequest {
            message,
            content: content_base64,
            branch: &location.branch,
            sha: existing_sha,
        };

        let response = self.client.put(url).json(&body).send().await?;
        let response = check_status(response, Operation::Write, &path).await?;

        // The write is durable once GitHub answers 2xx
        match response.json::<PutResponse>().await {
            Ok(parsed) => Ok(PutOutcome {
                sha: Some(parsed.content.sha),
            }),
            Err(e) => {
                warn!(%path, error = %e, "File written but response could not be parsed");
                Ok(PutOutcome { sha: None })
            }
        }
    }

    async fn delete_file(
        &self,
        location: &RepositoryLocation,
        filename: &str,
        sha: &str,
        message: &str,
    ) -> StoreResult<()> {
        let url = self.contents_url(location, Some(filename))?;
        let path = location.file_path(filename);
        debug!(%url, "DELETE contents");

        let body = DeleteRequest {
            message,
            sha,
            branch: &location.branch,
        };

        let response = self.client.delete(url).json(&body).send().await?;
        check_status(response, Operation::Write, &path).await?;
        Ok(())
    }
}
