use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// A story as persisted in the content store: a JSON object with at least a
/// `title`. All other fields are opaque and kept in the order they arrived.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoryRecord(Map<String, Value>);

impl StoryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a record holding only a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.insert("title", Value::String(title.into()));
        record
    }

    /// The `title` field, if present and a string. No trimming is applied.
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for StoryRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for StoryRecord {
    type Error = Value;

    /// Only JSON objects are stories; any other value is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl fmt::Display for StoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title().unwrap_or("<untitled>"))
    }
}

/// One entry of the story listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySummary {
    /// Filename without the `.json` suffix
    pub name: String,
    pub filename: String,
    /// Current version token, needed to delete the story
    pub sha: Option<String>,
    /// Raw download URL as reported by the content store
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListStoriesResponse {
    pub stories: Vec<StorySummary>,
}

/// A fetched story together with the version token it was read at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryDocument {
    pub filename: String,
    pub sha: Option<String>,
    pub story: StoryRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveStoryResponse {
    pub success: bool,
    pub filename: String,
    /// New version token. `None` when the store accepted the write but its
    /// reply could not be read.
    pub sha: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteStoryResponse {
    pub success: bool,
}
