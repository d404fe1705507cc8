use crate::chat::ChatProxy;
use crate::storage::StoryRepository;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub stories: Arc<StoryRepository>,
    pub chat: Arc<ChatProxy>,
}
