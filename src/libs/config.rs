//! Client configuration.

use crate::libs::core::models::{
    ANONYMOUS, DEFAULT_FEED_PATH, DEFAULT_MSG_LENGTH_LIMIT, DEFAULT_PHOTO_STORAGE_ROOT,
};
use crate::{ChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Collection path of the shared feed in the realtime database.
    pub feed_path: String,
    /// Object storage folder photos are uploaded into.
    pub photo_storage_root: String,
    /// Maximum composer input, in UTF-16 code units (the platform text field unit).
    pub message_length_limit: usize,
    /// Username used while nobody is signed in.
    pub anonymous_name: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            feed_path: DEFAULT_FEED_PATH.to_string(),
            photo_storage_root: DEFAULT_PHOTO_STORAGE_ROOT.to_string(),
            message_length_limit: DEFAULT_MSG_LENGTH_LIMIT,
            anonymous_name: ANONYMOUS.to_string(),
        }
    }
}

impl ChatConfig {
    pub fn from_json_str(contents: &str) -> Result<Self> {
        let config: ChatConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(ChatConfig::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed_path.trim().is_empty() {
            return Err(ChatError::Config("feed_path must not be empty".to_string()));
        }
        if self.photo_storage_root.trim().is_empty() {
            return Err(ChatError::Config(
                "photo_storage_root must not be empty".to_string(),
            ));
        }
        if self.message_length_limit == 0 {
            return Err(ChatError::Config(
                "message_length_limit must be positive".to_string(),
            ));
        }
        if self.anonymous_name.is_empty() {
            return Err(ChatError::Config(
                "anonymous_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
