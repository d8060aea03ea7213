use crate::{ChatError, Result};
use serde::{Deserialize, Serialize};

/// What a single chat entry carries. A record is either text or a photo, never both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MessageBody {
    Text(String),
    Photo(String),
}

/// One entry of the shared feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageRecord {
    pub sender_name: String,
    pub body: MessageBody,
}

impl MessageRecord {
    pub fn text(sender_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            body: MessageBody::Text(text.into()),
        }
    }

    pub fn photo(sender_name: impl Into<String>, photo_url: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            body: MessageBody::Photo(photo_url.into()),
        }
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Text(text) => Some(text),
            MessageBody::Photo(_) => None,
        }
    }

    pub fn photo_url(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Photo(url) => Some(url),
            MessageBody::Text(_) => None,
        }
    }

    /// Decode the remote payload of a feed child.
    pub fn from_payload(payload: serde_json::Value) -> Result<Self> {
        let remote: RemoteMessage = serde_json::from_value(payload)?;
        MessageRecord::try_from(remote)
    }

    pub fn to_payload(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(RemoteMessage::from(self))?)
    }
}

// Flat representation stored under the feed path. Missing fields are written as null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMessage {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(alias = "senderName")]
    pub name: String,
    #[serde(rename = "photoUrl", default)]
    pub photo_url: Option<String>,
}

impl TryFrom<RemoteMessage> for MessageRecord {
    type Error = ChatError;

    fn try_from(remote: RemoteMessage) -> Result<Self> {
        match (remote.text, remote.photo_url) {
            (Some(text), None) => Ok(MessageRecord::text(remote.name, text)),
            (None, Some(url)) => Ok(MessageRecord::photo(remote.name, url)),
            (Some(_), Some(_)) => Err(ChatError::MalformedRecord(
                "both text and photoUrl are set".to_string(),
            )),
            (None, None) => Err(ChatError::MalformedRecord(
                "neither text nor photoUrl is set".to_string(),
            )),
        }
    }
}

impl From<&MessageRecord> for RemoteMessage {
    fn from(record: &MessageRecord) -> Self {
        let (text, photo_url) = match &record.body {
            MessageBody::Text(text) => (Some(text.clone()), None),
            MessageBody::Photo(url) => (None, Some(url.clone())),
        };
        Self {
            text,
            name: record.sender_name.clone(),
            photo_url,
        }
    }
}
