// Rust models for the types handed to the Kotlin front-end

use crate::libs::config::ChatConfig;
use crate::libs::core::models::{Notice, SignInOutcome, ViewUpdate};
use crate::libs::models::{MessageBody, MessageRecord};
use crate::ChatError;

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum MessageContent {
    Text { text: String },
    Photo { url: String },
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct ChatMessage {
    pub sender_name: String,
    pub content: MessageContent,
}

impl From<MessageRecord> for ChatMessage {
    fn from(record: MessageRecord) -> Self {
        let content = match record.body {
            MessageBody::Text(text) => MessageContent::Text { text },
            MessageBody::Photo(url) => MessageContent::Photo { url },
        };
        Self {
            sender_name: record.sender_name,
            content,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum NoticeKind {
    SignedIn,
    SignInCancelled,
    SignInFailed { message: String },
    PhotoSelectionCancelled,
}

impl From<Notice> for NoticeKind {
    fn from(notice: Notice) -> Self {
        match notice {
            Notice::SignedIn => NoticeKind::SignedIn,
            Notice::SignInCancelled => NoticeKind::SignInCancelled,
            Notice::SignInFailed { message } => NoticeKind::SignInFailed { message },
            Notice::PhotoSelectionCancelled => NoticeKind::PhotoSelectionCancelled,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum ViewEvent {
    FeedAppended { message: ChatMessage },
    FeedRemoved { index: u32 },
    FeedCleared,
    ComposerChanged { input: String, send_enabled: bool },
    Notice { notice: NoticeKind },
    Finish,
}

impl From<ViewUpdate> for ViewEvent {
    fn from(update: ViewUpdate) -> Self {
        match update {
            ViewUpdate::FeedAppended { record } => ViewEvent::FeedAppended {
                message: record.into(),
            },
            ViewUpdate::FeedRemoved { index } => ViewEvent::FeedRemoved {
                index: u32::try_from(index).unwrap_or(u32::MAX),
            },
            ViewUpdate::FeedCleared => ViewEvent::FeedCleared,
            ViewUpdate::ComposerChanged {
                input,
                send_enabled,
            } => ViewEvent::ComposerChanged {
                input,
                send_enabled,
            },
            ViewUpdate::Notice(notice) => ViewEvent::Notice {
                notice: notice.into(),
            },
            ViewUpdate::Finish => ViewEvent::Finish,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Enum)]
pub enum SignInResult {
    Succeeded,
    Cancelled,
    Failed { message: String },
}

impl From<SignInResult> for SignInOutcome {
    fn from(result: SignInResult) -> Self {
        match result {
            SignInResult::Succeeded => SignInOutcome::Succeeded,
            SignInResult::Cancelled => SignInOutcome::Cancelled,
            SignInResult::Failed { message } => SignInOutcome::Failed(message),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, uniffi::Record)]
pub struct ChatSettings {
    pub feed_path: String,
    pub photo_storage_root: String,
    pub message_length_limit: u32,
    pub anonymous_name: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        ChatConfig::default().into()
    }
}

impl From<ChatConfig> for ChatSettings {
    fn from(config: ChatConfig) -> Self {
        Self {
            feed_path: config.feed_path,
            photo_storage_root: config.photo_storage_root,
            message_length_limit: u32::try_from(config.message_length_limit).unwrap_or(u32::MAX),
            anonymous_name: config.anonymous_name,
        }
    }
}

impl From<ChatSettings> for ChatConfig {
    fn from(settings: ChatSettings) -> Self {
        Self {
            feed_path: settings.feed_path,
            photo_storage_root: settings.photo_storage_root,
            message_length_limit: settings.message_length_limit as usize,
            anonymous_name: settings.anonymous_name,
        }
    }
}

/// Errors surfaced to Kotlin.
#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum FriendlyChatError {
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
    #[error("chat core has shut down")]
    ShutDown,
    #[error("unknown request: {request_id}")]
    UnknownRequest { request_id: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl From<ChatError> for FriendlyChatError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Config(message) => FriendlyChatError::InvalidConfig { message },
            ChatError::EventLoopClosed => FriendlyChatError::ShutDown,
            other => FriendlyChatError::Internal {
                message: other.to_string(),
            },
        }
    }
}
