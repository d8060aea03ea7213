pub mod libs;

use crate::libs::backend::BackendError;
use thiserror::Error;

pub use crate::libs::backend::{
    FeedSink, IdentityProvider, ImagePicker, ObjectStorage, RemoteFeed, ViewObserver,
};
pub use crate::libs::config::ChatConfig;
pub use crate::libs::core::chat_client::{ChatClient, ChatDeps};
pub use crate::libs::core::models::*;
pub use crate::libs::event_loop::{ChatEventLoop, ClientHandle};
pub use crate::libs::logging::init_logging;
pub use crate::libs::models::{MessageBody, MessageRecord, RemoteMessage};

uniffi::setup_scaffolding!("friendly_chat_lib");

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("feed listener already attached ({0})")]
    ListenerAlreadyAttached(crate::libs::core::models::SubscriptionId),
    #[error("malformed message record: {0}")]
    MalformedRecord(String),
    #[error("failed to deserialize: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("chat event loop is not running")]
    EventLoopClosed,
}

pub type Result<T> = std::result::Result<T, ChatError>;
