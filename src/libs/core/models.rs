use crate::libs::models::MessageRecord;
use std::fmt;

pub const ANONYMOUS: &str = "anonymous";
pub const DEFAULT_MSG_LENGTH_LIMIT: usize = 1000;
pub const DEFAULT_FEED_PATH: &str = "messages";
pub const DEFAULT_PHOTO_STORAGE_ROOT: &str = "chat_photos";

/// Identifies one attachment of the feed listener. A new id is handed out on every attach.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    SignedIn { display_name: String },
}

/// Notification from the identity provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthStateChange {
    SignedIn { display_name: Option<String> },
    SignedOut,
}

/// Result of an interactive sign-in flow started with `IdentityProvider::start_sign_in`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignInOutcome {
    Succeeded,
    Cancelled,
    Failed(String),
}

/// Locator of an image handed back by the platform picker, e.g. a `content://` URI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageLocator(pub String);

impl ImageLocator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageLocator {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ImageLocator {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickResult {
    Selected(ImageLocator),
    Cancelled,
}

/// Child notifications of the remote feed collection.
#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    ChildAdded {
        key: String,
        payload: serde_json::Value,
        previous_key: Option<String>,
    },
    ChildRemoved {
        key: String,
        payload: serde_json::Value,
    },
    ChildChanged {
        key: String,
        payload: serde_json::Value,
        previous_key: Option<String>,
    },
    ChildMoved {
        key: String,
        payload: serde_json::Value,
        previous_key: Option<String>,
    },
    Cancelled {
        message: String,
    },
}

/// How a photo workflow ended, as seen by the chat client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhotoOutcome {
    SelectionCancelled,
    Uploaded { url: String },
    Failed { reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    SignedIn,
    SignInCancelled,
    SignInFailed { message: String },
    PhotoSelectionCancelled,
}

/// Changes the view layer has to render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewUpdate {
    FeedAppended { record: MessageRecord },
    FeedRemoved { index: usize },
    FeedCleared,
    ComposerChanged { input: String, send_enabled: bool },
    Notice(Notice),
    Finish,
}

/// Everything the chat client reacts to. All boundaries funnel into one channel of these.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientEvent {
    InputChanged(String),
    SendPressed,
    PickPhotoPressed,
    SignOutPressed,
    Paused,
    Resumed,
    AuthChanged(AuthStateChange),
    SignInFinished(SignInOutcome),
    Feed {
        subscription: SubscriptionId,
        event: FeedEvent,
    },
    Photo(PhotoOutcome),
    Shutdown,
}
