// Contracts of the managed backend and the platform. Nothing in here talks to a real service;
// the app supplies implementations (see libs::ffi for the foreign-language bridge).

use crate::libs::core::models::{
    ClientEvent, FeedEvent, ImageLocator, PickResult, SubscriptionId, ViewUpdate,
};
use crate::libs::models::RemoteMessage;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc::WeakUnboundedSender;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("subscription to {path} failed: {message}")]
    Subscribe { path: String, message: String },
    #[error("upload to {path} failed: {message}")]
    Upload { path: String, message: String },
    #[error("download url for {path} unavailable: {message}")]
    DownloadUrl { path: String, message: String },
    #[error("backend bridge closed")]
    Disconnected,
}

pub trait IdentityProvider: Send + Sync {
    /// Begin the interactive sign-in flow. Its result comes back as `ClientEvent::SignInFinished`.
    fn start_sign_in(&self);
    fn sign_out(&self);
}

pub trait RemoteFeed: Send + Sync {
    /// Append a record under `path`. Fire-and-forget.
    fn push(&self, path: &str, message: RemoteMessage);
    fn subscribe(&self, path: &str, sink: FeedSink) -> Result<(), BackendError>;
    fn unsubscribe(&self, path: &str, subscription: SubscriptionId);
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn upload(&self, path: &str, file: &ImageLocator) -> Result<(), BackendError>;
    async fn download_url(&self, path: &str) -> Result<String, BackendError>;
}

#[async_trait]
pub trait ImagePicker: Send + Sync {
    async fn pick_image(&self) -> PickResult;
}

pub trait ViewObserver: Send + Sync {
    fn on_update(&self, update: ViewUpdate);
}

/// Where a remote feed delivers child notifications for one subscription.
///
/// A sink never keeps the event loop alive: once every [`ClientHandle`] is gone the
/// loop stops and deliveries start failing.
///
/// [`ClientHandle`]: crate::ClientHandle
#[derive(Clone, Debug)]
pub struct FeedSink {
    subscription: SubscriptionId,
    tx: WeakUnboundedSender<ClientEvent>,
}

impl FeedSink {
    pub(crate) fn new(subscription: SubscriptionId, tx: WeakUnboundedSender<ClientEvent>) -> Self {
        Self { subscription, tx }
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }

    /// Returns false once the event loop has gone away.
    pub fn deliver(&self, event: FeedEvent) -> bool {
        let Some(tx) = self.tx.upgrade() else {
            return false;
        };
        tx.send(ClientEvent::Feed {
            subscription: self.subscription,
            event,
        })
        .is_ok()
    }
}
