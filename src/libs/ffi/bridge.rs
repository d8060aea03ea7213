//! Adapters from the Kotlin callback interfaces to the collaborator traits.
//!
//! Kotlin cannot hand back a future, so each asynchronous request gets an id. The
//! platform answers later through a `FriendlyChatCore` method carrying that id, which
//! completes the oneshot channel the Rust side is waiting on.

use crate::libs::backend::{
    BackendError, FeedSink, IdentityProvider, ImagePicker, ObjectStorage, RemoteFeed,
    ViewObserver,
};
use crate::libs::core::models::{FeedEvent, ImageLocator, PickResult, SubscriptionId, ViewUpdate};
use crate::libs::ffi::models::ViewEvent;
use crate::libs::models::RemoteMessage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use tracing::{debug, error};
use uuid::Uuid;

#[uniffi::export(callback_interface)]
pub trait IdentityCallback: Send + Sync {
    fn start_sign_in(&self);
    fn sign_out(&self);
}

#[uniffi::export(callback_interface)]
pub trait FeedCallback: Send + Sync {
    fn push(&self, path: String, payload_json: String);
    /// Start delivering child events for `path`, tagged with `subscription_id`.
    fn subscribe(&self, path: String, subscription_id: u64);
    fn unsubscribe(&self, path: String, subscription_id: u64);
}

#[uniffi::export(callback_interface)]
pub trait StorageCallback: Send + Sync {
    fn start_upload(&self, request_id: String, path: String, locator: String);
    fn resolve_download_url(&self, request_id: String, path: String);
}

#[uniffi::export(callback_interface)]
pub trait PickerCallback: Send + Sync {
    fn request_image(&self, request_id: String);
}

#[uniffi::export(callback_interface)]
pub trait ViewCallback: Send + Sync {
    fn on_view_event(&self, event: ViewEvent);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Waiting<T> {
    senders: HashMap<String, oneshot::Sender<T>>,
    closed: bool,
}

/// Outstanding requests waiting on an answer from the platform.
///
/// Once closed, every request registered afterwards is abandoned on the spot, so
/// nothing can be left waiting on a core that has shut down.
pub(crate) struct PendingRequests<T> {
    waiting: Mutex<Waiting<T>>,
}

impl<T> PendingRequests<T> {
    pub(crate) fn new() -> Self {
        Self {
            waiting: Mutex::new(Waiting {
                senders: HashMap::new(),
                closed: false,
            }),
        }
    }

    pub(crate) fn register(&self) -> (String, oneshot::Receiver<T>) {
        let request_id = Uuid::now_v7().to_string();
        let (tx, rx) = oneshot::channel();
        let mut waiting = lock(&self.waiting);
        if waiting.closed {
            debug!(%request_id, "request made after shutdown, abandoned");
        } else {
            waiting.senders.insert(request_id.clone(), tx);
        }
        (request_id, rx)
    }

    /// Returns false for an unknown id or a requester that stopped waiting.
    pub(crate) fn resolve(&self, request_id: &str, value: T) -> bool {
        match lock(&self.waiting).senders.remove(request_id) {
            Some(tx) => tx.send(value).is_ok(),
            None => false,
        }
    }

    /// Drop every waiting sender so the requesters see a closed channel, now and for
    /// any request registered later.
    pub(crate) fn close(&self) {
        let mut waiting = lock(&self.waiting);
        waiting.closed = true;
        waiting.senders.clear();
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        lock(&self.waiting).senders.len()
    }
}

pub(crate) struct ForeignIdentity(pub(crate) Box<dyn IdentityCallback>);

impl IdentityProvider for ForeignIdentity {
    fn start_sign_in(&self) {
        self.0.start_sign_in();
    }

    fn sign_out(&self) {
        self.0.sign_out();
    }
}

pub(crate) struct ForeignView(pub(crate) Box<dyn ViewCallback>);

impl ViewObserver for ForeignView {
    fn on_update(&self, update: ViewUpdate) {
        self.0.on_view_event(update.into());
    }
}

pub(crate) struct ForeignFeed {
    callback: Box<dyn FeedCallback>,
    sinks: Mutex<HashMap<u64, FeedSink>>,
}

impl ForeignFeed {
    pub(crate) fn new(callback: Box<dyn FeedCallback>) -> Self {
        Self {
            callback,
            sinks: Mutex::new(HashMap::new()),
        }
    }

    /// Route a child event from the platform to the subscription it belongs to.
    /// Events for subscriptions that were already dropped are discarded.
    pub(crate) fn deliver(&self, subscription_id: u64, event: FeedEvent) -> bool {
        let sink = lock(&self.sinks).get(&subscription_id).cloned();
        match sink {
            Some(sink) => sink.deliver(event),
            None => {
                debug!(subscription_id, "event for unknown subscription dropped");
                true
            }
        }
    }
}

impl RemoteFeed for ForeignFeed {
    fn push(&self, path: &str, message: RemoteMessage) {
        match serde_json::to_string(&message) {
            Ok(payload_json) => self.callback.push(path.to_string(), payload_json),
            Err(err) => error!(error = %err, "could not encode outgoing message"),
        }
    }

    fn subscribe(&self, path: &str, sink: FeedSink) -> Result<(), BackendError> {
        let SubscriptionId(id) = sink.subscription();
        lock(&self.sinks).insert(id, sink);
        self.callback.subscribe(path.to_string(), id);
        Ok(())
    }

    fn unsubscribe(&self, path: &str, subscription: SubscriptionId) {
        lock(&self.sinks).remove(&subscription.0);
        self.callback.unsubscribe(path.to_string(), subscription.0);
    }
}

pub(crate) struct ForeignPicker {
    callback: Box<dyn PickerCallback>,
    pending: Arc<PendingRequests<PickResult>>,
}

impl ForeignPicker {
    pub(crate) fn new(
        callback: Box<dyn PickerCallback>,
        pending: Arc<PendingRequests<PickResult>>,
    ) -> Self {
        Self { callback, pending }
    }
}

#[async_trait]
impl ImagePicker for ForeignPicker {
    async fn pick_image(&self) -> PickResult {
        let (request_id, rx) = self.pending.register();
        self.callback.request_image(request_id);
        // A picker that never answers before shutdown counts as a cancellation.
        rx.await.unwrap_or(PickResult::Cancelled)
    }
}

pub(crate) type UploadResult = Result<(), String>;
pub(crate) type DownloadUrlResult = Result<String, String>;

pub(crate) struct ForeignStorage {
    callback: Box<dyn StorageCallback>,
    uploads: Arc<PendingRequests<UploadResult>>,
    download_urls: Arc<PendingRequests<DownloadUrlResult>>,
}

impl ForeignStorage {
    pub(crate) fn new(
        callback: Box<dyn StorageCallback>,
        uploads: Arc<PendingRequests<UploadResult>>,
        download_urls: Arc<PendingRequests<DownloadUrlResult>>,
    ) -> Self {
        Self {
            callback,
            uploads,
            download_urls,
        }
    }
}

#[async_trait]
impl ObjectStorage for ForeignStorage {
    async fn upload(&self, path: &str, file: &ImageLocator) -> Result<(), BackendError> {
        let (request_id, rx) = self.uploads.register();
        self.callback
            .start_upload(request_id, path.to_string(), file.as_str().to_string());
        match rx.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(message)) => Err(BackendError::Upload {
                path: path.to_string(),
                message,
            }),
            Err(_) => Err(BackendError::Disconnected),
        }
    }

    async fn download_url(&self, path: &str) -> Result<String, BackendError> {
        let (request_id, rx) = self.download_urls.register();
        self.callback
            .resolve_download_url(request_id, path.to_string());
        match rx.await {
            Ok(Ok(url)) => Ok(url),
            Ok(Err(message)) => Err(BackendError::DownloadUrl {
                path: path.to_string(),
                message,
            }),
            Err(_) => Err(BackendError::Disconnected),
        }
    }
}
