#![allow(dead_code)]

use async_trait::async_trait;
use friendly_chat_lib::libs::backend::BackendError;
use friendly_chat_lib::{
    AuthStateChange, ChatClient, ChatConfig, ChatDeps, ChatEventLoop, ClientHandle, FeedEvent,
    FeedSink, IdentityProvider, ImageLocator, ImagePicker, MessageRecord, ObjectStorage,
    PickResult, RemoteFeed, RemoteMessage, SubscriptionId, ViewObserver, ViewUpdate,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

#[derive(Default)]
pub struct RecordingView {
    pub updates: Mutex<Vec<ViewUpdate>>,
}

impl RecordingView {
    pub fn take(&self) -> Vec<ViewUpdate> {
        std::mem::take(&mut *self.updates.lock().unwrap())
    }
}

impl ViewObserver for RecordingView {
    fn on_update(&self, update: ViewUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}

#[derive(Default)]
pub struct FakeIdentity {
    pub sign_in_prompts: AtomicUsize,
    pub sign_outs: AtomicUsize,
}

impl IdentityProvider for FakeIdentity {
    fn start_sign_in(&self) {
        self.sign_in_prompts.fetch_add(1, Ordering::SeqCst);
    }

    fn sign_out(&self) {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
    }
}

/// Realtime-database stand-in: records pushes and lets tests play child events.
#[derive(Default)]
pub struct InMemoryFeed {
    pub pushes: Mutex<Vec<(String, RemoteMessage)>>,
    pub sinks: Mutex<HashMap<SubscriptionId, FeedSink>>,
    pub unsubscribed: Mutex<Vec<SubscriptionId>>,
    stale: Mutex<Vec<FeedSink>>,
}

impl InMemoryFeed {
    pub fn pushed_records(&self) -> Vec<MessageRecord> {
        self.pushes
            .lock()
            .unwrap()
            .iter()
            .map(|(_, remote)| MessageRecord::try_from(remote.clone()).unwrap())
            .collect()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.sinks.lock().unwrap().len()
    }

    pub fn emit(&self, event: FeedEvent) {
        for sink in self.sinks.lock().unwrap().values() {
            sink.deliver(event.clone());
        }
    }

    /// Deliver through sinks that were already unsubscribed, like a callback already in flight.
    pub fn emit_stale(&self, event: FeedEvent) {
        for sink in self.stale.lock().unwrap().iter() {
            sink.deliver(event.clone());
        }
    }

    pub fn emit_added(&self, record: &MessageRecord) {
        self.emit(FeedEvent::ChildAdded {
            key: Uuid::now_v7().to_string(),
            payload: record.to_payload().unwrap(),
            previous_key: None,
        });
    }

    pub fn emit_removed(&self, record: &MessageRecord) {
        self.emit(FeedEvent::ChildRemoved {
            key: Uuid::now_v7().to_string(),
            payload: record.to_payload().unwrap(),
        });
    }
}

impl RemoteFeed for InMemoryFeed {
    fn push(&self, path: &str, message: RemoteMessage) {
        self.pushes.lock().unwrap().push((path.to_string(), message));
    }

    fn subscribe(&self, _path: &str, sink: FeedSink) -> Result<(), BackendError> {
        self.sinks.lock().unwrap().insert(sink.subscription(), sink);
        Ok(())
    }

    fn unsubscribe(&self, _path: &str, subscription: SubscriptionId) {
        if let Some(sink) = self.sinks.lock().unwrap().remove(&subscription) {
            self.stale.lock().unwrap().push(sink);
        }
        self.unsubscribed.lock().unwrap().push(subscription);
    }
}

pub struct ScriptedPicker(pub PickResult);

#[async_trait]
impl ImagePicker for ScriptedPicker {
    async fn pick_image(&self) -> PickResult {
        self.0.clone()
    }
}

#[derive(Default)]
pub struct FakeStorage {
    pub fail_upload: bool,
    pub fail_download_url: bool,
    pub url: Option<String>,
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn upload(&self, path: &str, _file: &ImageLocator) -> Result<(), BackendError> {
        self.uploads.lock().unwrap().push(path.to_string());
        if self.fail_upload {
            return Err(BackendError::Upload {
                path: path.to_string(),
                message: "network unreachable".to_string(),
            });
        }
        Ok(())
    }

    async fn download_url(&self, path: &str) -> Result<String, BackendError> {
        if self.fail_download_url {
            return Err(BackendError::DownloadUrl {
                path: path.to_string(),
                message: "object not found".to_string(),
            });
        }
        Ok(self
            .url
            .clone()
            .unwrap_or_else(|| format!("https://storage.example/{path}")))
    }
}

pub struct Harness {
    pub event_loop: ChatEventLoop,
    pub handle: ClientHandle,
    pub identity: Arc<FakeIdentity>,
    pub feed: Arc<InMemoryFeed>,
    pub storage: Arc<FakeStorage>,
    pub view: Arc<RecordingView>,
}

impl Harness {
    pub fn new(picker: PickResult, storage: FakeStorage) -> Self {
        let identity = Arc::new(FakeIdentity::default());
        let feed = Arc::new(InMemoryFeed::default());
        let storage = Arc::new(storage);
        let view = Arc::new(RecordingView::default());
        let deps = ChatDeps {
            identity: identity.clone(),
            feed: feed.clone(),
            storage: storage.clone(),
            picker: Arc::new(ScriptedPicker(picker)),
            view: view.clone(),
        };
        let (event_loop, handle) = ChatEventLoop::new(ChatConfig::default(), deps).unwrap();
        Self {
            event_loop,
            handle,
            identity,
            feed,
            storage,
            view,
        }
    }

    pub fn text_only() -> Self {
        Self::new(PickResult::Cancelled, FakeStorage::default())
    }

    pub fn sign_in(&mut self, name: &str) {
        self.handle
            .auth_changed(AuthStateChange::SignedIn {
                display_name: Some(name.to_string()),
            })
            .unwrap();
        self.event_loop.process_pending();
    }

    pub fn client(&self) -> &ChatClient {
        self.event_loop.client()
    }

    /// Keep handling events until `done` holds, yielding so spawned workflows can progress.
    pub async fn pump_until(&mut self, mut done: impl FnMut(&Self) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                self.event_loop.process_pending();
                if done(&*self) {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("condition not reached in time");
    }

    /// Give spawned workflows a chance to finish and handle whatever they reported.
    pub async fn settle(&mut self) {
        for _ in 0..20 {
            tokio::task::yield_now().await;
            self.event_loop.process_pending();
        }
    }
}
