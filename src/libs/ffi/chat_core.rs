use crate::libs::config::ChatConfig;
use crate::libs::core::chat_client::ChatDeps;
use crate::libs::core::models::{AuthStateChange, FeedEvent, ImageLocator, PickResult};
use crate::libs::event_loop::{ChatEventLoop, ClientHandle};
use crate::libs::ffi::bridge::{
    DownloadUrlResult, FeedCallback, ForeignFeed, ForeignIdentity, ForeignPicker, ForeignStorage,
    ForeignView, IdentityCallback, PendingRequests, PickerCallback, StorageCallback,
    UploadResult, ViewCallback,
};
use crate::libs::ffi::models::{ChatSettings, FriendlyChatError, SignInResult};
use crate::libs::logging::init_logging;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::{debug, warn};

static RUNTIME: OnceCell<Runtime> = OnceCell::new();

fn runtime() -> Result<&'static Runtime, FriendlyChatError> {
    RUNTIME.get_or_try_init(|| {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("friendly-chat")
            .enable_all()
            .build()
            .map_err(|err| FriendlyChatError::Internal {
                message: format!("failed to start runtime: {err}"),
            })
    })
}

fn parse_payload(payload_json: &str) -> serde_json::Value {
    // Unparseable payloads still flow through so the feed listener can log and skip them.
    serde_json::from_str(payload_json).unwrap_or_else(|err| {
        warn!(error = %err, "feed payload is not valid json");
        serde_json::Value::Null
    })
}

/// Chat core exposed to the Android app.
///
/// Every method only queues an event for the chat event loop, so all of them are cheap
/// and safe to call from the main thread.
#[derive(uniffi::Object)]
pub struct FriendlyChatCore {
    handle: ClientHandle,
    feed: Arc<ForeignFeed>,
    picks: Arc<PendingRequests<PickResult>>,
    uploads: Arc<PendingRequests<UploadResult>>,
    download_urls: Arc<PendingRequests<DownloadUrlResult>>,
}

#[uniffi::export]
impl FriendlyChatCore {
    #[uniffi::constructor]
    pub fn new(
        settings: ChatSettings,
        identity: Box<dyn IdentityCallback>,
        feed: Box<dyn FeedCallback>,
        storage: Box<dyn StorageCallback>,
        picker: Box<dyn PickerCallback>,
        view: Box<dyn ViewCallback>,
    ) -> Result<Arc<Self>, FriendlyChatError> {
        init_logging(None);

        let picks = Arc::new(PendingRequests::new());
        let uploads = Arc::new(PendingRequests::new());
        let download_urls = Arc::new(PendingRequests::new());
        let feed = Arc::new(ForeignFeed::new(feed));

        let deps = ChatDeps {
            identity: Arc::new(ForeignIdentity(identity)),
            feed: feed.clone(),
            storage: Arc::new(ForeignStorage::new(
                storage,
                Arc::clone(&uploads),
                Arc::clone(&download_urls),
            )),
            picker: Arc::new(ForeignPicker::new(picker, Arc::clone(&picks))),
            view: Arc::new(ForeignView(view)),
        };

        let (event_loop, handle) = ChatEventLoop::new(ChatConfig::from(settings), deps)?;
        runtime()?.spawn(event_loop.run());

        Ok(Arc::new(Self {
            handle,
            feed,
            picks,
            uploads,
            download_urls,
        }))
    }

    pub fn input_changed(&self, text: String) -> Result<(), FriendlyChatError> {
        Ok(self.handle.input_changed(text)?)
    }

    pub fn send_pressed(&self) -> Result<(), FriendlyChatError> {
        Ok(self.handle.send_pressed()?)
    }

    pub fn pick_photo_pressed(&self) -> Result<(), FriendlyChatError> {
        Ok(self.handle.pick_photo_pressed()?)
    }

    pub fn sign_out_pressed(&self) -> Result<(), FriendlyChatError> {
        Ok(self.handle.sign_out_pressed()?)
    }

    pub fn paused(&self) -> Result<(), FriendlyChatError> {
        Ok(self.handle.paused()?)
    }

    pub fn resumed(&self) -> Result<(), FriendlyChatError> {
        Ok(self.handle.resumed()?)
    }

    pub fn auth_signed_in(&self, display_name: Option<String>) -> Result<(), FriendlyChatError> {
        Ok(self
            .handle
            .auth_changed(AuthStateChange::SignedIn { display_name })?)
    }

    pub fn auth_signed_out(&self) -> Result<(), FriendlyChatError> {
        Ok(self.handle.auth_changed(AuthStateChange::SignedOut)?)
    }

    pub fn sign_in_finished(&self, result: SignInResult) -> Result<(), FriendlyChatError> {
        Ok(self.handle.sign_in_finished(result.into())?)
    }

    pub fn feed_child_added(
        &self,
        subscription_id: u64,
        key: String,
        payload_json: String,
        previous_key: Option<String>,
    ) -> Result<(), FriendlyChatError> {
        self.deliver(
            subscription_id,
            FeedEvent::ChildAdded {
                key,
                payload: parse_payload(&payload_json),
                previous_key,
            },
        )
    }

    pub fn feed_child_removed(
        &self,
        subscription_id: u64,
        key: String,
        payload_json: String,
    ) -> Result<(), FriendlyChatError> {
        self.deliver(
            subscription_id,
            FeedEvent::ChildRemoved {
                key,
                payload: parse_payload(&payload_json),
            },
        )
    }

    pub fn feed_child_changed(
        &self,
        subscription_id: u64,
        key: String,
        payload_json: String,
        previous_key: Option<String>,
    ) -> Result<(), FriendlyChatError> {
        self.deliver(
            subscription_id,
            FeedEvent::ChildChanged {
                key,
                payload: parse_payload(&payload_json),
                previous_key,
            },
        )
    }

    pub fn feed_child_moved(
        &self,
        subscription_id: u64,
        key: String,
        payload_json: String,
        previous_key: Option<String>,
    ) -> Result<(), FriendlyChatError> {
        self.deliver(
            subscription_id,
            FeedEvent::ChildMoved {
                key,
                payload: parse_payload(&payload_json),
                previous_key,
            },
        )
    }

    pub fn feed_cancelled(
        &self,
        subscription_id: u64,
        message: String,
    ) -> Result<(), FriendlyChatError> {
        self.deliver(subscription_id, FeedEvent::Cancelled { message })
    }

    /// Answer a `PickerCallback::request_image`. `None` means the user backed out.
    pub fn image_picked(
        &self,
        request_id: String,
        locator: Option<String>,
    ) -> Result<(), FriendlyChatError> {
        let result = match locator {
            Some(locator) => PickResult::Selected(ImageLocator::from(locator)),
            None => PickResult::Cancelled,
        };
        Self::resolved(self.picks.resolve(&request_id, result), request_id)
    }

    pub fn upload_succeeded(&self, request_id: String) -> Result<(), FriendlyChatError> {
        Self::resolved(self.uploads.resolve(&request_id, Ok(())), request_id)
    }

    pub fn upload_failed(
        &self,
        request_id: String,
        message: String,
    ) -> Result<(), FriendlyChatError> {
        Self::resolved(self.uploads.resolve(&request_id, Err(message)), request_id)
    }

    pub fn download_url_resolved(
        &self,
        request_id: String,
        url: String,
    ) -> Result<(), FriendlyChatError> {
        Self::resolved(self.download_urls.resolve(&request_id, Ok(url)), request_id)
    }

    pub fn download_url_failed(
        &self,
        request_id: String,
        message: String,
    ) -> Result<(), FriendlyChatError> {
        Self::resolved(
            self.download_urls.resolve(&request_id, Err(message)),
            request_id,
        )
    }

    /// Stop the event loop. Requests still waiting on the platform are abandoned, and
    /// so is any request made while the loop winds down.
    pub fn shutdown(&self) -> Result<(), FriendlyChatError> {
        let queued = self.handle.shutdown();
        self.close_pending();
        Ok(queued?)
    }
}

impl Drop for FriendlyChatCore {
    // Kotlin may destroy the object without calling `shutdown`.
    fn drop(&mut self) {
        if self.handle.shutdown().is_ok() {
            debug!("chat core dropped while running, shutting down");
        }
        self.close_pending();
    }
}

impl FriendlyChatCore {
    fn close_pending(&self) {
        self.picks.close();
        self.uploads.close();
        self.download_urls.close();
    }

    fn deliver(&self, subscription_id: u64, event: FeedEvent) -> Result<(), FriendlyChatError> {
        if self.feed.deliver(subscription_id, event) {
            Ok(())
        } else {
            Err(FriendlyChatError::ShutDown)
        }
    }

    fn resolved(found: bool, request_id: String) -> Result<(), FriendlyChatError> {
        if found {
            Ok(())
        } else {
            Err(FriendlyChatError::UnknownRequest { request_id })
        }
    }
}
