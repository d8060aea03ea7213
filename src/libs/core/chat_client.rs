use crate::libs::backend::{IdentityProvider, ImagePicker, ObjectStorage, RemoteFeed, ViewObserver};
use crate::libs::config::ChatConfig;
use crate::libs::core::composer::Composer;
use crate::libs::core::models::{
    AuthStateChange, ClientEvent, FeedEvent, Notice, PhotoOutcome, SessionState, SignInOutcome,
    SubscriptionId, ViewUpdate,
};
use crate::libs::core::session::{SessionController, SessionTransition};
use crate::libs::feed_listener::{FeedChange, FeedListener};
use crate::libs::models::{MessageRecord, RemoteMessage};
use crate::libs::photo::pick_and_upload;
use crate::libs::storage::feed_store::FeedStore;
use std::sync::Arc;
use tokio::sync::mpsc::WeakUnboundedSender;
use tracing::{debug, error, info, warn};

/// External collaborators the client talks to.
#[derive(Clone)]
pub struct ChatDeps {
    pub identity: Arc<dyn IdentityProvider>,
    pub feed: Arc<dyn RemoteFeed>,
    pub storage: Arc<dyn ObjectStorage>,
    pub picker: Arc<dyn ImagePicker>,
    pub view: Arc<dyn ViewObserver>,
}

/// View-model of the chat screen.
///
/// Owns the session, the feed listener, the local feed and the composer. State only
/// changes inside [`ChatClient::handle`], which the event loop calls for one event at a
/// time, so none of it needs locking. Work that has to wait on a collaborator reports
/// back by sending another [`ClientEvent`] through `events`. The client only holds a
/// weak sender, so it never keeps its own event loop running.
pub struct ChatClient {
    config: ChatConfig,
    deps: ChatDeps,
    session: SessionController,
    listener: FeedListener,
    store: FeedStore,
    composer: Composer,
    events: WeakUnboundedSender<ClientEvent>,
}

impl ChatClient {
    pub fn new(
        config: ChatConfig,
        deps: ChatDeps,
        events: WeakUnboundedSender<ClientEvent>,
    ) -> Self {
        Self {
            session: SessionController::new(config.anonymous_name.clone()),
            listener: FeedListener::new(config.feed_path.clone()),
            store: FeedStore::new(),
            composer: Composer::new(config.message_length_limit),
            config,
            deps,
            events,
        }
    }

    pub fn username(&self) -> &str {
        self.session.username()
    }

    pub fn session_state(&self) -> &SessionState {
        self.session.state()
    }

    pub fn records(&self) -> &[MessageRecord] {
        self.store.records()
    }

    pub fn composer_input(&self) -> &str {
        self.composer.input()
    }

    pub fn is_send_enabled(&self) -> bool {
        self.composer.is_send_enabled()
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.listener.subscription()
    }

    pub fn handle(&mut self, event: ClientEvent) {
        match event {
            ClientEvent::InputChanged(text) => self.on_input_changed(&text),
            ClientEvent::SendPressed => self.on_send_pressed(),
            ClientEvent::PickPhotoPressed => self.start_photo_workflow(),
            ClientEvent::SignOutPressed => {
                info!("sign out requested");
                self.deps.identity.sign_out();
            }
            ClientEvent::Paused => {
                self.listener.detach(self.deps.feed.as_ref());
                self.clear_feed();
            }
            ClientEvent::Resumed => {
                if self.session.is_signed_in() && !self.listener.is_attached() {
                    self.attach_listener();
                }
            }
            ClientEvent::AuthChanged(change) => self.on_auth_changed(change),
            ClientEvent::SignInFinished(outcome) => self.on_sign_in_finished(outcome),
            ClientEvent::Feed {
                subscription,
                event,
            } => self.on_feed_event(subscription, event),
            ClientEvent::Photo(outcome) => self.on_photo_outcome(outcome),
            ClientEvent::Shutdown => {
                self.listener.detach(self.deps.feed.as_ref());
            }
        }
    }

    fn emit(&self, update: ViewUpdate) {
        self.deps.view.on_update(update);
    }

    fn publish(&self, record: &MessageRecord) {
        debug!(path = %self.config.feed_path, sender = %record.sender_name, "publishing message");
        self.deps
            .feed
            .push(&self.config.feed_path, RemoteMessage::from(record));
    }

    fn attach_listener(&mut self) {
        if let Err(err) = self.listener.attach(self.deps.feed.as_ref(), &self.events) {
            warn!(error = %err, "feed listener not attached");
        }
    }

    fn clear_feed(&mut self) {
        self.store.clear();
        self.emit(ViewUpdate::FeedCleared);
    }

    fn on_input_changed(&mut self, text: &str) {
        let send_enabled = self.composer.set_input(text);
        self.emit(ViewUpdate::ComposerChanged {
            input: self.composer.input().to_string(),
            send_enabled,
        });
    }

    fn on_send_pressed(&mut self) {
        let Some(record) = self.composer.take_message(self.session.username()) else {
            debug!("send pressed with blank input, ignored");
            return;
        };
        self.publish(&record);
        self.emit(ViewUpdate::ComposerChanged {
            input: String::new(),
            send_enabled: false,
        });
    }

    fn on_auth_changed(&mut self, change: AuthStateChange) {
        match self.session.apply(change) {
            SessionTransition::SignedIn { .. } => {
                if self.listener.is_attached() {
                    debug!("already listening to the feed");
                } else {
                    self.attach_listener();
                }
            }
            SessionTransition::SignedOut => {
                self.clear_feed();
                self.listener.detach(self.deps.feed.as_ref());
                self.deps.identity.start_sign_in();
            }
        }
    }

    fn on_sign_in_finished(&mut self, outcome: SignInOutcome) {
        match outcome {
            SignInOutcome::Succeeded => self.emit(ViewUpdate::Notice(Notice::SignedIn)),
            SignInOutcome::Cancelled => {
                info!("sign in cancelled, finishing");
                self.emit(ViewUpdate::Notice(Notice::SignInCancelled));
                self.emit(ViewUpdate::Finish);
            }
            SignInOutcome::Failed(message) => {
                warn!(%message, "sign in failed");
                self.emit(ViewUpdate::Notice(Notice::SignInFailed { message }));
            }
        }
    }

    fn on_feed_event(&mut self, subscription: SubscriptionId, event: FeedEvent) {
        match self.listener.apply(subscription, event, &mut self.store) {
            FeedChange::Appended(record) => self.emit(ViewUpdate::FeedAppended { record }),
            FeedChange::Removed(index) => self.emit(ViewUpdate::FeedRemoved { index }),
            FeedChange::Unchanged => {}
        }
    }

    fn start_photo_workflow(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!("photo workflow needs a tokio runtime");
            return;
        };

        let Some(events) = self.events.upgrade() else {
            debug!("event loop closing, photo workflow not started");
            return;
        };

        let picker = Arc::clone(&self.deps.picker);
        let storage = Arc::clone(&self.deps.storage);
        let root = self.config.photo_storage_root.clone();
        runtime.spawn(async move {
            let result = pick_and_upload(picker.as_ref(), storage.as_ref(), &root).await;
            if events.send(ClientEvent::Photo(result.into())).is_err() {
                debug!("event loop gone before photo workflow finished");
            }
        });
    }

    fn on_photo_outcome(&mut self, outcome: PhotoOutcome) {
        match outcome {
            PhotoOutcome::SelectionCancelled => {
                self.emit(ViewUpdate::Notice(Notice::PhotoSelectionCancelled));
            }
            PhotoOutcome::Uploaded { url } => {
                // Uses whoever is signed in now, which may be the sentinel after a sign-out.
                if !self.session.is_signed_in() {
                    warn!(%url, "publishing photo while signed out");
                }
                let record = MessageRecord::photo(self.session.username(), url);
                self.publish(&record);
            }
            PhotoOutcome::Failed { reason } => {
                error!(%reason, "photo workflow aborted");
            }
        }
    }
}
