use crate::libs::backend::{FeedSink, RemoteFeed};
use crate::libs::core::models::{ClientEvent, FeedEvent, SubscriptionId};
use crate::libs::models::MessageRecord;
use crate::libs::storage::feed_store::FeedStore;
use crate::{ChatError, Result};
use tokio::sync::mpsc::WeakUnboundedSender;
use tracing::{debug, info, warn};

/// Store mutation caused by one feed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedChange {
    Appended(MessageRecord),
    Removed(usize),
    Unchanged,
}

/// Keeps the local feed store in step with the remote collection at `path`.
///
/// At most one subscription is live at a time. Notifications tagged with any other
/// subscription id are ignored, so anything still queued after a detach is harmless.
#[derive(Debug)]
pub struct FeedListener {
    path: String,
    attached: Option<SubscriptionId>,
    next_id: u64,
}

impl FeedListener {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            attached: None,
            next_id: 0,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_attached(&self) -> bool {
        self.attached.is_some()
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.attached
    }

    pub fn attach(
        &mut self,
        feed: &dyn RemoteFeed,
        tx: &WeakUnboundedSender<ClientEvent>,
    ) -> Result<SubscriptionId> {
        if let Some(current) = self.attached {
            return Err(ChatError::ListenerAlreadyAttached(current));
        }

        self.next_id += 1;
        let subscription = SubscriptionId(self.next_id);
        feed.subscribe(&self.path, FeedSink::new(subscription, tx.clone()))?;
        self.attached = Some(subscription);
        info!(path = %self.path, %subscription, "feed listener attached");
        Ok(subscription)
    }

    /// Safe to call when nothing is attached. Returns whether a subscription was dropped.
    pub fn detach(&mut self, feed: &dyn RemoteFeed) -> bool {
        match self.attached.take() {
            Some(subscription) => {
                feed.unsubscribe(&self.path, subscription);
                info!(path = %self.path, %subscription, "feed listener detached");
                true
            }
            None => false,
        }
    }

    pub fn apply(
        &self,
        subscription: SubscriptionId,
        event: FeedEvent,
        store: &mut FeedStore,
    ) -> FeedChange {
        if self.attached != Some(subscription) {
            debug!(%subscription, "dropping notification from inactive subscription");
            return FeedChange::Unchanged;
        }

        match event {
            FeedEvent::ChildAdded {
                key,
                payload,
                previous_key,
            } => match MessageRecord::from_payload(payload) {
                Ok(record) => {
                    debug!(%key, ?previous_key, "child added");
                    store.append(record.clone());
                    FeedChange::Appended(record)
                }
                Err(err) => {
                    warn!(%key, error = %err, "skipping undecodable child");
                    FeedChange::Unchanged
                }
            },
            FeedEvent::ChildRemoved { key, payload } => match MessageRecord::from_payload(payload) {
                Ok(record) => match store.remove_first(&record) {
                    Some(index) => {
                        debug!(%key, index, "child removed");
                        FeedChange::Removed(index)
                    }
                    None => {
                        debug!(%key, "removed child was not in the local feed");
                        FeedChange::Unchanged
                    }
                },
                Err(err) => {
                    warn!(%key, error = %err, "skipping undecodable removed child");
                    FeedChange::Unchanged
                }
            },
            // Edits and reorders are not reflected locally.
            FeedEvent::ChildChanged { key, .. } => {
                debug!(%key, "child changed, ignored");
                FeedChange::Unchanged
            }
            FeedEvent::ChildMoved { key, .. } => {
                debug!(%key, "child moved, ignored");
                FeedChange::Unchanged
            }
            FeedEvent::Cancelled { message } => {
                warn!(path = %self.path, %message, "feed subscription cancelled, no further updates");
                FeedChange::Unchanged
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::backend::BackendError;
    use crate::libs::models::RemoteMessage;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    #[derive(Default)]
    struct FakeFeed {
        subscribed: Mutex<Vec<SubscriptionId>>,
        unsubscribed: Mutex<Vec<SubscriptionId>>,
        fail: bool,
    }

    impl RemoteFeed for FakeFeed {
        fn push(&self, _path: &str, _message: RemoteMessage) {}

        fn subscribe(&self, path: &str, sink: FeedSink) -> std::result::Result<(), BackendError> {
            if self.fail {
                return Err(BackendError::Subscribe {
                    path: path.to_string(),
                    message: "permission denied".to_string(),
                });
            }
            self.subscribed.lock().unwrap().push(sink.subscription());
            Ok(())
        }

        fn unsubscribe(&self, _path: &str, subscription: SubscriptionId) {
            self.unsubscribed.lock().unwrap().push(subscription);
        }
    }

    fn added(key: &str, text: &str) -> FeedEvent {
        FeedEvent::ChildAdded {
            key: key.to_string(),
            payload: json!({"text": text, "name": "alice", "photoUrl": null}),
            previous_key: None,
        }
    }

    #[test]
    fn test_attach_twice_is_an_error() {
        let feed = FakeFeed::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        let tx = tx.downgrade();
        let mut listener = FeedListener::new("messages");

        let first = listener.attach(&feed, &tx).unwrap();
        let second = listener.attach(&feed, &tx);
        assert!(matches!(second, Err(ChatError::ListenerAlreadyAttached(id)) if id == first));
        assert_eq!(feed.subscribed.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_detach_is_idempotent() {
        let feed = FakeFeed::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        let tx = tx.downgrade();
        let mut listener = FeedListener::new("messages");

        assert!(!listener.detach(&feed));
        let id = listener.attach(&feed, &tx).unwrap();
        assert!(listener.detach(&feed));
        assert!(!listener.detach(&feed));
        assert_eq!(*feed.unsubscribed.lock().unwrap(), vec![id]);
    }

    #[test]
    fn test_failed_subscribe_leaves_listener_detached() {
        let feed = FakeFeed {
            fail: true,
            ..Default::default()
        };
        let (tx, _rx) = mpsc::unbounded_channel();
        let tx = tx.downgrade();
        let mut listener = FeedListener::new("messages");

        assert!(matches!(listener.attach(&feed, &tx), Err(ChatError::Backend(_))));
        assert!(!listener.is_attached());
    }

    #[test]
    fn test_stale_subscription_does_not_touch_store() {
        let feed = FakeFeed::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        let tx = tx.downgrade();
        let mut listener = FeedListener::new("messages");
        let mut store = FeedStore::new();

        let old = listener.attach(&feed, &tx).unwrap();
        listener.detach(&feed);
        let current = listener.attach(&feed, &tx).unwrap();
        assert_ne!(old, current);

        assert_eq!(listener.apply(old, added("k1", "late"), &mut store), FeedChange::Unchanged);
        assert!(store.is_empty());

        listener.apply(current, added("k2", "fresh"), &mut store);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_changed_moved_and_cancelled_are_ignored() {
        let feed = FakeFeed::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        let tx = tx.downgrade();
        let mut listener = FeedListener::new("messages");
        let mut store = FeedStore::new();
        let id = listener.attach(&feed, &tx).unwrap();

        listener.apply(id, added("k1", "hello"), &mut store);
        let payload = json!({"text": "edited", "name": "alice", "photoUrl": null});
        let events = vec![
            FeedEvent::ChildChanged {
                key: "k1".to_string(),
                payload: payload.clone(),
                previous_key: None,
            },
            FeedEvent::ChildMoved {
                key: "k1".to_string(),
                payload,
                previous_key: Some("k0".to_string()),
            },
            FeedEvent::Cancelled {
                message: "permission denied".to_string(),
            },
        ];
        for event in events {
            assert_eq!(listener.apply(id, event, &mut store), FeedChange::Unchanged);
        }
        assert_eq!(store.records(), &[MessageRecord::text("alice", "hello")]);
    }

    #[test]
    fn test_undecodable_child_is_skipped() {
        let feed = FakeFeed::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        let tx = tx.downgrade();
        let mut listener = FeedListener::new("messages");
        let mut store = FeedStore::new();
        let id = listener.attach(&feed, &tx).unwrap();

        let bad = FeedEvent::ChildAdded {
            key: "bad".to_string(),
            payload: json!({"text": "x", "name": "a", "photoUrl": "y"}),
            previous_key: None,
        };
        assert_eq!(listener.apply(id, bad, &mut store), FeedChange::Unchanged);
        listener.apply(id, added("good", "ok"), &mut store);
        assert_eq!(store.len(), 1);
    }
}
