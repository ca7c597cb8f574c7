//! Change Feed
//!
//! Per-collection `watch` channels carrying full snapshots. Stores call
//! `subscribe` and `publish_with` while holding their own data lock, so the
//! first snapshot a listener sees and every later one are in mutation order.

use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

use crate::domain::{Snapshot, StoreError, StoreResult};

/// What a listener receives on every change
pub type SnapshotEvent = StoreResult<Snapshot>;

/// Live listener on one collection.
///
/// Dropping the handle releases the listener.
pub struct Subscription {
    collection: String,
    rx: watch::Receiver<SnapshotEvent>,
    primed: bool,
}

impl Subscription {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Wait for the next full snapshot.
    ///
    /// The first call returns the contents at subscription time without
    /// waiting. Returns `None` once the store has shut the feed down.
    /// Cancel-safe.
    pub async fn next(&mut self) -> Option<SnapshotEvent> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        if self.rx.changed().await.is_err() {
            return None;
        }
        Some(self.rx.borrow_and_update().clone())
    }

    /// Explicit release, same as dropping the handle
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        debug!("Released listener on '{}'", self.collection);
    }
}

#[derive(Default)]
struct FeedState {
    channels: HashMap<String, watch::Sender<SnapshotEvent>>,
    closed: bool,
}

/// Registry of snapshot channels, one per collection with listeners
#[derive(Default)]
pub struct ChangeFeed {
    state: Mutex<FeedState>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a listener. `load` is only called when the collection has
    /// no open channel yet; an open channel already holds the latest snapshot.
    pub fn subscribe<F>(&self, collection: &str, load: F) -> StoreResult<Subscription>
    where
        F: FnOnce() -> StoreResult<Snapshot>,
    {
        let mut state = self.lock();
        if state.closed {
            return Err(StoreError::Closed);
        }

        let rx = match state.channels.get(collection) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, rx) = watch::channel(Ok(load()?));
                state.channels.insert(collection.to_string(), sender);
                rx
            }
        };
        debug!("Opened listener on '{}'", collection);

        Ok(Subscription {
            collection: collection.to_string(),
            rx,
            primed: false,
        })
    }

    /// Push a new snapshot to every listener of `collection`.
    ///
    /// `load` is skipped when nobody is listening, and channels whose
    /// listeners are all gone are dropped here.
    pub fn publish_with<F>(&self, collection: &str, load: F)
    where
        F: FnOnce() -> SnapshotEvent,
    {
        let mut state = self.lock();
        let Some(sender) = state.channels.get(collection) else {
            return;
        };
        if sender.receiver_count() == 0 {
            state.channels.remove(collection);
            return;
        }
        sender.send_replace(load());
    }

    /// Number of live listeners on `collection`
    pub fn listener_count(&self, collection: &str) -> usize {
        self.lock()
            .channels
            .get(collection)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// End every feed. Listeners drain what they have not seen yet, then get `None`.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.channels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Document, DocumentId, Fields};
    use std::sync::Arc;

    fn snapshot(ids: &[&str]) -> Snapshot {
        Arc::new(
            ids.iter()
                .map(|id| Document::new(DocumentId::from(*id), Fields::new()))
                .collect(),
        )
    }

    fn ids(event: SnapshotEvent) -> Vec<String> {
        event
            .expect("snapshot")
            .iter()
            .map(|d| d.id.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_first_next_returns_current_contents() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe("list", || Ok(snapshot(&["a"]))).unwrap();
        assert_eq!(ids(sub.next().await.unwrap()), vec!["a"]);
    }

    #[tokio::test]
    async fn test_publish_reaches_listener() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe("list", || Ok(snapshot(&[]))).unwrap();
        sub.next().await.unwrap().unwrap();

        feed.publish_with("list", || Ok(snapshot(&["a", "b"])));
        assert_eq!(ids(sub.next().await.unwrap()), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_second_listener_reuses_channel() {
        let feed = ChangeFeed::new();
        let _first = feed.subscribe("list", || Ok(snapshot(&["a"]))).unwrap();
        let mut second = feed
            .subscribe("list", || panic!("channel should already exist"))
            .unwrap();
        assert_eq!(ids(second.next().await.unwrap()), vec!["a"]);
        assert_eq!(feed.listener_count("list"), 2);
    }

    #[test]
    fn test_drop_releases_listener() {
        let feed = ChangeFeed::new();
        let sub = feed.subscribe("list", || Ok(snapshot(&[]))).unwrap();
        assert_eq!(feed.listener_count("list"), 1);
        drop(sub);
        assert_eq!(feed.listener_count("list"), 0);
    }

    #[test]
    fn test_publish_without_listeners_skips_load() {
        let feed = ChangeFeed::new();
        feed.publish_with("list", || panic!("nobody is listening"));

        let sub = feed.subscribe("list", || Ok(snapshot(&[]))).unwrap();
        sub.unsubscribe();
        feed.publish_with("list", || panic!("listener was released"));
        assert_eq!(feed.listener_count("list"), 0);
    }

    #[tokio::test]
    async fn test_close_ends_subscriptions() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe("list", || Ok(snapshot(&["a"]))).unwrap();
        sub.next().await.unwrap().unwrap();

        feed.close();
        assert!(sub.next().await.is_none());
        assert_eq!(
            feed.subscribe("list", || Ok(snapshot(&[]))).err(),
            Some(StoreError::Closed)
        );
    }

    #[tokio::test]
    async fn test_errors_are_delivered_to_listeners() {
        let feed = ChangeFeed::new();
        let mut sub = feed.subscribe("list", || Ok(snapshot(&[]))).unwrap();
        sub.next().await.unwrap().unwrap();

        feed.publish_with("list", || Err(StoreError::Storage("disk gone".to_string())));
        assert_eq!(
            sub.next().await.unwrap().err(),
            Some(StoreError::Storage("disk gone".to_string()))
        );
    }
}
