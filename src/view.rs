//! List Sync View
//!
//! View-model holding the working list: the latest snapshot of a collection,
//! sorted by the current sort key. The subscription is the only writer of
//! the list; create and delete go to the store and come back as snapshots.

use doc_store::{CollectionStore, DocumentId};
use log::{debug, info};
use std::sync::Arc;

use crate::commands::ItemCommands;
use crate::error::SyncResult;
use crate::models::{Item, SortKey};
use crate::snapshots::SortedSnapshots;
use crate::sort::sort_items;

/// Subscription state of the view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Unsubscribed,
    Subscribed(SortKey),
}

pub struct ListSyncView {
    store: Arc<dyn CollectionStore>,
    commands: ItemCommands,
    sort_key: SortKey,
    /// Last snapshot in store order
    snapshot: Vec<Item>,
    /// `snapshot` sorted by `sort_key`
    items: Vec<Item>,
    feed: Option<SortedSnapshots>,
}

impl ListSyncView {
    /// Unsubscribed view sorted by name
    pub fn new(store: Arc<dyn CollectionStore>, collection: &str) -> Self {
        Self {
            commands: ItemCommands::new(store.clone(), collection),
            store,
            sort_key: SortKey::default(),
            snapshot: Vec::new(),
            items: Vec::new(),
            feed: None,
        }
    }

    pub fn collection(&self) -> &str {
        self.commands.collection()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn state(&self) -> ViewState {
        match &self.feed {
            Some(_) => ViewState::Subscribed(self.sort_key),
            None => ViewState::Unsubscribed,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.feed.is_some()
    }

    /// Handle for running create/delete off the view, e.g. on spawned tasks
    pub fn commands(&self) -> ItemCommands {
        self.commands.clone()
    }

    /// Open a listener for the current sort key, releasing any previous one
    pub async fn subscribe(&mut self) -> SyncResult<()> {
        self.unsubscribe();
        let feed =
            SortedSnapshots::open(self.store.as_ref(), self.collection(), self.sort_key).await?;
        self.feed = Some(feed);
        Ok(())
    }

    /// Release the listener. The working list keeps its last contents.
    pub fn unsubscribe(&mut self) {
        if self.feed.take().is_some() {
            debug!("View on '{}' unsubscribed", self.collection());
        }
    }

    /// Replace the working list with a snapshot (in store order), sorted
    /// by the current key
    pub fn apply_snapshot(&mut self, snapshot: Vec<Item>) {
        self.snapshot = snapshot;
        self.resort();
    }

    fn resort(&mut self) {
        let mut items = self.snapshot.clone();
        sort_items(&mut items, self.sort_key);
        self.items = items;
    }

    /// Wait for the next snapshot and apply it.
    ///
    /// `None` when unsubscribed or when the feed has ended (the view is then
    /// unsubscribed). A failed snapshot leaves the working list untouched.
    /// Cancel-safe.
    pub async fn next_update(&mut self) -> Option<SyncResult<()>> {
        let feed = self.feed.as_mut()?;
        match feed.next_unsorted().await {
            Some(Ok(items)) => {
                debug!("Applying snapshot of {} items", items.len());
                self.apply_snapshot(items);
                Some(Ok(()))
            }
            Some(Err(e)) => Some(Err(e)),
            None => {
                self.feed = None;
                None
            }
        }
    }

    /// Change the ordering. The cached snapshot is re-sorted at once; a
    /// subscribed view also swaps its listener for one on the new key.
    pub async fn set_sort_key(&mut self, key: SortKey) -> SyncResult<()> {
        if key == self.sort_key {
            return Ok(());
        }
        let was_subscribed = self.is_subscribed();
        self.unsubscribe();

        info!("Sorting '{}' by {}", self.collection(), key);
        self.sort_key = key;
        self.resort();

        if was_subscribed {
            self.subscribe().await?;
        }
        Ok(())
    }

    /// Ask the store to add an item; the list changes when the snapshot arrives
    pub async fn create_item(&self, name: &str, price: f64) -> SyncResult<DocumentId> {
        self.commands.create(name, price).await
    }

    /// Ask the store to delete an item; the list changes when the snapshot arrives
    pub async fn delete_item(&self, id: &DocumentId) -> SyncResult<()> {
        self.commands.delete_item(id).await
    }
}
