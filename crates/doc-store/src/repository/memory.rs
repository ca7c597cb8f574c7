//! In-Memory Store
//!
//! Collections held in process memory, in insertion order.

use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::feed::{ChangeFeed, Subscription};
use super::traits::CollectionStore;
use crate::domain::{check_collection, Document, DocumentId, Fields, Snapshot, StoreError, StoreResult};

type Collections = HashMap<String, Vec<Document>>;

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<Collections>,
    feed: ChangeFeed,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shut every feed down; later writes fail with `StoreError::Closed`
    pub fn close(&self) {
        self.feed.close();
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.feed.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }
}

fn snapshot_of(collections: &Collections, collection: &str) -> Snapshot {
    Arc::new(collections.get(collection).cloned().unwrap_or_default())
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn subscribe(&self, collection: &str) -> StoreResult<Subscription> {
        check_collection(collection)?;
        let collections = self.collections.lock().await;
        self.feed
            .subscribe(collection, || Ok(snapshot_of(&collections, collection)))
    }

    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<DocumentId> {
        check_collection(collection)?;
        self.ensure_open()?;
        let mut collections = self.collections.lock().await;

        let id = DocumentId::generate();
        collections
            .entry(collection.to_string())
            .or_default()
            .push(Document::new(id.clone(), fields));
        debug!("Inserted {} into '{}'", id, collection);

        self.feed
            .publish_with(collection, || Ok(snapshot_of(&collections, collection)));
        Ok(id)
    }

    async fn delete_by_id(&self, collection: &str, id: &DocumentId) -> StoreResult<()> {
        check_collection(collection)?;
        self.ensure_open()?;
        let mut collections = self.collections.lock().await;

        let removed = match collections.get_mut(collection) {
            Some(docs) => {
                let before = docs.len();
                docs.retain(|doc| &doc.id != id);
                docs.len() != before
            }
            None => false,
        };
        if !removed {
            debug!("Delete of missing {} in '{}' ignored", id, collection);
            return Ok(());
        }

        self.feed
            .publish_with(collection, || Ok(snapshot_of(&collections, collection)));
        Ok(())
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        check_collection(collection)?;
        let collections = self.collections.lock().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    fn listener_count(&self, collection: &str) -> usize {
        self.feed.listener_count(collection)
    }
}
