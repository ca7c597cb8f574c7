//! Sorted Snapshot Sequence
//!
//! One live subscription turned into a sequence of sorted working lists.
//! The sequence ends for good when the store closes its feed.

use doc_store::{CollectionStore, Document, Subscription};
use futures::stream::{self, Stream};
use log::{debug, error, warn};

use crate::error::{SyncError, SyncResult};
use crate::models::{Item, SortKey};
use crate::sort::sort_items;

/// Decode a snapshot in store order; undecodable documents are skipped
pub fn decode_snapshot(docs: &[Document]) -> Vec<Item> {
    docs.iter()
        .filter_map(|doc| match Item::from_document(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping document: {}", e);
                None
            }
        })
        .collect()
}

/// Decode a snapshot and sort it by `key`
pub fn items_from_snapshot(docs: &[Document], key: SortKey) -> Vec<Item> {
    let mut items = decode_snapshot(docs);
    sort_items(&mut items, key);
    items
}

pub struct SortedSnapshots {
    subscription: Option<Subscription>,
    sort_key: SortKey,
}

impl SortedSnapshots {
    /// Open one listener on `collection`, ordered by `key`
    pub async fn open(store: &dyn CollectionStore, collection: &str, key: SortKey) -> SyncResult<Self> {
        let subscription = store.subscribe(collection).await.map_err(|e| {
            error!("Could not subscribe to '{}': {}", collection, e);
            SyncError::Subscription(e)
        })?;
        debug!("Subscribed to '{}' sorted by {}", collection, key);

        Ok(Self {
            subscription: Some(subscription),
            sort_key: key,
        })
    }

    /// False once the feed has ended
    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    /// Next sorted working list. Cancel-safe.
    pub async fn next(&mut self) -> Option<SyncResult<Vec<Item>>> {
        let key = self.sort_key;
        let result = self.next_unsorted().await?;
        Some(result.map(|mut items| {
            sort_items(&mut items, key);
            items
        }))
    }

    /// Next snapshot decoded but left in store order
    pub async fn next_unsorted(&mut self) -> Option<SyncResult<Vec<Item>>> {
        let subscription = self.subscription.as_mut()?;
        match subscription.next().await {
            Some(Ok(docs)) => Some(Ok(decode_snapshot(&docs))),
            Some(Err(e)) => {
                error!("Snapshot for '{}' failed: {}", subscription.collection(), e);
                Some(Err(SyncError::Subscription(e)))
            }
            None => {
                warn!("Feed for '{}' ended", subscription.collection());
                self.subscription = None;
                None
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = SyncResult<Vec<Item>>> {
        stream::unfold(self, |mut snapshots| async move {
            let next = snapshots.next().await?;
            Some((next, snapshots))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_store::{DocumentId, Fields, MemoryStore};
    use futures::StreamExt;
    use serde_json::json;

    const LIST: &str = "shoppingliste";

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().unwrap().clone()
    }

    fn names(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_items_from_snapshot_skips_bad_documents() {
        let docs = vec![
            Document::new(DocumentId::from("1"), fields(json!({ "name": "milk", "price": 3 }))),
            Document::new(DocumentId::from("2"), fields(json!({ "title": "??" }))),
            Document::new(DocumentId::from("3"), fields(json!({ "name": "eggs", "price": 5 }))),
        ];
        let items = items_from_snapshot(&docs, SortKey::ByName);
        assert_eq!(names(&items), vec!["eggs", "milk"]);
    }

    #[test]
    fn test_non_finite_text_prices_are_skipped() {
        let docs: Vec<Document> = (0..40)
            .map(|i| {
                let price = match i % 3 {
                    0 => json!("NaN"),
                    1 if i % 2 == 0 => json!("inf"),
                    _ => json!(40 - i),
                };
                Document::new(
                    DocumentId::from(i.to_string()),
                    fields(json!({ "name": format!("item{}", i), "price": price })),
                )
            })
            .collect();

        let items = items_from_snapshot(&docs, SortKey::ByPrice);
        assert!(items.iter().all(|i| i.price.is_finite()));
        assert!(items.windows(2).all(|w| w[0].price <= w[1].price));
        assert_eq!(items.len(), 20);
    }

    #[tokio::test]
    async fn test_first_snapshot_is_current_contents_sorted() {
        let store = MemoryStore::new();
        store.insert(LIST, fields(json!({ "name": "milk", "price": 3 }))).await.unwrap();
        store.insert(LIST, fields(json!({ "name": "eggs", "price": 5 }))).await.unwrap();

        let mut by_price = SortedSnapshots::open(&store, LIST, SortKey::ByPrice).await.unwrap();
        let items = by_price.next().await.unwrap().unwrap();
        assert_eq!(names(&items), vec!["milk", "eggs"]);

        let mut by_name = SortedSnapshots::open(&store, LIST, SortKey::ByName).await.unwrap();
        let items = by_name.next().await.unwrap().unwrap();
        assert_eq!(names(&items), vec!["eggs", "milk"]);
    }

    #[tokio::test]
    async fn test_sequence_is_not_restartable() {
        let store = MemoryStore::new();
        let mut snapshots = SortedSnapshots::open(&store, LIST, SortKey::ByName).await.unwrap();
        snapshots.next().await.unwrap().unwrap();

        store.close();
        assert!(snapshots.next().await.is_none());
        assert!(!snapshots.is_live());
        assert!(snapshots.next().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_follows_inserts() {
        let store = MemoryStore::new();
        let snapshots = SortedSnapshots::open(&store, LIST, SortKey::ByName).await.unwrap();
        let mut stream = Box::pin(snapshots.into_stream());

        assert!(stream.next().await.unwrap().unwrap().is_empty());
        store.insert(LIST, fields(json!({ "name": "tea", "price": 4 }))).await.unwrap();
        let items = stream.next().await.unwrap().unwrap();
        assert_eq!(names(&items), vec!["tea"]);
    }

    #[tokio::test]
    async fn test_dropping_releases_listener() {
        let store = MemoryStore::new();
        let snapshots = SortedSnapshots::open(&store, LIST, SortKey::ByName).await.unwrap();
        assert_eq!(store.listener_count(LIST), 1);
        drop(snapshots);
        assert_eq!(store.listener_count(LIST), 0);
    }
}
