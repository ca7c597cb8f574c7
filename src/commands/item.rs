//! Item Commands
//!
//! Create and delete intents sent to the store. They never touch the
//! working list; the subscription reports the outcome.

use doc_store::{CollectionStore, DocumentId};
use log::{error, info};
use std::sync::Arc;

use crate::error::{SyncError, SyncResult};
use crate::models::NewItem;

/// Cloneable handle for issuing item intents against one collection
#[derive(Clone)]
pub struct ItemCommands {
    store: Arc<dyn CollectionStore>,
    collection: Arc<str>,
}

impl ItemCommands {
    pub fn new(store: Arc<dyn CollectionStore>, collection: &str) -> Self {
        Self {
            store,
            collection: Arc::from(collection),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Insert an item, returning the id the store assigned. Not retried.
    pub async fn create_item(&self, item: &NewItem) -> SyncResult<DocumentId> {
        match self.store.insert(&self.collection, item.to_fields()).await {
            Ok(id) => {
                info!("Item added with id {}", id);
                Ok(id)
            }
            Err(e) => {
                error!("Could not add item '{}': {}", item.name(), e);
                Err(SyncError::Create(e))
            }
        }
    }

    /// Validate then insert
    pub async fn create(&self, name: &str, price: f64) -> SyncResult<DocumentId> {
        let item = NewItem::new(name, price).map_err(|e| {
            error!("Rejected item '{}': {}", name, e);
            e
        })?;
        self.create_item(&item).await
    }

    /// Delete an item by id. Not retried.
    pub async fn delete_item(&self, id: &DocumentId) -> SyncResult<()> {
        match self.store.delete_by_id(&self.collection, id).await {
            Ok(()) => {
                info!("Item {} deleted", id);
                Ok(())
            }
            Err(e) => {
                error!("Could not delete item {}: {}", id, e);
                Err(SyncError::Delete(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_store::MemoryStore;

    const LIST: &str = "shoppingliste";

    #[tokio::test]
    async fn test_create_then_delete() {
        let store = Arc::new(MemoryStore::new());
        let commands = ItemCommands::new(store.clone(), LIST);

        let id = commands.create("milk", 3.0).await.unwrap();
        let docs = store.list(LIST).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);

        commands.delete_item(&id).await.unwrap();
        assert!(store.list(LIST).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_store() {
        let store = Arc::new(MemoryStore::new());
        let commands = ItemCommands::new(store.clone(), LIST);

        let err = commands.create("", 3.0).await.unwrap_err();
        assert!(matches!(err, SyncError::InvalidInput(_)));
        assert!(store.list(LIST).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failures_are_returned() {
        let store = Arc::new(MemoryStore::new());
        let commands = ItemCommands::new(store.clone(), LIST);
        store.close();

        assert!(matches!(
            commands.create("milk", 3.0).await,
            Err(SyncError::Create(_))
        ));
        assert!(matches!(
            commands.delete_item(&DocumentId::from("x")).await,
            Err(SyncError::Delete(_))
        ));
    }
}
