//! Repository Layer - Core Traits
//!
//! Defines the abstract interface of a document collection store.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;

use super::feed::Subscription;
use crate::domain::{Document, DocumentId, Fields, StoreResult};

/// A store of named document collections with live subscriptions
///
/// All operations are async to support various backends.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Open a live listener. Its first snapshot is the current contents,
    /// then one full snapshot per mutation of the collection.
    async fn subscribe(&self, collection: &str) -> StoreResult<Subscription>;

    /// Insert a document, returning the id the store assigned
    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<DocumentId>;

    /// Delete a document by id. Deleting a missing id is not an error.
    async fn delete_by_id(&self, collection: &str, id: &DocumentId) -> StoreResult<()>;

    /// One-shot read of the whole collection
    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Number of live listeners on a collection
    fn listener_count(&self, collection: &str) -> usize;
}
