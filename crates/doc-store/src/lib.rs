//! Document collection store
//!
//! Layered like the app backend:
//! - domain: documents, ids and errors
//! - repository: the `CollectionStore` trait, the change feed behind live
//!   subscriptions, and the in-memory and SQLite implementations

pub mod domain;
pub mod repository;

pub use domain::{Document, DocumentId, Fields, Snapshot, StoreError, StoreResult};
pub use repository::{
    ChangeFeed, CollectionStore, MemoryStore, SnapshotEvent, SqliteStore, Subscription,
    MEMORY_PATH,
};
