//! Repository Layer
//!
//! Store abstraction, change feed and implementations.

mod db;
mod feed;
mod memory;
mod sqlite_store;
mod traits;


pub use db::MEMORY_PATH;
pub use feed::{ChangeFeed, SnapshotEvent, Subscription};
pub use memory::MemoryStore;
pub use sqlite_store::SqliteStore;
pub use traits::CollectionStore;
