//! Domain Layer
//!
//! Documents, identifiers and store errors.

mod document;
mod error;

pub use document::{Document, DocumentId, Fields, Snapshot};
pub use error::{check_collection, StoreError, StoreResult};
