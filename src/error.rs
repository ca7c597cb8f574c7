//! Client Errors
//!
//! Every failure is logged where it is observed and then returned, so the
//! host decides whether the user sees it.

use doc_store::StoreError;
use thiserror::Error;

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Document {id} is not an item: {reason}")]
    Decode { id: String, reason: String },
    #[error("Subscription failed: {0}")]
    Subscription(#[source] StoreError),
    #[error("Could not add item: {0}")]
    Create(#[source] StoreError),
    #[error("Could not delete item: {0}")]
    Delete(#[source] StoreError),
}
