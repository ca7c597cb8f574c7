//! Shop-List Client
//!
//! Keeps a shopping list live and sorted over a document store:
//! - models: items, validated input and the sort key
//! - sort / snapshots: ordering and the sorted snapshot sequence
//! - view: the `ListSyncView` view-model
//! - commands: create/delete intents
//! - config / app: configuration and the terminal front end

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod snapshots;
pub mod sort;
pub mod view;

pub use commands::ItemCommands;
pub use config::AppConfig;
pub use error::{SyncError, SyncResult};
pub use models::{Item, NewItem, SortKey};
pub use snapshots::SortedSnapshots;
pub use view::{ListSyncView, ViewState};
