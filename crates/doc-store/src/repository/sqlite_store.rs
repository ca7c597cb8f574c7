//! SQLite Store Implementation
//!
//! SQLite-backed implementation of CollectionStore. Documents are stored as
//! JSON text; snapshots come back in insertion order.

use async_trait::async_trait;
use log::{debug, error};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::db::open_connection;
use super::feed::{ChangeFeed, SnapshotEvent, Subscription};
use super::traits::CollectionStore;
use crate::domain::{check_collection, Document, DocumentId, Fields, StoreResult};

pub struct SqliteStore {
    conn: Mutex<Connection>,
    feed: ChangeFeed,
}

impl SqliteStore {
    /// Open (or create) the database at `path`; `":memory:"` is supported
    pub fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self {
            conn: Mutex::new(open_connection(path)?),
            feed: ChangeFeed::new(),
        })
    }

    /// Shut every feed down. Stored data is untouched.
    pub fn close(&self) {
        self.feed.close();
    }
}

fn load(conn: &Connection, collection: &str) -> StoreResult<Vec<Document>> {
    let mut stmt = conn.prepare(
        "SELECT id, data FROM documents WHERE collection = ?1 ORDER BY created_at ASC, rowid ASC",
    )?;
    let rows = stmt.query_map(params![collection], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    let mut docs = Vec::new();
    for row in rows {
        let (id, data) = row?;
        let fields: Fields = serde_json::from_str(&data)?;
        docs.push(Document::new(DocumentId::from(id), fields));
    }
    Ok(docs)
}

fn load_event(conn: &Connection, collection: &str) -> SnapshotEvent {
    load(conn, collection).map(Arc::new).map_err(|e| {
        error!("Failed to reload '{}' for listeners: {}", collection, e);
        e
    })
}

#[async_trait]
impl CollectionStore for SqliteStore {
    async fn subscribe(&self, collection: &str) -> StoreResult<Subscription> {
        check_collection(collection)?;
        let conn = self.conn.lock().await;
        self.feed
            .subscribe(collection, || load(&conn, collection).map(Arc::new))
    }

    async fn insert(&self, collection: &str, fields: Fields) -> StoreResult<DocumentId> {
        check_collection(collection)?;
        let data = serde_json::to_string(&fields)?;
        let id = DocumentId::generate();
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO documents (collection, id, data, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![collection, id.as_str(), data, chrono::Utc::now().timestamp_millis()],
        )?;
        debug!("Inserted {} into '{}'", id, collection);

        self.feed.publish_with(collection, || load_event(&conn, collection));
        Ok(id)
    }

    async fn delete_by_id(&self, collection: &str, id: &DocumentId) -> StoreResult<()> {
        check_collection(collection)?;
        let conn = self.conn.lock().await;

        let removed = conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id.as_str()],
        )?;
        if removed == 0 {
            debug!("Delete of missing {} in '{}' ignored", id, collection);
            return Ok(());
        }

        self.feed.publish_with(collection, || load_event(&conn, collection));
        Ok(())
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        check_collection(collection)?;
        let conn = self.conn.lock().await;
        load(&conn, collection)
    }

    fn listener_count(&self, collection: &str) -> usize {
        self.feed.listener_count(collection)
    }
}
