//! Database Connection and Setup
//!
//! Opens the SQLite database and runs migrations.

use log::info;
use rusqlite::Connection;
use std::path::Path;

use crate::domain::{StoreError, StoreResult};

/// Path that selects a private in-memory database
pub const MEMORY_PATH: &str = ":memory:";

/// Open the database at `path` and bring its schema up to date
pub fn open_connection(path: &Path) -> StoreResult<Connection> {
    let conn = if path == Path::new(MEMORY_PATH) {
        Connection::open_in_memory()?
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        Connection::open(path)?
    };

    run_migrations(&conn)?;
    info!("Opened document database at {}", path.display());
    Ok(conn)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            PRIMARY KEY (collection, id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, created_at)",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = open_connection(Path::new(MEMORY_PATH)).unwrap();
        run_migrations(&conn).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("list.db");
        open_connection(&path).unwrap();
        assert!(path.exists());
    }
}
