//! App Configuration
//!
//! Defaults, then an optional JSON file named by `SHOPLIST_CONFIG`, then
//! individual environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG: &str = "SHOPLIST_CONFIG";
pub const ENV_DB: &str = "SHOPLIST_DB";
pub const ENV_COLLECTION: &str = "SHOPLIST_COLLECTION";
pub const ENV_LOG_DIR: &str = "SHOPLIST_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file, or `:memory:` for a throwaway in-memory list
    pub db_path: PathBuf,
    pub collection: String,
    pub log_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("shoplist.db"),
            collection: "shoppingliste".to_string(),
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl AppConfig {
    /// Resolve from the process environment
    pub fn load() -> Result<Self, String> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Resolve from an explicit variable map
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, String> {
        let mut config = match vars.get(ENV_CONFIG) {
            Some(path) => Self::from_file(Path::new(path))?,
            None => Self::default(),
        };

        if let Some(db) = vars.get(ENV_DB) {
            config.db_path = PathBuf::from(db);
        }
        if let Some(collection) = vars.get(ENV_COLLECTION) {
            config.collection = collection.clone();
        }
        if let Some(dir) = vars.get(ENV_LOG_DIR) {
            config.log_dir = PathBuf::from(dir);
        }

        if config.collection.trim().is_empty() {
            return Err("collection name must not be empty".to_string());
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
        serde_json::from_str(&text)
            .map_err(|e| format!("Failed to parse config {}: {}", path.display(), e))
    }

    /// True when the list should live in memory only
    pub fn in_memory(&self) -> bool {
        self.db_path == Path::new(doc_store::MEMORY_PATH)
    }
}
