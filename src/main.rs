//! Shop-List Terminal Entry Point

use std::process::ExitCode;
use std::sync::Arc;

use doc_store::{CollectionStore, MemoryStore, SqliteStore};
use rolling_logger::RollingConfig;
use shoplist::{app, AppConfig, ListSyncView};

const APP_NAME: &str = "ShopList";

fn open_store(config: &AppConfig) -> Result<Arc<dyn CollectionStore>, String> {
    if config.in_memory() {
        log::info!("Using an in-memory list; nothing will be saved");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let store = SqliteStore::open(&config.db_path)
        .map_err(|e| format!("Failed to open {}: {}", config.db_path.display(), e))?;
    Ok(Arc::new(store))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    // The terminal is for the list; log lines only go to the file
    let logging = RollingConfig {
        echo_stderr: false,
        ..RollingConfig::default()
    };
    if let Err(e) = rolling_logger::init_logger_with(config.log_dir.clone(), APP_NAME, logging) {
        eprintln!("Failed to init logger: {}", e);
    }
    let _ = rolling_logger::info(&format!("{} starting with {:?}", APP_NAME, config));

    let store = match open_store(&config) {
        Ok(store) => store,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let view = ListSyncView::new(store, &config.collection);
    match app::run(view).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = rolling_logger::error(&e.to_string());
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
