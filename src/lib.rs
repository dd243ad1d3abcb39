//! TechRiskAI core library.
//!
//! Wires together:
//! - Encrypted local storage (storage/)
//! - Input sanitization before text reaches the LLM (safety/)
//! - The analysis report model (report.rs)
//! - History, comparison and action plans (history.rs)
//! - The trial / paywall gate (access.rs)

pub mod access;
pub mod config;
pub mod history;
pub mod report;
pub mod safety;
pub mod storage;

use config::AppConfig;
use storage::{FileBackend, SecureStore};

/// Initialise `env_logger`. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Open the on-disk encrypted store described by `config`.
pub fn open_store(config: &AppConfig) -> SecureStore<FileBackend> {
    let path = config.storage_path();
    log::info!("[STORAGE] Using {}", path.display());
    SecureStore::new(FileBackend::new(path))
}
