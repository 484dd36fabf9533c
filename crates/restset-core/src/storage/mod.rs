mod config;
pub mod database;
mod memory;
pub mod record;

pub use config::{AppConfig, TerminalConfig, TimerConfig};
pub use database::SqliteKv;
pub use memory::MemoryKv;
pub use record::{merge_record, PersistedRecord, PersistentStore, STORE_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// A string key-value persistence surface.
pub trait KeyValueStore {
    /// # Errors
    /// Returns an error if the surface cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    /// Returns an error if the surface cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Returns `~/.config/restset[-dev]/` based on RESTSET_ENV.
///
/// Set RESTSET_ENV=dev to use development data directory.
/// RESTSET_DATA_DIR overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("RESTSET_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("RESTSET_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("restset-dev")
            } else {
                base_dir.join("restset")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
