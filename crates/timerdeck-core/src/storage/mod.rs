mod config;
pub mod database;
mod gateway;
mod lock;
mod memory;
mod writer;

pub use config::{Config, DisplayConfig, LoggingConfig, NotificationsConfig};
pub use database::Database;
pub use gateway::{Persistence, HISTORY_KEY, THEME_KEY, TIMERS_KEY};
pub use lock::RunLock;
pub use memory::MemoryStore;
pub use writer::{PersistenceWriter, WriteOp, WriterTask};

use std::path::PathBuf;

use crate::error::StorageError;

/// A string-keyed blob store.
///
/// Implementations report failures; deciding whether a failure matters is
/// left to [`Persistence`], which logs and degrades.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// Returns the data directory, creating it if needed.
///
/// `TIMERDECK_DATA_DIR` overrides the location. Otherwise it is
/// `~/.config/timerdeck[-dev]/`, with the `-dev` suffix when
/// `TIMERDECK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("TIMERDECK_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TIMERDECK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("timerdeck-dev")
            } else {
                base_dir.join("timerdeck")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
