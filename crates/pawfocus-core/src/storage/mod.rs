mod config;
pub mod database;
pub mod memory;

pub use config::{SessionConfig, Shelter, SHELTER_URL_PLACEHOLDER};
pub use database::Database;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

use crate::error::StorageError;

/// Keys under which settings and ledger state are persisted.
pub mod keys {
    pub const DURATION_SECS: &str = "settings.duration_secs";
    pub const STRICT_MODE: &str = "settings.strict_mode";
    pub const TREATS_PER_SUCCESS: &str = "settings.treats_per_success";
    pub const PLEDGE_RATE_CENTS: &str = "settings.pledge_rate_cents";
    pub const SHELTER: &str = "settings.shelter";
    pub const TREATS: &str = "ledger.treats";
    pub const DONATED_CENTS: &str = "ledger.donated_cents";
    pub const HISTORY: &str = "ledger.history";
}

/// Raw string key-value backend.
///
/// Backends only move strings in and out; encoding and fallback handling
/// live in [`KvStoreExt`].
pub trait KvStore {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: KvStore + ?Sized> KvStore for &T {
    fn kv_get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).kv_get(key)
    }

    fn kv_set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).kv_set(key, value)
    }
}

/// Typed, infallible access on top of any [`KvStore`].
pub trait KvStoreExt: KvStore {
    /// Load a JSON-encoded value, returning `fallback` when the key is
    /// missing, unreadable or does not decode.
    fn load<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        let raw = match self.kv_get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(e) => {
                tracing::debug!(key, error = %e, "read failed, using fallback");
                return fallback;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(key, error = %e, "malformed stored value, using fallback");
                fallback
            }
        }
    }

    /// Persist a value as JSON. Best effort: failures are logged and dropped.
    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(key, error = %e, "could not encode value, not saved");
                return;
            }
        };
        if let Err(e) = self.kv_set(key, &encoded) {
            tracing::warn!(key, error = %e, "could not save value");
        }
    }
}

impl<T: KvStore + ?Sized> KvStoreExt for T {}

/// Returns the data directory, creating it if needed.
///
/// `PAWFOCUS_DATA_DIR` wins when set. Otherwise `~/.config/pawfocus[-dev]/`
/// depending on `PAWFOCUS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("PAWFOCUS_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("PAWFOCUS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pawfocus-dev")
            } else {
                base_dir.join("pawfocus")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| StorageError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
