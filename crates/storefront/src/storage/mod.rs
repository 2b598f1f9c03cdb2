//! Persistent key-value storage.
//!
//! The storefront keeps two records on the device: the serialized cart and the
//! logged-in user. Both go through [`KeyValueStore`], a minimal string
//! `get`/`set`/`delete` contract, so the cart and session stores never depend
//! on where the bytes end up.
//!
//! # Implementations
//!
//! - [`MemoryStore`] - process-local map, used by tests and throwaway sessions
//! - [`FileStore`] - one JSON file per key inside a data directory

mod file;
mod memory;

use std::future::Future;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors that can occur when reading or writing persisted values.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key contains characters that cannot be stored.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    /// Storage backend is not available.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Device-local string storage keyed by name.
///
/// Futures must be `Send` so the cart writer can run on a spawned task.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Remove the value under `key`. Removing a missing key succeeds.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Validate a storage key.
///
/// Keys become file names in [`FileStore`], so only ASCII letters, digits,
/// `-` and `_` are accepted.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
