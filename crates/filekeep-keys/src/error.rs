//! Error types for key generation.

use filekeep_types::TypeError;
use thiserror::Error;

/// Errors that can occur while generating or parsing keys.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The kind is not registered, or the text is not a valid `kind:id` key.
    #[error("unsupported storage key: {0}")]
    UnsupportedKey(String),

    /// Counter storage failed.
    #[error("store error: {0}")]
    Store(#[from] filekeep_fs::StoreError),

    /// The counter document lock could not be taken.
    #[error("lock error: {0}")]
    Lock(#[from] filekeep_lock::LockError),
}

impl From<TypeError> for KeyError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UnsupportedKey(key) => Self::UnsupportedKey(key),
        }
    }
}

/// Convenience alias for key operations.
pub type KeyResult<T> = Result<T, KeyError>;
