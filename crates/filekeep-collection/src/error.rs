//! Error types for collection stores.

use filekeep_types::KeyKind;
use thiserror::Error;

/// Errors from keyed collections and scoped documents.
#[derive(Debug, Error)]
pub enum CollectionError {
    /// A key of the wrong kind was passed to a typed store.
    #[error("unsupported storage key: expected {expected}, got {actual}")]
    UnsupportedKey { expected: KeyKind, actual: KeyKind },

    /// No entry exists under the given key.
    #[error("not found: {key}")]
    NotFound { key: String },

    /// A stored entry cannot be unpacked.
    #[error("corrupt record {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    Key(#[from] filekeep_keys::KeyError),

    /// Document storage failed.
    #[error("store error: {0}")]
    Store(#[from] filekeep_fs::StoreError),

    /// A document lock could not be taken.
    #[error("lock error: {0}")]
    Lock(#[from] filekeep_lock::LockError),
}

impl CollectionError {
    pub(crate) fn corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for collection operations.
pub type CollectionResult<T> = Result<T, CollectionError>;
