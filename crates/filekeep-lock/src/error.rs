use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors from lock operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// A marker already exists for this resource.
    #[error("resource is locked: {name}")]
    ResourceLocked { name: String },

    /// The lock file stayed held by someone else for the whole timeout.
    #[error("timed out after {waited:?} waiting for lock {}", path.display())]
    Timeout { path: PathBuf, waited: Duration },

    /// I/O error on the lock file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Marker storage failed.
    #[error("store error: {0}")]
    Store(#[from] filekeep_fs::StoreError),
}

/// Result alias for lock operations.
pub type LockResult<T> = Result<T, LockError>;
