/// Errors from file store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A document could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored document exists but is not a JSON object.
    #[error("corrupt document {path}: {reason}")]
    CorruptDocument { path: String, reason: String },

    /// The path is empty or escapes the base directory.
    #[error("invalid path: {0:?}")]
    InvalidPath(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
