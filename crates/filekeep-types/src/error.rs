use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// The text does not name a registered key kind, or is not a `kind:id` pair.
    #[error("unsupported storage key: {0}")]
    UnsupportedKey(String),
}
