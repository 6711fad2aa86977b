use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] filekeep_fs::StoreError),

    #[error("lock error: {0}")]
    Lock(#[from] filekeep_lock::LockError),

    #[error("key error: {0}")]
    Key(#[from] filekeep_keys::KeyError),

    #[error("collection error: {0}")]
    Collection(#[from] filekeep_collection::CollectionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
