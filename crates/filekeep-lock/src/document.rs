use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::LockResult;
use crate::file_lock::FileLock;
use crate::hashed_name;
use crate::options::LockOptions;

/// One lock file per document path.
///
/// Stores hold the lock for a document across its whole read-modify-write
/// cycle. Documents with different paths lock independently.
#[derive(Clone, Debug)]
pub struct DocumentLocks {
    dir: PathBuf,
    options: LockOptions,
}

impl DocumentLocks {
    /// Keep lock files in `dir`.
    pub fn new(dir: impl Into<PathBuf>, options: LockOptions) -> Self {
        Self {
            dir: dir.into(),
            options,
        }
    }

    /// Directory holding the lock files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lock file used for `document`.
    pub fn lock_path(&self, document: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", hashed_name(document)))
    }

    /// Block until `document` is exclusively ours. Released when the guard
    /// drops.
    pub fn acquire(&self, document: &str) -> LockResult<FileLock> {
        let lock = FileLock::acquire(&self.lock_path(document), &self.options)?;
        debug!(document, "document locked");
        Ok(lock)
    }
}
