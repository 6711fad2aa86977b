//! Exclusive advisory locks on a lock file.
//!
//! # Safety
//! - The lock is released when [`FileLock`] is dropped
//! - The lock file (and its directory) is created if it doesn't exist
//! - Acquisition polls a non-blocking attempt, so waiters are not queued and
//!   fairness between them is not guaranteed

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use fs2::FileExt;
use tracing::{debug, warn};

use crate::error::{LockError, LockResult};
use crate::options::LockOptions;

/// Exclusive lock held on a lock file.
///
/// The lock is held for the lifetime of this struct and released when it is
/// dropped. Locks taken through separate `FileLock`s exclude each other across
/// processes and across threads of one process.
#[derive(Debug)]
pub struct FileLock {
    file: File,
    path: PathBuf,
}

impl FileLock {
    /// Acquire an exclusive lock on `path`, polling per `options`.
    ///
    /// # Errors
    /// - [`LockError::Timeout`] if `options.timeout` elapses first
    /// - [`LockError::Io`] if the lock file cannot be opened or locked
    pub fn acquire(path: &Path, options: &LockOptions) -> LockResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let started = Instant::now();
        let mut contended = false;
        while !Self::try_lock(&file)? {
            let waited = started.elapsed();
            let mut pause = options.poll_interval;
            if let Some(timeout) = options.timeout {
                if waited >= timeout {
                    warn!(path = %path.display(), ?waited, "gave up waiting for lock");
                    return Err(LockError::Timeout {
                        path: path.to_path_buf(),
                        waited,
                    });
                }
                pause = pause.min(timeout - waited);
            }
            if !contended {
                debug!(path = %path.display(), "lock contended; polling");
                contended = true;
            }
            thread::sleep(pause);
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Attempt to acquire the lock once without waiting.
    ///
    /// Returns `Ok(None)` if someone else holds it.
    pub fn try_acquire(path: &Path) -> LockResult<Option<Self>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if Self::try_lock(&file)? {
            Ok(Some(Self {
                file,
                path: path.to_path_buf(),
            }))
        } else {
            Ok(None)
        }
    }

    /// Returns the path to the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_lock(file: &File) -> LockResult<bool> {
        match FileExt::try_lock_exclusive(file) {
            Ok(()) => Ok(true),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Closing the file releases the lock too; unlock eagerly anyway.
        if let Err(e) = FileExt::unlock(&self.file) {
            debug!(path = %self.path.display(), error = %e, "explicit unlock failed");
        }
    }
}
