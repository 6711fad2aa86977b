use std::path::{Path, PathBuf};
use std::sync::Arc;

use filekeep_fs::FileStore;
use tracing::debug;

use crate::error::{LockError, LockResult};
use crate::file_lock::FileLock;
use crate::hashed_name;
use crate::options::LockOptions;

/// Default directory (relative to the store) holding resource markers.
pub const DEFAULT_NAMESPACE: &str = "resource_locks";

/// Named resource locks backed by marker files.
///
/// A resource is locked iff its marker file exists. Markers are named by the
/// hash of the resource name. Every operation runs while holding the single
/// lock file at `lock_path`, so operations on different names are serialized
/// relative to each other as well.
pub struct ResourceLockStore {
    markers: Arc<dyn FileStore>,
    namespace: String,
    lock_path: PathBuf,
    options: LockOptions,
}

impl ResourceLockStore {
    /// Create a store keeping markers in `markers` and serializing on
    /// `lock_path`.
    pub fn new(markers: Arc<dyn FileStore>, lock_path: impl Into<PathBuf>) -> Self {
        Self {
            markers,
            namespace: DEFAULT_NAMESPACE.to_string(),
            lock_path: lock_path.into(),
            options: LockOptions::default(),
        }
    }

    /// Keep markers under `namespace` instead of [`DEFAULT_NAMESPACE`].
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: LockOptions) -> Self {
        self.options = options;
        self
    }

    /// The shared lock file guarding all marker operations.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Lock `name`.
    ///
    /// # Errors
    /// [`LockError::ResourceLocked`] if `name` is already locked.
    pub fn create(&self, name: &str) -> LockResult<()> {
        let marker = self.marker_path(name);
        self.critical_section(|| {
            if self.markers.has(&marker)? {
                return Err(LockError::ResourceLocked {
                    name: name.to_string(),
                });
            }
            self.markers.put(&marker, b"")?;
            debug!(resource = name, "resource locked");
            Ok(())
        })
    }

    /// Returns `true` if `name` is currently locked.
    pub fn has(&self, name: &str) -> LockResult<bool> {
        let marker = self.marker_path(name);
        self.critical_section(|| Ok(self.markers.has(&marker)?))
    }

    /// Unlock `name`. Unlocking a resource that is not locked is a no-op.
    pub fn delete(&self, name: &str) -> LockResult<()> {
        let marker = self.marker_path(name);
        self.critical_section(|| {
            if self.markers.has(&marker)? {
                self.markers.remove(&marker)?;
                debug!(resource = name, "resource unlocked");
            }
            Ok(())
        })
    }

    /// Run `f` while holding the shared lock file.
    pub fn critical_section<T>(&self, f: impl FnOnce() -> LockResult<T>) -> LockResult<T> {
        let _guard = FileLock::acquire(&self.lock_path, &self.options)?;
        f()
    }

    fn marker_path(&self, name: &str) -> String {
        format!("{}/{}", self.namespace, hashed_name(name))
    }
}

impl std::fmt::Debug for ResourceLockStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLockStore")
            .field("namespace", &self.namespace)
            .field("lock_path", &self.lock_path)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
