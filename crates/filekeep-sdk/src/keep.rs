use std::sync::Arc;

use filekeep_collection::{KeyedCollection, ScopedDocuments};
use filekeep_fs::{FileStorage, FileStore};
use filekeep_keys::KeyGenerator;
use filekeep_lock::{DocumentLocks, ResourceLockStore};
use filekeep_types::KeyKind;
use tracing::{info, warn};

use crate::config::StorageConfig;
use crate::error::SdkResult;

/// One base directory with every filekeep store wired to it.
///
/// All handles share the same [`FileStore`] and key generator. When
/// `document_locking` is on, every store also shares the same
/// [`DocumentLocks`], so writers to the same document exclude each other
/// regardless of which handle they came from.
pub struct FileKeep {
    config: StorageConfig,
    store: Arc<dyn FileStore>,
    generator: Arc<KeyGenerator>,
    document_locks: Option<DocumentLocks>,
    resource_locks: ResourceLockStore,
}

impl FileKeep {
    /// Open (creating if needed) the storage described by `config`.
    pub fn open(config: StorageConfig) -> SdkResult<Self> {
        config.validate()?;
        std::fs::create_dir_all(&config.base_dir)?;
        let store: Arc<dyn FileStore> =
            Arc::new(FileStorage::new(&config.base_dir).with_json_mode(config.json_mode));
        Self::with_store(config, store)
    }

    /// Use `store` for documents instead of the files under `base_dir`.
    ///
    /// Lock files still live under `base_dir`. `config.json_mode` is not
    /// applied: `store` keeps its own [`FileStore::json_mode`], and a
    /// mismatch is logged at `warn`.
    pub fn with_store(config: StorageConfig, store: Arc<dyn FileStore>) -> SdkResult<Self> {
        config.validate()?;
        if store.json_mode() != config.json_mode {
            warn!(
                configured = ?config.json_mode,
                store = ?store.json_mode(),
                "store JSON mode differs from config; using the store's"
            );
        }

        let options = config.lock_options();
        let document_locks = config
            .document_locking
            .then(|| DocumentLocks::new(config.document_lock_path(), options.clone()));

        let mut generator = KeyGenerator::new(Arc::clone(&store));
        if let Some(locks) = &document_locks {
            generator = generator.with_locks(locks.clone());
        }

        let resource_locks = ResourceLockStore::new(Arc::clone(&store), config.lock_file_path())
            .with_namespace(config.resource_namespace.clone())
            .with_options(options);

        info!(
            base_dir = %config.base_dir.display(),
            document_locking = config.document_locking,
            json_mode = ?config.json_mode,
            "filekeep opened"
        );

        Ok(Self {
            config,
            store,
            generator: Arc::new(generator),
            document_locks,
            resource_locks,
        })
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// The underlying document store.
    pub fn store(&self) -> &Arc<dyn FileStore> {
        &self.store
    }

    /// Key generator shared by every collection of this instance.
    pub fn keys(&self) -> &KeyGenerator {
        &self.generator
    }

    /// A collection of `kind` records in the document at `path`.
    pub fn collection(&self, path: &str, kind: KeyKind) -> KeyedCollection {
        let collection =
            KeyedCollection::new(Arc::clone(&self.generator), Arc::clone(&self.store), path, kind);
        match &self.document_locks {
            Some(locks) => collection.with_locks(locks.clone()),
            None => collection,
        }
    }

    /// Per-owner documents under `namespace` for owners of `kind`.
    pub fn scoped(&self, namespace: &str, kind: KeyKind) -> ScopedDocuments {
        let docs = ScopedDocuments::new(Arc::clone(&self.store), namespace, kind);
        match &self.document_locks {
            Some(locks) => docs.with_locks(locks.clone()),
            None => docs,
        }
    }

    pub fn resource_locks(&self) -> &ResourceLockStore {
        &self.resource_locks
    }
}

impl std::fmt::Debug for FileKeep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileKeep")
            .field("config", &self.config)
            .field("resource_locks", &self.resource_locks)
            .finish_non_exhaustive()
    }
}
