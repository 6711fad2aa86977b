use std::sync::Arc;

use filekeep_fs::{Document, FileStore};
use filekeep_lock::{DocumentLocks, FileLock};
use filekeep_types::{KeyKind, StorageKey};
use serde_json::Value;
use tracing::debug;

use crate::error::{CollectionError, CollectionResult};

/// Named JSON values kept in one document per owner key.
///
/// The owner with id `n` gets `<namespace>/<n>.json`. Values are stored as
/// given; unlike [`KeyedCollection`](crate::KeyedCollection) nothing is
/// packed.
pub struct ScopedDocuments {
    store: Arc<dyn FileStore>,
    namespace: String,
    kind: KeyKind,
    locks: Option<DocumentLocks>,
}

impl ScopedDocuments {
    /// Scope documents under `namespace` to owners of `kind`.
    pub fn new(store: Arc<dyn FileStore>, namespace: impl Into<String>, kind: KeyKind) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            kind,
            locks: None,
        }
    }

    #[must_use]
    pub fn with_locks(mut self, locks: DocumentLocks) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Path of the document owned by `owner`.
    pub fn document_path(&self, owner: &StorageKey) -> CollectionResult<String> {
        if !owner.is(self.kind) {
            return Err(CollectionError::UnsupportedKey {
                expected: self.kind,
                actual: owner.kind(),
            });
        }
        Ok(format!("{}/{}.json", self.namespace, owner.id()))
    }

    /// Store `value` as `name` in `owner`'s document.
    pub fn set(&self, owner: &StorageKey, name: &str, value: Value) -> CollectionResult<()> {
        let path = self.document_path(owner)?;
        let _guard = self.lock(&path)?;

        let mut document = self.store.get_json(&path)?;
        document.insert(name.to_string(), value);
        self.store.put_json(&path, Some(&document))?;
        debug!(path = %path, name, "scoped value stored");
        Ok(())
    }

    /// The value stored as `name`.
    ///
    /// # Errors
    /// [`CollectionError::NotFound`] if `owner` has no such value.
    pub fn get(&self, owner: &StorageKey, name: &str) -> CollectionResult<Value> {
        let path = self.document_path(owner)?;
        self.store
            .get_json(&path)?
            .remove(name)
            .ok_or_else(|| not_found(owner, name))
    }

    pub fn has(&self, owner: &StorageKey, name: &str) -> CollectionResult<bool> {
        let path = self.document_path(owner)?;
        Ok(self.store.get_json(&path)?.contains_key(name))
    }

    /// Remove `name` from `owner`'s document.
    ///
    /// # Errors
    /// [`CollectionError::NotFound`] if `owner` has no such value.
    pub fn unset(&self, owner: &StorageKey, name: &str) -> CollectionResult<()> {
        let path = self.document_path(owner)?;
        let _guard = self.lock(&path)?;

        let mut document = self.store.get_json(&path)?;
        if document.remove(name).is_none() {
            return Err(not_found(owner, name));
        }
        self.store.put_json(&path, Some(&document))?;
        debug!(path = %path, name, "scoped value removed");
        Ok(())
    }

    /// Every value in `owner`'s document.
    pub fn entries(&self, owner: &StorageKey) -> CollectionResult<Document> {
        let path = self.document_path(owner)?;
        Ok(self.store.get_json(&path)?)
    }

    /// Drop `owner`'s whole document.
    pub fn clear(&self, owner: &StorageKey) -> CollectionResult<()> {
        let path = self.document_path(owner)?;
        let _guard = self.lock(&path)?;
        self.store.put_json(&path, None)?;
        Ok(())
    }

    fn lock(&self, path: &str) -> CollectionResult<Option<FileLock>> {
        Ok(self
            .locks
            .as_ref()
            .map(|locks| locks.acquire(path))
            .transpose()?)
    }
}

impl std::fmt::Debug for ScopedDocuments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedDocuments")
            .field("namespace", &self.namespace)
            .field("kind", &self.kind)
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

fn not_found(owner: &StorageKey, name: &str) -> CollectionError {
    CollectionError::NotFound {
        key: format!("{owner}/{name}"),
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use filekeep_fs::{FileStorage, InMemoryFileStore};
    use filekeep_lock::LockOptions;
    use serde_json::json;

    use super::*;

    fn portal_storage() -> (Arc<InMemoryFileStore>, ScopedDocuments) {
        let store = Arc::new(InMemoryFileStore::new());
        let docs = ScopedDocuments::new(store.clone(), "portalStorage", KeyKind::PortalNode);
        (store, docs)
    }

    #[test]
    fn set_get_has_unset() {
        let (store, docs) = portal_storage();
        let node = StorageKey::from_raw(KeyKind::PortalNode, 5);
        let value = json!({"value": "s3cr3t", "type": "string"});

        assert!(!docs.has(&node, "token").unwrap());
        docs.set(&node, "token", value.clone()).unwrap();
        assert!(docs.has(&node, "token").unwrap());
        assert_eq!(docs.get(&node, "token").unwrap(), value);
        assert!(store.has("portalStorage/5.json").unwrap());

        docs.unset(&node, "token").unwrap();
        assert!(matches!(
            docs.get(&node, "token"),
            Err(CollectionError::NotFound { ref key }) if key == "portal_node:5/token"
        ));
        assert!(matches!(docs.unset(&node, "token"), Err(CollectionError::NotFound { .. })));
        assert!(!store.has("portalStorage/5.json").unwrap());
    }

    #[test]
    fn owners_are_isolated() {
        let (_store, docs) = portal_storage();
        let a = StorageKey::from_raw(KeyKind::PortalNode, 1);
        let b = StorageKey::from_raw(KeyKind::PortalNode, 2);
        docs.set(&a, "k", json!(1)).unwrap();
        docs.set(&b, "k", json!(2)).unwrap();
        docs.set(&b, "other", json!(null)).unwrap();

        assert_eq!(docs.get(&a, "k").unwrap(), json!(1));
        assert_eq!(docs.entries(&b).unwrap().len(), 2);

        docs.clear(&b).unwrap();
        assert!(docs.entries(&b).unwrap().is_empty());
        assert_eq!(docs.entries(&a).unwrap().len(), 1);
    }

    #[test]
    fn wrong_owner_kind_is_rejected() {
        let (store, docs) = portal_storage();
        let route = StorageKey::from_raw(KeyKind::Route, 1);
        assert!(matches!(
            docs.set(&route, "k", json!(1)),
            Err(CollectionError::UnsupportedKey {
                expected: KeyKind::PortalNode,
                actual: KeyKind::Route
            })
        ));
        assert!(docs.has(&route, "k").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_sets_with_locks_keep_every_value() {
        let dir = tempfile::tempdir().unwrap();
        let node = StorageKey::from_raw(KeyKind::PortalNode, 1);
        let open = |base: &std::path::Path| {
            let store: Arc<dyn FileStore> = Arc::new(FileStorage::new(base.join("storage")));
            ScopedDocuments::new(store, "portalStorage", KeyKind::PortalNode).with_locks(
                DocumentLocks::new(
                    base.join(".document_locks"),
                    LockOptions::bounded(Duration::from_millis(2), Duration::from_secs(30)),
                ),
            )
        };

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let base = dir.path().to_path_buf();
                thread::spawn(move || {
                    let docs = open(&base);
                    for i in 0..10 {
                        docs.set(&node, &format!("t{t}-{i}"), json!(i)).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }

        assert_eq!(open(dir.path()).entries(&node).unwrap().len(), 40);
    }
}
