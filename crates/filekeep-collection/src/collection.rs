use std::sync::Arc;

use filekeep_fs::{Document, FileStore};
use filekeep_keys::KeyGenerator;
use filekeep_lock::{DocumentLocks, FileLock};
use filekeep_types::{KeyKind, Record, StorageKey};
use tracing::debug;

use crate::codec;
use crate::error::{CollectionError, CollectionResult};

/// Field added to listed records, holding the entry's key.
pub const ID_FIELD: &str = "id";

/// A table of records of one [`KeyKind`] stored in one JSON document.
///
/// Entries are keyed by the text form of their [`StorageKey`]. Values are
/// packed with [`codec::pack`] so embedded keys and timestamps come back
/// typed.
pub struct KeyedCollection {
    generator: Arc<KeyGenerator>,
    store: Arc<dyn FileStore>,
    path: String,
    kind: KeyKind,
    locks: Option<DocumentLocks>,
}

impl KeyedCollection {
    /// Bind a collection of `kind` records to the document at `path`.
    pub fn new(
        generator: Arc<KeyGenerator>,
        store: Arc<dyn FileStore>,
        path: impl Into<String>,
        kind: KeyKind,
    ) -> Self {
        Self {
            generator,
            store,
            path: path.into(),
            kind,
            locks: None,
        }
    }

    /// Hold the document lock across every load-mutate-write.
    #[must_use]
    pub fn with_locks(mut self, locks: DocumentLocks) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Document path backing this collection.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The kind every key in this collection must have.
    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Store `record` under `key`, replacing any existing entry.
    pub fn put(&self, key: &StorageKey, record: &Record) -> CollectionResult<()> {
        self.check_kind(key)?;
        let _guard = self.lock()?;

        let mut entries = self.load()?;
        entries.insert(self.generator.serialize(key), codec::pack(record).into());
        self.store.put_json(&self.path, Some(&entries))?;
        debug!(path = %self.path, key = %key, "record stored");
        Ok(())
    }

    /// Allocate a fresh key of this collection's kind and store `record`
    /// under it.
    pub fn insert(&self, record: &Record) -> CollectionResult<StorageKey> {
        let key = self.generator.generate(self.kind)?;
        self.put(&key, record)?;
        Ok(key)
    }

    /// Returns `true` if an entry exists under `key`.
    pub fn has(&self, key: &StorageKey) -> CollectionResult<bool> {
        self.check_kind(key)?;
        Ok(self.load()?.contains_key(&self.generator.serialize(key)))
    }

    /// Fetch the record stored under `key`.
    ///
    /// # Errors
    /// [`CollectionError::NotFound`] if there is no such entry.
    pub fn get(&self, key: &StorageKey) -> CollectionResult<Record> {
        self.check_kind(key)?;
        let entry = self.generator.serialize(key);
        let stored = self
            .load()?
            .remove(&entry)
            .ok_or_else(|| CollectionError::NotFound { key: entry.clone() })?;
        codec::unpack(&entry, stored)
    }

    /// Delete the entry under `key`. The document file goes away with its
    /// last entry.
    ///
    /// # Errors
    /// [`CollectionError::NotFound`] if there is no such entry.
    pub fn remove(&self, key: &StorageKey) -> CollectionResult<()> {
        self.check_kind(key)?;
        let _guard = self.lock()?;

        let entry = self.generator.serialize(key);
        let mut entries = self.load()?;
        if entries.remove(&entry).is_none() {
            return Err(CollectionError::NotFound { key: entry });
        }
        self.store.put_json(&self.path, Some(&entries))?;
        debug!(path = %self.path, key = %key, remaining = entries.len(), "record removed");
        Ok(())
    }

    /// Modify the record under `key` in place, holding the document lock for
    /// the whole read-modify-write.
    ///
    /// `f` runs while the lock is held. It must not write to this collection
    /// (`put`, `insert`, `remove`, `update`): with locks configured that call
    /// waits on the held lock, forever if [`LockOptions::timeout`] is `None`.
    ///
    /// # Errors
    /// [`CollectionError::NotFound`] if there is no such entry.
    ///
    /// [`LockOptions::timeout`]: filekeep_lock::LockOptions::timeout
    pub fn update<F>(&self, key: &StorageKey, f: F) -> CollectionResult<Record>
    where
        F: FnOnce(&mut Record),
    {
        self.check_kind(key)?;
        let _guard = self.lock()?;

        let entry = self.generator.serialize(key);
        let mut entries = self.load()?;
        let stored = entries
            .remove(&entry)
            .ok_or_else(|| CollectionError::NotFound { key: entry.clone() })?;
        let mut record = codec::unpack(&entry, stored)?;
        f(&mut record);

        entries.insert(entry, codec::pack(&record).into());
        self.store.put_json(&self.path, Some(&entries))?;
        debug!(path = %self.path, key = %key, "record updated");
        Ok(record)
    }

    /// Snapshot every record, each with an [`ID_FIELD`] holding its key.
    ///
    /// The document is read once, here. Records are unpacked as the iterator
    /// advances; dropping it early has no effect on storage.
    pub fn list(&self) -> CollectionResult<Entries> {
        Ok(Entries {
            generator: Arc::clone(&self.generator),
            inner: self.load()?.into_iter(),
        })
    }

    /// Keys of all entries, in stored order.
    pub fn keys(&self) -> CollectionResult<Vec<StorageKey>> {
        self.load()?
            .keys()
            .map(|entry| self.generator.deserialize(entry).map_err(CollectionError::from))
            .collect()
    }

    /// Number of entries.
    pub fn len(&self) -> CollectionResult<usize> {
        Ok(self.load()?.len())
    }

    pub fn is_empty(&self) -> CollectionResult<bool> {
        Ok(self.len()? == 0)
    }

    fn check_kind(&self, key: &StorageKey) -> CollectionResult<()> {
        if key.is(self.kind) {
            Ok(())
        } else {
            Err(CollectionError::UnsupportedKey {
                expected: self.kind,
                actual: key.kind(),
            })
        }
    }

    fn lock(&self) -> CollectionResult<Option<FileLock>> {
        Ok(self
            .locks
            .as_ref()
            .map(|locks| locks.acquire(&self.path))
            .transpose()?)
    }

    fn load(&self) -> CollectionResult<Document> {
        Ok(self.store.get_json(&self.path)?)
    }
}

impl std::fmt::Debug for KeyedCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyedCollection")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

/// Iterator over a collection snapshot. See [`KeyedCollection::list`].
pub struct Entries {
    generator: Arc<KeyGenerator>,
    inner: serde_json::map::IntoIter,
}

impl Iterator for Entries {
    type Item = CollectionResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let (entry, stored) = self.inner.next()?;
        Some(self.unpack_entry(&entry, stored))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl Entries {
    fn unpack_entry(&self, entry: &str, stored: serde_json::Value) -> CollectionResult<Record> {
        let key = self.generator.deserialize(entry)?;
        let mut record = codec::unpack(entry, stored)?;
        record.insert(ID_FIELD, key);
        Ok(record)
    }
}

impl std::fmt::Debug for Entries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entries")
            .field("remaining", &self.inner.len())
            .finish()
    }
}
