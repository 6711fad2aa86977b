use std::sync::Arc;

use filekeep_fs::{FileStore, StoreError};
use filekeep_lock::DocumentLocks;
use filekeep_types::{KeyKind, StorageKey};
use serde_json::Value;
use tracing::debug;

use crate::error::{KeyError, KeyResult};

/// Document holding the last issued id per kind.
pub const COUNTER_PATH: &str = "storage_key_generator/keys.json";

/// Mints storage keys and (de)serializes them.
///
/// Every call to [`generate`](Self::generate) reloads the counter document,
/// so several generators (or processes) sharing one store see each other's
/// allocations. With [`DocumentLocks`] configured the load-increment-write is
/// exclusive; without them concurrent generators can hand out the same id.
pub struct KeyGenerator {
    store: Arc<dyn FileStore>,
    locks: Option<DocumentLocks>,
}

impl KeyGenerator {
    /// Create a generator keeping its counters in `store`.
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store, locks: None }
    }

    /// Hold a document lock on the counter across each allocation.
    #[must_use]
    pub fn with_locks(mut self, locks: DocumentLocks) -> Self {
        self.locks = Some(locks);
        self
    }

    /// Mint a fresh key of `kind`.
    pub fn generate(&self, kind: KeyKind) -> KeyResult<StorageKey> {
        let id = self.next_id(kind)?;
        debug!(kind = %kind, id, "storage key generated");
        Ok(StorageKey::from_raw(kind, id))
    }

    /// Mint a fresh key for the kind registered under `discriminator`.
    ///
    /// # Errors
    /// [`KeyError::UnsupportedKey`] if `discriminator` is not registered.
    pub fn generate_named(&self, discriminator: &str) -> KeyResult<StorageKey> {
        let kind = discriminator.parse::<KeyKind>()?;
        self.generate(kind)
    }

    /// The `kind:id` text form of `key`.
    pub fn serialize(&self, key: &StorageKey) -> String {
        key.to_string()
    }

    /// Reconstruct a key from its `kind:id` text form. Never allocates.
    ///
    /// # Errors
    /// [`KeyError::UnsupportedKey`] if the id is not numeric or the kind is
    /// not registered.
    pub fn deserialize(&self, text: &str) -> KeyResult<StorageKey> {
        Ok(StorageKey::parse(text)?)
    }

    /// The last id issued for `kind`, or 0 if none has been issued.
    pub fn last_issued(&self, kind: KeyKind) -> KeyResult<u64> {
        let counters = self.store.get_json(COUNTER_PATH)?;
        read_counter(counters.get(kind.discriminator()), kind)
    }

    fn next_id(&self, kind: KeyKind) -> KeyResult<u64> {
        let _guard = self
            .locks
            .as_ref()
            .map(|locks| locks.acquire(COUNTER_PATH))
            .transpose()?;

        let mut counters = self.store.get_json(COUNTER_PATH)?;
        let last = read_counter(counters.get(kind.discriminator()), kind)?;
        let next = last.checked_add(1).ok_or_else(|| StoreError::CorruptDocument {
            path: COUNTER_PATH.to_string(),
            reason: format!("counter for {kind} is exhausted"),
        })?;

        counters.insert(kind.discriminator().to_string(), Value::from(next));
        self.store.put_json(COUNTER_PATH, Some(&counters))?;
        Ok(next)
    }
}

impl std::fmt::Debug for KeyGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyGenerator")
            .field("locks", &self.locks)
            .finish_non_exhaustive()
    }
}

fn read_counter(value: Option<&Value>, kind: KeyKind) -> KeyResult<u64> {
    match value {
        None => Ok(0),
        Some(v) => v.as_u64().ok_or_else(|| {
            KeyError::Store(StoreError::CorruptDocument {
                path: COUNTER_PATH.to_string(),
                reason: format!("counter for {kind} is not an unsigned integer: {v}"),
            })
        }),
    }
}
