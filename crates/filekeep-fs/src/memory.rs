use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::StoreResult;
use crate::json::JsonMode;
use crate::path;
use crate::traits::FileStore;

/// In-memory, HashMap-based file store.
///
/// Intended for tests and embedding. Files are held in memory behind a
/// `RwLock` and keyed by their normalized path. Data is lost when the store
/// is dropped.
pub struct InMemoryFileStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
    json_mode: JsonMode,
}

impl InMemoryFileStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self::with_json_mode(JsonMode::default())
    }

    /// Create a new empty store with the given JSON handling.
    pub fn with_json_mode(json_mode: JsonMode) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            json_mode,
        }
    }

    /// Number of files currently stored.
    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if the store holds no files.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sorted list of all stored paths.
    pub fn paths(&self) -> Vec<String> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let mut paths: Vec<String> = files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Remove all files from the store.
    pub fn clear(&self) {
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Default for InMemoryFileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore for InMemoryFileStore {
    fn put(&self, path: &str, content: &[u8]) -> StoreResult<()> {
        let path = path::normalize(path)?;
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.insert(path, content.to_vec());
        Ok(())
    }

    fn has(&self, path: &str) -> StoreResult<bool> {
        let path = path::normalize(path)?;
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        Ok(files.contains_key(&path))
    }

    fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let path = path::normalize(path)?;
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        Ok(files.get(&path).filter(|bytes| !bytes.is_empty()).cloned())
    }

    fn remove(&self, path: &str) -> StoreResult<()> {
        let path = path::normalize(path)?;
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        files.remove(&path);
        Ok(())
    }

    fn json_mode(&self) -> JsonMode {
        self.json_mode
    }
}

impl std::fmt::Debug for InMemoryFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryFileStore")
            .field("file_count", &self.len())
            .field("json_mode", &self.json_mode)
            .finish()
    }
}
