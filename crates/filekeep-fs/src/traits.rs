use crate::error::StoreResult;
use crate::json::{self, Document, JsonMode};

/// Default text decoded when a JSON document is absent.
pub const EMPTY_DOCUMENT: &str = "[]";

/// Whole-file storage addressed by relative paths.
///
/// All implementations must satisfy these invariants:
/// - A missing file and an empty file are indistinguishable through `get`.
/// - `put` overwrites unconditionally and creates intermediate directories.
/// - `remove` of an absent file is a no-op.
/// - Paths are normalized with [`crate::path::normalize`]; invalid paths fail
///   with [`StoreError::InvalidPath`](crate::StoreError::InvalidPath).
pub trait FileStore: Send + Sync {
    /// Write `content` to `path`, replacing any previous content.
    fn put(&self, path: &str, content: &[u8]) -> StoreResult<()>;

    /// Check whether a file exists at `path`.
    fn has(&self, path: &str) -> StoreResult<bool>;

    /// Read the file at `path`.
    ///
    /// Returns `Ok(None)` if the file does not exist or is empty.
    fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Delete the file at `path` if present.
    fn remove(&self, path: &str) -> StoreResult<()>;

    /// How malformed JSON documents are treated by [`get_json`](Self::get_json).
    fn json_mode(&self) -> JsonMode {
        JsonMode::Strict
    }

    /// Read the JSON document at `path`, or an empty document if absent.
    fn get_json(&self, path: &str) -> StoreResult<Document> {
        self.get_json_or(path, EMPTY_DOCUMENT)
    }

    /// Read the JSON document at `path`, decoding `default_json` if absent.
    fn get_json_or(&self, path: &str, default_json: &str) -> StoreResult<Document> {
        let content = self.get(path)?;
        let bytes = content.as_deref().unwrap_or(default_json.as_bytes());
        json::decode_document(path, bytes, self.json_mode())
    }

    /// Write a JSON document to `path`.
    ///
    /// `None` or an empty document removes the file, so "no data" is always
    /// represented by "no file".
    fn put_json(&self, path: &str, content: Option<&Document>) -> StoreResult<()> {
        match content {
            Some(document) if !document.is_empty() => {
                self.put(path, &json::encode_document(document)?)
            }
            _ => self.remove(path),
        }
    }
}
