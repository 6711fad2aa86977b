use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::error::StoreResult;
use crate::json::JsonMode;
use crate::path;
use crate::traits::FileStore;

/// Files under a base directory on the local filesystem.
///
/// Writes go to a temporary file in the target directory which is then
/// renamed over the destination, so readers never observe a half-written
/// document.
#[derive(Clone, Debug)]
pub struct FileStorage {
    base_dir: PathBuf,
    json_mode: JsonMode,
}

impl FileStorage {
    /// Create a store rooted at `base_dir`. The directory is created lazily on
    /// the first write.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            json_mode: JsonMode::default(),
        }
    }

    /// Set how malformed JSON documents are treated.
    #[must_use]
    pub fn with_json_mode(mut self, json_mode: JsonMode) -> Self {
        self.json_mode = json_mode;
        self
    }

    /// The root directory of this store.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute (base-joined) location of `path`.
    pub fn full_path(&self, path: &str) -> StoreResult<PathBuf> {
        Ok(self.base_dir.join(path::normalize(path)?))
    }

    /// Temp file in `dir` that will carry the permissions `target` should
    /// end up with: the existing file's mode, or `0o666` less the umask.
    fn temp_file_for(target: &Path, dir: &Path) -> StoreResult<NamedTempFile> {
        #[cfg_attr(not(unix), allow(unused_mut))]
        let mut builder = Builder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let tmp = builder.tempfile_in(dir)?;

        match fs::metadata(target) {
            Ok(existing) => fs::set_permissions(tmp.path(), existing.permissions())?,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        Ok(tmp)
    }
}

impl FileStore for FileStorage {
    fn put(&self, path: &str, content: &[u8]) -> StoreResult<()> {
        let full = self.full_path(path)?;
        let dir = full.parent().unwrap_or(&self.base_dir);
        fs::create_dir_all(dir)?;

        let mut tmp = Self::temp_file_for(&full, dir)?;
        tmp.write_all(content)?;
        tmp.persist(&full).map_err(|e| e.error)?;

        debug!(path, bytes = content.len(), "file written");
        Ok(())
    }

    fn has(&self, path: &str) -> StoreResult<bool> {
        Ok(self.full_path(path)?.is_file())
    }

    fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let full = self.full_path(path)?;
        if !full.is_file() {
            return Ok(None);
        }
        match fs::read(&full) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, path: &str) -> StoreResult<()> {
        let full = self.full_path(path)?;
        if !full.is_file() {
            return Ok(());
        }
        match fs::remove_file(&full) {
            Ok(()) => {
                debug!(path, "file removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn json_mode(&self) -> JsonMode {
        self.json_mode
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::StoreError;
    use crate::json::Document;

    const FILE_NAME: &str = "testfile.txt";
    const CONTENT: &str = "Super special content";

    fn storage() -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("storage"));
        (dir, storage)
    }

    #[test]
    fn put_creates_directories_and_writes() {
        let (_dir, storage) = storage();
        storage.put("nested/deeper/testfile.txt", CONTENT.as_bytes()).unwrap();
        let full = storage.base_dir().join("nested/deeper/testfile.txt");
        assert_eq!(fs::read_to_string(full).unwrap(), CONTENT);
    }

    #[test]
    fn put_overwrites() {
        let (_dir, storage) = storage();
        storage.put(FILE_NAME, b"first").unwrap();
        storage.put(FILE_NAME, b"second").unwrap();
        assert_eq!(storage.get(FILE_NAME).unwrap().unwrap(), b"second");
    }

    #[test]
    fn has_reflects_files_only() {
        let (_dir, storage) = storage();
        assert!(!storage.has(FILE_NAME).unwrap());
        fs::create_dir_all(storage.base_dir()).unwrap();
        fs::write(storage.base_dir().join(FILE_NAME), b"").unwrap();
        assert!(storage.has(FILE_NAME).unwrap());

        fs::create_dir_all(storage.base_dir().join("a_dir")).unwrap();
        assert!(!storage.has("a_dir").unwrap());
    }

    #[test]
    fn get_merges_missing_and_empty() {
        let (_dir, storage) = storage();
        assert_eq!(storage.get(FILE_NAME).unwrap(), None);
        storage.put(FILE_NAME, b"").unwrap();
        assert!(storage.has(FILE_NAME).unwrap());
        assert_eq!(storage.get(FILE_NAME).unwrap(), None);
        storage.put(FILE_NAME, CONTENT.as_bytes()).unwrap();
        assert_eq!(storage.get(FILE_NAME).unwrap().unwrap(), CONTENT.as_bytes());
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dir, storage) = storage();
        storage.put(FILE_NAME, CONTENT.as_bytes()).unwrap();
        storage.remove(FILE_NAME).unwrap();
        assert!(!storage.has(FILE_NAME).unwrap());
        storage.remove(FILE_NAME).unwrap();
    }

    #[test]
    fn json_roundtrip_and_pretty_form() {
        let (_dir, storage) = storage();
        let mut doc = Document::new();
        doc.insert("name".into(), json!("Super special content"));
        storage.put_json(FILE_NAME, Some(&doc)).unwrap();

        let text = fs::read_to_string(storage.base_dir().join(FILE_NAME)).unwrap();
        assert_eq!(text, "{\n    \"name\": \"Super special content\"\n}");
        assert_eq!(storage.get_json(FILE_NAME).unwrap(), doc);
    }

    #[test]
    fn put_json_empty_or_none_removes_file() {
        let (_dir, storage) = storage();
        storage.put(FILE_NAME, b"{}").unwrap();
        storage.put_json(FILE_NAME, None).unwrap();
        assert!(!storage.has(FILE_NAME).unwrap());

        storage.put(FILE_NAME, b"{}").unwrap();
        storage.put_json(FILE_NAME, Some(&Document::new())).unwrap();
        assert!(!storage.has(FILE_NAME).unwrap());
    }

    #[test]
    fn get_json_missing_or_empty_array_is_empty() {
        let (_dir, storage) = storage();
        assert!(storage.get_json(FILE_NAME).unwrap().is_empty());
        storage.put(FILE_NAME, b"[]").unwrap();
        assert!(storage.get_json(FILE_NAME).unwrap().is_empty());
    }

    #[test]
    fn get_json_or_uses_default_when_absent() {
        let (_dir, storage) = storage();
        let doc = storage.get_json_or(FILE_NAME, r#"{"seed": 1}"#).unwrap();
        assert_eq!(doc.get("seed"), Some(&json!(1)));
    }

    #[test]
    fn malformed_json_strict_and_lenient() {
        let (dir, storage) = storage();
        storage.put(FILE_NAME, b"{broken").unwrap();
        assert!(matches!(
            storage.get_json(FILE_NAME),
            Err(StoreError::CorruptDocument { .. })
        ));

        let lenient = FileStorage::new(dir.path().join("storage")).with_json_mode(JsonMode::Lenient);
        assert!(lenient.get_json(FILE_NAME).unwrap().is_empty());
    }

    #[test]
    fn rejects_paths_outside_base() {
        let (_dir, storage) = storage();
        assert!(matches!(
            storage.put("../escape.txt", b"x"),
            Err(StoreError::InvalidPath(_))
        ));
        assert!(matches!(storage.get(""), Err(StoreError::InvalidPath(_))));
    }

    #[cfg(unix)]
    #[test]
    fn new_files_get_default_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, storage) = storage();
        storage.put("doc.json", b"{}").unwrap();
        let plain = storage.base_dir().join("plain.json");
        fs::write(&plain, b"{}").unwrap();

        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&storage.full_path("doc.json").unwrap()), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn overwrite_keeps_existing_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, storage) = storage();
        storage.put(FILE_NAME, b"first").unwrap();
        let full = storage.full_path(FILE_NAME).unwrap();
        fs::set_permissions(&full, fs::Permissions::from_mode(0o640)).unwrap();

        storage.put(FILE_NAME, b"second").unwrap();
        assert_eq!(fs::metadata(&full).unwrap().permissions().mode() & 0o777, 0o640);
        assert_eq!(storage.get(FILE_NAME).unwrap().unwrap(), b"second");
    }

    #[test]
    fn leading_separator_is_relative() {
        let (_dir, storage) = storage();
        storage.put("/rooted.txt", b"x").unwrap();
        assert!(storage.base_dir().join("rooted.txt").is_file());
        assert!(storage.has("rooted.txt").unwrap());
    }
}
