use std::path::{Path, PathBuf};
use std::time::Duration;

use filekeep_fs::JsonMode;
use filekeep_lock::LockOptions;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Where and how a [`FileKeep`](crate::FileKeep) stores its data.
///
/// Relative `lock_file` and `document_lock_dir` paths are resolved against
/// `base_dir`. Every field has a default, so a TOML file only needs the
/// settings it changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub base_dir: PathBuf,
    /// Lock file serializing resource lock operations.
    pub lock_file: PathBuf,
    /// Store directory holding resource lock markers.
    pub resource_namespace: String,
    /// Directory holding per-document lock files.
    pub document_lock_dir: PathBuf,
    /// Lock each document around its read-modify-write.
    pub document_locking: bool,
    pub json_mode: JsonMode,
    pub lock_poll_interval_ms: u64,
    /// `None` waits for locks indefinitely.
    pub lock_timeout_ms: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("storage"),
            lock_file: PathBuf::from(".lock"),
            resource_namespace: filekeep_lock::resource::DEFAULT_NAMESPACE.to_string(),
            document_lock_dir: PathBuf::from(".document_locks"),
            document_locking: true,
            json_mode: JsonMode::Strict,
            lock_poll_interval_ms: 1_000,
            lock_timeout_ms: None,
        }
    }
}

impl StorageConfig {
    /// Default settings rooted at `base_dir`.
    pub fn at(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML configuration file.
    pub fn load(path: &Path) -> SdkResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> SdkResult<String> {
        toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn validate(&self) -> SdkResult<()> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(SdkError::Config("base_dir must not be empty".into()));
        }
        if self.lock_file.as_os_str().is_empty() {
            return Err(SdkError::Config("lock_file must not be empty".into()));
        }
        if self.document_lock_dir.as_os_str().is_empty() {
            return Err(SdkError::Config("document_lock_dir must not be empty".into()));
        }
        if self.lock_poll_interval_ms == 0 {
            return Err(SdkError::Config(
                "lock_poll_interval_ms must be positive".into(),
            ));
        }
        filekeep_fs::path::normalize(&self.resource_namespace).map_err(|e| {
            SdkError::Config(format!("resource_namespace is not a valid store path: {e}"))
        })?;
        Ok(())
    }

    /// Lock polling behavior derived from the `lock_*` settings.
    pub fn lock_options(&self) -> LockOptions {
        LockOptions {
            poll_interval: Duration::from_millis(self.lock_poll_interval_ms),
            timeout: self.lock_timeout_ms.map(Duration::from_millis),
        }
    }

    /// Absolute location of the resource lock file.
    pub fn lock_file_path(&self) -> PathBuf {
        self.base_dir.join(&self.lock_file)
    }

    /// Absolute location of the document lock directory.
    pub fn document_lock_path(&self) -> PathBuf {
        self.base_dir.join(&self.document_lock_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = StorageConfig::default();
        assert_eq!(c.lock_file, PathBuf::from(".lock"));
        assert_eq!(c.resource_namespace, "resource_locks");
        assert_eq!(c.document_lock_dir, PathBuf::from(".document_locks"));
        assert!(c.document_locking);
        assert_eq!(c.json_mode, JsonMode::Strict);
        assert_eq!(c.lock_options(), LockOptions::default());
        c.validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = StorageConfig::from_toml_str(
            r#"
            base_dir = "/var/lib/app"
            json_mode = "lenient"
            lock_timeout_ms = 2500
            "#,
        )
        .unwrap();
        assert_eq!(c.base_dir, PathBuf::from("/var/lib/app"));
        assert_eq!(c.json_mode, JsonMode::Lenient);
        assert_eq!(c.lock_options().timeout, Some(Duration::from_millis(2500)));
        assert_eq!(c.lock_options().poll_interval, Duration::from_secs(1));
        assert_eq!(c.lock_file_path(), PathBuf::from("/var/lib/app/.lock"));
        assert_eq!(
            c.document_lock_path(),
            PathBuf::from("/var/lib/app/.document_locks")
        );
    }

    #[test]
    fn toml_roundtrip() {
        let mut c = StorageConfig::at("/data");
        c.lock_timeout_ms = Some(10);
        c.document_locking = false;
        let text = c.to_toml_string().unwrap();
        assert_eq!(StorageConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let cases = [
            "lock_poll_interval_ms = 0",
            r#"base_dir = """#,
            r#"resource_namespace = "../outside""#,
            r#"json_mode = "sloppy""#,
            "document_locking = \"yes\"",
        ];
        for text in cases {
            assert!(
                matches!(StorageConfig::from_toml_str(text), Err(SdkError::Config(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filekeep.toml");
        std::fs::write(&path, "resource_namespace = \"locks\"\n").unwrap();
        assert_eq!(StorageConfig::load(&path).unwrap().resource_namespace, "locks");

        assert!(matches!(
            StorageConfig::load(&dir.path().join("missing.toml")),
            Err(SdkError::Io(_))
        ));
    }
}
