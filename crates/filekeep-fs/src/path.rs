//! Relative path normalization shared by all backends.

use std::path::{Component, Path};

use crate::error::{StoreError, StoreResult};

/// Normalize a store path to its canonical `a/b/c` form.
///
/// Leading separators are ignored (the path is always relative to the base
/// directory) and `.` segments are dropped. Empty paths and paths containing
/// `..`, a root or a drive prefix are rejected.
pub fn normalize(path: &str) -> StoreResult<String> {
    let trimmed = path.trim_start_matches(['/', '\\']);
    let mut segments = Vec::new();

    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(segment) => {
                let segment = segment
                    .to_str()
                    .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
                segments.push(segment);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(StoreError::InvalidPath(path.to_string()));
            }
        }
    }

    if segments.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(segments.join("/"))
}
