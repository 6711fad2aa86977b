//! File and JSON document storage for filekeep.
//!
//! Every persisted structure in filekeep -- identity counters, collection
//! documents, scoped documents, lock markers -- is a whole file addressed by
//! a relative path under one base directory. This crate owns that layer.
//!
//! # Storage Backends
//!
//! All backends implement the [`FileStore`] trait:
//!
//! - [`FileStorage`] -- files under a base directory on disk
//! - [`InMemoryFileStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. A missing file and an empty file are the same observable state.
//! 2. An empty JSON document is never written: it removes the file instead.
//! 3. Paths are relative and may not escape the base directory.
//! 4. Writers are not coordinated here; callers that need cross-process
//!    safety hold a lock from `filekeep-lock` around read-modify-write.
//! 5. I/O errors are propagated, never silently ignored.

pub mod disk;
pub mod error;
pub mod json;
pub mod memory;
pub mod path;
pub mod traits;

pub use disk::FileStorage;
pub use error::{StoreError, StoreResult};
pub use json::{Document, JsonMode};
pub use memory::InMemoryFileStore;
pub use traits::FileStore;
