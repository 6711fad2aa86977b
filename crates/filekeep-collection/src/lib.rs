//! Keyed record collections for filekeep.
//!
//! A collection is one JSON document treated as a table: top-level entries are
//! keyed by the `kind:id` text of a [`StorageKey`] and hold packed
//! [`Record`]s. Every mutation loads the whole document, changes it and writes
//! it back.
//!
//! # Design Rules
//!
//! 1. A collection is bound to one document path and one [`KeyKind`]; keys of
//!    any other kind are rejected before touching storage.
//! 2. No caching. Every operation reads the document as it is on disk.
//! 3. With [`DocumentLocks`] configured, each load-mutate-write holds the
//!    document's lock. Reads never lock: writes replace files atomically.
//! 4. An empty collection is the absence of its file.
//!
//! [`StorageKey`]: filekeep_types::StorageKey
//! [`Record`]: filekeep_types::Record
//! [`KeyKind`]: filekeep_types::KeyKind
//! [`DocumentLocks`]: filekeep_lock::DocumentLocks

pub mod codec;
pub mod collection;
pub mod error;
pub mod scoped;

pub use collection::{Entries, KeyedCollection, ID_FIELD};
pub use error::{CollectionError, CollectionResult};
pub use scoped::ScopedDocuments;
