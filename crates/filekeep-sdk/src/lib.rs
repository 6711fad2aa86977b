//! High-level entry point for filekeep.
//!
//! [`FileKeep`] opens a base directory from a [`StorageConfig`] and hands out
//! the stores that live in it: the key generator, keyed collections, scoped
//! per-owner documents, and the resource lock store. This is the crate most
//! applications depend on.
//!
//! ```no_run
//! use filekeep_sdk::{FileKeep, KeyKind, Record, StorageConfig};
//!
//! # fn main() -> filekeep_sdk::SdkResult<()> {
//! let keep = FileKeep::open(StorageConfig::at("/var/lib/app"))?;
//! let jobs = keep.collection("cronjobs.json", KeyKind::Cronjob);
//! let key = jobs.insert(&Record::new().with("cronExpression", "0 * * * *"))?;
//! assert!(jobs.has(&key)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod keep;

pub use config::StorageConfig;
pub use error::{SdkError, SdkResult};
pub use keep::FileKeep;

// Re-export key types
pub use filekeep_collection::{CollectionError, Entries, KeyedCollection, ScopedDocuments, ID_FIELD};
pub use filekeep_fs::{Document, FileStore, JsonMode};
pub use filekeep_keys::KeyGenerator;
pub use filekeep_lock::{LockError, LockOptions, ResourceLockStore};
pub use filekeep_types::{FieldValue, KeyKind, Record, StorageKey};
