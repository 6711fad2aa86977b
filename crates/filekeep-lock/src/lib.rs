//! Cross-process mutual exclusion for filekeep.
//!
//! Everything here is built on one primitive: an exclusive advisory lock on a
//! dedicated lock file ([`FileLock`]), acquired by polling.
//!
//! - [`ResourceLockStore`] -- named resource locks. Each locked name is a
//!   marker file; every marker check-then-act runs while holding one shared
//!   lock file, so it is atomic with respect to every other user of that file.
//! - [`DocumentLocks`] -- one lock file per document path, held around the
//!   load-mutate-write cycle of a JSON document so concurrent writers do not
//!   lose each other's updates.
//!
//! # Known risk
//!
//! With no [`LockOptions::timeout`] a waiter polls forever. A holder that never
//! releases (a hung process, or a filesystem without working advisory locks)
//! stalls every later waiter.

pub mod document;
pub mod error;
pub mod file_lock;
pub mod options;
pub mod resource;

pub use document::DocumentLocks;
pub use error::{LockError, LockResult};
pub use file_lock::FileLock;
pub use options::LockOptions;
pub use resource::ResourceLockStore;

/// Fixed-length, filesystem-safe file name for an arbitrary string.
pub fn hashed_name(name: &str) -> String {
    blake3::hash(name.as_bytes()).to_hex().to_string()
}
