//! Foundation types for filekeep.
//!
//! This crate provides the key and value types shared by every other filekeep
//! crate. Every other filekeep crate depends on `filekeep-types`.
//!
//! # Key Types
//!
//! - [`KeyKind`] -- Closed registry of record families and their discriminators
//! - [`StorageKey`] -- Immutable `kind:id` identity of a stored record
//! - [`Record`] -- Open map of field name to [`FieldValue`]
//! - [`FieldValue`] -- Plain JSON, an embedded key, or a UTC timestamp

pub mod error;
pub mod key;
pub mod kind;
pub mod record;

pub use error::TypeError;
pub use key::StorageKey;
pub use kind::KeyKind;
pub use record::{FieldValue, Record};
