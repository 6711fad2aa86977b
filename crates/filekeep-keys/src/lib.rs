//! Storage key generation for filekeep.
//!
//! [`KeyGenerator`] mints fresh [`StorageKey`]s with dense, per-kind ids
//! starting at 1, and converts keys to and from their `kind:id` text form.
//! The text form is the literal document key used by collection stores, so it
//! must stay stable.
//!
//! Identity allocation is per kind: independent record kinds never compete
//! for the same counter. The counters live in one JSON document,
//! [`COUNTER_PATH`], mapping each discriminator to the last issued id.
//!
//! [`StorageKey`]: filekeep_types::StorageKey

pub mod error;
pub mod generator;

pub use error::{KeyError, KeyResult};
pub use generator::{KeyGenerator, COUNTER_PATH};
