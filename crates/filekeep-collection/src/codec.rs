//! Lossless conversion between [`Record`]s and their stored JSON form.
//!
//! JSON has no notion of storage keys or timestamps, so packing flattens them
//! and records which fields need rehydrating:
//!
//! | Field value | Stored as | Listed in |
//! |---|---|---|
//! | [`FieldValue::Key`] | `"kind:id"` text | `_keys` |
//! | [`FieldValue::DateTime`] | integer epoch seconds | `_datetimes` |
//! | [`FieldValue::Json`] | itself | - |
//!
//! Timestamps survive at one-second resolution.

use chrono::{DateTime, Utc};
use filekeep_fs::Document;
use filekeep_types::{FieldValue, Record, StorageKey};
use serde_json::Value;

use crate::error::{CollectionError, CollectionResult};

/// Bookkeeping field listing key-valued fields.
pub const KEYS_FIELD: &str = "_keys";

/// Bookkeeping field listing timestamp-valued fields.
pub const DATETIMES_FIELD: &str = "_datetimes";

/// Flatten `record` into a JSON object with bookkeeping fields appended.
///
/// A record field named like a bookkeeping field is overwritten.
pub fn pack(record: &Record) -> Document {
    let mut packed = Document::new();
    let mut keys = Vec::new();
    let mut datetimes = Vec::new();

    for (name, value) in record {
        let stored = match value {
            FieldValue::Json(v) => v.clone(),
            FieldValue::Key(key) => {
                keys.push(Value::from(name.as_str()));
                Value::from(key.to_string())
            }
            FieldValue::DateTime(at) => {
                datetimes.push(Value::from(name.as_str()));
                Value::from(at.timestamp())
            }
        };
        packed.insert(name.clone(), stored);
    }

    packed.insert(KEYS_FIELD.to_string(), Value::Array(keys));
    packed.insert(DATETIMES_FIELD.to_string(), Value::Array(datetimes));
    packed
}

/// Rebuild the record stored under `entry`.
///
/// # Errors
/// [`CollectionError::CorruptRecord`] if the value is not an object, a
/// bookkeeping list is malformed, or a listed field is missing or has the
/// wrong shape.
pub fn unpack(entry: &str, stored: Value) -> CollectionResult<Record> {
    let Value::Object(mut fields) = stored else {
        return Err(CollectionError::corrupt(entry, "record is not a JSON object"));
    };

    let keys = take_field_list(entry, &mut fields, KEYS_FIELD)?;
    let datetimes = take_field_list(entry, &mut fields, DATETIMES_FIELD)?;

    let mut record: Record = fields.into_iter().collect();

    for name in keys {
        let key = match record.get_str(&name) {
            Some(text) => StorageKey::parse(text)
                .map_err(|e| CollectionError::corrupt(entry, format!("field {name}: {e}")))?,
            None => {
                return Err(CollectionError::corrupt(
                    entry,
                    format!("key field {name} is missing or not text"),
                ))
            }
        };
        record.insert(name, key);
    }

    for name in datetimes {
        let at = record
            .get_i64(&name)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| {
                CollectionError::corrupt(
                    entry,
                    format!("timestamp field {name} is missing or not epoch seconds"),
                )
            })?;
        record.insert(name, at);
    }

    Ok(record)
}

fn take_field_list(
    entry: &str,
    fields: &mut Document,
    list: &str,
) -> CollectionResult<Vec<String>> {
    match fields.remove(list) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(names)) => names
            .into_iter()
            .map(|name| match name {
                Value::String(s) => Ok(s),
                other => Err(CollectionError::corrupt(
                    entry,
                    format!("{list} holds a non-text entry: {other}"),
                )),
            })
            .collect(),
        Some(other) => Err(CollectionError::corrupt(
            entry,
            format!("{list} is not an array: {other}"),
        )),
    }
}
