use std::collections::btree_map;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::key::StorageKey;

/// A single field of a [`Record`].
///
/// Keys and timestamps are kept as typed values so collection stores can
/// persist them losslessly. Everything else, including `null` and nested
/// arrays/objects, is opaque JSON.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Any plain JSON value.
    Json(Value),
    /// An embedded storage key.
    Key(StorageKey),
    /// A point in time, persisted at one-second resolution.
    DateTime(DateTime<Utc>),
}

impl FieldValue {
    /// JSON `null`.
    pub const fn null() -> Self {
        Self::Json(Value::Null)
    }

    /// Returns `true` for JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<StorageKey> {
        match self {
            Self::Key(k) => Some(*k),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(t) => Some(*t),
            _ => None,
        }
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<StorageKey> for FieldValue {
    fn from(key: StorageKey) -> Self {
        Self::Key(key)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(at: DateTime<Utc>) -> Self {
        Self::DateTime(at)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Json(Value::from(s))
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Json(Value::from(s))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        Self::Json(Value::from(b))
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Into::into)
    }
}

/// An open, ordered map of field name to [`FieldValue`].
///
/// Records are what callers hand to and receive from a keyed collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.fields.iter()
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    // ---------------------------------------------------------------
    // Typed accessors
    // ---------------------------------------------------------------

    pub fn get_json(&self, name: &str) -> Option<&Value> {
        self.get(name).and_then(FieldValue::as_json)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get_json(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get_json(name).and_then(Value::as_i64)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get_json(name).and_then(Value::as_u64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get_json(name).and_then(Value::as_bool)
    }

    pub fn get_key(&self, name: &str) -> Option<StorageKey> {
        self.get(name).and_then(FieldValue::as_key)
    }

    pub fn get_datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get(name).and_then(FieldValue::as_datetime)
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, FieldValue);
    type IntoIter = btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::kind::KeyKind;

    #[test]
    fn builder_and_typed_accessors() {
        let portal = StorageKey::from_raw(KeyKind::PortalNode, 1);
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record = Record::new()
            .with("handler", "sync")
            .with("attempts", 3i64)
            .with("enabled", true)
            .with("portalNodeKey", portal)
            .with("queuedUntil", at)
            .with("payload", Option::<&str>::None);

        assert_eq!(record.len(), 6);
        assert_eq!(record.get_str("handler"), Some("sync"));
        assert_eq!(record.get_i64("attempts"), Some(3));
        assert_eq!(record.get_u64("attempts"), Some(3));
        assert_eq!(record.get_bool("enabled"), Some(true));
        assert_eq!(record.get_key("portalNodeKey"), Some(portal));
        assert_eq!(record.get_datetime("queuedUntil"), Some(at));
        assert!(record.get("payload").unwrap().is_null());
    }

    #[test]
    fn accessors_do_not_coerce_between_variants() {
        let record = Record::new()
            .with("key", StorageKey::from_raw(KeyKind::Route, 2))
            .with("text", "route:2");
        assert_eq!(record.get_str("key"), None);
        assert_eq!(record.get_key("text"), None);
        assert_eq!(record.get_datetime("missing"), None);
    }

    #[test]
    fn insert_replaces_and_returns_previous() {
        let mut record = Record::new().with("a", 1i64);
        let prev = record.insert("a", 2i64);
        assert_eq!(prev, Some(FieldValue::Json(json!(1))));
        assert_eq!(record.get_i64("a"), Some(2));
        assert_eq!(record.remove("a"), Some(FieldValue::Json(json!(2))));
        assert!(record.is_empty());
    }

    #[test]
    fn nested_json_passes_through() {
        let record = Record::new().with("payload", json!({"items": [1, 2, {"x": null}]}));
        assert_eq!(
            record.get_json("payload"),
            Some(&json!({"items": [1, 2, {"x": null}]}))
        );
    }

    #[test]
    fn names_are_ordered() {
        let record: Record = [("b", 1i64), ("a", 2i64), ("c", 3i64)].into_iter().collect();
        assert_eq!(record.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }
}
