use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::kind::KeyKind;

/// Immutable identity of one stored record: a kind plus a numeric id.
///
/// Two keys are equal iff both the kind and the id match. Fresh keys come from
/// the key generator, which allocates ids per kind starting at 1; everything
/// else reconstructs keys from their `kind:id` text via [`StorageKey::parse`].
///
/// The JSON form is `{"type": "<kind>", "id": "<id>"}` with the id rendered as
/// text. The storage form (used as document keys) is the [`Display`] output.
///
/// [`Display`]: fmt::Display
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "KeyRepr", try_from = "KeyRepr")]
pub struct StorageKey {
    kind: KeyKind,
    id: u64,
}

impl StorageKey {
    /// Separator between kind and id in the text form.
    pub const SEPARATOR: char = ':';

    /// Create from an already-allocated id. Use the key generator for new
    /// records.
    pub const fn from_raw(kind: KeyKind, id: u64) -> Self {
        Self { kind, id }
    }

    /// The record family of this key.
    pub const fn kind(&self) -> KeyKind {
        self.kind
    }

    /// The numeric identity within [`kind`](Self::kind).
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns `true` if this key belongs to `kind`.
    pub fn is(&self, kind: KeyKind) -> bool {
        self.kind == kind
    }

    /// Parse the `kind:id` text form.
    ///
    /// Splits on the first `:`. The id must be a non-empty run of ASCII
    /// digits that fits in a `u64`, and the kind must be registered.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        let unsupported = || TypeError::UnsupportedKey(text.to_string());

        let (discriminator, id) = text.split_once(Self::SEPARATOR).ok_or_else(unsupported)?;
        let id = parse_id(id).ok_or_else(unsupported)?;
        let kind = KeyKind::from_discriminator(discriminator).ok_or_else(unsupported)?;

        Ok(Self { kind, id })
    }
}

impl fmt::Debug for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StorageKey({self})")
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind, Self::SEPARATOR, self.id)
    }
}

impl FromStr for StorageKey {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A non-empty run of ASCII digits that fits in a `u64`. Signs, spaces and
/// fractions are rejected.
fn parse_id(text: &str) -> Option<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

#[derive(Serialize, Deserialize)]
struct KeyRepr {
    #[serde(rename = "type")]
    kind: KeyKind,
    id: String,
}

impl From<StorageKey> for KeyRepr {
    fn from(key: StorageKey) -> Self {
        Self {
            kind: key.kind,
            id: key.id.to_string(),
        }
    }
}

impl TryFrom<KeyRepr> for StorageKey {
    type Error = TypeError;

    fn try_from(repr: KeyRepr) -> Result<Self, Self::Error> {
        let id = parse_id(&repr.id)
            .ok_or_else(|| TypeError::UnsupportedKey(format!("{}:{}", repr.kind, repr.id)))?;
        Ok(Self { kind: repr.kind, id })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn equality_requires_kind_and_id() {
        let a = StorageKey::from_raw(KeyKind::Cronjob, 7);
        assert_eq!(a, StorageKey::from_raw(KeyKind::Cronjob, 7));
        assert_ne!(a, StorageKey::from_raw(KeyKind::Cronjob, 8));
        assert_ne!(a, StorageKey::from_raw(KeyKind::Webhook, 7));
    }

    #[test]
    fn display_format() {
        let key = StorageKey::from_raw(KeyKind::PortalNode, 42);
        assert_eq!(key.to_string(), "portal_node:42");
        assert_eq!(format!("{key:?}"), "StorageKey(portal_node:42)");
    }

    #[test]
    fn parse_valid() {
        let key = StorageKey::parse("mapping_node:13").unwrap();
        assert_eq!(key.kind(), KeyKind::MappingNode);
        assert_eq!(key.id(), 13);
        assert!(key.is(KeyKind::MappingNode));
    }

    #[test]
    fn parse_splits_on_first_separator() {
        assert!(StorageKey::parse("route:1:2").is_err());
    }

    #[test]
    fn parse_rejects_non_numeric_id() {
        for text in ["route:", "route:abc", "route:-1", "route:+1", "route:1.5", "route: 1"] {
            assert_eq!(
                StorageKey::parse(text),
                Err(TypeError::UnsupportedKey(text.to_string())),
                "{text}"
            );
        }
    }

    #[test]
    fn parse_rejects_unknown_kind_and_missing_separator() {
        assert!(StorageKey::parse("bogus:1").is_err());
        assert!(StorageKey::parse("route").is_err());
        assert!(StorageKey::parse("").is_err());
    }

    #[test]
    fn parse_rejects_overflow() {
        assert!(StorageKey::parse("route:99999999999999999999999").is_err());
    }

    #[test]
    fn json_form_uses_type_and_text_id() {
        let key = StorageKey::from_raw(KeyKind::Webhook, 5);
        let json = serde_json::to_value(key).unwrap();
        assert_eq!(json, serde_json::json!({"type": "webhook", "id": "5"}));

        let parsed: StorageKey = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn json_form_rejects_bad_id() {
        for id in ["five", "+5", "-5", " 5", "5.0", ""] {
            let json = serde_json::json!({"type": "route", "id": id});
            assert!(serde_json::from_value::<StorageKey>(json).is_err(), "{id:?}");
            assert!(StorageKey::parse(&format!("route:{id}")).is_err(), "{id:?}");
        }
    }

    proptest! {
        #[test]
        fn text_roundtrip(kind_idx in 0usize..KeyKind::ALL.len(), id in any::<u64>()) {
            let key = StorageKey::from_raw(KeyKind::ALL[kind_idx], id);
            let parsed: StorageKey = key.to_string().parse().unwrap();
            prop_assert_eq!(parsed, key);
        }
    }
}
