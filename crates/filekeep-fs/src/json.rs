//! JSON document encoding.
//!
//! Documents are always JSON objects on the way in and out. The on-disk form
//! is pretty-printed with four-space indentation and unescaped slashes.

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{StoreError, StoreResult};

/// A decoded JSON document: a top-level object.
pub type Document = Map<String, Value>;

/// How to treat a stored document that is not a JSON object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonMode {
    /// Malformed or non-object documents are a [`StoreError::CorruptDocument`].
    #[default]
    Strict,
    /// Malformed or non-object documents are logged and read as empty.
    Lenient,
}

/// Decode `bytes` read from `path` into a document.
///
/// An empty JSON array decodes to an empty document in both modes, since it is
/// the conventional "nothing stored" default.
pub fn decode_document(path: &str, bytes: &[u8], mode: JsonMode) -> StoreResult<Document> {
    let reason = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => return Ok(map),
        Ok(Value::Array(items)) if items.is_empty() => return Ok(Document::new()),
        Ok(other) => format!("expected a JSON object, found {}", kind_name(&other)),
        Err(e) => e.to_string(),
    };

    match mode {
        JsonMode::Strict => Err(StoreError::CorruptDocument {
            path: path.to_string(),
            reason,
        }),
        JsonMode::Lenient => {
            warn!(path, %reason, "malformed JSON document read as empty");
            Ok(Document::new())
        }
    }
}

/// Encode a document in the on-disk form.
pub fn encode_document(document: &Document) -> StoreResult<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    document
        .serialize(&mut serializer)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(out)
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
