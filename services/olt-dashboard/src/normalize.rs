//! Response normalization
//!
//! The backend wraps list payloads in several shapes depending on the
//! endpoint and on whether SmartOLT answered directly or through the proxy.
//! Extractors are tried in a fixed order and the first non-empty array wins.

use serde_json::Value;

use crate::records::Record;

/// Default shown for a descriptive field the backend left out
pub const PLACEHOLDER: &str = "-";

/// A single payload shape the normalizer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{"response": {"<collection>": [...]}}`
    NestedCollection,
    /// `{"<collection>": [...]}`
    Collection,
    /// `{"data": [...]}`
    Data,
    /// `{"response": [...]}`
    ResponseArray,
    /// `[...]`
    BareArray,
}

/// Extraction order; earlier shapes take precedence
pub const EXTRACTION_ORDER: [PayloadShape; 5] = [
    PayloadShape::NestedCollection,
    PayloadShape::Collection,
    PayloadShape::Data,
    PayloadShape::ResponseArray,
    PayloadShape::BareArray,
];

impl PayloadShape {
    /// Return the items array if `payload` has this shape
    pub fn extract<'a>(&self, payload: &'a Value, collection: &str) -> Option<&'a Vec<Value>> {
        match self {
            PayloadShape::NestedCollection => payload
                .get("response")
                .and_then(|r| r.get(collection))
                .and_then(Value::as_array),
            PayloadShape::Collection => payload.get(collection).and_then(Value::as_array),
            PayloadShape::Data => payload.get("data").and_then(Value::as_array),
            PayloadShape::ResponseArray => payload.get("response").and_then(Value::as_array),
            PayloadShape::BareArray => payload.as_array(),
        }
    }
}

/// Find the record array inside `payload`, or an empty slice when none matches
pub fn extract_items<'a>(payload: &'a Value, collection: &str) -> &'a [Value] {
    for shape in EXTRACTION_ORDER {
        if let Some(items) = shape.extract(payload, collection) {
            if !items.is_empty() {
                tracing::trace!("Extracted {} items via {:?}", items.len(), shape);
                return items;
            }
        }
    }
    &[]
}

/// Normalize a raw payload into canonical records
pub fn normalize<R: Record>(payload: &Value) -> Vec<R> {
    extract_items(payload, R::COLLECTION)
        .iter()
        .enumerate()
        .map(|(idx, item)| R::from_raw(idx + 1, item))
        .collect()
}

/// First non-empty primitive value among `keys`, rendered as text
///
/// Strings are trimmed; numbers and booleans are formatted. Objects, arrays
/// and nulls count as missing.
pub fn text(item: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match item.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Like [`text`] but substitutes `default` when every key is missing
pub fn text_or(item: &Value, keys: &[&str], default: &str) -> String {
    text(item, keys).unwrap_or_else(|| default.to_string())
}

/// Numeric field that may arrive as a number or a numeric string
pub fn count(item: &Value, key: &str) -> u64 {
    match item.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// True for values that carry no information for matching or ranking
pub fn is_blank(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == PLACEHOLDER
}
