//! List codec: ordered string lists stored in a single text column.
//!
//! The remote schema types list-valued configuration fields as text, so a
//! list travels as its JSON array text. Cells written before list support
//! hold a plain scalar; those decode to a one-element list.

use serde_json::Value;

/// Serialize a list to its stored text form (a JSON array).
pub fn encode_list<S: AsRef<str>>(items: &[S]) -> String {
    let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    Value::from(items).to_string()
}

/// Decode a stored cell back into a list. Never fails.
///
/// - native array: returned as-is (non-string scalars rendered as JSON text)
/// - text holding a JSON array: the decoded array
/// - other text that is not JSON: a one-element list with the text itself,
///   or the empty list when the text is empty
/// - text holding some other JSON value, null, or anything else: empty list
pub fn decode_list(cell: &Value) -> Vec<String> {
    match cell {
        Value::Array(items) => items.iter().map(element_text).collect(),
        Value::String(text) => decode_text(text),
        _ => Vec::new(),
    }
}

/// Decode from a raw text cell.
pub fn decode_text(text: &str) -> Vec<String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => items.iter().map(element_text).collect(),
        Ok(_) => Vec::new(),
        Err(_) if text.is_empty() => Vec::new(),
        Err(_) => vec![text.to_string()],
    }
}

fn element_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
