//! URL construction, query encoding and response decoding for the REST
//! document API.

use orderdesk_storage::{Document, DocumentList, Query, StoreError};
use serde::Deserialize;
use serde_json::Value;

/// Error body returned by the server on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default, rename = "type")]
    kind: String,
}

/// Base URL of a collection's documents.
///
/// `{endpoint}/databases/{database_id}/collections/{collection}/documents`
pub(crate) fn documents_url(endpoint: &str, database_id: &str, collection: &str) -> String {
    format!(
        "{}/databases/{}/collections/{}/documents",
        endpoint.trim_end_matches('/'),
        urlencoded(database_id),
        urlencoded(collection)
    )
}

/// URL of a single document.
pub(crate) fn document_url(
    endpoint: &str,
    database_id: &str,
    collection: &str,
    document_id: &str,
) -> String {
    format!(
        "{}/{}",
        documents_url(endpoint, database_id, collection),
        urlencoded(document_id)
    )
}

/// Append queries as repeated `queries[]` parameters, each one the
/// URL-encoded JSON form of the query.
pub(crate) fn with_queries(base: &str, queries: &[Query]) -> String {
    if queries.is_empty() {
        return base.to_string();
    }
    let params: Vec<String> = queries
        .iter()
        .map(|q| format!("queries%5B%5D={}", urlencoded(&q.to_wire().to_string())))
        .collect();
    format!("{}?{}", base, params.join("&"))
}

/// Percent-encode a path segment or query value.
///
/// Only unreserved characters pass through unchanged.
pub(crate) fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Map a non-2xx response to a [`StoreError`].
///
/// The server's `message` is kept verbatim in `Rejected`, since callers
/// classify failures by that text.
pub(crate) fn failure_from_response(
    status: u16,
    body: &str,
    collection: &str,
    document_id: Option<&str>,
) -> StoreError {
    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
    let (message, kind) = match parsed {
        Some(b) if !b.message.is_empty() => (b.message, b.kind),
        Some(b) => (format!("request failed with status {status}"), b.kind),
        None if body.trim().is_empty() => (format!("request failed with status {status}"), String::new()),
        None => (body.trim().to_string(), String::new()),
    };

    match (kind.as_str(), document_id) {
        ("document_not_found", Some(id)) => StoreError::DocumentNotFound {
            collection: collection.to_string(),
            document_id: id.to_string(),
        },
        ("collection_not_found", _) => StoreError::CollectionNotFound(collection.to_string()),
        _ => StoreError::Rejected { status, message },
    }
}

pub(crate) fn decode_document(body: &str) -> Result<Document, StoreError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| StoreError::Decode(format!("document body is not JSON: {e}")))?;
    Document::from_wire(value)
}

pub(crate) fn decode_document_list(body: &str) -> Result<DocumentList, StoreError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| StoreError::Decode(format!("list body is not JSON: {e}")))?;
    let documents = match value.get("documents") {
        Some(Value::Array(items)) => items
            .iter()
            .cloned()
            .map(Document::from_wire)
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(StoreError::Decode(
                "list body has no \"documents\" array".to_string(),
            ))
        }
    };
    let total = value
        .get("total")
        .and_then(Value::as_u64)
        .unwrap_or(documents.len() as u64);
    Ok(DocumentList { total, documents })
}
