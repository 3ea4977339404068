use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::StoreError;

/// Flat attribute map sent to or read from the store.
///
/// Insertion order is preserved. Values are scalars only: strings, numbers,
/// booleans, null, or ISO 8601 strings. The remote schema is flat.
pub type Payload = serde_json::Map<String, Value>;

/// Attribute name of the server-assigned document id.
pub const ATTR_ID: &str = "$id";
/// Attribute name of the server-assigned creation timestamp.
pub const ATTR_CREATED_AT: &str = "$createdAt";
/// Attribute name of the server-assigned update timestamp.
pub const ATTR_UPDATED_AT: &str = "$updatedAt";

/// A document as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub updated_at: String,
    /// User attributes, without any `$`-prefixed server fields.
    pub data: Payload,
}

impl Document {
    /// Build a document from its wire form: a JSON object carrying `$id`,
    /// `$createdAt`, `$updatedAt` next to the user attributes.
    ///
    /// Every other `$`-prefixed key (`$collectionId`, `$permissions`, ...)
    /// is dropped.
    pub fn from_wire(value: Value) -> Result<Self, StoreError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::Decode(format!(
                    "expected a document object, got {other}"
                )))
            }
        };

        let mut id = None;
        let mut created_at = String::new();
        let mut updated_at = String::new();
        let mut data = Payload::new();

        for (key, value) in map {
            match key.as_str() {
                ATTR_ID => id = value.as_str().map(str::to_string),
                ATTR_CREATED_AT => created_at = value.as_str().unwrap_or_default().to_string(),
                ATTR_UPDATED_AT => updated_at = value.as_str().unwrap_or_default().to_string(),
                k if k.starts_with('$') => {}
                _ => {
                    data.insert(key, value);
                }
            }
        }

        let id = id.ok_or_else(|| StoreError::Decode("document has no $id".to_string()))?;
        Ok(Document {
            id,
            created_at,
            updated_at,
            data,
        })
    }

    /// Render the document in wire form (server fields first).
    pub fn to_wire(&self) -> Value {
        let mut map = Payload::new();
        map.insert(ATTR_ID.to_string(), Value::String(self.id.clone()));
        map.insert(
            ATTR_CREATED_AT.to_string(),
            Value::String(self.created_at.clone()),
        );
        map.insert(
            ATTR_UPDATED_AT.to_string(),
            Value::String(self.updated_at.clone()),
        );
        for (k, v) in &self.data {
            map.insert(k.clone(), v.clone());
        }
        Value::Object(map)
    }
}

/// Result of a list call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
    /// Total number of matching documents, before any limit.
    pub total: u64,
    pub documents: Vec<Document>,
}

/// A filter, ordering or limit applied to a list call.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal(String, Value),
    OrderAsc(String),
    OrderDesc(String),
    Limit(usize),
}

impl Query {
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Query::Equal(attribute.to_string(), value.into())
    }

    pub fn order_asc(attribute: &str) -> Self {
        Query::OrderAsc(attribute.to_string())
    }

    pub fn order_desc(attribute: &str) -> Self {
        Query::OrderDesc(attribute.to_string())
    }

    /// Newest documents first.
    pub fn newest_first() -> Self {
        Query::order_desc(ATTR_CREATED_AT)
    }

    /// JSON query form understood by Appwrite-compatible servers.
    ///
    /// `OrderDesc("$createdAt")` → `{"method":"orderDesc","attribute":"$createdAt"}`
    pub fn to_wire(&self) -> Value {
        match self {
            Query::Equal(attribute, value) => serde_json::json!({
                "method": "equal",
                "attribute": attribute,
                "values": [value],
            }),
            Query::OrderAsc(attribute) => serde_json::json!({
                "method": "orderAsc",
                "attribute": attribute,
            }),
            Query::OrderDesc(attribute) => serde_json::json!({
                "method": "orderDesc",
                "attribute": attribute,
            }),
            Query::Limit(n) => serde_json::json!({
                "method": "limit",
                "values": [n],
            }),
        }
    }
}
