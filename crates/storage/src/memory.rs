//! In-process document store with server-side schema enforcement.
//!
//! [`MemoryStore`] behaves like a hosted document database as far as
//! clients can tell: it owns a [`CollectionSchema`] per collection, rejects
//! writes that do not match it using the same failure grammar, and lets the
//! schema change underneath existing documents. It backs the test suites
//! and local experiments.

use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::document::{Document, DocumentList, Payload, Query, ATTR_CREATED_AT, ATTR_ID};
use crate::error::StoreError;
use crate::id::{now_rfc3339, unique_id, ID_UNIQUE};
use crate::traits::DocumentStore;

// ── Schema ────────────────────────────────────────────────────────────────────

/// Storage type of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Text column holding at most `size` characters.
    String { size: usize },
    Integer,
    Boolean,
    /// RFC 3339 timestamp string.
    Datetime,
}

/// Declaration of one attribute in a collection schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub key: String,
    pub kind: AttributeKind,
    pub required: bool,
}

impl AttributeSpec {
    pub fn string(key: &str, size: usize) -> Self {
        Self::new(key, AttributeKind::String { size })
    }

    pub fn integer(key: &str) -> Self {
        Self::new(key, AttributeKind::Integer)
    }

    pub fn boolean(key: &str) -> Self {
        Self::new(key, AttributeKind::Boolean)
    }

    pub fn datetime(key: &str) -> Self {
        Self::new(key, AttributeKind::Datetime)
    }

    /// Mark the attribute as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn new(key: &str, kind: AttributeKind) -> Self {
        AttributeSpec {
            key: key.to_string(),
            kind,
            required: false,
        }
    }

    fn check_value(&self, value: &Value) -> Result<(), StoreError> {
        let ok = match (&self.kind, value) {
            (_, Value::Null) => true,
            (AttributeKind::String { size }, Value::String(s)) => s.chars().count() <= *size,
            (AttributeKind::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (AttributeKind::Boolean, Value::Bool(_)) => true,
            (AttributeKind::Datetime, Value::String(s)) => {
                OffsetDateTime::parse(s, &Rfc3339).is_ok()
            }
            _ => false,
        };
        if ok {
            return Ok(());
        }
        let expectation = match self.kind {
            AttributeKind::String { size } => {
                format!("Value must be a valid string and no longer than {size} chars")
            }
            AttributeKind::Integer => "Value must be a valid integer".to_string(),
            AttributeKind::Boolean => "Value must be a valid boolean".to_string(),
            AttributeKind::Datetime => "Value must be valid date".to_string(),
        };
        Err(StoreError::invalid_structure(format!(
            "Attribute \"{}\" has invalid type. {}",
            self.key, expectation
        )))
    }
}

/// Attribute schema of one collection, owned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSchema {
    attributes: Vec<AttributeSpec>,
}

impl CollectionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`CollectionSchema::add_attribute`].
    pub fn with(mut self, spec: AttributeSpec) -> Self {
        self.add_attribute(spec);
        self
    }

    /// Add an attribute, replacing any existing one with the same key.
    pub fn add_attribute(&mut self, spec: AttributeSpec) {
        self.remove_attribute(&spec.key);
        self.attributes.push(spec);
    }

    /// Remove an attribute. Returns whether it existed.
    pub fn remove_attribute(&mut self, key: &str) -> bool {
        let before = self.attributes.len();
        self.attributes.retain(|a| a.key != key);
        self.attributes.len() != before
    }

    pub fn get(&self, key: &str) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| a.key == key)
    }

    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    /// Validate a complete document body.
    ///
    /// Checks run in a fixed order and stop at the first problem: required
    /// attributes (schema order), then unknown attributes (payload order),
    /// then value types.
    pub fn validate(&self, data: &Payload) -> Result<(), StoreError> {
        for spec in self.attributes.iter().filter(|a| a.required) {
            if data.get(&spec.key).map_or(true, Value::is_null) {
                return Err(StoreError::invalid_structure(format!(
                    "Missing required attribute \"{}\"",
                    spec.key
                )));
            }
        }

        for key in data.keys() {
            if self.get(key).is_none() {
                return Err(StoreError::invalid_structure(format!(
                    "Unknown attribute: \"{key}\""
                )));
            }
        }

        for (key, value) in data {
            if let Some(spec) = self.get(key) {
                spec.check_value(value)?;
            }
        }

        Ok(())
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

struct StoredDocument {
    /// Creation sequence number; orders `$createdAt` deterministically.
    seq: u64,
    document: Document,
}

struct Collection {
    schema: CollectionSchema,
    documents: Vec<StoredDocument>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Collection>,
    injected_failures: VecDeque<StoreError>,
    next_seq: u64,
    write_calls: usize,
}

/// In-memory [`DocumentStore`] that enforces per-collection schemas.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`MemoryStore::define_collection`].
    pub fn with_collection(self, name: &str, schema: CollectionSchema) -> Self {
        self.define_collection(name, schema);
        self
    }

    /// Create a collection, or replace the schema of an existing one.
    ///
    /// Stored documents are kept as they are, so they may no longer satisfy
    /// the new schema. That is how schema drift looks from a client. Values
    /// of removed attributes are ignored by later updates.
    pub fn define_collection(&self, name: &str, schema: CollectionSchema) {
        let mut inner = self.lock();
        match inner.collections.get_mut(name) {
            Some(collection) => collection.schema = schema,
            None => {
                inner.collections.insert(
                    name.to_string(),
                    Collection {
                        schema,
                        documents: Vec::new(),
                    },
                );
            }
        }
    }

    /// Change the schema of an existing collection in place.
    pub fn alter_schema(
        &self,
        name: &str,
        change: impl FnOnce(&mut CollectionSchema),
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let collection = inner
            .collections
            .get_mut(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))?;
        change(&mut collection.schema);
        Ok(())
    }

    /// Current schema of a collection.
    pub fn schema(&self, name: &str) -> Option<CollectionSchema> {
        self.lock().collections.get(name).map(|c| c.schema.clone())
    }

    /// Make the next write (create or update) fail with `error`, whatever
    /// it is.
    ///
    /// Queued failures are consumed in order, one per write. Reads and
    /// deletes never consume them.
    pub fn push_failure(&self, error: StoreError) {
        self.lock().injected_failures.push_back(error);
    }

    /// Number of create/update calls received, including rejected ones.
    pub fn write_calls(&self) -> usize {
        self.lock().write_calls
    }

    /// Snapshot of a collection's documents in creation order.
    pub fn documents(&self, name: &str) -> Vec<Document> {
        self.lock()
            .collections
            .get(name)
            .map(|c| c.documents.iter().map(|s| s.document.clone()).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Recover data even if the mutex was poisoned by a panicking test
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Inner {
    fn take_injected(&mut self) -> Result<(), StoreError> {
        match self.injected_failures.pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut Collection, StoreError> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| StoreError::CollectionNotFound(name.to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, StoreError> {
        let mut inner = self.lock();
        let collection = inner.collection_mut(collection)?;

        let mut matches: Vec<&StoredDocument> = collection
            .documents
            .iter()
            .filter(|stored| {
                queries.iter().all(|q| match q {
                    Query::Equal(attr, expected) => {
                        attribute_of(&stored.document, attr).as_ref() == Some(expected)
                    }
                    _ => true,
                })
            })
            .collect();

        // Stable sorts applied last-to-first give a lexicographic ordering
        // over all order clauses.
        for query in queries.iter().rev() {
            match query {
                Query::OrderAsc(attr) => matches.sort_by(|a, b| compare_on(a, b, attr)),
                Query::OrderDesc(attr) => matches.sort_by(|a, b| compare_on(b, a, attr)),
                _ => {}
            }
        }

        let total = matches.len() as u64;
        if let Some(limit) = queries.iter().rev().find_map(|q| match q {
            Query::Limit(n) => Some(*n),
            _ => None,
        }) {
            matches.truncate(limit);
        }

        Ok(DocumentList {
            total,
            documents: matches.into_iter().map(|s| s.document.clone()).collect(),
        })
    }

    async fn create_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Payload,
    ) -> Result<Document, StoreError> {
        let mut inner = self.lock();
        inner.write_calls += 1;
        inner.take_injected()?;
        let seq = inner.next_seq;
        let collection_name = collection;
        let collection = inner.collection_mut(collection_name)?;

        if let Err(err) = collection.schema.validate(&data) {
            tracing::debug!(collection = collection_name, "create rejected: {err}");
            return Err(err);
        }

        let id = if document_id == ID_UNIQUE {
            unique_id()
        } else {
            document_id.to_string()
        };
        if collection.documents.iter().any(|s| s.document.id == id) {
            return Err(StoreError::Rejected {
                status: 409,
                message: "Document with the requested ID already exists.".to_string(),
            });
        }

        let now = now_rfc3339();
        let document = Document {
            id,
            created_at: now.clone(),
            updated_at: now,
            data,
        };
        collection.documents.push(StoredDocument {
            seq,
            document: document.clone(),
        });
        inner.next_seq += 1;
        Ok(document)
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Payload,
    ) -> Result<Document, StoreError> {
        let mut inner = self.lock();
        inner.write_calls += 1;
        inner.take_injected()?;
        let collection_name = collection;
        let collection = inner.collection_mut(collection_name)?;

        let index = collection
            .documents
            .iter()
            .position(|s| s.document.id == document_id)
            .ok_or_else(|| StoreError::DocumentNotFound {
                collection: collection_name.to_string(),
                document_id: document_id.to_string(),
            })?;

        // Values of attributes dropped from the schema are gone, as with a
        // dropped column.
        let mut merged: Payload = collection.documents[index]
            .document
            .data
            .iter()
            .filter(|(key, _)| collection.schema.get(key).is_some())
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        for (key, value) in data {
            merged.insert(key, value);
        }
        if let Err(err) = collection.schema.validate(&merged) {
            tracing::debug!(
                collection = collection_name,
                document_id,
                "update rejected: {err}"
            );
            return Err(err);
        }

        let stored = &mut collection.documents[index].document;
        stored.data = merged;
        stored.updated_at = now_rfc3339();
        Ok(stored.clone())
    }

    async fn delete_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let collection_name = collection;
        let collection = inner.collection_mut(collection_name)?;

        let before = collection.documents.len();
        collection.documents.retain(|s| s.document.id != document_id);
        if collection.documents.len() == before {
            return Err(StoreError::DocumentNotFound {
                collection: collection_name.to_string(),
                document_id: document_id.to_string(),
            });
        }
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn attribute_of(document: &Document, attr: &str) -> Option<Value> {
    match attr {
        ATTR_ID => Some(Value::String(document.id.clone())),
        ATTR_CREATED_AT => Some(Value::String(document.created_at.clone())),
        _ => document.data.get(attr).cloned(),
    }
}

fn compare_on(a: &StoredDocument, b: &StoredDocument, attr: &str) -> Ordering {
    if attr == ATTR_CREATED_AT {
        return a.seq.cmp(&b.seq);
    }
    compare_values(a.document.data.get(attr), b.document.data.get(attr))
}

/// Total order over optional scalars: absent/null first, then booleans,
/// numbers, strings.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
