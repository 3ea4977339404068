pub mod conformance;
mod document;
mod error;
mod id;
mod memory;
mod traits;

pub use document::{
    Document, DocumentList, Payload, Query, ATTR_CREATED_AT, ATTR_ID, ATTR_UPDATED_AT,
};
pub use error::StoreError;
pub use id::{now_rfc3339, unique_id, ID_UNIQUE};
pub use memory::{AttributeKind, AttributeSpec, CollectionSchema, MemoryStore};
pub use traits::DocumentStore;
