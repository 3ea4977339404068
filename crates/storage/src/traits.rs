use async_trait::async_trait;

use crate::document::{Document, DocumentList, Payload, Query};
use crate::error::StoreError;

/// The storage trait for orderdesk document backends.
///
/// A `DocumentStore` keeps flat attribute maps in named collections and
/// validates every write against a schema it owns. Clients never see that
/// schema; they only learn about it from rejected writes.
///
/// ## Failure grammar
///
/// A write whose attributes do not match the schema MUST fail with
/// `StoreError::Rejected` and a message containing either
/// `Missing required attribute "<name>"` or `Unknown attribute: "<name>"`.
/// Callers parse that text to repair their payloads, so backends that wrap
/// another service must pass the message through unchanged.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` so a single handle can be
/// built at startup and shared by every repository.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// List documents in a collection, applying filters, ordering and limit.
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, StoreError>;

    /// Create a document under `document_id`.
    ///
    /// Passing [`crate::ID_UNIQUE`] asks the backend to pick the id itself.
    async fn create_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Payload,
    ) -> Result<Document, StoreError>;

    /// Merge `data` into an existing document.
    ///
    /// Attributes not named in `data` keep their stored values. The merged
    /// document is validated as a whole.
    ///
    /// Returns `Err(StoreError::DocumentNotFound)` if the document does not exist.
    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Payload,
    ) -> Result<Document, StoreError>;

    /// Delete a document.
    ///
    /// Returns `Err(StoreError::DocumentNotFound)` if the document does not exist.
    async fn delete_document(&self, collection: &str, document_id: &str)
        -> Result<(), StoreError>;
}
