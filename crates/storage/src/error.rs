/// All errors that can be returned by a DocumentStore implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store refused the request. `message` is the store's own text,
    /// displayed verbatim so callers can inspect it.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// No document with the given id exists in the collection.
    #[error("document not found: {collection}/{document_id}")]
    DocumentNotFound {
        collection: String,
        document_id: String,
    },

    /// The collection does not exist.
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// The request never got an answer (DNS, connection refused, TLS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered, but the body could not be understood.
    #[error("malformed store response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Build a `Rejected` error with HTTP-style status 400.
    pub fn invalid_structure(detail: impl std::fmt::Display) -> Self {
        StoreError::Rejected {
            status: 400,
            message: format!("Invalid document structure: {detail}"),
        }
    }

    /// HTTP-style status code, when the failure carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Rejected { status, .. } => Some(*status),
            StoreError::DocumentNotFound { .. } | StoreError::CollectionNotFound(_) => Some(404),
            StoreError::Transport(_) | StoreError::Decode(_) => None,
        }
    }
}
