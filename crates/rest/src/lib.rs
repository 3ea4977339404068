//! REST backend for orderdesk.
//!
//! [`RestStore`] talks to an Appwrite-compatible document API:
//!
//! - `GET    {endpoint}/databases/{db}/collections/{collection}/documents?queries[]=...`
//! - `POST   .../documents` with `{"documentId": ..., "data": {...}}`
//! - `PATCH  .../documents/{id}` with `{"data": {...}}`
//! - `DELETE .../documents/{id}`
//!
//! Every request carries `X-Appwrite-Project`, plus `X-Appwrite-Key` when an
//! API key is configured.

mod store;
mod wire;

pub use store::{RestConfig, RestStore, DEFAULT_ENDPOINT};
