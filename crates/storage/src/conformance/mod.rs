//! Conformance test suite for `DocumentStore` implementations.
//!
//! This module provides a backend-agnostic test suite that any
//! `DocumentStore` implementation can run to verify the behavior the
//! adaptive write path depends on. The suite covers:
//!
//! - **Create**: id assignment, requested ids, timestamps
//! - **Update**: partial merge, unknown documents
//! - **Delete**: removal, unknown documents
//! - **List**: newest-first ordering, limit, equality filters
//! - **Structure**: the `Missing required attribute` / `Unknown attribute`
//!   failure grammar, and rejection of the whole write
//!
//! # Usage
//!
//! The factory must return a fresh backend in which the collection
//! [`CONFORMANCE_COLLECTION`] exists, is empty, and has the attributes
//! described by [`conformance_schema`]:
//!
//! ```ignore
//! use orderdesk_storage::conformance::{conformance_schema, run_conformance_suite, CONFORMANCE_COLLECTION};
//! use orderdesk_storage::MemoryStore;
//!
//! #[tokio::test]
//! async fn memory_conformance() {
//!     let report = run_conformance_suite(|| async {
//!         MemoryStore::new().with_collection(CONFORMANCE_COLLECTION, conformance_schema())
//!     })
//!     .await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod create;
mod delete;
mod list;
mod structure;
mod update;

use std::fmt;
use std::future::Future;

use serde_json::Value;

use crate::document::Payload;
use crate::memory::{AttributeSpec, CollectionSchema};
use crate::DocumentStore;

/// Collection every conformance test writes to.
pub const CONFORMANCE_COLLECTION: &str = "conformance_items";

/// Schema the backend must enforce on [`CONFORMANCE_COLLECTION`]:
/// `title` (required text, 64 chars), `count` (integer), `active` (boolean).
pub fn conformance_schema() -> CollectionSchema {
    CollectionSchema::new()
        .with(AttributeSpec::string("title", 64).required())
        .with(AttributeSpec::integer("count"))
        .with(AttributeSpec::boolean("active"))
}

/// Outcome of one conformance check.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Area under test: "create", "update", "delete", "list" or "structure".
    pub category: String,
    pub name: String,
    /// `None` when the check passed, otherwise what went wrong.
    pub failure: Option<String>,
}

impl TestResult {
    fn record(category: &str, name: &str, outcome: Result<(), String>) -> Self {
        TestResult {
            category: category.to_string(),
            name: name.to_string(),
            failure: outcome.err(),
        }
    }

    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Outcome of a whole suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} of {} conformance checks passed", self.passed, self.total)?;
        for result in self.results.iter().filter(|r| !r.passed()) {
            let failure = result.failure.as_deref().unwrap_or_default();
            writeln!(f, "  failed {}::{}: {failure}", result.category, result.name)?;
        }
        Ok(())
    }
}

/// Run the full conformance suite against a document store backend.
///
/// `factory` runs once per check, so every check starts from an empty
/// collection.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(create::run_create_tests(&factory).await);
    results.extend(update::run_update_tests(&factory).await);
    results.extend(delete::run_delete_tests(&factory).await);
    results.extend(list::run_list_tests(&factory).await);
    results.extend(structure::run_structure_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed()).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a payload from a JSON object literal.
fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}

/// Payload for a valid item with the given title.
fn item(title: &str) -> Payload {
    payload(serde_json::json!({ "title": title }))
}
