use std::future::Future;

use serde_json::json;

use super::{item, payload, TestResult, CONFORMANCE_COLLECTION};
use crate::{DocumentStore, StoreError, ID_UNIQUE};

pub(super) async fn run_structure_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::record(
        "structure",
        "missing_required_attribute_is_named",
        missing_required_attribute_is_named(factory).await,
    ));
    results.push(TestResult::record(
        "structure",
        "unknown_attribute_is_named",
        unknown_attribute_is_named(factory).await,
    ));
    results.push(TestResult::record(
        "structure",
        "unknown_attribute_on_update_is_named",
        unknown_attribute_on_update_is_named(factory).await,
    ));
    results.push(TestResult::record(
        "structure",
        "rejected_create_stores_nothing",
        rejected_create_stores_nothing(factory).await,
    ));
    results.push(TestResult::record(
        "structure",
        "invalid_type_is_not_a_shape_error",
        invalid_type_is_not_a_shape_error(factory).await,
    ));

    results
}

/// Check that `result` is a `Rejected` whose message contains `phrase`
/// (case-insensitive) and the attribute name.
fn expect_shape_error<T: std::fmt::Debug>(
    result: Result<T, StoreError>,
    phrase: &str,
    attribute: &str,
) -> Result<(), String> {
    match result {
        Err(err @ StoreError::Rejected { .. }) => {
            let message = err.to_string();
            if !message.to_lowercase().contains(&phrase.to_lowercase()) {
                return Err(format!("expected \"{phrase}\" in \"{message}\""));
            }
            if !message.contains(attribute) {
                return Err(format!("expected attribute \"{attribute}\" in \"{message}\""));
            }
            Ok(())
        }
        other => Err(format!("expected Rejected, got {:?}", other)),
    }
}

// ── 1. omitting a required attribute names it ───────────────────────────────

async fn missing_required_attribute_is_named<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let result = s
        .create_document(CONFORMANCE_COLLECTION, ID_UNIQUE, payload(json!({"count": 1})))
        .await;
    expect_shape_error(result, "Missing required attribute", "title")
}

// ── 2. an attribute outside the schema names it ─────────────────────────────

async fn unknown_attribute_is_named<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let result = s
        .create_document(
            CONFORMANCE_COLLECTION,
            ID_UNIQUE,
            payload(json!({"title": "t", "colour": "red"})),
        )
        .await;
    expect_shape_error(result, "Unknown attribute", "colour")
}

// ── 3. updates are held to the same grammar ─────────────────────────────────

async fn unknown_attribute_on_update_is_named<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.create_document(CONFORMANCE_COLLECTION, "s3", item("t"))
        .await
        .map_err(|e| e.to_string())?;
    let result = s
        .update_document(CONFORMANCE_COLLECTION, "s3", payload(json!({"weight": 2})))
        .await;
    expect_shape_error(result, "Unknown attribute", "weight")
}

// ── 4. a rejected create has no side effect ─────────────────────────────────

async fn rejected_create_stores_nothing<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let _ = s
        .create_document(
            CONFORMANCE_COLLECTION,
            ID_UNIQUE,
            payload(json!({"title": "t", "bogus": true})),
        )
        .await;
    let list = s
        .list_documents(CONFORMANCE_COLLECTION, &[])
        .await
        .map_err(|e| e.to_string())?;
    if list.total != 0 {
        return Err(format!("rejected write left {} document(s)", list.total));
    }
    Ok(())
}

// ── 5. a wrongly typed value is rejected without the shape phrases ──────────

async fn invalid_type_is_not_a_shape_error<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let result = s
        .create_document(
            CONFORMANCE_COLLECTION,
            ID_UNIQUE,
            payload(json!({"title": "t", "count": "many"})),
        )
        .await;
    match result {
        Err(err @ StoreError::Rejected { .. }) => {
            let message = err.to_string().to_lowercase();
            if message.contains("missing required attribute")
                || message.contains("unknown attribute")
            {
                return Err(format!("type error reads like a shape error: \"{message}\""));
            }
            Ok(())
        }
        other => Err(format!("expected Rejected, got {:?}", other)),
    }
}
