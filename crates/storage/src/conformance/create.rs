use std::future::Future;

use serde_json::json;

use super::{item, payload, TestResult, CONFORMANCE_COLLECTION};
use crate::{DocumentStore, StoreError, ID_UNIQUE};

pub(super) async fn run_create_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::record(
        "create",
        "create_assigns_id_and_timestamps",
        create_assigns_id_and_timestamps(factory).await,
    ));
    results.push(TestResult::record(
        "create",
        "create_uses_requested_id",
        create_uses_requested_id(factory).await,
    ));
    results.push(TestResult::record(
        "create",
        "create_returns_stored_attributes",
        create_returns_stored_attributes(factory).await,
    ));
    results.push(TestResult::record(
        "create",
        "create_duplicate_id_is_rejected",
        create_duplicate_id_is_rejected(factory).await,
    ));
    results.push(TestResult::record(
        "create",
        "created_document_is_listed",
        created_document_is_listed(factory).await,
    ));

    results
}

// ── 1. create with ID_UNIQUE gets a generated id and timestamps ──────────────

async fn create_assigns_id_and_timestamps<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let doc = s
        .create_document(CONFORMANCE_COLLECTION, ID_UNIQUE, item("first"))
        .await
        .map_err(|e| e.to_string())?;
    if doc.id.is_empty() || doc.id == ID_UNIQUE {
        return Err(format!("expected a generated id, got \"{}\"", doc.id));
    }
    if doc.created_at.is_empty() {
        return Err("expected a creation timestamp".to_string());
    }
    Ok(())
}

// ── 2. create honors an explicit document id ─────────────────────────────────

async fn create_uses_requested_id<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let doc = s
        .create_document(CONFORMANCE_COLLECTION, "item-42", item("answer"))
        .await
        .map_err(|e| e.to_string())?;
    if doc.id != "item-42" {
        return Err(format!("expected id \"item-42\", got \"{}\"", doc.id));
    }
    Ok(())
}

// ── 3. create echoes back the user attributes ───────────────────────────────

async fn create_returns_stored_attributes<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let doc = s
        .create_document(
            CONFORMANCE_COLLECTION,
            ID_UNIQUE,
            payload(json!({"title": "full", "count": 7, "active": false})),
        )
        .await
        .map_err(|e| e.to_string())?;
    if doc.data.get("title") != Some(&json!("full")) {
        return Err(format!("title not stored: {:?}", doc.data));
    }
    if doc.data.get("count") != Some(&json!(7)) {
        return Err(format!("count not stored: {:?}", doc.data));
    }
    if doc.data.keys().any(|k| k.starts_with('$')) {
        return Err(format!("server fields leaked into data: {:?}", doc.data));
    }
    Ok(())
}

// ── 4. duplicate ids are refused ─────────────────────────────────────────────

async fn create_duplicate_id_is_rejected<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.create_document(CONFORMANCE_COLLECTION, "dup", item("one"))
        .await
        .map_err(|e| e.to_string())?;
    match s
        .create_document(CONFORMANCE_COLLECTION, "dup", item("two"))
        .await
    {
        Err(StoreError::Rejected { .. }) => Ok(()),
        other => Err(format!("expected Rejected, got {:?}", other)),
    }
}

// ── 5. a created document shows up in list ───────────────────────────────────

async fn created_document_is_listed<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let doc = s
        .create_document(CONFORMANCE_COLLECTION, ID_UNIQUE, item("visible"))
        .await
        .map_err(|e| e.to_string())?;
    let list = s
        .list_documents(CONFORMANCE_COLLECTION, &[])
        .await
        .map_err(|e| e.to_string())?;
    if list.total != 1 || list.documents.len() != 1 {
        return Err(format!("expected exactly 1 document, got {}", list.total));
    }
    if list.documents[0].id != doc.id {
        return Err(format!(
            "listed id \"{}\" differs from created id \"{}\"",
            list.documents[0].id, doc.id
        ));
    }
    Ok(())
}
