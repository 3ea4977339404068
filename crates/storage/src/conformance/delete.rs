use std::future::Future;

use super::{item, TestResult, CONFORMANCE_COLLECTION};
use crate::{DocumentStore, StoreError};

pub(super) async fn run_delete_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::record(
        "delete",
        "delete_removes_document",
        delete_removes_document(factory).await,
    ));
    results.push(TestResult::record(
        "delete",
        "delete_leaves_other_documents",
        delete_leaves_other_documents(factory).await,
    ));
    results.push(TestResult::record(
        "delete",
        "delete_nonexistent_is_not_found",
        delete_nonexistent_is_not_found(factory).await,
    ));

    results
}

// ── 1. a deleted document is gone from list ──────────────────────────────────

async fn delete_removes_document<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.create_document(CONFORMANCE_COLLECTION, "d1", item("doomed"))
        .await
        .map_err(|e| e.to_string())?;
    s.delete_document(CONFORMANCE_COLLECTION, "d1")
        .await
        .map_err(|e| e.to_string())?;
    let list = s
        .list_documents(CONFORMANCE_COLLECTION, &[])
        .await
        .map_err(|e| e.to_string())?;
    if list.total != 0 {
        return Err(format!("expected empty collection, got {}", list.total));
    }
    Ok(())
}

// ── 2. delete touches only the named document ───────────────────────────────

async fn delete_leaves_other_documents<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for id in ["d1", "d2", "d3"] {
        s.create_document(CONFORMANCE_COLLECTION, id, item(id))
            .await
            .map_err(|e| e.to_string())?;
    }
    s.delete_document(CONFORMANCE_COLLECTION, "d2")
        .await
        .map_err(|e| e.to_string())?;
    let list = s
        .list_documents(CONFORMANCE_COLLECTION, &[])
        .await
        .map_err(|e| e.to_string())?;
    let mut ids: Vec<&str> = list.documents.iter().map(|d| d.id.as_str()).collect();
    ids.sort_unstable();
    if ids != ["d1", "d3"] {
        return Err(format!("expected [d1, d3], got {:?}", ids));
    }
    Ok(())
}

// ── 3. deleting an unknown document returns DocumentNotFound ────────────────

async fn delete_nonexistent_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s.delete_document(CONFORMANCE_COLLECTION, "ghost").await {
        Err(StoreError::DocumentNotFound { .. }) => Ok(()),
        other => Err(format!("expected DocumentNotFound, got {:?}", other)),
    }
}
