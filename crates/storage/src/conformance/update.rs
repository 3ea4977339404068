use std::future::Future;

use serde_json::json;

use super::{item, payload, TestResult, CONFORMANCE_COLLECTION};
use crate::{DocumentStore, StoreError};

pub(super) async fn run_update_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::record(
        "update",
        "update_merges_partial_payload",
        update_merges_partial_payload(factory).await,
    ));
    results.push(TestResult::record(
        "update",
        "update_keeps_id_and_created_at",
        update_keeps_id_and_created_at(factory).await,
    ));
    results.push(TestResult::record(
        "update",
        "update_nonexistent_is_not_found",
        update_nonexistent_is_not_found(factory).await,
    ));
    results.push(TestResult::record(
        "update",
        "update_is_visible_in_list",
        update_is_visible_in_list(factory).await,
    ));

    results
}

// ── 1. attributes not named in the update keep their values ─────────────────

async fn update_merges_partial_payload<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.create_document(
        CONFORMANCE_COLLECTION,
        "m1",
        payload(json!({"title": "keep", "count": 1})),
    )
    .await
    .map_err(|e| e.to_string())?;

    let doc = s
        .update_document(CONFORMANCE_COLLECTION, "m1", payload(json!({"count": 2})))
        .await
        .map_err(|e| e.to_string())?;
    if doc.data.get("title") != Some(&json!("keep")) {
        return Err(format!("title lost by partial update: {:?}", doc.data));
    }
    if doc.data.get("count") != Some(&json!(2)) {
        return Err(format!("count not updated: {:?}", doc.data));
    }
    Ok(())
}

// ── 2. server-managed fields are stable across updates ──────────────────────

async fn update_keeps_id_and_created_at<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let created = s
        .create_document(CONFORMANCE_COLLECTION, "m2", item("stable"))
        .await
        .map_err(|e| e.to_string())?;
    let updated = s
        .update_document(CONFORMANCE_COLLECTION, "m2", item("renamed"))
        .await
        .map_err(|e| e.to_string())?;
    if updated.id != created.id {
        return Err(format!("id changed: {} -> {}", created.id, updated.id));
    }
    if updated.created_at != created.created_at {
        return Err(format!(
            "created_at changed: {} -> {}",
            created.created_at, updated.created_at
        ));
    }
    Ok(())
}

// ── 3. updating an unknown document returns DocumentNotFound ────────────────

async fn update_nonexistent_is_not_found<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    match s
        .update_document(CONFORMANCE_COLLECTION, "ghost", item("x"))
        .await
    {
        Err(StoreError::DocumentNotFound {
            collection,
            document_id,
        }) => {
            if collection != CONFORMANCE_COLLECTION || document_id != "ghost" {
                return Err(format!(
                    "wrong fields on DocumentNotFound: {collection}/{document_id}"
                ));
            }
            Ok(())
        }
        other => Err(format!("expected DocumentNotFound, got {:?}", other)),
    }
}

// ── 4. list reflects the update ──────────────────────────────────────────────

async fn update_is_visible_in_list<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    s.create_document(CONFORMANCE_COLLECTION, "m4", item("before"))
        .await
        .map_err(|e| e.to_string())?;
    s.update_document(CONFORMANCE_COLLECTION, "m4", item("after"))
        .await
        .map_err(|e| e.to_string())?;
    let list = s
        .list_documents(CONFORMANCE_COLLECTION, &[])
        .await
        .map_err(|e| e.to_string())?;
    match list.documents.first().and_then(|d| d.data.get("title")) {
        Some(title) if title == "after" => Ok(()),
        other => Err(format!("expected title \"after\", got {:?}", other)),
    }
}
