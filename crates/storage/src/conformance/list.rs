use std::future::Future;

use serde_json::json;

use super::{item, payload, TestResult, CONFORMANCE_COLLECTION};
use crate::{DocumentStore, Query};

pub(super) async fn run_list_tests<S, F, Fut>(factory: &F) -> Vec<TestResult>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.push(TestResult::record(
        "list",
        "list_empty_collection",
        list_empty_collection(factory).await,
    ));
    results.push(TestResult::record(
        "list",
        "list_newest_first",
        list_newest_first(factory).await,
    ));
    results.push(TestResult::record(
        "list",
        "list_limit_keeps_total",
        list_limit_keeps_total(factory).await,
    ));
    results.push(TestResult::record(
        "list",
        "list_equal_filter",
        list_equal_filter(factory).await,
    ));

    results
}

async fn seed<S: DocumentStore>(s: &S, titles: &[&str]) -> Result<(), String> {
    for title in titles {
        s.create_document(CONFORMANCE_COLLECTION, title, item(title))
            .await
            .map_err(|e| e.to_string())?;
    }
    Ok(())
}

// ── 1. an empty collection lists as empty ────────────────────────────────────

async fn list_empty_collection<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    let list = s
        .list_documents(CONFORMANCE_COLLECTION, &[Query::newest_first()])
        .await
        .map_err(|e| e.to_string())?;
    if list.total != 0 || !list.documents.is_empty() {
        return Err(format!("expected no documents, got {}", list.total));
    }
    Ok(())
}

// ── 2. orderDesc($createdAt) returns the latest creation first ──────────────

async fn list_newest_first<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &["oldest", "middle", "newest"]).await?;
    let list = s
        .list_documents(CONFORMANCE_COLLECTION, &[Query::newest_first()])
        .await
        .map_err(|e| e.to_string())?;
    let ids: Vec<&str> = list.documents.iter().map(|d| d.id.as_str()).collect();
    if ids != ["newest", "middle", "oldest"] {
        return Err(format!("expected newest-first order, got {:?}", ids));
    }
    Ok(())
}

// ── 3. limit truncates documents but not total ──────────────────────────────

async fn list_limit_keeps_total<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    seed(&s, &["a", "b", "c"]).await?;
    let list = s
        .list_documents(CONFORMANCE_COLLECTION, &[Query::Limit(1)])
        .await
        .map_err(|e| e.to_string())?;
    if list.documents.len() != 1 {
        return Err(format!("expected 1 document, got {}", list.documents.len()));
    }
    if list.total != 3 {
        return Err(format!("expected total 3, got {}", list.total));
    }
    Ok(())
}

// ── 4. equal filter selects matching documents ───────────────────────────────

async fn list_equal_filter<S, F, Fut>(factory: &F) -> Result<(), String>
where
    S: DocumentStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let s = factory().await;
    for (id, active) in [("on-1", true), ("off", false), ("on-2", true)] {
        s.create_document(
            CONFORMANCE_COLLECTION,
            id,
            payload(json!({"title": id, "active": active})),
        )
        .await
        .map_err(|e| e.to_string())?;
    }
    let list = s
        .list_documents(CONFORMANCE_COLLECTION, &[Query::equal("active", true)])
        .await
        .map_err(|e| e.to_string())?;
    let mut ids: Vec<&str> = list.documents.iter().map(|d| d.id.as_str()).collect();
    ids.sort_unstable();
    if ids != ["on-1", "on-2"] {
        return Err(format!("expected [on-1, on-2], got {:?}", ids));
    }
    Ok(())
}
