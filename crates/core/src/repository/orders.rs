use std::sync::Arc;

use orderdesk_storage::{unique_id, DocumentStore, Query, StoreError};

use super::Collections;
use crate::executor::WriteExecutor;
use crate::model::{Order, OrderFields};

/// Orders collection access.
pub struct OrderRepository<S: DocumentStore> {
    store: Arc<S>,
    collections: Collections,
    executor: WriteExecutor,
}

impl<S: DocumentStore> OrderRepository<S> {
    pub fn new(store: Arc<S>, collections: Collections, executor: WriteExecutor) -> Self {
        OrderRepository {
            store,
            collections,
            executor,
        }
    }

    /// All orders, newest first.
    pub async fn list(&self) -> Result<Vec<Order>, StoreError> {
        self.list_filtered(&[]).await
    }

    /// Orders matching `filters`. Results are ordered by the filters' own
    /// order clauses, then newest first.
    pub async fn list_filtered(&self, filters: &[Query]) -> Result<Vec<Order>, StoreError> {
        let mut queries = filters.to_vec();
        queries.push(Query::newest_first());
        let list = self
            .store
            .list_documents(&self.collections.orders, &queries)
            .await?;
        tracing::debug!(
            collection = %self.collections.orders,
            total = list.total,
            "listed orders"
        );
        Ok(list.documents.iter().map(Order::from_document).collect())
    }

    /// Create an order under a fresh client-side id.
    pub async fn create(&self, fields: &OrderFields) -> Result<Order, StoreError> {
        let id = unique_id();
        let (store, collection) = (&self.store, self.collections.orders.as_str());
        let document = self
            .executor
            .execute(&fields.to_payload(), |data| {
                store.create_document(collection, id.as_str(), data)
            })
            .await?;
        tracing::info!(order_id = %document.id, "order created");
        Ok(Order::from_document(&document))
    }

    /// Overwrite the business fields of an existing order.
    pub async fn update(&self, id: &str, fields: &OrderFields) -> Result<Order, StoreError> {
        let (store, collection) = (&self.store, self.collections.orders.as_str());
        let document = self
            .executor
            .execute(&fields.to_payload(), |data| {
                store.update_document(collection, id, data)
            })
            .await?;
        tracing::info!(order_id = %document.id, "order updated");
        Ok(Order::from_document(&document))
    }

    /// Delete an order. Not retried.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store
            .delete_document(&self.collections.orders, id)
            .await?;
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }
}
