use std::sync::Arc;

use orderdesk_storage::{unique_id, DocumentStore, Query, StoreError};

use super::Collections;
use crate::executor::WriteExecutor;
use crate::model::SystemConfig;

/// Configuration together with the id of the document holding it.
///
/// `document_id` is `None` when the configuration could not be persisted;
/// the next save then creates a document instead of updating one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigHandle {
    pub config: SystemConfig,
    pub document_id: Option<String>,
}

/// Access to the single system configuration document.
pub struct ConfigRepository<S: DocumentStore> {
    store: Arc<S>,
    collections: Collections,
    executor: WriteExecutor,
}

impl<S: DocumentStore> ConfigRepository<S> {
    pub fn new(store: Arc<S>, collections: Collections, executor: WriteExecutor) -> Self {
        ConfigRepository {
            store,
            collections,
            executor,
        }
    }

    /// Load the configuration, creating it from the defaults on first run.
    ///
    /// A failed list call is returned as an error. A failed first-run create
    /// is not: it is logged and the defaults come back without a document id.
    pub async fn fetch(&self) -> Result<ConfigHandle, StoreError> {
        let list = self
            .store
            .list_documents(&self.collections.config, &[Query::Limit(1)])
            .await?;

        if let Some(document) = list.documents.first() {
            tracing::debug!(document_id = %document.id, "loaded system configuration");
            return Ok(ConfigHandle {
                config: SystemConfig::from_payload(&document.data),
                document_id: Some(document.id.clone()),
            });
        }

        let defaults = SystemConfig::default();
        match self.create(&defaults).await {
            Ok(document_id) => {
                tracing::info!(%document_id, "stored default system configuration");
                Ok(ConfigHandle {
                    config: defaults,
                    document_id: Some(document_id),
                })
            }
            Err(err) => {
                tracing::error!("could not store default system configuration: {err}");
                Ok(ConfigHandle {
                    config: defaults,
                    document_id: None,
                })
            }
        }
    }

    /// Persist `config`: update the document when its id is known, create
    /// one otherwise.
    pub async fn save(
        &self,
        document_id: Option<&str>,
        config: &SystemConfig,
    ) -> Result<ConfigHandle, StoreError> {
        let document_id = match document_id {
            Some(id) => {
                let (store, collection) = (&self.store, self.collections.config.as_str());
                self.executor
                    .execute(&config.to_payload(), |data| {
                        store.update_document(collection, id, data)
                    })
                    .await?
                    .id
            }
            None => self.create(config).await?,
        };
        tracing::info!(%document_id, "system configuration saved");
        Ok(ConfigHandle {
            config: config.clone(),
            document_id: Some(document_id),
        })
    }

    async fn create(&self, config: &SystemConfig) -> Result<String, StoreError> {
        let id = unique_id();
        let (store, collection) = (&self.store, self.collections.config.as_str());
        let document = self
            .executor
            .execute(&config.to_payload(), |data| {
                store.create_document(collection, id.as_str(), data)
            })
            .await?;
        Ok(document.id)
    }
}
