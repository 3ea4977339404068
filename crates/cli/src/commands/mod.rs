pub(crate) mod config;
pub(crate) mod orders;

use std::sync::Arc;

use orderdesk_core::{Collections, ConfigRepository, OrderRepository, WriteExecutor};
use orderdesk_storage::{DocumentStore, StoreError};
use serde::Serialize;

use crate::settings::SettingsError;
use crate::OutputFormat;

#[derive(Debug, thiserror::Error)]
pub(crate) enum CommandError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Usage(String),
}

/// Everything a command needs: the store handle and how to talk to it.
pub(crate) struct Context<S: DocumentStore> {
    pub store: Arc<S>,
    pub collections: Collections,
    pub executor: WriteExecutor,
    pub output: OutputFormat,
}

impl<S: DocumentStore> Context<S> {
    pub fn orders(&self) -> OrderRepository<S> {
        OrderRepository::new(
            self.store.clone(),
            self.collections.clone(),
            self.executor.clone(),
        )
    }

    pub fn configs(&self) -> ConfigRepository<S> {
        ConfigRepository::new(
            self.store.clone(),
            self.collections.clone(),
            self.executor.clone(),
        )
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) {
    let pretty = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization error: {e}\"}}"));
    println!("{pretty}");
}
