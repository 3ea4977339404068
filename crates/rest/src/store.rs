use async_trait::async_trait;
use orderdesk_storage::{Document, DocumentList, DocumentStore, Payload, Query, StoreError};
use serde_json::{json, Value};

use crate::wire;

/// Default endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://fra.cloud.appwrite.io/v1";

/// Connection settings for a REST document database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    /// API root, e.g. `https://fra.cloud.appwrite.io/v1`.
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    /// Server API key. Without it requests run with the project's
    /// guest permissions.
    pub api_key: Option<String>,
}

impl RestConfig {
    pub fn new(project_id: &str, database_id: &str) -> Self {
        RestConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: project_id.to_string(),
            database_id: database_id.to_string(),
            api_key: None,
        }
    }
}

enum Method {
    Get,
    Post(Value),
    Patch(Value),
    Delete,
}

impl Method {
    fn name(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post(_) => "POST",
            Method::Patch(_) => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// [`DocumentStore`] backed by an Appwrite-compatible REST API.
///
/// Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` to avoid
/// blocking the async runtime. Non-2xx responses are read rather than
/// turned into transport errors, so the server's message survives.
pub struct RestStore {
    config: RestConfig,
    agent: ureq::Agent,
}

impl RestStore {
    pub fn new(config: RestConfig) -> Self {
        let agent_config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build();
        RestStore {
            config,
            agent: ureq::Agent::new_with_config(agent_config),
        }
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("X-Appwrite-Project", self.config.project_id.clone())];
        if let Some(ref key) = self.config.api_key {
            headers.push(("X-Appwrite-Key", key.clone()));
        }
        headers
    }

    /// Perform one request off the async runtime and return (status, body).
    async fn send(&self, method: Method, url: String) -> Result<(u16, String), StoreError> {
        let agent = self.agent.clone();
        let headers = self.headers();
        tracing::debug!(method = method.name(), %url, "document store request");

        tokio::task::spawn_blocking(move || {
            let response = match method {
                Method::Get => with_headers(agent.get(&url), &headers).call(),
                Method::Delete => with_headers(agent.delete(&url), &headers).call(),
                Method::Post(body) => with_headers(agent.post(&url), &headers).send_json(&body),
                Method::Patch(body) => with_headers(agent.patch(&url), &headers).send_json(&body),
            }
            .map_err(|e| StoreError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let body = response
                .into_body()
                .read_to_string()
                .map_err(|e| StoreError::Transport(format!("failed to read response: {e}")))?;
            Ok((status, body))
        })
        .await
        .map_err(|e| StoreError::Transport(format!("task join error: {e}")))?
    }
}

fn with_headers<B>(
    mut request: ureq::RequestBuilder<B>,
    headers: &[(&'static str, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        request = request.header(*name, value);
    }
    request
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[async_trait]
impl DocumentStore for RestStore {
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList, StoreError> {
        let base = wire::documents_url(&self.config.endpoint, &self.config.database_id, collection);
        let url = wire::with_queries(&base, queries);
        let (status, body) = self.send(Method::Get, url).await?;
        if !is_success(status) {
            return Err(wire::failure_from_response(status, &body, collection, None));
        }
        wire::decode_document_list(&body)
    }

    async fn create_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Payload,
    ) -> Result<Document, StoreError> {
        let url = wire::documents_url(&self.config.endpoint, &self.config.database_id, collection);
        let body = json!({ "documentId": document_id, "data": Value::Object(data) });
        let (status, body) = self.send(Method::Post(body), url).await?;
        if !is_success(status) {
            return Err(wire::failure_from_response(status, &body, collection, None));
        }
        wire::decode_document(&body)
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Payload,
    ) -> Result<Document, StoreError> {
        let url = wire::document_url(
            &self.config.endpoint,
            &self.config.database_id,
            collection,
            document_id,
        );
        let body = json!({ "data": Value::Object(data) });
        let (status, body) = self.send(Method::Patch(body), url).await?;
        if !is_success(status) {
            return Err(wire::failure_from_response(
                status,
                &body,
                collection,
                Some(document_id),
            ));
        }
        wire::decode_document(&body)
    }

    async fn delete_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<(), StoreError> {
        let url = wire::document_url(
            &self.config.endpoint,
            &self.config.database_id,
            collection,
            document_id,
        );
        let (status, body) = self.send(Method::Delete, url).await?;
        if !is_success(status) {
            return Err(wire::failure_from_response(
                status,
                &body,
                collection,
                Some(document_id),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_store() -> RestStore {
        // Port 1 on loopback refuses connections.
        RestStore::new(RestConfig {
            endpoint: "http://127.0.0.1:1/v1".to_string(),
            ..RestConfig::new("proj", "db")
        })
    }

    #[test]
    fn config_defaults_to_cloud_endpoint() {
        let config = RestConfig::new("p", "d");
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn store_keeps_its_config() {
        let config = RestConfig {
            api_key: Some("secret".to_string()),
            ..RestConfig::new("proj", "db")
        };
        let store = RestStore::new(config.clone());
        assert_eq!(store.config(), &config);
    }

    #[test]
    fn api_key_header_only_when_configured() {
        let store = RestStore::new(RestConfig::new("p", "d"));
        let names: Vec<&str> = store.headers().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["X-Appwrite-Project"]);

        let store = RestStore::new(RestConfig {
            api_key: Some("secret".to_string()),
            ..RestConfig::new("p", "d")
        });
        let headers = store.headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[1], ("X-Appwrite-Key", "secret".to_string()));
    }

    #[tokio::test]
    async fn connection_refused_is_transport_error() {
        let store = unreachable_store();
        let err = store.list_documents("orders", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)), "got {err:?}");

        let err = store
            .create_document("orders", "x", Payload::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)), "got {err:?}");
    }
}
