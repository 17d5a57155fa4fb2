// Minimal client for the Algolia indexing REST API.
// https://www.algolia.com/doc/rest-api/search/#tag/Records/operation/batch

pub mod models;

use reqwest::{header, Client};
use serde::Serialize;
use thiserror::Error;

use crate::models::{ApiErrorBody, BatchOperation, BatchRequest, BatchResponse};

/// Upper bound Algolia accepts comfortably in a single batch call.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum AlgoliaError {
    #[error("request to Algolia failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Algolia returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("record {object_id} could not be serialized: {source}")]
    Serialize {
        object_id: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct AlgoliaOptions {
    pub app_id: String,
    pub api_key: String,
    pub batch_size: usize,
    /// Overrides `https://{app_id}.algolia.net`.
    pub host: Option<String>,
}

impl AlgoliaOptions {
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            api_key: api_key.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            host: None,
        }
    }
}

/// Anything that can be written to an index under a stable object id.
pub trait IndexRecord: Serialize {
    fn object_id(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct AlgoliaService {
    options: AlgoliaOptions,
    client: Client,
}

impl AlgoliaService {
    pub fn new(options: AlgoliaOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn base_url(&self) -> String {
        match &self.options.host {
            Some(host) => host.trim_end_matches('/').to_string(),
            None => format!("https://{}.algolia.net", self.options.app_id),
        }
    }

    /// Upserts `records` and removes `delete_ids` from `index_name`.
    ///
    /// Operations are split into requests of at most `batch_size` entries,
    /// upserts first. Returns one response per request sent; an empty batch
    /// sends nothing.
    pub async fn batch<R: IndexRecord>(
        &self,
        index_name: &str,
        records: &[R],
        delete_ids: &[String],
    ) -> Result<Vec<BatchResponse>, AlgoliaError> {
        let mut operations = Vec::with_capacity(records.len() + delete_ids.len());

        for record in records {
            let body = serde_json::to_value(record).map_err(|source| AlgoliaError::Serialize {
                object_id: record.object_id().to_string(),
                source,
            })?;
            operations.push(BatchOperation::update(record.object_id(), body));
        }
        operations.extend(delete_ids.iter().map(|id| BatchOperation::delete(id)));

        self.send_operations(index_name, &operations).await
    }

    pub async fn delete_objects(
        &self,
        index_name: &str,
        object_ids: &[String],
    ) -> Result<Vec<BatchResponse>, AlgoliaError> {
        let operations: Vec<BatchOperation> =
            object_ids.iter().map(|id| BatchOperation::delete(id)).collect();

        self.send_operations(index_name, &operations).await
    }

    async fn send_operations(
        &self,
        index_name: &str,
        operations: &[BatchOperation],
    ) -> Result<Vec<BatchResponse>, AlgoliaError> {
        let url = format!("{}/1/indexes/{}/batch", self.base_url(), index_name);
        let chunk_size = self.options.batch_size.max(1);
        let mut responses = Vec::new();

        for chunk in operations.chunks(chunk_size) {
            let response = self
                .client
                .post(&url)
                .header("X-Algolia-Application-Id", &self.options.app_id)
                .header("X-Algolia-API-Key", &self.options.api_key)
                .header(header::CONTENT_TYPE, "application/json")
                .json(&BatchRequest { requests: chunk })
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorBody>(&body)
                    .map(|e| e.message)
                    .unwrap_or(body);
                tracing::warn!(index = index_name, status = status.as_u16(), "Algolia batch rejected");
                return Err(AlgoliaError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            responses.push(response.json::<BatchResponse>().await?);
        }

        Ok(responses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Doc {
        id: String,
        name: String,
    }

    impl IndexRecord for Doc {
        fn object_id(&self) -> &str {
            &self.id
        }
    }

    fn service(server: &MockServer, batch_size: usize) -> AlgoliaService {
        let mut options = AlgoliaOptions::new("APPID", "secret");
        options.batch_size = batch_size;
        options.host = Some(server.base_url());
        AlgoliaService::new(options)
    }

    #[tokio::test]
    async fn batch_sends_updates_and_deletes_in_one_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/1/indexes/seller/batch")
                    .header("X-Algolia-Application-Id", "APPID")
                    .header("X-Algolia-API-Key", "secret")
                    .body_includes("\"updateObject\"")
                    .body_includes("\"objectID\":\"sel_1\"")
                    .body_includes("\"deleteObject\"")
                    .body_includes("\"objectID\":\"sel_2\"");
                then.status(200)
                    .json_body(json!({"taskID": 7, "objectIDs": ["sel_1", "sel_2"]}));
            })
            .await;

        let docs = vec![Doc {
            id: "sel_1".into(),
            name: "Bakery".into(),
        }];
        let responses = service(&server, 100)
            .batch("seller", &docs, &["sel_2".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].task_id, 7);
    }

    #[tokio::test]
    async fn batch_is_chunked_by_batch_size() {
        let server = MockServer::start_async().await;
        let first = server
            .mock_async(|when, then| {
                when.method(POST).body_includes("\"objectID\":\"a\"");
                then.status(200).json_body(json!({"taskID": 1}));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(POST).body_includes("\"objectID\":\"c\"");
                then.status(200).json_body(json!({"taskID": 2}));
            })
            .await;

        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let responses = service(&server, 2)
            .delete_objects("seller", &ids)
            .await
            .unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(responses.len(), 2);
    }

    #[tokio::test]
    async fn empty_batch_sends_nothing() {
        // No mock registered: any request would come back 404 and fail the call.
        let server = MockServer::start_async().await;

        let responses = service(&server, 10)
            .batch::<Doc>("seller", &[], &[])
            .await
            .unwrap();

        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(403)
                    .json_body(json!({"message": "Invalid Application-ID or API key", "status": 403}));
            })
            .await;

        let err = service(&server, 10)
            .delete_objects("seller", &["x".to_string()])
            .await
            .unwrap_err();

        match err {
            AlgoliaError::Api { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("API key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
