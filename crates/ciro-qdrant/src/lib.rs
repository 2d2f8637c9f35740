// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Qdrant vector search adapter for the Ciro query engine.
//!
//! [`QdrantSearch`] implements [`VectorSearchAdapter`] over the REST endpoint
//! `POST /collections/{collection}/points/search`. Read-only: no upserts.

use std::time::Duration;

use async_trait::async_trait;
use ciro_config::model::QdrantConfig;
use ciro_core::{
    AdapterType, CiroError, HealthStatus, PluginAdapter, SearchHit, VectorSearchAdapter,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<&'a serde_json::Value>,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: PointId,
    score: f32,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

/// Qdrant point ids are unsigned integers or UUID strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PointId {
    Num(u64),
    Uuid(String),
}

impl From<PointId> for String {
    fn from(id: PointId) -> Self {
        match id {
            PointId::Num(n) => n.to_string(),
            PointId::Uuid(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    status: ErrorStatus,
}

#[derive(Debug, Deserialize)]
struct ErrorStatus {
    error: String,
}

/// Vector search against a Qdrant server.
#[derive(Debug, Clone)]
pub struct QdrantSearch {
    client: reqwest::Client,
    base_url: String,
}

impl QdrantSearch {
    /// Creates a client from the `[qdrant]` configuration section.
    pub fn new(config: &QdrantConfig) -> Result<Self, CiroError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            headers.insert(
                "api-key",
                HeaderValue::from_str(key)
                    .map_err(|e| CiroError::Config(format!("invalid Qdrant API key header value: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| search_error(format!("failed to build HTTP client: {e}"), Some(Box::new(e))))?;

        info!(url = config.url.as_str(), "Qdrant search initialized");

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }
}

fn search_error(message: String, source: Option<ciro_core::error::BoxError>) -> CiroError {
    CiroError::Search { message, source }
}

#[async_trait]
impl PluginAdapter for QdrantSearch {
    fn name(&self) -> &str {
        "qdrant"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorSearch
    }

    async fn health_check(&self) -> Result<HealthStatus, CiroError> {
        let url = format!("{}/healthz", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => Ok(HealthStatus::Degraded(format!(
                "GET /healthz returned {}",
                response.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl VectorSearchAdapter for QdrantSearch {
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&serde_json::Value>,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, CiroError> {
        let url = format!("{}/collections/{collection}/points/search", self.base_url);
        let request = SearchRequest {
            vector,
            limit: top_k,
            filter,
            with_payload: true,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| search_error(format!("HTTP request failed: {e}"), Some(Box::new(e))))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| search_error(format!("failed to read response body: {e}"), Some(Box::new(e))))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => format!("Qdrant error ({status}): {}", err.status.error),
                Err(_) => format!("Qdrant returned {status}: {body}"),
            };
            return Err(search_error(message, None));
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| search_error(format!("failed to parse search response: {e}"), Some(Box::new(e))))?;

        debug!(collection, hits = parsed.result.len(), "Qdrant search complete");

        Ok(parsed
            .result
            .into_iter()
            .map(|point| SearchHit {
                id: point.id.into(),
                score: point.score,
                payload: point.payload,
                content: None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn qdrant(server: &MockServer, api_key: Option<&str>) -> QdrantSearch {
        QdrantSearch::new(&QdrantConfig {
            url: format!("{}/", server.uri()),
            api_key: api_key.map(str::to_string),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn search_posts_vector_and_maps_hits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/funds/points/search"))
            .and(body_json(json!({
                "vector": [0.5, 0.25],
                "limit": 3,
                "with_payload": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": [
                    {"id": 7, "score": 0.91, "payload": {"text": "Fund A"}, "version": 1},
                    {"id": "5c56c793-69f3-4fbf-87e6-c4bf54c28c26", "score": 0.5}
                ],
                "status": "ok",
                "time": 0.001
            })))
            .mount(&server)
            .await;

        let hits = qdrant(&server, None)
            .search("funds", &[0.5, 0.25], None, 3)
            .await
            .unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "7");
        assert_eq!(hits[0].payload.as_ref().unwrap()["text"], "Fund A");
        assert_eq!(hits[1].id, "5c56c793-69f3-4fbf-87e6-c4bf54c28c26");
        assert!(hits[1].payload.is_none());
    }

    #[tokio::test]
    async fn filter_and_api_key_are_forwarded() {
        let server = MockServer::start().await;
        let filter = json!({"must": [{"key": "year", "match": {"value": 2024}}]});
        Mock::given(method("POST"))
            .and(path("/collections/docs/points/search"))
            .and(header("api-key", "secret"))
            .and(body_json(json!({
                "vector": [1.0],
                "limit": 1,
                "filter": filter,
                "with_payload": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": []})))
            .expect(1)
            .mount(&server)
            .await;

        let hits = qdrant(&server, Some("secret"))
            .search("docs", &[1.0], Some(&filter), 1)
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn missing_collection_is_a_search_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/collections/nope/points/search"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "status": {"error": "Not found: Collection `nope` doesn't exist!"},
                "time": 0.0
            })))
            .mount(&server)
            .await;

        let err = qdrant(&server, None)
            .search("nope", &[1.0], None, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, CiroError::Search { .. }));
        assert!(err.to_string().contains("doesn't exist"), "got: {err}");
    }

    #[tokio::test]
    async fn health_check_reports_unreachable_server() {
        let search = QdrantSearch::new(&QdrantConfig {
            url: "http://127.0.0.1:9".to_string(),
            api_key: None,
        })
        .unwrap();
        assert!(matches!(
            search.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}
