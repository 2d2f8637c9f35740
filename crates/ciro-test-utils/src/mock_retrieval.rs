// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding, vector search, and reranking adapters.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use ciro_core::{
    AdapterType, CiroError, EmbeddingAdapter, HealthStatus, PluginAdapter, RerankerAdapter,
    RetrievedDocument, SearchHit, VectorSearchAdapter,
};

/// Build a search hit whose payload carries `text`.
pub fn search_hit(id: &str, text: &str, score: f32) -> SearchHit {
    SearchHit {
        id: id.to_string(),
        score,
        payload: Some(json!({ "text": text })),
        content: None,
    }
}

macro_rules! plugin_adapter {
    ($ty:ty, $name:literal, $kind:expr) => {
        #[async_trait]
        impl PluginAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }

            fn adapter_type(&self) -> AdapterType {
                $kind
            }

            async fn health_check(&self) -> Result<HealthStatus, CiroError> {
                Ok(HealthStatus::Healthy)
            }
        }
    };
}

async fn pause(delay: Option<Duration>) {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

/// Returns a fixed vector, or fails.
pub struct MockEmbedder {
    vector: Vec<f32>,
    fail: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self {
            vector: vec![0.1, 0.2, 0.3],
            fail: false,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Texts embedded so far.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

plugin_adapter!(MockEmbedder, "mock-embedder", AdapterType::Embedding);

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CiroError> {
        self.calls.lock().await.push(text.to_string());
        pause(self.delay).await;
        if self.fail {
            return Err(CiroError::Embedding {
                message: "mock embedder failure".to_string(),
                source: None,
            });
        }
        Ok(self.vector.clone())
    }
}

/// A search call as the mock received it.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub collection: String,
    pub top_k: usize,
    pub filter: Option<serde_json::Value>,
    pub vector_len: usize,
}

/// Returns canned hits (truncated to `top_k`), or fails.
pub struct MockVectorSearch {
    hits: Vec<SearchHit>,
    fail: bool,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MockVectorSearch {
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            fail: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::with_hits(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::empty()
        }
    }

    pub async fn requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().await.clone()
    }
}

plugin_adapter!(MockVectorSearch, "mock-vector-search", AdapterType::VectorSearch);

#[async_trait]
impl VectorSearchAdapter for MockVectorSearch {
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&serde_json::Value>,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, CiroError> {
        self.requests.lock().await.push(SearchRequest {
            collection: collection.to_string(),
            top_k,
            filter: filter.cloned(),
            vector_len: vector.len(),
        });
        if self.fail {
            return Err(CiroError::Search {
                message: "mock search failure".to_string(),
                source: None,
            });
        }
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }
}

/// Reverses document order (then truncates to `top_k`), or fails.
pub struct MockReranker {
    fail: bool,
    delay: Option<Duration>,
    calls: Mutex<usize>,
}

impl MockReranker {
    pub fn reversing() -> Self {
        Self {
            fail: false,
            delay: None,
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::reversing()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn call_count(&self) -> usize {
        *self.calls.lock().await
    }
}

plugin_adapter!(MockReranker, "mock-reranker", AdapterType::Reranker);

#[async_trait]
impl RerankerAdapter for MockReranker {
    async fn rerank(
        &self,
        _query: &str,
        mut documents: Vec<RetrievedDocument>,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, CiroError> {
        *self.calls.lock().await += 1;
        pause(self.delay).await;
        if self.fail {
            return Err(CiroError::Rerank {
                message: "mock reranker failure".to_string(),
                source: None,
            });
        }
        documents.reverse();
        documents.truncate(top_k);
        Ok(documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_truncates_to_top_k_and_records() {
        let search = MockVectorSearch::with_hits(vec![
            search_hit("a", "x", 0.9),
            search_hit("b", "y", 0.8),
        ]);
        let hits = search.search("docs", &[0.0; 4], None, 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        let requests = search.requests().await;
        assert_eq!(requests[0].collection, "docs");
        assert_eq!(requests[0].vector_len, 4);
    }

    #[tokio::test]
    async fn reranker_reverses() {
        let docs = vec![
            RetrievedDocument { id: "1".into(), text: "a".into(), score: 0.9, original_payload: None },
            RetrievedDocument { id: "2".into(), text: "b".into(), score: 0.8, original_payload: None },
        ];
        let out = MockReranker::reversing().rerank("q", docs, 5).await.unwrap();
        assert_eq!(out[0].id, "2");
    }

    #[tokio::test]
    async fn failing_embedder_reports_embedding_error() {
        let err = MockEmbedder::failing().embed("q").await.unwrap_err();
        assert!(matches!(err, CiroError::Embedding { .. }));
    }
}
