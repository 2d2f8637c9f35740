// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end engine tests.
//!
//! `TestHarness` assembles a [`QueryEngine`] over mock adapters and keeps
//! handles to every mock so tests can drive a query and then inspect what
//! each collaborator saw.

use std::sync::Arc;

use ciro_config::CiroConfig;
use ciro_core::{ExecutionResult, SearchHit};
use ciro_engine::{EngineAdapters, QueryEngine, QueryRequest, QueryResponse};

use crate::mock_provider::{MockProvider, MockReply};
use crate::mock_retrieval::{MockEmbedder, MockReranker, MockVectorSearch};
use crate::mock_sandbox::MockSandbox;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    script: Vec<MockReply>,
    hits: Vec<SearchHit>,
    sandbox_results: Vec<ExecutionResult>,
    provider: Option<MockProvider>,
    embedder: Option<MockEmbedder>,
    search: Option<MockVectorSearch>,
    reranker: Option<MockReranker>,
    sandbox: Option<MockSandbox>,
    config: CiroConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            script: Vec::new(),
            hits: Vec::new(),
            sandbox_results: Vec::new(),
            provider: None,
            embedder: None,
            search: None,
            reranker: None,
            sandbox: None,
            config: CiroConfig::default(),
        }
    }

    /// Set generator replies, consumed in order.
    pub fn with_mock_responses(mut self, responses: Vec<&str>) -> Self {
        self.script = responses
            .into_iter()
            .map(|text| MockReply::Text(text.to_string()))
            .collect();
        self
    }

    /// Set the hits every vector search returns.
    pub fn with_hits(mut self, hits: Vec<SearchHit>) -> Self {
        self.hits = hits;
        self
    }

    /// Set sandbox results, consumed in order.
    pub fn with_sandbox_results(mut self, results: Vec<ExecutionResult>) -> Self {
        self.sandbox_results = results;
        self
    }

    /// Replace the generator mock entirely.
    pub fn with_provider(mut self, provider: MockProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_embedder(mut self, embedder: MockEmbedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_search(mut self, search: MockVectorSearch) -> Self {
        self.search = Some(search);
        self
    }

    /// Install a reranker; without one, reranking is a no-op.
    pub fn with_reranker(mut self, reranker: MockReranker) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn with_sandbox(mut self, sandbox: MockSandbox) -> Self {
        self.sandbox = Some(sandbox);
        self
    }

    /// Adjust the engine configuration before the engine is built.
    pub fn configure(mut self, edit: impl FnOnce(&mut CiroConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Build the test harness and its engine.
    pub fn build(self) -> TestHarness {
        let provider = Arc::new(
            self.provider
                .unwrap_or_else(|| MockProvider::with_script(self.script)),
        );
        let embedder = Arc::new(self.embedder.unwrap_or_default());
        let search = Arc::new(
            self.search
                .unwrap_or_else(|| MockVectorSearch::with_hits(self.hits)),
        );
        let reranker = self.reranker.map(Arc::new);
        let sandbox = Arc::new(
            self.sandbox
                .unwrap_or_else(|| MockSandbox::with_results(self.sandbox_results)),
        );

        let adapters = EngineAdapters {
            embedder: embedder.clone(),
            search: search.clone(),
            reranker: reranker
                .clone()
                .map(|r| r as Arc<dyn ciro_core::RerankerAdapter>),
            provider: provider.clone(),
            sandbox: sandbox.clone(),
        };
        let engine = QueryEngine::new(&self.config, adapters);

        TestHarness {
            engine,
            provider,
            embedder,
            search,
            reranker,
            sandbox,
            config: self.config,
        }
    }
}

/// A complete engine wired to mock collaborators.
pub struct TestHarness {
    pub engine: QueryEngine,
    pub provider: Arc<MockProvider>,
    pub embedder: Arc<MockEmbedder>,
    pub search: Arc<MockVectorSearch>,
    pub reranker: Option<Arc<MockReranker>>,
    pub sandbox: Arc<MockSandbox>,
    pub config: CiroConfig,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send `query` through the engine with default request options.
    pub async fn ask(&self, query: &str) -> QueryResponse {
        self.engine.handle(QueryRequest::new(query)).await
    }

    /// Send a fully specified request through the engine.
    pub async fn send(&self, request: QueryRequest) -> QueryResponse {
        self.engine.handle(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_harness_answers_a_retrieval_question() {
        let harness = TestHarness::builder()
            .with_mock_responses(vec!["Nothing indexed yet."])
            .build();
        let response = harness.ask("What does the onboarding guide say?").await;
        assert!(response.success);
        assert_eq!(response.answer, "Nothing indexed yet.");
        assert_eq!(harness.provider.call_count().await, 1);
    }
}
