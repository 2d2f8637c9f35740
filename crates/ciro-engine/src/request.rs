// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The engine's request and response envelopes.

use ciro_agent::{AnalyticalArtifact, AnalyticalResponse};
use ciro_core::{RetrievedDocument, SessionId};
use ciro_rag::{DirectRagQueryResponse, RagQuery};
use ciro_router::RouteDecision;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which pipeline a request should use.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PathOverride {
    /// Let the router decide.
    #[default]
    Auto,
    /// Always answer by direct retrieval.
    Retrieval,
    /// Always run the analytical loop.
    Analytical,
}

/// A question plus the per-request knobs both pipelines accept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    /// Sandbox session for analytical requests; a fresh one is minted if absent.
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub use_reranker: Option<bool>,
    #[serde(default)]
    pub filter: Option<serde_json::Value>,
    /// Extra context handed to the analytical loop.
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub path: PathOverride,
}

impl QueryRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(SessionId(session_id.into()));
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_reranker(mut self, enabled: bool) -> Self {
        self.use_reranker = Some(enabled);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_path(mut self, path: PathOverride) -> Self {
        self.path = path;
        self
    }

    /// The retrieval-pipeline view of this request.
    pub(crate) fn to_rag_query(&self) -> RagQuery {
        RagQuery {
            query: self.query.clone(),
            collection_override: self.collection.clone(),
            top_k: self.top_k,
            use_reranker: self.use_reranker,
            filter: self.filter.clone(),
        }
    }
}

/// The pipeline-specific half of a [`QueryResponse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathResult {
    DirectRetrieval(DirectRagQueryResponse),
    Analytical(AnalyticalResponse),
    /// The request was cancelled before the pipeline produced anything.
    Cancelled,
}

/// Uniform answer envelope for either pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub request_id: String,
    pub answer: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub route: RouteDecision,
    /// True when the caller forced the path instead of the router.
    pub forced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub result: PathResult,
    pub elapsed_ms: u64,
}

impl QueryResponse {
    /// Supporting documents; empty for analytical answers.
    pub fn documents(&self) -> &[RetrievedDocument] {
        match &self.result {
            PathResult::DirectRetrieval(rag) => &rag.source_documents,
            _ => &[],
        }
    }

    /// Produced artifacts; empty for retrieval answers.
    pub fn artifacts(&self) -> &[AnalyticalArtifact] {
        match &self.result {
            PathResult::Analytical(analytical) => &analytical.artifacts,
            _ => &[],
        }
    }
}
