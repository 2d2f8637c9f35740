// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request, response, and trace types for the direct retrieval pipeline.

use ciro_core::RetrievedDocument;
use serde::Serialize;
use strum::Display;

/// Answer returned when the query could not be embedded.
pub const EMBEDDING_FAILURE_ANSWER: &str =
    "Error: Could not process query due to embedding failure.";

/// Answer returned when vector search failed.
pub const SEARCH_FAILURE_ANSWER: &str =
    "Error: Could not search the knowledge base at this time.";

/// Answer returned when the generator failed.
pub const GENERATION_FAILURE_ANSWER: &str = "Error: Could not generate an answer at this time.";

/// Answer returned without generation when nothing relevant was found.
pub const NO_DOCUMENTS_ANSWER: &str =
    "I could not find any relevant information in the documents to answer this question.";

/// A direct retrieval request.
#[derive(Debug, Clone, PartialEq)]
pub struct RagQuery {
    pub query: String,
    /// Collection to search instead of the configured default.
    pub collection_override: Option<String>,
    /// Documents to retrieve; falls back to `rag.top_k`.
    pub top_k: Option<usize>,
    /// Whether to rerank; falls back to `rag.use_reranker`.
    pub use_reranker: Option<bool>,
    /// Payload filter passed through to vector search.
    pub filter: Option<serde_json::Value>,
}

impl RagQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            collection_override: None,
            top_k: None,
            use_reranker: None,
            filter: None,
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection_override = Some(collection.into());
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

    pub fn with_filter(mut self, filter: serde_json::Value) -> Self {
        self.filter = Some(filter);
        self
    }
}

/// Pipeline step named in a [`StageReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    Embed,
    Search,
    Extract,
    Rerank,
    Context,
    Generate,
}

/// How a pipeline step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageOutcome {
    Ok,
    /// The step did not run (disabled, nothing to do, or short-circuited).
    Skipped,
    /// The step failed but the pipeline carried on with prior output.
    Degraded,
    /// The step failed and ended the pipeline.
    Failed,
}

/// One entry of the diagnostic trace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Result of a direct retrieval request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectRagQueryResponse {
    pub answer: String,
    /// Documents the context was built from; possibly empty.
    pub source_documents: Vec<RetrievedDocument>,
    /// Model that produced the answer, when generation succeeded.
    pub model: Option<String>,
    pub trace: Vec<StageReport>,
}

impl DirectRagQueryResponse {
    /// Outcome recorded for `stage`, if the stage was reached.
    pub fn outcome_of(&self, stage: Stage) -> Option<StageOutcome> {
        self.trace
            .iter()
            .find(|report| report.stage == stage)
            .map(|report| report.outcome)
    }
}
