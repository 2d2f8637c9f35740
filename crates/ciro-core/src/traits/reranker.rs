// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reranker adapter trait.

use async_trait::async_trait;

use crate::error::CiroError;
use crate::traits::adapter::PluginAdapter;
use crate::types::RetrievedDocument;

/// Second-pass relevance ordering over an initial retrieval set.
///
/// Implementations may reorder and drop documents but must keep each
/// surviving document's `id`, `text` and `score` intact.
#[async_trait]
pub trait RerankerAdapter: PluginAdapter {
    async fn rerank(
        &self,
        query: &str,
        documents: Vec<RetrievedDocument>,
        top_k: usize,
    ) -> Result<Vec<RetrievedDocument>, CiroError>;
}
