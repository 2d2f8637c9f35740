// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector search adapter trait.

use async_trait::async_trait;

use crate::error::CiroError;
use crate::traits::adapter::PluginAdapter;
use crate::types::SearchHit;

/// Nearest-neighbour search over a named vector collection.
#[async_trait]
pub trait VectorSearchAdapter: PluginAdapter {
    /// Returns up to `top_k` hits ordered by descending relevance.
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        filter: Option<&serde_json::Value>,
        top_k: usize,
    ) -> Result<Vec<SearchHit>, CiroError>;
}
