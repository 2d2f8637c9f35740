// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait.

use async_trait::async_trait;

use crate::error::CiroError;
use crate::traits::adapter::PluginAdapter;

/// Converts query text into a dense vector for similarity search.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Embeds a single piece of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CiroError>;
}
