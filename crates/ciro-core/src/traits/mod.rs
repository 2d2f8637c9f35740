// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contracts for the external collaborators the engine drives.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility. The engine only
//! ever holds them as `Arc<dyn …>` handed in at construction time.

pub mod adapter;
pub mod embedding;
pub mod provider;
pub mod reranker;
pub mod sandbox;
pub mod search;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use provider::ProviderAdapter;
pub use reranker::RerankerAdapter;
pub use sandbox::SandboxAdapter;
pub use search::VectorSearchAdapter;
