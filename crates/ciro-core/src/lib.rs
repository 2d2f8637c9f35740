// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Ciro query engine.
//!
//! This crate provides the request-scoped data model, the error type, and
//! the collaborator traits (embedder, vector search, reranker, generator,
//! sandbox) that every other crate in the workspace builds on.

pub mod error;
pub mod timeout;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CiroError;
pub use timeout::with_timeout;
pub use types::{
    AdapterType, ChatCompletion, CompletionMetadata, ComplexityTier, ConversationMessage,
    ExecutionResult, GenerationOptions, HealthStatus, RetrievedDocument, Role, SandboxFile,
    SearchHit, SessionId,
};

pub use traits::{
    EmbeddingAdapter, PluginAdapter, ProviderAdapter, RerankerAdapter, SandboxAdapter,
    VectorSearchAdapter,
};
