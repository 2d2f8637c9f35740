// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Ciro query engine.

use thiserror::Error;

/// Boxed error source carried by adapter failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The primary error type used by collaborator traits and orchestration internals.
///
/// Public orchestration entry points never surface this type directly; they
/// fold it into the response envelope instead.
#[derive(Debug, Error)]
pub enum CiroError {
    /// Configuration errors (invalid values, unusable adapter settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// The embedding collaborator failed to produce a vector.
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<BoxError>,
    },

    /// The vector search collaborator failed.
    #[error("search error: {message}")]
    Search {
        message: String,
        source: Option<BoxError>,
    },

    /// The reranking collaborator failed.
    #[error("rerank error: {message}")]
    Rerank {
        message: String,
        source: Option<BoxError>,
    },

    /// LLM provider errors (API failure, malformed response, model not found).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<BoxError>,
    },

    /// The code sandbox could not be reached or returned a malformed reply.
    #[error("sandbox error: {message}")]
    Sandbox {
        message: String,
        source: Option<BoxError>,
    },

    /// A collaborator call did not finish in time.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// The caller cancelled an in-flight operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CiroError {
    /// Shorthand for a provider error without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        CiroError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for a sandbox error without an underlying source.
    pub fn sandbox(message: impl Into<String>) -> Self {
        CiroError::Sandbox {
            message: message.into(),
            source: None,
        }
    }
}
