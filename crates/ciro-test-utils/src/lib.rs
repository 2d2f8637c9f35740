// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Ciro query engine.
//!
//! Provides mock collaborators (generator, embedder, vector search,
//! reranker, sandbox) and a `TestHarness` that wires them into a
//! [`ciro_engine::QueryEngine`] for end-to-end tests without network access.

pub mod harness;
pub mod mock_provider;
pub mod mock_retrieval;
pub mod mock_sandbox;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_provider::{MockProvider, MockReply, RecordedRequest};
pub use mock_retrieval::{MockEmbedder, MockReranker, MockVectorSearch, SearchRequest, search_hit};
pub use mock_sandbox::{MockSandbox, sandbox_error, sandbox_output};
