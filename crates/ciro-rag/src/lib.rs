// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Direct retrieval-augmented generation for the Ciro engine.
//!
//! [`DirectRagPipeline`] embeds a query, searches a vector collection,
//! optionally reranks, assembles a token-budgeted context, and asks the
//! generator for an answer grounded only in that context. Every step is
//! fail-soft: failures become labelled answers, never errors.

pub mod pipeline;
pub mod prompt;
pub mod types;

pub use pipeline::{DirectRagPipeline, normalize_collection_name};
pub use types::{DirectRagQueryResponse, RagQuery, Stage, StageOutcome, StageReport};
