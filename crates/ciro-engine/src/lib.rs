// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine facade for the Ciro query engine.
//!
//! A [`QueryEngine`] routes each [`QueryRequest`] to the direct retrieval
//! pipeline or the analytical loop and returns a uniform [`QueryResponse`].
//! Collaborators are injected through [`EngineAdapters`]; nothing is global.

pub mod engine;
pub mod request;

pub use engine::{AdapterHealth, EngineAdapters, QueryEngine};
pub use request::{PathOverride, PathResult, QueryRequest, QueryResponse};
