// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query classification, routing, and model selection for the Ciro engine.
//!
//! This crate provides:
//! - [`ModelSelector`]: Heuristic complexity scoring and tiered model choice
//! - [`determine_intent`] / [`determine_count_type`]: Ordered regex rule lists
//! - [`QueryRouter`]: Chooses between direct retrieval and the analytical agent
//!
//! Everything here is pure and synchronous: no network, no shared state.

pub mod intent;
pub mod router;
pub mod selector;

pub use intent::{CountType, Intent, IntentAnalysisResult, determine_count_type, determine_intent};
pub use router::{HeuristicScores, PreprocessedQuery, QueryRouter, RouteDecision, RoutePath};
pub use selector::{ModelSelection, ModelSelector};
