// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Analytical agent loop for the Ciro engine.
//!
//! The agent alternates between asking the generator for a `Thought:` with an
//! optional Python `Action:`, executing that code in the session's sandbox,
//! and feeding the result back as an `Observation:`, until the generator emits
//! a `Final Answer:` or the iteration bound is reached.
//!
//! Components:
//! - [`Conversation`]: immutable, append-only prompt history
//! - [`parse_reply`]: reply grammar parser
//! - [`ArtifactCollector`]: de-duplicated sandbox file handles
//! - [`SessionLocks`]: at most one sandbox execution per session at a time
//! - [`AnalyticalAgent`]: the loop itself, with timeouts and cancellation

pub mod agent;
pub mod artifacts;
pub mod conversation;
pub mod prompt;
pub mod response;
pub mod sessions;
pub mod step;

pub use agent::AnalyticalAgent;
pub use artifacts::{AnalyticalArtifact, ArtifactCollector, ArtifactType};
pub use conversation::Conversation;
pub use response::{AgentState, AnalyticalResponse, AnalyticalStatus};
pub use sessions::SessionLocks;
pub use step::{AgentAction, AgentStep, ParsedReply, parse_reply};
