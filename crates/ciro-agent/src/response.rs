// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loop states and the analytical response envelope.

use serde::Serialize;
use strum::Display;

use crate::artifacts::AnalyticalArtifact;
use crate::step::AgentStep;

/// States of the reason-act-observe loop.
///
/// `Thinking -> (Acting -> Observing) -> Thinking -> ... -> Completed | Exhausted`,
/// with `Failed` and `Cancelled` reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AgentState {
    Thinking,
    Acting,
    Observing,
    Completed,
    Exhausted,
    Failed,
    Cancelled,
}

impl AgentState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AgentState::Completed | AgentState::Exhausted | AgentState::Failed | AgentState::Cancelled
        )
    }
}

/// How an analytical request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AnalyticalStatus {
    /// The generator produced a final answer.
    Completed,
    /// The iteration bound was reached; the answer is synthesized.
    Exhausted,
    /// An unrecoverable error ended the loop.
    Failed,
    /// The caller cancelled the request.
    Cancelled,
}

/// Result of an analytical request, including partial results on failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticalResponse {
    pub final_answer: String,
    pub artifacts: Vec<AnalyticalArtifact>,
    pub code_executed: Vec<String>,
    pub reasoning: Vec<AgentStep>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution_time_ms: u64,
    pub status: AnalyticalStatus,
    pub model: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(!AgentState::Thinking.is_terminal());
        assert!(!AgentState::Observing.is_terminal());
        assert!(AgentState::Exhausted.is_terminal());
        assert!(AgentState::Cancelled.is_terminal());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(AnalyticalStatus::Exhausted).unwrap(),
            "exhausted"
        );
        assert_eq!(AgentState::Acting.to_string(), "acting");
    }
}
