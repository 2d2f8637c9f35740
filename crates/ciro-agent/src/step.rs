// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reply grammar and the per-iteration reasoning record.
//!
//! Generator replies follow:
//!
//! ~~~text
//! Thought: <reasoning>
//! Action: Python
//! ```python
//! <code>
//! ```
//! ~~~
//!
//! or end with `Final Answer: <text>`. Parsing is lenient: a reply without a
//! `Thought:` label uses its leading prose as the thought.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

/// Name of the only tool the agent can invoke.
pub const PYTHON_TOOL: &str = "Python";

static THOUGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)thought:\s*(.*?)\s*(?:\n\s*action:|\n\s*final answer:|\z)")
        .expect("thought regex must compile")
});

static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)action:\s*python\s*```(?:python|py)?[ \t]*\n?(.*?)```")
        .expect("action regex must compile")
});

static FINAL_ANSWER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)final answer:\s*(.*)\z").expect("final answer regex must compile")
});

static LEADING_PROSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(.*?)(?:action:|final answer:|\z)").expect("prose regex must compile")
});

/// A tool invocation requested by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentAction {
    pub tool: String,
    pub code: String,
}

/// One iteration of the loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentStep {
    pub thought: String,
    pub action: Option<AgentAction>,
    pub observation: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A generator reply split into its grammar parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedReply {
    pub thought: String,
    pub action: Option<AgentAction>,
    pub final_answer: Option<String>,
}

impl ParsedReply {
    /// Start an [`AgentStep`] from this reply; the observation is filled in later.
    pub fn to_step(&self) -> AgentStep {
        AgentStep {
            thought: self.thought.clone(),
            action: self.action.clone(),
            observation: None,
            timestamp: Utc::now(),
        }
    }
}

/// Parse a raw generator reply.
pub fn parse_reply(reply: &str) -> ParsedReply {
    let thought = THOUGHT
        .captures(reply)
        .or_else(|| LEADING_PROSE.captures(reply))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let action = ACTION
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|code| !code.is_empty())
        .map(|code| AgentAction {
            tool: PYTHON_TOOL.to_string(),
            code,
        });

    let final_answer = FINAL_ANSWER
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());

    ParsedReply {
        thought,
        action,
        final_answer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_thought_and_python_action() {
        let reply = "Thought: I need the mean.\nAction: Python\n```python\nimport numpy as np\nprint(np.mean([1, 2, 3]))\n```";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.thought, "I need the mean.");
        let action = parsed.action.unwrap();
        assert_eq!(action.tool, "Python");
        assert_eq!(action.code, "import numpy as np\nprint(np.mean([1, 2, 3]))");
        assert!(parsed.final_answer.is_none());
    }

    #[test]
    fn parses_final_answer() {
        let reply = "Thought: The output shows 3.0.\nFinal Answer: The mean is 3.0.";
        let parsed = parse_reply(reply);
        assert_eq!(parsed.thought, "The output shows 3.0.");
        assert_eq!(parsed.final_answer.as_deref(), Some("The mean is 3.0."));
        assert!(parsed.action.is_none());
    }

    #[test]
    fn final_answer_keeps_multiline_text() {
        let parsed = parse_reply("Final Answer: line one\nline two");
        assert_eq!(parsed.final_answer.as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn unfenced_language_tag_is_optional() {
        let parsed = parse_reply("Thought: t\nAction: Python\n```\nprint(1)\n```");
        assert_eq!(parsed.action.unwrap().code, "print(1)");
    }

    #[test]
    fn labels_are_case_insensitive() {
        let parsed = parse_reply("thought: lower\naction: python\n```py\nx = 1\n```");
        assert_eq!(parsed.thought, "lower");
        assert_eq!(parsed.action.unwrap().code, "x = 1");
    }

    #[test]
    fn unlabelled_prose_becomes_thought() {
        let parsed = parse_reply("Let me look at the data first.");
        assert_eq!(parsed.thought, "Let me look at the data first.");
        assert!(parsed.action.is_none());
        assert!(parsed.final_answer.is_none());
    }

    #[test]
    fn empty_code_block_is_no_action() {
        let parsed = parse_reply("Thought: t\nAction: Python\n```python\n```");
        assert!(parsed.action.is_none());
    }

    #[test]
    fn step_starts_without_observation() {
        let step = parse_reply("Thought: t").to_step();
        assert_eq!(step.thought, "t");
        assert!(step.observation.is_none());
    }
}
