// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seed prompt and observation text for the analytical loop.

use ciro_core::{CiroError, ConversationMessage, ExecutionResult};

use crate::artifacts::AnalyticalArtifact;

/// Describes the Python tool, the reply grammar, and the sandbox environment.
pub const SYSTEM_PROMPT: &str = r#"You are a data analyst that answers questions by writing and running Python code.

You have one tool:
- Python: executes a Python code block in a persistent sandbox session and returns its printed output and any files it created.

The sandbox has these libraries already imported:
- pandas as pd, numpy as np
- matplotlib.pyplot as plt, seaborn as sns
- plotly.express as px, plotly.graph_objects as go
- scipy, sklearn

Save any files you create (charts, tables, exports) under /scratch. To save the current matplotlib figure, call save_plot("name.png"); called with no arguments it picks a timestamped file name.
Variables persist between executions within the session. Always print() the values you need to see.

Respond in exactly this format:

Thought: <your reasoning about what to do next>
Action: Python
```python
<code to execute>
```

After each action you will receive:
Observation: <the output of your code>

Repeat Thought/Action/Observation as needed. When you have enough information, respond with:

Thought: <your final reasoning>
Final Answer: <a complete answer to the question, citing the computed numbers and any files you created>"#;

/// Marker appended when observation text is cut.
const TRUNCATION_MARKER: &str = "\n... [output truncated]";

/// The seed user turn: the question plus optional caller context.
pub fn user_message(query: &str, context: Option<&str>) -> ConversationMessage {
    let mut content = format!("Question: {query}");
    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        content.push_str("\n\nAdditional context:\n");
        content.push_str(context);
    }
    ConversationMessage::user(content)
}

/// Observation for a completed execution (which may have raised).
pub fn execution_observation(
    result: &ExecutionResult,
    new_artifacts: &[AnalyticalArtifact],
    max_chars: usize,
) -> String {
    if !result.success {
        let detail = result
            .error
            .as_deref()
            .or(result.stderr.as_deref())
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("the code raised an error without a message");
        return format!("Error executing code: {}", truncate(detail.trim(), max_chars));
    }

    let stdout = result.stdout.as_deref().unwrap_or("").trim();
    let mut text = if stdout.is_empty() {
        "Code executed successfully with no printed output.".to_string()
    } else {
        format!("Output:\n{}", truncate(stdout, max_chars))
    };

    if let Some(stderr) = result.stderr.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        text.push_str("\nWarnings:\n");
        text.push_str(&truncate(stderr, max_chars / 4));
    }

    if !new_artifacts.is_empty() {
        let names: Vec<&str> = new_artifacts.iter().map(|a| a.name.as_str()).collect();
        text.push_str("\nNew files created: ");
        text.push_str(&names.join(", "));
    }
    text
}

/// Observation for an execution that never completed.
pub fn failure_observation(error: &CiroError) -> String {
    format!("Error executing code: {error}")
}

/// Observation used when a reply had neither an action nor a final answer.
pub const NO_ACTION_OBSERVATION: &str = "No action was taken. Continue with a Thought followed by either an Action or a Final Answer.";

/// Wrap observation text as the user turn that follows an action.
pub fn observation_message(observation: &str) -> ConversationMessage {
    ConversationMessage::user(format!("Observation: {observation}"))
}

/// Cut `text` to at most `max_chars` characters plus a marker.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}{TRUNCATION_MARKER}", &text[..byte_index]),
        None => text.to_string(),
    }
}
