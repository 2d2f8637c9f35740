// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Token-budgeted context assembly for retrieval prompts.
//!
//! Documents are appended whole, in order, as numbered blocks until the next
//! block would push the estimated token count over budget. Token counts use
//! the usual characters-per-token approximation; no tokenizer is loaded.

use ciro_config::model::RagConfig;
use ciro_core::RetrievedDocument;
use tracing::debug;

/// Separator that terminates every document block.
pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

/// Result of assembling context from a ranked document list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuiltContext {
    /// Concatenated document blocks, without a trailing separator.
    pub text: String,
    /// How many leading documents made it into `text`.
    pub included_documents: usize,
    /// Estimated token count of `text`.
    pub estimated_tokens: usize,
}

/// Assembles document blocks under a token budget.
#[derive(Debug, Clone, Copy)]
pub struct ContextBuilder {
    token_budget: usize,
    chars_per_token: usize,
}

impl ContextBuilder {
    /// Create a builder. A `chars_per_token` of zero is treated as one.
    pub fn new(token_budget: usize, chars_per_token: usize) -> Self {
        Self {
            token_budget,
            chars_per_token: chars_per_token.max(1),
        }
    }

    /// Create a builder from the `[rag]` configuration section.
    pub fn from_config(config: &RagConfig) -> Self {
        Self::new(config.context_token_budget, config.chars_per_token)
    }

    pub fn token_budget(&self) -> usize {
        self.token_budget
    }

    /// Estimated tokens for `text`: `ceil(chars / chars_per_token)`.
    pub fn estimate_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(self.chars_per_token)
    }

    /// Format one document block. `position` is 1-based.
    pub fn format_block(position: usize, document: &RetrievedDocument) -> String {
        format!(
            "Document {position} (ID: {}):\n{}{BLOCK_SEPARATOR}",
            document.id, document.text
        )
    }

    /// Greedily append blocks while the accumulated text stays within budget.
    ///
    /// The first block that would exceed the budget stops inclusion; no
    /// document is ever truncated.
    pub fn build(&self, documents: &[RetrievedDocument]) -> BuiltContext {
        let mut text = String::new();
        let mut chars = 0usize;
        let mut included = 0usize;

        for (index, document) in documents.iter().enumerate() {
            let block = Self::format_block(index + 1, document);
            let candidate_chars = chars + block.chars().count();
            if candidate_chars.div_ceil(self.chars_per_token) > self.token_budget {
                debug!(
                    included,
                    remaining = documents.len() - index,
                    budget = self.token_budget,
                    "context budget reached"
                );
                break;
            }
            text.push_str(&block);
            chars = candidate_chars;
            included += 1;
        }

        if let Some(stripped) = text.strip_suffix(BLOCK_SEPARATOR) {
            let len = stripped.len();
            text.truncate(len);
        }

        BuiltContext {
            estimated_tokens: self.estimate_tokens(&text),
            text,
            included_documents: included,
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::from_config(&RagConfig::default())
    }
}
