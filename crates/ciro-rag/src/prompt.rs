// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Grounded answer prompt.

use ciro_core::ConversationMessage;

/// Instructions that confine the generator to the retrieved documents.
pub const SYSTEM_PROMPT: &str = "\
You are a precise assistant that answers questions using only the documents provided.
Rules:
- Base your answer strictly on the documents in the context. Do not use outside knowledge.
- If the documents do not contain the answer, say explicitly that the provided documents do not contain enough information to answer.
- When you use a document, cite it by its number, for example [Document 2].
- Be concise and factual.";

const EMPTY_CONTEXT: &str = "(no documents were retrieved)";

/// Build the system and user turns for one retrieval answer.
pub fn build_messages(query: &str, context: &str) -> Vec<ConversationMessage> {
    let context = if context.trim().is_empty() {
        EMPTY_CONTEXT
    } else {
        context
    };
    vec![
        ConversationMessage::system(SYSTEM_PROMPT),
        ConversationMessage::user(format!(
            "Context:\n{context}\n\nQuestion: {query}\n\nAnswer:"
        )),
    ]
}
