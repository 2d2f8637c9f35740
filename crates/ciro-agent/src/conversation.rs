// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Immutable, append-only conversation log.

use std::sync::Arc;

use ciro_core::ConversationMessage;

/// A prompt history. Appending returns a new log; existing logs never change.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Arc<[ConversationMessage]>,
}

impl Conversation {
    /// Start a log from seed messages.
    pub fn new(seed: Vec<ConversationMessage>) -> Self {
        Self {
            messages: seed.into(),
        }
    }

    /// A new log with `message` appended.
    #[must_use]
    pub fn with_message(&self, message: ConversationMessage) -> Self {
        let mut messages = Vec::with_capacity(self.messages.len() + 1);
        messages.extend_from_slice(&self.messages);
        messages.push(message);
        Self {
            messages: messages.into(),
        }
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }
}
