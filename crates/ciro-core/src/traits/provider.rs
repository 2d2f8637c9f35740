// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for chat-completion LLM backends.

use async_trait::async_trait;

use crate::error::CiroError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatCompletion, ConversationMessage, GenerationOptions};

/// Adapter for LLM chat-completion backends.
///
/// Retry policy, if any, lives inside the implementation. The engine calls
/// each method at most once per step.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends the full message history and returns the generated reply.
    async fn generate_chat_completion(
        &self,
        messages: &[ConversationMessage],
        options: &GenerationOptions,
    ) -> Result<ChatCompletion, CiroError>;
}
