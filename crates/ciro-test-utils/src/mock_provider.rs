// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generator adapter for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with pre-configured replies,
//! enabling fast, CI-runnable tests without external API calls.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ciro_core::{
    AdapterType, ChatCompletion, CiroError, CompletionMetadata, ConversationMessage,
    GenerationOptions, HealthStatus, PluginAdapter, ProviderAdapter,
};

/// One scripted generator outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockReply {
    Text(String),
    Fail(String),
}

/// A generator request as the mock received it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ConversationMessage>,
    pub options: GenerationOptions,
}

/// A mock generator that returns scripted replies in FIFO order.
///
/// When the script is exhausted the fallback reply is returned, which is
/// "mock response" unless configured otherwise.
pub struct MockProvider {
    script: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    delay: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockProvider {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self::with_script(Vec::new())
    }

    /// Create a mock pre-loaded with text replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self::with_script(responses.into_iter().map(MockReply::Text).collect())
    }

    /// Create a mock with a mixed script of replies and failures.
    pub fn with_script(script: Vec<MockReply>) -> Self {
        Self {
            script: Mutex::new(VecDeque::from(script)),
            fallback: MockReply::Text("mock response".to_string()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A mock that always returns `text`.
    pub fn repeating(text: impl Into<String>) -> Self {
        Self {
            fallback: MockReply::Text(text.into()),
            ..Self::new()
        }
    }

    /// A mock whose every call fails with a provider error.
    pub fn failing() -> Self {
        Self {
            fallback: MockReply::Fail("mock provider failure".to_string()),
            ..Self::new()
        }
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Append a text reply to the script.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.script.lock().await.push_back(MockReply::Text(text.into()));
    }

    /// Every request received so far.
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    async fn next_reply(&self) -> MockReply {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, CiroError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn generate_chat_completion(
        &self,
        messages: &[ConversationMessage],
        options: &GenerationOptions,
    ) -> Result<ChatCompletion, CiroError> {
        self.requests.lock().await.push(RecordedRequest {
            messages: messages.to_vec(),
            options: options.clone(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.next_reply().await {
            MockReply::Text(content) => Ok(ChatCompletion {
                content,
                metadata: CompletionMetadata {
                    model: options.model.clone(),
                },
            }),
            MockReply::Fail(message) => Err(CiroError::provider(message)),
        }
    }
}
