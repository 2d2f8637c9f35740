// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible generator and embedder for the Ciro query engine.
//!
//! [`OpenAiClient`] implements [`ProviderAdapter`] over `POST /chat/completions`
//! and [`EmbeddingAdapter`] over `POST /embeddings`.

pub mod client;
pub mod types;

use async_trait::async_trait;
use ciro_config::model::OpenAiConfig;
use ciro_core::{
    AdapterType, ChatCompletion, CiroError, CompletionMetadata, ConversationMessage,
    EmbeddingAdapter, GenerationOptions, HealthStatus, PluginAdapter, ProviderAdapter,
};
use tracing::{debug, info};

use crate::client::OpenAiHttp;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse};

/// Generator and embedder backed by one OpenAI-compatible endpoint.
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: OpenAiHttp,
    embedding_model: String,
}

impl OpenAiClient {
    /// Creates a client from the `[openai]` configuration section.
    pub fn new(config: &OpenAiConfig) -> Result<Self, CiroError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let http = OpenAiHttp::new(&api_key, &config.base_url)?;

        info!(
            base_url = config.base_url.as_str(),
            embedding_model = config.embedding_model.as_str(),
            "OpenAI client initialized"
        );

        Ok(Self {
            http,
            embedding_model: config.embedding_model.clone(),
        })
    }

    #[cfg(test)]
    fn with_http(http: OpenAiHttp, embedding_model: &str) -> Self {
        Self {
            http,
            embedding_model: embedding_model.to_string(),
        }
    }
}

fn resolve_api_key(configured: Option<&str>) -> Result<String, CiroError> {
    if let Some(key) = configured.filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| {
            CiroError::Config(
                "no OpenAI API key: set openai.api_key or OPENAI_API_KEY".to_string(),
            )
        })
}

fn provider_error(message: String, source: Option<ciro_core::error::BoxError>) -> CiroError {
    CiroError::Provider { message, source }
}

fn embedding_error(message: String, source: Option<ciro_core::error::BoxError>) -> CiroError {
    CiroError::Embedding { message, source }
}

#[async_trait]
impl PluginAdapter for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, CiroError> {
        let status = self.http.probe("models").await?;
        Ok(if status.is_success() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded(format!("GET /models returned {status}"))
        })
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiClient {
    async fn generate_chat_completion(
        &self,
        messages: &[ConversationMessage],
        options: &GenerationOptions,
    ) -> Result<ChatCompletion, CiroError> {
        let request = ChatRequest {
            model: options.model.clone(),
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        debug!(
            model = request.model.as_str(),
            messages = request.messages.len(),
            task_type = options.task_type.as_deref().unwrap_or("-"),
            "requesting chat completion"
        );

        let response: ChatResponse = self
            .http
            .post("chat/completions", &request, provider_error)
            .await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CiroError::provider("completion contained no text"))?;

        Ok(ChatCompletion {
            content,
            metadata: CompletionMetadata {
                model: response.model,
            },
        })
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CiroError> {
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            input: text.to_string(),
        };
        let response: EmbeddingResponse = self
            .http
            .post("embeddings", &request, embedding_error)
            .await?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| embedding_error("embedding response contained no vectors".into(), None))
    }
}
