// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Ciro query engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Ciro configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CiroConfig {
    /// Process-wide settings (identity, logging).
    #[serde(default)]
    pub engine: EngineConfig,

    /// Query routing and model selection.
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Direct retrieval pipeline settings.
    #[serde(default)]
    pub rag: RagConfig,

    /// Analytical agent loop settings.
    #[serde(default)]
    pub analytical: AnalyticalConfig,

    /// Code sandbox service settings.
    #[serde(default)]
    pub sandbox: SandboxConfig,

    /// Qdrant vector index settings.
    #[serde(default)]
    pub qdrant: QdrantConfig,

    /// OpenAI-compatible generation and embedding API settings.
    #[serde(default)]
    pub openai: OpenAiConfig,
}

/// Process-wide engine settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Display name used in logs.
    #[serde(default = "default_engine_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: default_engine_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_engine_name() -> String {
    "ciro".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Query routing and model selection configuration.
///
/// Complexity scores below `simple_threshold` use the simple model, scores at
/// or above `complex_threshold` use the complex model, everything else the
/// medium model.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Force every request to a specific model, bypassing complexity scoring.
    #[serde(default)]
    pub force_model: Option<String>,

    /// Model identifier for the cheapest tier.
    #[serde(default = "default_simple_model")]
    pub simple_model: String,

    /// Model identifier for the middle tier.
    #[serde(default = "default_medium_model")]
    pub medium_model: String,

    /// Model identifier for the most capable tier.
    #[serde(default = "default_complex_model")]
    pub complex_model: String,

    /// Complexity score below which the simple tier is chosen.
    #[serde(default = "default_simple_threshold")]
    pub simple_threshold: f32,

    /// Complexity score at or above which the complex tier is chosen.
    #[serde(default = "default_complex_threshold")]
    pub complex_threshold: f32,

    /// Max tokens for simple tier responses.
    #[serde(default = "default_simple_max_tokens")]
    pub simple_max_tokens: u32,

    /// Max tokens for medium tier responses.
    #[serde(default = "default_medium_max_tokens")]
    pub medium_max_tokens: u32,

    /// Max tokens for complex tier responses.
    #[serde(default = "default_complex_max_tokens")]
    pub complex_max_tokens: u32,

    /// Analytical heuristic score needed to send a non-code query down the
    /// analytical path.
    #[serde(default = "default_analytical_threshold")]
    pub analytical_threshold: f32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            force_model: None,
            simple_model: default_simple_model(),
            medium_model: default_medium_model(),
            complex_model: default_complex_model(),
            simple_threshold: default_simple_threshold(),
            complex_threshold: default_complex_threshold(),
            simple_max_tokens: default_simple_max_tokens(),
            medium_max_tokens: default_medium_max_tokens(),
            complex_max_tokens: default_complex_max_tokens(),
            analytical_threshold: default_analytical_threshold(),
        }
    }
}

fn default_simple_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_medium_model() -> String {
    "gpt-4o".to_string()
}

fn default_complex_model() -> String {
    "gpt-4.1".to_string()
}

fn default_simple_threshold() -> f32 {
    0.3
}

fn default_complex_threshold() -> f32 {
    0.7
}

fn default_simple_max_tokens() -> u32 {
    1024
}

fn default_medium_max_tokens() -> u32 {
    2048
}

fn default_complex_max_tokens() -> u32 {
    4096
}

fn default_analytical_threshold() -> f32 {
    0.6
}

/// What the retrieval pipeline does when search returns nothing usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResultPolicy {
    /// Still call the generator with an empty context; it states that the
    /// documents do not contain the answer.
    #[default]
    Generate,
    /// Skip generation and return a fixed "no relevant information" answer.
    ShortCircuit,
}

/// Direct retrieval pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RagConfig {
    /// Collection searched when the caller does not name one.
    #[serde(default = "default_collection")]
    pub default_collection: String,

    /// Number of documents requested from search (and kept after reranking).
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Whether reranking runs by default when a reranker is configured.
    #[serde(default = "default_use_reranker")]
    pub use_reranker: bool,

    /// Token budget for the assembled document context.
    #[serde(default = "default_context_token_budget")]
    pub context_token_budget: usize,

    /// Characters-per-token ratio used by the token estimate.
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: usize,

    /// Sampling temperature for answer generation.
    #[serde(default = "default_rag_temperature")]
    pub temperature: f32,

    /// Behavior when no documents survive retrieval.
    #[serde(default)]
    pub empty_result_policy: EmptyResultPolicy,

    /// Timeout for the embedding call, in seconds.
    #[serde(default = "default_embed_timeout_secs")]
    pub embed_timeout_secs: u64,

    /// Timeout for the vector search call, in seconds.
    #[serde(default = "default_search_timeout_secs")]
    pub search_timeout_secs: u64,

    /// Timeout for the rerank call, in seconds.
    #[serde(default = "default_rerank_timeout_secs")]
    pub rerank_timeout_secs: u64,

    /// Timeout for the answer generation call, in seconds.
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            default_collection: default_collection(),
            top_k: default_top_k(),
            use_reranker: default_use_reranker(),
            context_token_budget: default_context_token_budget(),
            chars_per_token: default_chars_per_token(),
            temperature: default_rag_temperature(),
            empty_result_policy: EmptyResultPolicy::default(),
            embed_timeout_secs: default_embed_timeout_secs(),
            search_timeout_secs: default_search_timeout_secs(),
            rerank_timeout_secs: default_rerank_timeout_secs(),
            generation_timeout_secs: default_generation_timeout_secs(),
        }
    }
}

fn default_collection() -> String {
    "documents".to_string()
}

fn default_top_k() -> usize {
    5
}

fn default_use_reranker() -> bool {
    true
}

fn default_context_token_budget() -> usize {
    3000
}

fn default_chars_per_token() -> usize {
    4
}

fn default_rag_temperature() -> f32 {
    0.2
}

fn default_embed_timeout_secs() -> u64 {
    15
}

fn default_search_timeout_secs() -> u64 {
    15
}

fn default_rerank_timeout_secs() -> u64 {
    20
}

fn default_generation_timeout_secs() -> u64 {
    90
}

/// Analytical agent loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyticalConfig {
    /// Hard cap on reason/act/observe iterations per request.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,

    /// Sampling temperature for reasoning turns.
    #[serde(default = "default_analytical_temperature")]
    pub temperature: f32,

    /// Max tokens per reasoning turn.
    #[serde(default = "default_analytical_max_tokens")]
    pub max_tokens: u32,

    /// Timeout for each generator call, in seconds.
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Timeout for each sandbox execution, in seconds. Must exceed
    /// `sandbox.execution_timeout_secs` so the sandbox reports its own limit.
    #[serde(default = "default_agent_execution_timeout_secs")]
    pub execution_timeout_secs: u64,

    /// Longest stdout excerpt fed back to the model per observation.
    #[serde(default = "default_max_observation_chars")]
    pub max_observation_chars: usize,
}

impl Default for AnalyticalConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            temperature: default_analytical_temperature(),
            max_tokens: default_analytical_max_tokens(),
            generation_timeout_secs: default_generation_timeout_secs(),
            execution_timeout_secs: default_agent_execution_timeout_secs(),
            max_observation_chars: default_max_observation_chars(),
        }
    }
}

fn default_max_iterations() -> usize {
    10
}

fn default_analytical_temperature() -> f32 {
    0.1
}

fn default_analytical_max_tokens() -> u32 {
    2000
}

fn default_execution_timeout_secs() -> u64 {
    60
}

fn default_agent_execution_timeout_secs() -> u64 {
    default_execution_timeout_secs() + 10
}

fn default_max_observation_chars() -> usize {
    4000
}

/// Code sandbox service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SandboxConfig {
    /// Base URL of a shared sandbox service.
    #[serde(default = "default_sandbox_url")]
    pub base_url: String,

    /// Per-session URL template containing `{session_id}`, e.g.
    /// `http://sandbox-{session_id}:8000`. Takes precedence over `base_url`.
    #[serde(default)]
    pub session_url_template: Option<String>,

    /// In-sandbox execution timeout forwarded with each request, in seconds.
    #[serde(default = "default_execution_timeout_secs")]
    pub execution_timeout_secs: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            base_url: default_sandbox_url(),
            session_url_template: None,
            execution_timeout_secs: default_execution_timeout_secs(),
        }
    }
}

fn default_sandbox_url() -> String {
    "http://localhost:8000".to_string()
}

/// Qdrant vector index configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QdrantConfig {
    /// Base URL of the Qdrant REST API.
    #[serde(default = "default_qdrant_url")]
    pub url: String,

    /// Optional API key sent as the `api-key` header.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: default_qdrant_url(),
            api_key: None,
        }
    }
}

fn default_qdrant_url() -> String {
    "http://localhost:6333".to_string()
}

/// OpenAI-compatible API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API key. `None` falls back to the `OPENAI_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the API, without a trailing slash.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    /// Embedding model used for query vectors.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_openai_base_url(),
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}
