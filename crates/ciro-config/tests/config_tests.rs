// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Ciro configuration system.

use ciro_config::diagnostic::ConfigError;
use ciro_config::model::{CiroConfig, EmptyResultPolicy};
use ciro_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with every section deserializes successfully.
#[test]
fn valid_toml_deserializes_into_ciro_config() {
    let toml = r#"
[engine]
name = "ciro-test"
log_level = "debug"

[routing]
force_model = "gpt-4o"
simple_threshold = 0.2
complex_threshold = 0.8
analytical_threshold = 0.5

[rag]
default_collection = "vc_funds"
top_k = 8
use_reranker = false
context_token_budget = 1500
empty_result_policy = "short_circuit"

[analytical]
max_iterations = 4
max_observation_chars = 2000

[sandbox]
base_url = "http://sandbox:8000"
session_url_template = "http://sandbox-{session_id}:8000"

[qdrant]
url = "http://qdrant:6333"
api_key = "q-key"

[openai]
api_key = "sk-test"
embedding_model = "text-embedding-3-large"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.engine.name, "ciro-test");
    assert_eq!(config.routing.force_model.as_deref(), Some("gpt-4o"));
    assert_eq!(config.rag.default_collection, "vc_funds");
    assert_eq!(config.rag.top_k, 8);
    assert!(!config.rag.use_reranker);
    assert_eq!(config.rag.empty_result_policy, EmptyResultPolicy::ShortCircuit);
    assert_eq!(config.analytical.max_iterations, 4);
    assert_eq!(
        config.sandbox.session_url_template.as_deref(),
        Some("http://sandbox-{session_id}:8000")
    );
    assert_eq!(config.qdrant.api_key.as_deref(), Some("q-key"));
    assert_eq!(config.openai.embedding_model, "text-embedding-3-large");
}

/// Omitted sections and fields fall back to compiled defaults.
#[test]
fn empty_toml_yields_defaults() {
    let config = load_config_from_str("").expect("empty TOML should deserialize");
    let defaults = CiroConfig::default();
    assert_eq!(config.rag.top_k, defaults.rag.top_k);
    assert_eq!(config.analytical.max_iterations, 10);
    assert_eq!(config.rag.empty_result_policy, EmptyResultPolicy::Generate);
}

/// A misspelled key is rejected and a suggestion is offered.
#[test]
fn unknown_field_in_rag_suggests_correction() {
    let toml = r#"
[rag]
top_kk = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("unknown key must fail");
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "top_kk");
            assert_eq!(suggestion.as_deref(), Some("top_k"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// A value of the wrong type surfaces as InvalidType.
#[test]
fn wrong_type_produces_invalid_type_error() {
    let toml = r#"
[analytical]
max_iterations = "many"
"#;

    let errors = load_and_validate_str(toml).expect_err("wrong type must fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { .. })),
        "got: {errors:?}"
    );
}

/// Semantic violations are reported after a successful parse.
#[test]
fn semantic_validation_runs_after_parse() {
    let toml = r#"
[rag]
top_k = 0

[routing]
simple_threshold = 0.9
complex_threshold = 0.4
"#;

    let errors = load_and_validate_str(toml).expect_err("invalid values must fail");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

/// Unknown empty-result policy names are rejected.
#[test]
fn unknown_policy_is_rejected() {
    let toml = r#"
[rag]
empty_result_policy = "ignore"
"#;
    assert!(load_and_validate_str(toml).is_err());
}
