// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde cannot express: ranges, orderings of
//! thresholds, non-empty identifiers and URLs.

use crate::diagnostic::ConfigError;
use crate::model::CiroConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every violation instead of failing fast.
pub fn validate_config(config: &CiroConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    validate_routing(config, &mut errors);
    validate_rag(config, &mut errors);
    validate_analytical(config, &mut errors);
    validate_endpoints(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_routing(config: &CiroConfig, errors: &mut Vec<ConfigError>) {
    let routing = &config.routing;

    for (key, value) in [
        ("simple_threshold", routing.simple_threshold),
        ("complex_threshold", routing.complex_threshold),
        ("analytical_threshold", routing.analytical_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            errors.push(ConfigError::validation(format!(
                "routing.{key} must be within 0.0..=1.0, got {value}"
            )));
        }
    }

    if routing.simple_threshold >= routing.complex_threshold {
        errors.push(ConfigError::validation(format!(
            "routing.simple_threshold ({}) must be below routing.complex_threshold ({})",
            routing.simple_threshold, routing.complex_threshold
        )));
    }

    for (key, model) in [
        ("simple_model", &routing.simple_model),
        ("medium_model", &routing.medium_model),
        ("complex_model", &routing.complex_model),
    ] {
        if model.trim().is_empty() {
            errors.push(ConfigError::validation(format!(
                "routing.{key} must not be empty"
            )));
        }
    }

    if routing
        .force_model
        .as_deref()
        .is_some_and(|m| m.trim().is_empty())
    {
        errors.push(ConfigError::validation(
            "routing.force_model must not be an empty string; omit it instead",
        ));
    }
}

fn validate_rag(config: &CiroConfig, errors: &mut Vec<ConfigError>) {
    let rag = &config.rag;

    if rag.default_collection.trim().is_empty() {
        errors.push(ConfigError::validation(
            "rag.default_collection must not be empty",
        ));
    }
    if rag.top_k == 0 {
        errors.push(ConfigError::validation("rag.top_k must be at least 1"));
    }
    if rag.chars_per_token == 0 {
        errors.push(ConfigError::validation(
            "rag.chars_per_token must be at least 1",
        ));
    }
    if rag.context_token_budget == 0 {
        errors.push(ConfigError::validation(
            "rag.context_token_budget must be at least 1",
        ));
    }
    if !(0.0..=2.0).contains(&rag.temperature) {
        errors.push(ConfigError::validation(format!(
            "rag.temperature must be within 0.0..=2.0, got {}",
            rag.temperature
        )));
    }
    for (key, secs) in [
        ("embed_timeout_secs", rag.embed_timeout_secs),
        ("search_timeout_secs", rag.search_timeout_secs),
        ("rerank_timeout_secs", rag.rerank_timeout_secs),
        ("generation_timeout_secs", rag.generation_timeout_secs),
    ] {
        if secs == 0 {
            errors.push(ConfigError::validation(format!(
                "rag.{key} must be at least 1"
            )));
        }
    }
}

fn validate_analytical(config: &CiroConfig, errors: &mut Vec<ConfigError>) {
    let analytical = &config.analytical;

    if analytical.max_iterations == 0 {
        errors.push(ConfigError::validation(
            "analytical.max_iterations must be at least 1",
        ));
    }
    if !(0.0..=2.0).contains(&analytical.temperature) {
        errors.push(ConfigError::validation(format!(
            "analytical.temperature must be within 0.0..=2.0, got {}",
            analytical.temperature
        )));
    }
    if analytical.generation_timeout_secs == 0 || analytical.execution_timeout_secs == 0 {
        errors.push(ConfigError::validation(
            "analytical timeouts must be at least 1 second",
        ));
    }
    if analytical.execution_timeout_secs <= config.sandbox.execution_timeout_secs {
        errors.push(ConfigError::validation(format!(
            "analytical.execution_timeout_secs ({}) must exceed sandbox.execution_timeout_secs ({})",
            analytical.execution_timeout_secs, config.sandbox.execution_timeout_secs
        )));
    }
}

fn validate_endpoints(config: &CiroConfig, errors: &mut Vec<ConfigError>) {
    for (key, url) in [
        ("sandbox.base_url", &config.sandbox.base_url),
        ("qdrant.url", &config.qdrant.url),
        ("openai.base_url", &config.openai.base_url),
    ] {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "{key} must be an http(s) URL, got `{url}`"
            )));
        }
    }

    if let Some(template) = &config.sandbox.session_url_template {
        if !template.contains("{session_id}") {
            errors.push(ConfigError::validation(
                "sandbox.session_url_template must contain `{session_id}`",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&CiroConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let mut config = CiroConfig::default();
        config.rag.top_k = 0;
        config.analytical.max_iterations = 0;
        config.routing.simple_threshold = 0.9;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3, "got: {errors:?}");
    }

    #[test]
    fn execution_timeout_must_outlast_the_sandbox() {
        let defaults = CiroConfig::default();
        assert!(
            defaults.analytical.execution_timeout_secs > defaults.sandbox.execution_timeout_secs
        );

        let mut config = CiroConfig::default();
        config.sandbox.execution_timeout_secs = 120;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("sandbox.execution_timeout_secs (120)"));
    }

    #[test]
    fn session_template_requires_placeholder() {
        let mut config = CiroConfig::default();
        config.sandbox.session_url_template = Some("http://sandbox:8000".into());
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].to_string().contains("{session_id}"));
    }
}
