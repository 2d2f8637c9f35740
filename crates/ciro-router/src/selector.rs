// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic complexity scoring and tiered model selection.
//!
//! Scores a query in [0, 1] from cheap lexical signals and maps the score
//! to one of three configured models. No LLM pre-call, no network, no state.

use ciro_config::model::RoutingConfig;
use ciro_core::ComplexityTier;
use serde::Serialize;
use tracing::debug;

/// Vocabulary that signals analytical or multi-step reasoning.
const ANALYTICAL_KEYWORDS: &[&str] = &[
    "analyze", "analyse", "analysis", "compare", "comparison", "evaluate",
    "calculate", "compute", "correlation", "regression", "trend", "trends",
    "forecast", "statistics", "statistical", "distribution", "insight",
    "insights", "implications", "assess", "synthesize", "breakdown",
];

/// Discourse connectives typical of complex, multi-clause questions.
const CONNECTIVES: &[&str] = &[
    "however", "therefore", "although", "whereas", "furthermore", "moreover",
    "consequently", "nevertheless", "because", "meanwhile",
];

const QUESTION_WORDS: &[&str] = &["what", "why", "how", "when", "where", "which", "who"];

const ANALYTICAL_WEIGHT: f32 = 0.25;
const CONNECTIVE_WEIGHT: f32 = 0.15;
const QUESTION_WORD_WEIGHT: f32 = 0.05;
const QUESTION_WORD_CAP: f32 = 0.15;
const EXPLAIN_WHY_WEIGHT: f32 = 0.15;
const CONTRAST_WEIGHT: f32 = 0.1;

/// Outcome of model selection for one piece of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSelection {
    /// Model identifier to send to the generator.
    pub model: String,
    /// Tier the score fell into (after any caller hint).
    pub tier: ComplexityTier,
    /// Raw complexity score in [0, 1].
    pub score: f32,
    /// Generation budget for the tier.
    pub max_tokens: u32,
}

/// Pure, deterministic model selector.
#[derive(Debug, Clone)]
pub struct ModelSelector {
    config: RoutingConfig,
}

impl ModelSelector {
    /// Create a selector over the given routing configuration.
    pub fn new(config: RoutingConfig) -> Self {
        Self { config }
    }

    /// Score the complexity of `text` in [0, 1].
    pub fn estimate_complexity(&self, text: &str) -> f32 {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has_word = |w: &str| words.contains(&w);

        let mut score = length_score(text.chars().count());

        if ANALYTICAL_KEYWORDS.iter().any(|k| has_word(k)) {
            score += ANALYTICAL_WEIGHT;
        }
        if CONNECTIVES.iter().any(|c| has_word(c)) || lower.contains("in contrast") {
            score += CONNECTIVE_WEIGHT;
        }

        let distinct_questions = QUESTION_WORDS.iter().filter(|q| has_word(q)).count();
        score += (distinct_questions as f32 * QUESTION_WORD_WEIGHT).min(QUESTION_WORD_CAP);

        if has_explain_why(&words) {
            score += EXPLAIN_WHY_WEIGHT;
        }
        if lower.contains("difference between") || lower.contains(" vs ") || has_word("versus") {
            score += CONTRAST_WEIGHT;
        }

        score.clamp(0.0, 1.0)
    }

    /// Pick the model identifier for `text`.
    pub fn select_model(&self, text: &str) -> String {
        self.select(text).model
    }

    /// Full selection: score, tier, model, and token budget.
    pub fn select(&self, text: &str) -> ModelSelection {
        self.select_with_hint(text, None)
    }

    /// Like [`select`](Self::select), but a caller-supplied tier acts as a floor.
    pub fn select_with_hint(&self, text: &str, hint: Option<ComplexityTier>) -> ModelSelection {
        let score = self.estimate_complexity(text);
        let mut tier = self.tier_for_score(score);
        if let Some(hint) = hint {
            if tier_rank(hint) > tier_rank(tier) {
                tier = hint;
            }
        }

        let model = match &self.config.force_model {
            Some(forced) => forced.clone(),
            None => self.model_for_tier(tier),
        };

        debug!(score, %tier, model = model.as_str(), "model selected");

        ModelSelection {
            model,
            tier,
            score,
            max_tokens: self.max_tokens_for_tier(tier),
        }
    }

    fn tier_for_score(&self, score: f32) -> ComplexityTier {
        if score >= self.config.complex_threshold {
            ComplexityTier::Complex
        } else if score < self.config.simple_threshold {
            ComplexityTier::Simple
        } else {
            ComplexityTier::Medium
        }
    }

    fn model_for_tier(&self, tier: ComplexityTier) -> String {
        match tier {
            ComplexityTier::Simple => self.config.simple_model.clone(),
            ComplexityTier::Medium => self.config.medium_model.clone(),
            ComplexityTier::Complex => self.config.complex_model.clone(),
        }
    }

    fn max_tokens_for_tier(&self, tier: ComplexityTier) -> u32 {
        match tier {
            ComplexityTier::Simple => self.config.simple_max_tokens,
            ComplexityTier::Medium => self.config.medium_max_tokens,
            ComplexityTier::Complex => self.config.complex_max_tokens,
        }
    }
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}

fn length_score(chars: usize) -> f32 {
    match chars {
        0..50 => 0.0,
        50..150 => 0.1,
        150..300 => 0.2,
        _ => 0.3,
    }
}

/// "explain" followed later by "why".
fn has_explain_why(words: &[&str]) -> bool {
    words
        .iter()
        .position(|w| *w == "explain")
        .is_some_and(|i| words[i + 1..].contains(&"why"))
}

fn tier_rank(tier: ComplexityTier) -> u8 {
    match tier {
        ComplexityTier::Simple => 0,
        ComplexityTier::Medium => 1,
        ComplexityTier::Complex => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn selector() -> ModelSelector {
        ModelSelector::default()
    }

    #[test]
    fn short_lookup_is_simple() {
        let s = selector().select("who is the ceo?");
        assert_eq!(s.tier, ComplexityTier::Simple);
        assert_eq!(s.model, "gpt-4o-mini");
        assert_eq!(s.max_tokens, 1024);
    }

    #[test]
    fn analytical_question_is_at_least_medium() {
        let s = selector()
            .select("compare revenue trends across the portfolio and explain why they differ");
        assert!(s.score >= 0.3, "score = {}", s.score);
        assert_ne!(s.tier, ComplexityTier::Simple);
    }

    #[test]
    fn heavy_question_is_complex() {
        let text = "Explain why the fund's returns diverged from the benchmark, and what the \
                    difference between the two strategies implies; however, also analyze how \
                    fees changed over time and where the largest drawdowns occurred.";
        let s = selector().select(text);
        assert_eq!(s.tier, ComplexityTier::Complex, "score = {}", s.score);
        assert_eq!(s.model, "gpt-4.1");
    }

    #[test]
    fn question_words_are_whole_words() {
        // "show" must not count as "how".
        let sel = selector();
        assert_eq!(sel.estimate_complexity("show"), 0.0);
        assert!((sel.estimate_complexity("how") - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn question_word_bonus_is_capped() {
        let sel = selector();
        let score = sel.estimate_complexity("what why how when where which who");
        assert!((score - QUESTION_WORD_CAP).abs() < 1e-6);
    }

    #[test]
    fn force_model_overrides_choice() {
        let config = RoutingConfig {
            force_model: Some("pinned-model".into()),
            ..RoutingConfig::default()
        };
        let s = ModelSelector::new(config).select("hi");
        assert_eq!(s.model, "pinned-model");
        assert_eq!(s.tier, ComplexityTier::Simple);
    }

    #[test]
    fn hint_raises_tier_but_never_lowers() {
        let sel = selector();
        let raised = sel.select_with_hint("hi", Some(ComplexityTier::Complex));
        assert_eq!(raised.tier, ComplexityTier::Complex);

        let text = "analyze the correlation between fees and returns; however explain why";
        let kept = sel.select_with_hint(text, Some(ComplexityTier::Simple));
        assert_eq!(kept.tier, sel.select(text).tier);
    }

    #[test]
    fn selection_is_deterministic() {
        let sel = selector();
        let text = "what is the difference between series a vs series b?";
        assert_eq!(sel.select(text), sel.select(text));
    }

    proptest! {
        #[test]
        fn score_is_always_in_unit_range(text in ".{0,600}") {
            let score = selector().estimate_complexity(&text);
            prop_assert!((0.0..=1.0).contains(&score));
        }

        #[test]
        fn score_is_monotonic_in_length(
            base in prop::sample::select(vec![
                "what is the total",
                "analyze the fund",
                "explain why returns fell, however fees rose",
                "",
            ]),
            shorter in 0usize..80,
            extra in 0usize..80,
        ) {
            let sel = selector();
            let pad = |n: usize| format!("{base}{}", " lorem".repeat(n));
            let a = sel.estimate_complexity(&pad(shorter));
            let b = sel.estimate_complexity(&pad(shorter + extra));
            prop_assert!(a <= b, "{a} > {b}");
        }
    }
}
