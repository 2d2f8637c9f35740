// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Path selection between direct retrieval and the analytical agent.
//!
//! Routing order: preprocess > classify intent > score heuristics > decide.
//! Never fails; anything unrecognized falls through to direct retrieval.

use ciro_config::model::RoutingConfig;
use serde::Serialize;
use strum::Display;
use tracing::{debug, info};

use crate::intent::{self, Intent, IntentAnalysisResult};
use crate::selector::ModelSelector;

/// Vocabulary that only makes sense with code execution.
const CODE_VOCABULARY: &[&str] = &[
    "calculate", "compute", "plot", "chart", "graph", "visualize", "visualise",
    "histogram", "regression", "correlation", "mean", "median", "average",
    "statistics", "forecast", "predict", "python", "code", "script",
    "dataframe", "csv", "excel", "simulate",
];

/// Vocabulary typical of lookups answered from stored documents.
const RETRIEVAL_VOCABULARY: &[&str] = &[
    "who", "where", "when", "find", "search", "document", "documents",
    "describe", "mention", "mentioned", "according", "policy", "say", "said",
];

const RETRIEVAL_PHRASES: &[&str] = &["what is", "tell me about", "what does"];

const VOCABULARY_WEIGHT: f32 = 0.1;
const VOCABULARY_CAP: f32 = 0.4;
const RETRIEVAL_BASE: f32 = 0.3;
const COMPLEXITY_WEIGHT: f32 = 0.2;

/// Confidence reported when a rule fired versus the fallback.
const MATCHED_CONFIDENCE: f32 = 0.9;
const DEFAULT_CONFIDENCE: f32 = 0.5;

/// A query after normalization. Created once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreprocessedQuery {
    pub original_query: String,
    pub normalized_query: String,
}

/// Which pipeline should answer the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RoutePath {
    DirectRetrieval,
    Analytical,
}

/// Numeric evidence for each path, both in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeuristicScores {
    pub analytical_score: f32,
    pub retrieval_score: f32,
    pub is_analytical_intent: bool,
}

/// Routing outcome with a human-readable justification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteDecision {
    pub chosen_path: RoutePath,
    /// Never empty.
    pub reasoning: String,
    pub intent: IntentAnalysisResult,
    pub scores: HeuristicScores,
}

/// Classifies queries and picks a pipeline.
#[derive(Debug, Clone)]
pub struct QueryRouter {
    selector: ModelSelector,
    analytical_threshold: f32,
}

impl QueryRouter {
    /// Create a router from routing configuration.
    pub fn new(config: RoutingConfig) -> Self {
        Self {
            analytical_threshold: config.analytical_threshold,
            selector: ModelSelector::new(config),
        }
    }

    /// The model selector this router scores complexity with.
    pub fn selector(&self) -> &ModelSelector {
        &self.selector
    }

    /// Trim and lower-case a raw query.
    pub fn preprocess(&self, raw: &str) -> PreprocessedQuery {
        PreprocessedQuery {
            original_query: raw.to_string(),
            normalized_query: raw.trim().to_lowercase(),
        }
    }

    /// Classify intent, count type, and complexity.
    pub fn analyze(&self, query: &PreprocessedQuery) -> IntentAnalysisResult {
        let normalized = query.normalized_query.as_str();
        let (intent, matched_rule) = intent::classify_intent(normalized);

        let count_type = (intent == Intent::Count).then(|| intent::determine_count_type(normalized));
        let confidence_score = match (intent, matched_rule) {
            (Intent::Unknown, _) => 0.0,
            (_, Some(_)) => MATCHED_CONFIDENCE,
            (_, None) => DEFAULT_CONFIDENCE,
        };

        IntentAnalysisResult {
            intent,
            count_type,
            confidence_score,
            complexity_score: self.selector.estimate_complexity(normalized),
            matched_rule,
        }
    }

    /// Score the query for each path.
    pub fn run_heuristics(&self, query: &PreprocessedQuery) -> HeuristicScores {
        let analysis = self.analyze(query);
        self.score(query, &analysis)
    }

    /// Decide which pipeline answers `raw`.
    pub fn determine_route(&self, raw: &str) -> RouteDecision {
        let query = self.preprocess(raw);
        let intent = self.analyze(&query);
        let scores = self.score(&query, &intent);

        let (chosen_path, reasoning) = self.decide(&intent, &scores);

        info!(
            path = %chosen_path,
            intent = %intent.intent,
            analytical_score = scores.analytical_score,
            retrieval_score = scores.retrieval_score,
            "query routed"
        );

        RouteDecision {
            chosen_path,
            reasoning,
            intent,
            scores,
        }
    }

    fn score(&self, query: &PreprocessedQuery, analysis: &IntentAnalysisResult) -> HeuristicScores {
        let normalized = query.normalized_query.as_str();
        let words: Vec<&str> = normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let vocabulary_hits = |vocabulary: &[&str]| {
            let hits = vocabulary.iter().filter(|v| words.contains(v)).count();
            (hits as f32 * VOCABULARY_WEIGHT).min(VOCABULARY_CAP)
        };

        let analytical_base = match analysis.intent {
            Intent::AnalyticalCode => 0.5,
            Intent::AnalyticalProgramming => 0.45,
            Intent::Analysis => 0.2,
            Intent::Comparison => 0.1,
            _ => 0.0,
        };
        let analytical_score = (analytical_base
            + vocabulary_hits(CODE_VOCABULARY)
            + COMPLEXITY_WEIGHT * analysis.complexity_score)
            .clamp(0.0, 1.0);

        let retrieval_base = match analysis.intent {
            Intent::Unknown => 0.0,
            Intent::Count => RETRIEVAL_BASE + 0.3,
            Intent::Summary | Intent::Exploration | Intent::General => RETRIEVAL_BASE + 0.2,
            Intent::Comparison => RETRIEVAL_BASE + 0.1,
            _ => RETRIEVAL_BASE,
        };
        let phrase_hits = RETRIEVAL_PHRASES
            .iter()
            .filter(|p| normalized.contains(*p))
            .count() as f32
            * VOCABULARY_WEIGHT;
        let retrieval_score =
            (retrieval_base + (vocabulary_hits(RETRIEVAL_VOCABULARY) + phrase_hits).min(VOCABULARY_CAP))
                .clamp(0.0, 1.0);

        let scores = HeuristicScores {
            analytical_score,
            retrieval_score,
            is_analytical_intent: analysis.intent.is_analytical(),
        };
        debug!(?scores, "routing heuristics");
        scores
    }

    fn decide(&self, intent: &IntentAnalysisResult, scores: &HeuristicScores) -> (RoutePath, String) {
        let a = scores.analytical_score;
        let r = scores.retrieval_score;

        if scores.is_analytical_intent && a >= r {
            return (
                RoutePath::Analytical,
                format!(
                    "intent `{}` needs code execution (analytical {a:.2} >= retrieval {r:.2})",
                    intent.intent
                ),
            );
        }
        if a >= self.analytical_threshold && a > r {
            return (
                RoutePath::Analytical,
                format!(
                    "analytical score {a:.2} clears threshold {:.2} and exceeds retrieval {r:.2}",
                    self.analytical_threshold
                ),
            );
        }

        let reasoning = match intent.intent {
            Intent::Unknown => "empty or unrecognized query; defaulting to direct retrieval".to_string(),
            other if scores.is_analytical_intent => format!(
                "intent `{other}` suggests code, but retrieval {r:.2} dominates analytical {a:.2}"
            ),
            other => format!(
                "intent `{other}` is answerable from documents (retrieval {r:.2}, analytical {a:.2})"
            ),
        };
        (RoutePath::DirectRetrieval, reasoning)
    }
}

impl Default for QueryRouter {
    fn default() -> Self {
        Self::new(RoutingConfig::default())
    }
}
