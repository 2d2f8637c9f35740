// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification over an ordered rule list.
//!
//! Each rule is a `(label, regex)` pair. Rules are tested in array order and
//! the first match wins, so a query that says "how many" and "analyze" is a
//! count. Count types use the same first-match scheme over disjoint noun
//! families.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use strum::{Display, EnumString};

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Intent {
    General,
    Count,
    Analysis,
    Summary,
    Comparison,
    Exploration,
    AnalyticalCode,
    AnalyticalProgramming,
    Unknown,
}

impl Intent {
    /// Intents that need code execution rather than retrieval.
    pub fn is_analytical(self) -> bool {
        matches!(self, Intent::AnalyticalCode | Intent::AnalyticalProgramming)
    }
}

/// What a count query is counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CountType {
    Entity,
    Document,
    Vcfund,
    General,
    Item,
}

/// Classification of one preprocessed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntentAnalysisResult {
    pub intent: Intent,
    /// Only set for [`Intent::Count`].
    pub count_type: Option<CountType>,
    pub confidence_score: f32,
    pub complexity_score: f32,
    /// Label of the rule that fired, if any.
    pub matched_rule: Option<&'static str>,
}

/// A labelled pattern in a first-match-wins rule list.
pub struct Rule<T> {
    pub label: &'static str,
    pub value: T,
    pattern: LazyLock<Regex>,
}

impl<T: Copy> Rule<T> {
    /// Whether this rule's pattern matches `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

macro_rules! rule {
    ($label:literal, $value:expr, $re:literal) => {
        Rule {
            label: $label,
            value: $value,
            pattern: LazyLock::new(|| Regex::new($re).expect("intent rule regex must compile")),
        }
    };
}

/// Intent rules in priority order.
pub static INTENT_RULES: [Rule<Intent>; 7] = [
    rule!(
        "count",
        Intent::Count,
        r"\b(how many|count of|number of|total number|total count|count (all|the))\b"
    ),
    rule!(
        "analytical_code",
        Intent::AnalyticalCode,
        r"\b(calculate|compute|plot|chart|graph|visuali[sz]e|histogram|scatter|regression|correlation|standard deviation|variance|mean|median|average|percentile|statistics|statistical|forecast|predict|prediction|cluster|clustering|dataframe|pandas|numpy|matplotlib)\b"
    ),
    rule!(
        "analytical_programming",
        Intent::AnalyticalProgramming,
        r"\b(python|code|script|program|function|algorithm|execute|run (this|the|a))\b"
    ),
    rule!(
        "analysis",
        Intent::Analysis,
        r"\b(analy[sz]e|analysis|trends?|patterns?|insights?|breakdown|evaluate|assess|assessment)\b"
    ),
    rule!(
        "summary",
        Intent::Summary,
        r"\b(summary|summari[sz]e|summaries|overview|recap|tl;?dr|briefly|key points)\b"
    ),
    rule!(
        "comparison",
        Intent::Comparison,
        r"\b(compare|comparison|versus|vs|differences? between|contrast|better than|worse than)\b"
    ),
    rule!(
        "exploration",
        Intent::Exploration,
        r"\b(explore|exploration|tell me about|what (kinds?|types?) of|show me|list (all|the)|browse|discover)\b"
    ),
];

/// Count-type rules in priority order.
pub static COUNT_TYPE_RULES: [Rule<CountType>; 4] = [
    rule!(
        "document",
        CountType::Document,
        r"\b(documents?|files?|pdfs?|reports?|pages?|spreadsheets?|decks?)\b"
    ),
    rule!(
        "vcfund",
        CountType::Vcfund,
        r"\b(funds?|investments?|investors?|vcs?|venture|portfolios?|lps?)\b"
    ),
    rule!(
        "entity",
        CountType::Entity,
        r"\b(compan(y|ies)|people|persons?|organi[sz]ations?|customers?|clients?|users?|employees?|startups?|founders?|entit(y|ies))\b"
    ),
    rule!(
        "item",
        CountType::Item,
        r"\b(items?|products?|entries|entry|rows?|records?|things?)\b"
    ),
];

fn first_match<T: Copy>(rules: &[Rule<T>], text: &str) -> Option<(&'static str, T)> {
    rules
        .iter()
        .find(|rule| rule.matches(text))
        .map(|rule| (rule.label, rule.value))
}

/// Classify a normalized query. Empty input is [`Intent::Unknown`].
pub fn determine_intent(normalized: &str) -> Intent {
    classify_intent(normalized).0
}

/// Intent plus the label of the rule that produced it.
pub(crate) fn classify_intent(normalized: &str) -> (Intent, Option<&'static str>) {
    if normalized.trim().is_empty() {
        return (Intent::Unknown, None);
    }
    match first_match(&INTENT_RULES, normalized) {
        Some((label, intent)) => (intent, Some(label)),
        None => (Intent::General, None),
    }
}

/// Classify what a count query is counting.
pub fn determine_count_type(normalized: &str) -> CountType {
    first_match(&COUNT_TYPE_RULES, normalized)
        .map(|(_, count_type)| count_type)
        .unwrap_or(CountType::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_phrases_are_counts() {
        for q in [
            "how many documents are there?",
            "count of companies",
            "what is the number of funds",
            "total number of rows",
        ] {
            assert_eq!(determine_intent(q), Intent::Count, "{q}");
        }
    }

    #[test]
    fn count_beats_analysis() {
        assert_eq!(
            determine_intent("analyze how many investments we made"),
            Intent::Count
        );
    }

    #[test]
    fn analytical_code_beats_programming_and_analysis() {
        assert_eq!(
            determine_intent("write python to calculate the mean and analyze it"),
            Intent::AnalyticalCode
        );
        assert_eq!(
            determine_intent("write a python script"),
            Intent::AnalyticalProgramming
        );
    }

    #[test]
    fn each_family_is_reachable() {
        let cases = [
            ("analyze the sales trends", Intent::Analysis),
            ("summarize the memo", Intent::Summary),
            ("compare acme vs globex", Intent::Comparison),
            ("tell me about the portfolio", Intent::Exploration),
            ("who founded acme?", Intent::General),
        ];
        for (q, expected) in cases {
            assert_eq!(determine_intent(q), expected, "{q}");
        }
    }

    #[test]
    fn matches_whole_words_only() {
        // "meaning" must not trigger the "mean" rule.
        assert_eq!(determine_intent("what is the meaning of this"), Intent::General);
    }

    #[test]
    fn empty_query_is_unknown() {
        assert_eq!(determine_intent(""), Intent::Unknown);
        assert_eq!(determine_intent("   "), Intent::Unknown);
    }

    #[test]
    fn count_type_families() {
        assert_eq!(determine_count_type("how many documents are there?"), CountType::Document);
        assert_eq!(determine_count_type("how many funds invested"), CountType::Vcfund);
        assert_eq!(determine_count_type("how many investment companies"), CountType::Vcfund);
        assert_eq!(determine_count_type("how many companies"), CountType::Entity);
        assert_eq!(determine_count_type("how many products"), CountType::Item);
        assert_eq!(determine_count_type("how many are there"), CountType::General);
    }

    #[test]
    fn intent_labels_match_display() {
        for rule in INTENT_RULES.iter() {
            assert_eq!(rule.label, rule.value.to_string());
        }
        for rule in COUNT_TYPE_RULES.iter() {
            assert_eq!(rule.label, rule.value.to_string());
        }
    }
}
