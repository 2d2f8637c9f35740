// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ciro route` command implementation.
//!
//! Classifies a question and reports the chosen path and model tier
//! without contacting any collaborator.

use ciro_config::CiroConfig;
use ciro_core::CiroError;
use ciro_router::{ModelSelection, QueryRouter, RouteDecision};
use serde::Serialize;

/// Structured output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct RouteReport {
    pub decision: RouteDecision,
    pub model: ModelSelection,
}

pub fn route_report(config: &CiroConfig, query: &str) -> RouteReport {
    let router = QueryRouter::new(config.routing.clone());
    RouteReport {
        decision: router.determine_route(query),
        model: router.selector().select(query),
    }
}

/// Run the `ciro route` command.
pub fn run_route(config: &CiroConfig, query: &str, json: bool) -> Result<bool, CiroError> {
    let report = route_report(config, query);

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CiroError::Internal(format!("failed to serialize route: {e}")))?;
        println!("{out}");
        return Ok(true);
    }

    let d = &report.decision;
    println!();
    println!("  path:       {}", d.chosen_path);
    println!("  reasoning:  {}", d.reasoning);
    match d.intent.count_type {
        Some(count_type) => println!("  intent:     {} ({count_type})", d.intent.intent),
        None => println!("  intent:     {}", d.intent.intent),
    }
    println!(
        "  scores:     analytical {:.2}, retrieval {:.2}",
        d.scores.analytical_score, d.scores.retrieval_score
    );
    println!(
        "  model:      {} ({}, complexity {:.2}, max {} tokens)",
        report.model.model, report.model.tier, report.model.score, report.model.max_tokens
    );
    println!();
    Ok(true)
}
