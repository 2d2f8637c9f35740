// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ciro health` command implementation.

use std::io::IsTerminal;

use ciro_config::CiroConfig;
use ciro_core::{CiroError, HealthStatus};
use ciro_engine::AdapterHealth;

use crate::ask::build_engine;

/// Run the `ciro health` command. Returns whether every adapter is healthy.
pub async fn run_health(config: &CiroConfig, plain: bool) -> Result<bool, CiroError> {
    let engine = build_engine(config)?;
    let report = engine.health().await;
    let use_color = !plain && std::io::stdout().is_terminal();

    println!();
    println!("  ciro health");
    println!("  {}", "-".repeat(50));
    for entry in &report {
        println!("{}", format_line(entry, use_color));
    }
    println!();

    Ok(report.iter().all(|h| h.status == HealthStatus::Healthy))
}

fn format_line(entry: &AdapterHealth, use_color: bool) -> String {
    use colored::Colorize;

    let label = format!("{} ({})", entry.name, entry.adapter_type);
    let (symbol, detail) = match (&entry.status, use_color) {
        (HealthStatus::Healthy, true) => ("✓".green().to_string(), String::new()),
        (HealthStatus::Healthy, false) => ("[OK]".to_string(), String::new()),
        (HealthStatus::Degraded(why), true) => ("!".yellow().to_string(), why.clone()),
        (HealthStatus::Degraded(why), false) => ("[WARN]".to_string(), why.clone()),
        (HealthStatus::Unhealthy(why), true) => ("✗".red().to_string(), why.clone()),
        (HealthStatus::Unhealthy(why), false) => ("[FAIL]".to_string(), why.clone()),
    };
    if detail.is_empty() {
        format!("    {symbol} {label}")
    } else {
        format!("    {symbol} {label}: {detail}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciro_core::AdapterType;

    #[test]
    fn plain_lines_use_bracket_markers() {
        let entry = AdapterHealth {
            name: "qdrant".into(),
            adapter_type: AdapterType::VectorSearch,
            status: HealthStatus::Unhealthy("connection refused".into()),
        };
        assert_eq!(
            format_line(&entry, false),
            "    [FAIL] qdrant (VectorSearch): connection refused"
        );
    }
}
