// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ciro config` command implementation.

use ciro_config::CiroConfig;
use ciro_core::CiroError;

const REDACTED: &str = "<redacted>";

/// Print the effective configuration as TOML with secrets masked.
pub fn run_show_config(config: &CiroConfig) -> Result<bool, CiroError> {
    println!("{}", render(config)?);
    Ok(true)
}

fn render(config: &CiroConfig) -> Result<String, CiroError> {
    let mut shown = config.clone();
    if shown.openai.api_key.is_some() {
        shown.openai.api_key = Some(REDACTED.to_string());
    }
    if shown.qdrant.api_key.is_some() {
        shown.qdrant.api_key = Some(REDACTED.to_string());
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| CiroError::Internal(format!("failed to render configuration: {e}")))
}
