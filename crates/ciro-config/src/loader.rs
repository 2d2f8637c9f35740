// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./ciro.toml` > `~/.config/ciro/ciro.toml` > `/etc/ciro/ciro.toml`
//! with environment variable overrides via the `CIRO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::CiroConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/ciro/ciro.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "ciro.toml";

/// Top-level sections that environment variables may address.
const SECTIONS: &[&str] = &[
    "engine",
    "routing",
    "rag",
    "analytical",
    "sandbox",
    "qdrant",
    "openai",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ciro/ciro.toml`
/// 3. `~/.config/ciro/ciro.toml`
/// 4. `./ciro.toml`
/// 5. `CIRO_*` environment variables
pub fn load_config() -> Result<CiroConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<CiroConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CiroConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CiroConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CiroConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment without extracting, so callers can inspect metadata.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(CiroConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Path of the per-user configuration file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ciro").join("ciro.toml"))
}

/// Create the environment variable provider.
///
/// Only the section name is split off, so `CIRO_RAG_CONTEXT_TOKEN_BUDGET`
/// maps to `rag.context_token_budget` rather than `rag.context.token.budget`.
fn env_provider() -> Env {
    Env::prefixed("CIRO_").map(|key| section_key(key.as_str()).into())
}

/// Map a prefix-stripped env var name to a lowercase dotted config key.
fn section_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
