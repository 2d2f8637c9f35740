// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sandbox service wire types.

use ciro_core::SandboxFile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteRequest<'a> {
    pub code: &'a str,
    /// In-sandbox limit, in seconds.
    pub timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileList {
    pub files: Vec<SandboxFile>,
}

/// Reply of `DELETE /files` and `DELETE /session`.
#[derive(Debug, Clone, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub success: bool,
}

/// Reply of `GET /status`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SandboxStatus {
    /// Names bound in the session's interpreter globals.
    #[serde(default)]
    pub session_variables: Vec<String>,
    #[serde(default)]
    pub scratch_files: usize,
    #[serde(default)]
    pub files: Vec<SandboxFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthReply {
    pub status: String,
}

/// FastAPI-style error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorReply {
    pub detail: serde_json::Value,
}
