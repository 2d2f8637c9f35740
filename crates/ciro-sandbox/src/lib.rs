// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Python code sandbox service.
//!
//! The service keeps one interpreter per container and exposes:
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | `POST` | `/execute` | run code, return output and scratch files |
//! | `GET` | `/files` | list scratch files |
//! | `DELETE` | `/files` | clear scratch files |
//! | `DELETE` | `/session` | reset interpreter globals |
//! | `GET` | `/status` | globals and scratch summary |
//! | `GET` | `/healthz` | liveness |
//!
//! With `session_url_template` set, each session talks to its own container.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use ciro_config::model::SandboxConfig;
use ciro_core::{
    AdapterType, CiroError, ExecutionResult, HealthStatus, PluginAdapter, SandboxAdapter,
    SandboxFile, SessionId,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::types::{
    Acknowledgement, ErrorReply, ExecuteRequest, FileList, HealthReply, SandboxStatus,
};

/// Headroom added to the in-sandbox timeout for the HTTP round trip.
const TRANSPORT_MARGIN_SECS: u64 = 10;

/// Sandbox client, shared by every session.
#[derive(Debug, Clone)]
pub struct HttpSandbox {
    client: reqwest::Client,
    base_url: String,
    session_url_template: Option<String>,
    execution_timeout_secs: u64,
}

impl HttpSandbox {
    /// Creates a client from the `[sandbox]` configuration section.
    pub fn new(config: &SandboxConfig) -> Result<Self, CiroError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(
                config.execution_timeout_secs + TRANSPORT_MARGIN_SECS,
            ))
            .build()
            .map_err(|e| CiroError::Sandbox {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(
            base_url = config.base_url.as_str(),
            per_session = config.session_url_template.is_some(),
            "sandbox client initialized"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session_url_template: config.session_url_template.clone(),
            execution_timeout_secs: config.execution_timeout_secs,
        })
    }

    /// Base URL serving `session_id`.
    pub fn session_url(&self, session_id: &SessionId) -> Result<String, CiroError> {
        let Some(template) = &self.session_url_template else {
            return Ok(self.base_url.clone());
        };
        let id = session_id.as_str();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(CiroError::sandbox(format!(
                "session id `{id}` cannot be used in a sandbox URL"
            )));
        }
        Ok(template
            .replace("{session_id}", id)
            .trim_end_matches('/')
            .to_string())
    }

    /// Scratch files currently in the session's sandbox.
    pub async fn list_files(&self, session_id: &SessionId) -> Result<Vec<SandboxFile>, CiroError> {
        let list: FileList = self.call(session_id, Method::GET, "files").await?;
        Ok(list.files)
    }

    /// Delete every scratch file in the session's sandbox.
    pub async fn clear_files(&self, session_id: &SessionId) -> Result<(), CiroError> {
        let ack: Acknowledgement = self.call(session_id, Method::DELETE, "files").await?;
        acknowledge(ack, "clear files")
    }

    /// Drop the session's interpreter globals. Scratch files are kept.
    pub async fn reset_session(&self, session_id: &SessionId) -> Result<(), CiroError> {
        let ack: Acknowledgement = self.call(session_id, Method::DELETE, "session").await?;
        info!(session_id = %session_id, "sandbox session reset");
        acknowledge(ack, "reset session")
    }

    /// Interpreter globals and scratch summary for the session.
    pub async fn status(&self, session_id: &SessionId) -> Result<SandboxStatus, CiroError> {
        self.call(session_id, Method::GET, "status").await
    }

    async fn call<R: DeserializeOwned>(
        &self,
        session_id: &SessionId,
        method: Method,
        endpoint: &str,
    ) -> Result<R, CiroError> {
        let url = format!("{}/{endpoint}", self.session_url(session_id)?);
        let response = self
            .client
            .request(method, &url)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        parse_reply(response).await
    }
}

fn transport_error(e: &reqwest::Error) -> CiroError {
    let message = if e.is_timeout() {
        format!("sandbox request timed out: {e}")
    } else {
        format!("sandbox request failed: {e}")
    };
    CiroError::sandbox(message)
}

async fn parse_reply<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, CiroError> {
    let status = response.status();
    let body = response.text().await.map_err(|e| CiroError::Sandbox {
        message: format!("failed to read sandbox response: {e}"),
        source: Some(Box::new(e)),
    })?;

    if !status.is_success() {
        let message = match serde_json::from_str::<ErrorReply>(&body) {
            Ok(reply) => match reply.detail {
                serde_json::Value::String(detail) => format!("sandbox returned {status}: {detail}"),
                other => format!("sandbox returned {status}: {other}"),
            },
            Err(_) => format!("sandbox returned {status}: {body}"),
        };
        return Err(CiroError::sandbox(message));
    }

    serde_json::from_str(&body).map_err(|e| CiroError::Sandbox {
        message: format!("malformed sandbox response: {e}"),
        source: Some(Box::new(e)),
    })
}

fn acknowledge(ack: Acknowledgement, action: &str) -> Result<(), CiroError> {
    if ack.success {
        Ok(())
    } else {
        Err(CiroError::sandbox(format!("sandbox refused to {action}: {}", ack.message)))
    }
}

#[async_trait]
impl PluginAdapter for HttpSandbox {
    fn name(&self) -> &str {
        "http-sandbox"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sandbox
    }

    async fn health_check(&self) -> Result<HealthStatus, CiroError> {
        let url = format!("{}/healthz", self.base_url);
        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };
        match parse_reply::<HealthReply>(response).await {
            Ok(reply) if reply.status == "healthy" => Ok(HealthStatus::Healthy),
            Ok(reply) => Ok(HealthStatus::Degraded(format!("sandbox reports `{}`", reply.status))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }
}

#[async_trait]
impl SandboxAdapter for HttpSandbox {
    async fn execute_code(
        &self,
        session_id: &SessionId,
        code: &str,
    ) -> Result<ExecutionResult, CiroError> {
        let url = format!("{}/execute", self.session_url(session_id)?);
        let request = ExecuteRequest {
            code,
            timeout: self.execution_timeout_secs,
        };

        debug!(session_id = %session_id, code_len = code.len(), "executing code in sandbox");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;
        let result: ExecutionResult = parse_reply(response).await?;

        if !result.success {
            warn!(
                session_id = %session_id,
                error = result.error.as_deref().unwrap_or("unknown"),
                "sandbox code raised"
            );
        }
        debug!(
            session_id = %session_id,
            files = result.files.len(),
            execution_time = result.execution_time,
            "sandbox execution finished"
        );
        Ok(result)
    }
}
