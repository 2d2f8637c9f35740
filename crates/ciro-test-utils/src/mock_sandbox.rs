// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock code sandbox that records executions and tracks overlap.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ciro_core::{
    AdapterType, CiroError, ExecutionResult, HealthStatus, PluginAdapter, SandboxAdapter,
    SandboxFile, SessionId,
};

/// A successful execution printing `stdout` and reporting `files` in scratch.
pub fn sandbox_output(stdout: &str, files: &[&str]) -> ExecutionResult {
    ExecutionResult {
        success: true,
        stdout: Some(stdout.to_string()),
        stderr: Some(String::new()),
        error: None,
        files: files
            .iter()
            .map(|name| SandboxFile {
                name: name.to_string(),
                size: 1024,
                path: Some(format!("/scratch/{name}")),
            })
            .collect(),
        execution_time: 0.01,
    }
}

/// An execution whose code raised `error`.
pub fn sandbox_error(error: &str) -> ExecutionResult {
    ExecutionResult {
        success: false,
        stdout: Some(String::new()),
        stderr: Some(error.to_string()),
        error: Some(error.to_string()),
        files: Vec::new(),
        execution_time: 0.01,
    }
}

/// Scripted sandbox. Unscripted calls succeed with no output.
pub struct MockSandbox {
    results: Mutex<VecDeque<ExecutionResult>>,
    fail: bool,
    delay: Option<Duration>,
    executions: Mutex<Vec<(SessionId, String)>>,
    running: AtomicUsize,
    peak: AtomicUsize,
}

/// Decrements the running counter even when the execution future is dropped.
struct RunningGuard<'a>(&'a AtomicUsize);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockSandbox {
    pub fn new() -> Self {
        Self::with_results(Vec::new())
    }

    pub fn with_results(results: Vec<ExecutionResult>) -> Self {
        Self {
            results: Mutex::new(VecDeque::from(results)),
            fail: false,
            delay: None,
            executions: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// A sandbox that cannot be reached.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every `(session, code)` pair executed so far.
    pub async fn executions(&self) -> Vec<(SessionId, String)> {
        self.executions.lock().await.clone()
    }

    /// Highest number of executions observed running at once.
    pub fn max_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Default for MockSandbox {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockSandbox {
    fn name(&self) -> &str {
        "mock-sandbox"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Sandbox
    }

    async fn health_check(&self) -> Result<HealthStatus, CiroError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl SandboxAdapter for MockSandbox {
    async fn execute_code(
        &self,
        session_id: &SessionId,
        code: &str,
    ) -> Result<ExecutionResult, CiroError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        let _running = RunningGuard(&self.running);
        self.peak.fetch_max(now, Ordering::SeqCst);

        self.executions
            .lock()
            .await
            .push((session_id.clone(), code.to_string()));

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(CiroError::sandbox("mock sandbox unreachable"));
        }
        let result = self.results.lock().await.pop_front();
        Ok(result.unwrap_or_else(|| sandbox_output("", &[])))
    }
}
