// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Code sandbox adapter trait.

use async_trait::async_trait;

use crate::error::CiroError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ExecutionResult, SessionId};

/// Session-scoped execution environment for generated analysis code.
///
/// An `Err` means the sandbox could not be driven at all; code that ran and
/// raised is reported as `Ok` with `success == false`.
#[async_trait]
pub trait SandboxAdapter: PluginAdapter {
    async fn execute_code(
        &self,
        session_id: &SessionId,
        code: &str,
    ) -> Result<ExecutionResult, CiroError>;
}
