// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deadline wrapper for collaborator calls.

use std::future::Future;
use std::time::Duration;

use crate::error::CiroError;

/// Run `future` with a deadline, mapping expiry to [`CiroError::Timeout`].
pub async fn with_timeout<T, F>(duration: Duration, future: F) -> Result<T, CiroError>
where
    F: Future<Output = Result<T, CiroError>>,
{
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(CiroError::Timeout { duration }),
    }
}
