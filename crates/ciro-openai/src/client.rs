// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an OpenAI-compatible API.
//!
//! Provides [`OpenAiHttp`] which handles bearer authentication, JSON
//! request/response handling, and a single retry on transient errors.

use std::time::Duration;

use ciro_core::CiroError;
use ciro_core::error::BoxError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::ApiErrorResponse;

/// Builds the error variant for the endpoint being called.
pub type ErrorWrap = fn(String, Option<BoxError>) -> CiroError;

/// Low-level JSON client shared by the chat and embedding adapters.
#[derive(Debug, Clone)]
pub struct OpenAiHttp {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl OpenAiHttp {
    /// Creates a client authenticating with `api_key` against `base_url`.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, CiroError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|e| CiroError::Config(format!("invalid API key header value: {e}")))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| CiroError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// `POST {base_url}/{endpoint}`, retrying once on 429/500/503.
    pub async fn post<T, R>(&self, endpoint: &str, body: &T, wrap: ErrorWrap) -> Result<R, CiroError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, endpoint, "retrying request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| wrap(format!("HTTP request failed: {e}"), Some(Box::new(e))))?;

            let status = response.status();
            debug!(status = %status, attempt, endpoint, "response received");

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| wrap(format!("failed to read response body: {e}"), Some(Box::new(e))))?;
                return serde_json::from_str(&text)
                    .map_err(|e| wrap(format!("failed to parse API response: {e}"), Some(Box::new(e))));
            }

            let text = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %text, "transient error, will retry");
                last_error = Some(wrap(format!("API returned {status}: {text}"), None));
                continue;
            }
            return Err(wrap(api_error_message(status, &text), None));
        }

        Err(last_error.unwrap_or_else(|| wrap("request failed after retries".into(), None)))
    }

    /// `GET {base_url}/{endpoint}`, returning only whether it succeeded.
    pub async fn probe(&self, endpoint: &str) -> Result<reqwest::StatusCode, CiroError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CiroError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(response.status())
    }

    /// Overrides the base URL (for testing with wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }
}

fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => match api_err.error.type_ {
            Some(kind) => format!("API error ({kind}): {}", api_err.error.message),
            None => format!("API error: {}", api_err.error.message),
        },
        Err(_) => format!("API returned {status}: {body}"),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
