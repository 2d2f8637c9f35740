// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ciro ask` command implementation.

use std::io::IsTerminal;
use std::sync::Arc;

use ciro_config::CiroConfig;
use ciro_core::CiroError;
use ciro_engine::{EngineAdapters, PathOverride, QueryEngine, QueryRequest, QueryResponse};
use ciro_openai::OpenAiClient;
use ciro_qdrant::QdrantSearch;
use ciro_sandbox::HttpSandbox;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Flags of `ciro ask` beyond the query itself.
#[derive(Debug, Default)]
pub struct AskOptions {
    pub session: Option<String>,
    pub collection: Option<String>,
    pub top_k: Option<usize>,
    pub no_rerank: bool,
    pub path: PathOverride,
    pub context: Option<String>,
    pub json: bool,
}

/// Build an engine over the HTTP adapters named in `config`.
pub fn build_engine(config: &CiroConfig) -> Result<QueryEngine, CiroError> {
    let openai = Arc::new(OpenAiClient::new(&config.openai)?);
    let adapters = EngineAdapters {
        embedder: openai.clone(),
        search: Arc::new(QdrantSearch::new(&config.qdrant)?),
        reranker: None,
        provider: openai,
        sandbox: Arc::new(HttpSandbox::new(&config.sandbox)?),
    };
    Ok(QueryEngine::new(config, adapters))
}

/// Run the `ciro ask` command. Returns whether the answer succeeded.
pub async fn run_ask(config: &CiroConfig, query: &str, options: AskOptions) -> Result<bool, CiroError> {
    let engine = build_engine(config)?;
    let request = to_request(query, &options);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    let response = engine.handle_with_cancel(request, cancel).await;

    if options.json {
        let json = serde_json::to_string_pretty(&response)
            .map_err(|e| CiroError::Internal(format!("failed to serialize response: {e}")))?;
        println!("{json}");
    } else {
        print_response(&response, std::io::stdout().is_terminal());
    }
    Ok(response.success)
}

fn to_request(query: &str, options: &AskOptions) -> QueryRequest {
    let mut request = QueryRequest::new(query).with_path(options.path);
    if let Some(session) = &options.session {
        request = request.with_session(session.clone());
    }
    if let Some(collection) = &options.collection {
        request = request.with_collection(collection.clone());
    }
    if let Some(top_k) = options.top_k {
        request = request.with_top_k(top_k);
    }
    if options.no_rerank {
        request = request.with_reranker(false);
    }
    if let Some(context) = &options.context {
        request = request.with_context(context.clone());
    }
    request
}

fn print_response(response: &QueryResponse, use_color: bool) {
    use colored::Colorize;

    println!();
    println!("{}", response.answer);
    println!();

    let path = response.route.chosen_path.to_string();
    let intent = response.route.intent.intent.to_string();
    if use_color {
        println!("  {} {} ({})", "path:".dimmed(), path.cyan(), intent);
    } else {
        println!("  path: {path} ({intent})");
    }
    if let Some(model) = &response.model {
        println!("  model: {model}");
    }
    if let Some(session) = &response.session_id {
        println!("  session: {session}");
    }

    for doc in response.documents() {
        println!("  source: {} (score {:.3})", doc.id, doc.score);
    }
    for artifact in response.artifacts() {
        let location = artifact.url.as_deref().unwrap_or(&artifact.name);
        println!("  artifact: {} [{}]", location, artifact.artifact_type);
    }

    if let Some(error) = &response.error {
        if use_color {
            println!("  {} {}", "error:".red(), error);
        } else {
            println!("  error: {error}");
        }
    }
    println!("  {} ms", response.elapsed_ms);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_map_onto_request() {
        let options = AskOptions {
            session: Some("s-9".into()),
            collection: Some("funds".into()),
            top_k: Some(4),
            no_rerank: true,
            path: PathOverride::Analytical,
            context: Some("FY2024 only".into()),
            json: false,
        };
        let request = to_request("plot revenue", &options);
        assert_eq!(request.session_id.as_ref().map(|s| s.as_str()), Some("s-9"));
        assert_eq!(request.collection.as_deref(), Some("funds"));
        assert_eq!(request.top_k, Some(4));
        assert_eq!(request.use_reranker, Some(false));
        assert_eq!(request.path, PathOverride::Analytical);
        assert_eq!(request.context.as_deref(), Some("FY2024 only"));
    }

    #[test]
    fn rerank_is_left_to_config_by_default() {
        let request = to_request("q", &AskOptions::default());
        assert_eq!(request.use_reranker, None);
        assert_eq!(request.path, PathOverride::Auto);
    }
}
