// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Route a request, dispatch it to one pipeline, and wrap the result.

use std::sync::Arc;
use std::time::Instant;

use ciro_agent::{AnalyticalAgent, SessionLocks};
use ciro_config::CiroConfig;
use ciro_core::{
    AdapterType, CiroError, EmbeddingAdapter, HealthStatus, ProviderAdapter, RerankerAdapter,
    SandboxAdapter, SessionId, VectorSearchAdapter,
};
use ciro_rag::{DirectRagPipeline, DirectRagQueryResponse, StageOutcome};
use ciro_router::{QueryRouter, RouteDecision, RoutePath};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::request::{PathOverride, PathResult, QueryRequest, QueryResponse};

const CANCELLED_ANSWER: &str = "The request was cancelled before an answer was produced.";

/// The external collaborators an engine is built from.
#[derive(Clone)]
pub struct EngineAdapters {
    pub embedder: Arc<dyn EmbeddingAdapter>,
    pub search: Arc<dyn VectorSearchAdapter>,
    pub reranker: Option<Arc<dyn RerankerAdapter>>,
    pub provider: Arc<dyn ProviderAdapter>,
    pub sandbox: Arc<dyn SandboxAdapter>,
}

/// Health of one collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterHealth {
    pub name: String,
    pub adapter_type: AdapterType,
    pub status: HealthStatus,
}

/// Owns the router and both pipelines.
pub struct QueryEngine {
    router: QueryRouter,
    rag: DirectRagPipeline,
    agent: AnalyticalAgent,
    sessions: Arc<SessionLocks>,
    adapters: EngineAdapters,
}

impl QueryEngine {
    /// Wire the router and pipelines to `adapters` using `config`.
    pub fn new(config: &CiroConfig, adapters: EngineAdapters) -> Self {
        let router = QueryRouter::new(config.routing.clone());

        let mut rag = DirectRagPipeline::new(
            Arc::clone(&adapters.embedder),
            Arc::clone(&adapters.search),
            Arc::clone(&adapters.provider),
            router.selector().clone(),
            config.rag.clone(),
        );
        if let Some(reranker) = &adapters.reranker {
            rag = rag.with_reranker(Arc::clone(reranker));
        }

        let sessions = Arc::new(SessionLocks::new());
        let agent = AnalyticalAgent::new(
            Arc::clone(&adapters.provider),
            Arc::clone(&adapters.sandbox),
            router.selector().clone(),
            config.analytical.clone(),
        )
        .with_session_locks(Arc::clone(&sessions));

        Self {
            router,
            rag,
            agent,
            sessions,
            adapters,
        }
    }

    /// Classify `query` without running either pipeline.
    pub fn route(&self, query: &str) -> RouteDecision {
        self.router.determine_route(query)
    }

    /// Number of analytical sessions currently holding or awaiting the sandbox.
    pub fn active_sessions(&self) -> usize {
        self.sessions.active_sessions()
    }

    /// Answer `request`. Never fails; problems are reported in the envelope.
    pub async fn handle(&self, request: QueryRequest) -> QueryResponse {
        self.handle_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Like [`handle`](Self::handle), stopping early when `cancel` fires.
    pub async fn handle_with_cancel(
        &self,
        request: QueryRequest,
        cancel: CancellationToken,
    ) -> QueryResponse {
        let started = Instant::now();
        let request_id = uuid::Uuid::new_v4().to_string();
        let (route, forced) = self.resolve_route(&request);

        info!(
            request_id = request_id.as_str(),
            path = %route.chosen_path,
            intent = %route.intent.intent,
            forced,
            "query routed"
        );

        let mut response = QueryResponse {
            request_id,
            answer: CANCELLED_ANSWER.to_string(),
            success: false,
            error: Some(CiroError::Cancelled.to_string()),
            model: None,
            route,
            forced,
            session_id: None,
            result: PathResult::Cancelled,
            elapsed_ms: 0,
        };

        if cancel.is_cancelled() {
            info!(request_id = response.request_id.as_str(), "request cancelled before dispatch");
        } else {
            match response.route.chosen_path {
                RoutePath::DirectRetrieval => {
                    let answer = self.rag.answer_query(request.to_rag_query());
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            info!(request_id = response.request_id.as_str(), "retrieval cancelled");
                        }
                        rag = answer => fill_from_rag(&mut response, rag),
                    }
                }
                RoutePath::Analytical => {
                    let session_id = request.session_id.clone().unwrap_or_else(|| {
                        SessionId(format!("session-{}", uuid::Uuid::new_v4()))
                    });
                    let analytical = self
                        .agent
                        .process_analytical_query_with_cancel(
                            &session_id,
                            &request.query,
                            request.context.as_deref(),
                            cancel,
                        )
                        .await;
                    response.answer = analytical.final_answer.clone();
                    response.success = analytical.success;
                    response.error = analytical.error.clone();
                    response.model = Some(analytical.model.clone());
                    response.session_id = Some(session_id);
                    response.result = PathResult::Analytical(analytical);
                }
            }
        }

        response.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            request_id = response.request_id.as_str(),
            success = response.success,
            elapsed_ms = response.elapsed_ms,
            "query finished"
        );
        response
    }

    /// Health of every configured collaborator.
    pub async fn health(&self) -> Vec<AdapterHealth> {
        let a = &self.adapters;
        let mut report = vec![
            probe(a.embedder.name(), a.embedder.adapter_type(), a.embedder.health_check().await),
            probe(a.search.name(), a.search.adapter_type(), a.search.health_check().await),
            probe(a.provider.name(), a.provider.adapter_type(), a.provider.health_check().await),
            probe(a.sandbox.name(), a.sandbox.adapter_type(), a.sandbox.health_check().await),
        ];
        if let Some(reranker) = &a.reranker {
            report.push(probe(
                reranker.name(),
                reranker.adapter_type(),
                reranker.health_check().await,
            ));
        }
        report
    }

    fn resolve_route(&self, request: &QueryRequest) -> (RouteDecision, bool) {
        let mut route = self.router.determine_route(&request.query);
        let forced_path = match request.path {
            PathOverride::Auto => return (route, false),
            PathOverride::Retrieval => RoutePath::DirectRetrieval,
            PathOverride::Analytical => RoutePath::Analytical,
        };
        route.reasoning = format!(
            "path {forced_path} requested by caller; router suggested {}: {}",
            route.chosen_path, route.reasoning
        );
        route.chosen_path = forced_path;
        (route, true)
    }
}

fn fill_from_rag(response: &mut QueryResponse, rag: DirectRagQueryResponse) {
    let failure = rag
        .trace
        .iter()
        .find(|report| report.outcome == StageOutcome::Failed)
        .map(|report| match &report.detail {
            Some(detail) => format!("{} failed: {detail}", report.stage),
            None => format!("{} failed", report.stage),
        });

    response.answer = rag.answer.clone();
    response.success = failure.is_none();
    response.error = failure;
    response.model = rag.model.clone();
    response.result = PathResult::DirectRetrieval(rag);
}

fn probe(name: &str, adapter_type: AdapterType, result: Result<HealthStatus, CiroError>) -> AdapterHealth {
    let status = result.unwrap_or_else(|e| {
        warn!(adapter = name, error = %e, "health check failed");
        HealthStatus::Unhealthy(e.to_string())
    });
    AdapterHealth {
        name: name.to_string(),
        adapter_type,
        status,
    }
}
