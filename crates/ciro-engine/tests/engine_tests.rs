// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end engine tests over mock collaborators.

use std::time::Duration;

use ciro_agent::AnalyticalStatus;
use ciro_config::model::EmptyResultPolicy;
use ciro_core::{AdapterType, HealthStatus};
use ciro_engine::{PathOverride, PathResult, QueryRequest};
use ciro_rag::{Stage, StageOutcome};
use ciro_router::{Intent, RoutePath};
use ciro_test_utils::{
    MockEmbedder, MockProvider, MockReranker, MockSandbox, MockVectorSearch, TestHarness,
    sandbox_output, search_hit,
};
use tokio_util::sync::CancellationToken;

const MEAN_ACTION: &str = "Thought: I will use numpy.\nAction: Python\n```python\nprint(np.mean([1, 2, 3, 4, 5]))\n```";
const MEAN_FINAL: &str = "Thought: The sandbox printed 3.0.\nFinal Answer: The mean is 3.0.";

fn fund_hits() -> Vec<ciro_core::SearchHit> {
    vec![
        search_hit("a", "Fund A invested in three startups.", 0.9),
        search_hit("b", "Fund B focuses on climate tech.", 0.8),
    ]
}

#[tokio::test]
async fn count_question_goes_through_retrieval() {
    let harness = TestHarness::builder()
        .with_hits(fund_hits())
        .with_mock_responses(vec!["There are 2 documents."])
        .build();

    let response = harness.ask("How many documents are there?").await;

    assert!(response.success);
    assert_eq!(response.route.chosen_path, RoutePath::DirectRetrieval);
    assert_eq!(response.route.intent.intent, Intent::Count);
    assert!(!response.forced);
    assert_eq!(response.answer, "There are 2 documents.");
    assert_eq!(response.documents().len(), 2);
    assert!(response.artifacts().is_empty());
    assert!(response.session_id.is_none());

    let requests = harness.provider.requests().await;
    let prompt = &requests[0].messages.last().unwrap().content;
    assert!(prompt.contains("Fund A invested"));
    assert_eq!(requests[0].options.task_type.as_deref(), Some("rag"));
}

#[tokio::test]
async fn calculation_goes_through_the_analytical_loop() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec![MEAN_ACTION, MEAN_FINAL])
        .with_sandbox_results(vec![sandbox_output("3.0\n", &[])])
        .build();

    let response = harness
        .send(QueryRequest::new("Calculate the mean of [1, 2, 3, 4, 5]").with_session("s-1"))
        .await;

    assert!(response.success);
    assert_eq!(response.route.chosen_path, RoutePath::Analytical);
    assert_eq!(response.answer, "The mean is 3.0.");
    assert_eq!(response.session_id.as_ref().map(|s| s.as_str()), Some("s-1"));

    let PathResult::Analytical(analytical) = &response.result else {
        panic!("expected an analytical result, got {:?}", response.result);
    };
    assert!(analytical.reasoning.len() <= 2);
    assert!(!analytical.code_executed.is_empty());

    let executions = harness.sandbox.executions().await;
    assert_eq!(executions[0].0.as_str(), "s-1");
}

#[tokio::test]
async fn analytical_request_without_session_gets_a_fresh_one() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["Final Answer: done"])
        .build();

    let first = harness.ask("plot a histogram of revenue").await;
    let second = harness.ask("plot a histogram of revenue").await;

    let first_id = first.session_id.expect("analytical responses carry a session");
    let second_id = second.session_id.expect("analytical responses carry a session");
    assert_ne!(first_id, second_id);
}

#[tokio::test]
async fn forced_path_overrides_the_router() {
    let harness = TestHarness::builder()
        .with_hits(fund_hits())
        .with_mock_responses(vec!["Retrieved answer."])
        .build();

    let response = harness
        .send(
            QueryRequest::new("Calculate the mean of [1, 2, 3, 4, 5]")
                .with_path(PathOverride::Retrieval),
        )
        .await;

    assert!(response.forced);
    assert_eq!(response.route.chosen_path, RoutePath::DirectRetrieval);
    assert!(response.route.reasoning.contains("requested by caller"));
    assert!(harness.sandbox.executions().await.is_empty());
    assert_eq!(response.answer, "Retrieved answer.");
}

#[tokio::test]
async fn zero_hits_still_call_the_generator() {
    let harness = TestHarness::builder()
        .with_mock_responses(vec!["I could not find anything relevant."])
        .build();

    let response = harness.ask("What is the fund strategy?").await;

    assert!(response.success);
    assert!(response.documents().is_empty());
    assert_eq!(harness.provider.call_count().await, 1);
}

#[tokio::test]
async fn short_circuit_policy_skips_the_generator() {
    let harness = TestHarness::builder()
        .configure(|config| config.rag.empty_result_policy = EmptyResultPolicy::ShortCircuit)
        .build();

    let response = harness.ask("What is the fund strategy?").await;

    assert!(response.success);
    assert_eq!(harness.provider.call_count().await, 0);
    let PathResult::DirectRetrieval(rag) = &response.result else {
        panic!("expected a retrieval result");
    };
    assert_eq!(rag.outcome_of(Stage::Generate), Some(StageOutcome::Skipped));
}

#[tokio::test]
async fn search_failure_is_reported_in_the_envelope() {
    let harness = TestHarness::builder()
        .with_search(MockVectorSearch::failing())
        .build();

    let response = harness.ask("What is the fund strategy?").await;

    assert!(!response.success);
    assert!(response.error.as_deref().unwrap().starts_with("search failed"));
    assert!(response.documents().is_empty());
    assert_eq!(harness.provider.call_count().await, 0);
}

#[tokio::test]
async fn reranker_failure_keeps_the_request_successful() {
    let harness = TestHarness::builder()
        .with_hits(fund_hits())
        .with_reranker(MockReranker::failing())
        .with_mock_responses(vec!["Two funds."])
        .build();

    let response = harness
        .send(QueryRequest::new("Which funds are there?").with_reranker(true))
        .await;

    assert!(response.success);
    assert_eq!(response.documents()[0].id, "a");
    assert_eq!(response.documents().len(), 2);
}

#[tokio::test]
async fn request_overrides_reach_vector_search() {
    let harness = TestHarness::builder()
        .with_hits(fund_hits())
        .with_mock_responses(vec!["ok"])
        .build();

    harness
        .send(
            QueryRequest::new("Which funds are there?")
                .with_collection("Portfolio Funds")
                .with_top_k(1),
        )
        .await;

    let searches = harness.search.requests().await;
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].top_k, 1);
    assert_ne!(searches[0].collection, harness.config.rag.default_collection);
}

#[tokio::test]
async fn generator_failure_in_loop_is_not_successful() {
    let harness = TestHarness::builder()
        .with_provider(MockProvider::failing())
        .build();

    let response = harness
        .send(QueryRequest::new("compute the median deal size").with_path(PathOverride::Analytical))
        .await;

    assert!(!response.success);
    assert!(response.error.is_some());
    assert!(!response.answer.is_empty());
}

#[tokio::test]
async fn cancelled_token_skips_all_work() {
    let harness = TestHarness::builder().build();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let response = harness
        .engine
        .handle_with_cancel(QueryRequest::new("How many documents are there?"), cancel)
        .await;

    assert!(!response.success);
    assert_eq!(response.result, PathResult::Cancelled);
    assert!(harness.embedder.calls().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_slow_retrieval() {
    let harness = TestHarness::builder()
        .with_embedder(MockEmbedder::new().with_delay(Duration::from_secs(5)))
        .build();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let response = harness
        .engine
        .handle_with_cancel(QueryRequest::new("What is the fund strategy?"), cancel)
        .await;

    assert_eq!(response.result, PathResult::Cancelled);
    assert_eq!(harness.provider.call_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn cancelled_analysis_keeps_its_step_and_frees_the_session() {
    let harness = TestHarness::builder()
        .with_provider(MockProvider::repeating(MEAN_ACTION))
        .with_sandbox(MockSandbox::new().with_delay(Duration::from_secs(30)))
        .build();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let response = harness
        .engine
        .handle_with_cancel(
            QueryRequest::new("Calculate the mean of [1, 2, 3, 4, 5]").with_session("s-cancel"),
            cancel,
        )
        .await;

    let PathResult::Analytical(analytical) = &response.result else {
        panic!("expected an analytical result, got {:?}", response.result);
    };
    assert_eq!(analytical.status, AnalyticalStatus::Cancelled);
    assert_eq!(analytical.code_executed.len(), 1);
    assert_eq!(analytical.reasoning.len(), analytical.code_executed.len());
    assert_eq!(harness.engine.active_sessions(), 0);
}

#[tokio::test]
async fn same_session_requests_do_not_overlap_in_the_sandbox() {
    let harness = TestHarness::builder()
        .with_provider(MockProvider::repeating(MEAN_ACTION))
        .with_sandbox(MockSandbox::new().with_delay(Duration::from_millis(20)))
        .configure(|config| config.analytical.max_iterations = 2)
        .build();

    let request = || {
        QueryRequest::new("Calculate the mean of [1, 2, 3, 4, 5]").with_session("shared")
    };
    let (a, b) = tokio::join!(harness.send(request()), harness.send(request()));

    assert!(a.success && b.success);
    assert_eq!(harness.sandbox.executions().await.len(), 4);
    assert_eq!(harness.sandbox.max_concurrency(), 1);
    assert_eq!(harness.engine.active_sessions(), 0);
}

#[tokio::test]
async fn health_reports_every_adapter() {
    let harness = TestHarness::builder()
        .with_reranker(MockReranker::reversing())
        .build();

    let report = harness.engine.health().await;

    assert_eq!(report.len(), 5);
    assert!(report.iter().all(|h| h.status == HealthStatus::Healthy));
    assert!(report.iter().any(|h| h.adapter_type == AdapterType::Sandbox));
}

#[test]
fn route_only_classifies() {
    let harness = TestHarness::builder().build();
    let decision = harness.engine.route("How many documents are there?");
    assert_eq!(decision.intent.intent, Intent::Count);
    assert!(!decision.reasoning.is_empty());
}
