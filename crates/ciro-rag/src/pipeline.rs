// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The direct retrieval pipeline.
//!
//! Steps run in order: embed, search, extract, rerank, context, generate.
//! Embedding and search failures end the request with a labelled answer;
//! rerank failures fall back to the unreranked documents; generation
//! failures keep the documents. Every step appends a [`StageReport`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use ciro_config::model::{EmptyResultPolicy, RagConfig};
use ciro_context::ContextBuilder;
use ciro_core::{
    EmbeddingAdapter, GenerationOptions, ProviderAdapter, RerankerAdapter, RetrievedDocument,
    SearchHit, VectorSearchAdapter, with_timeout,
};
use ciro_router::ModelSelector;
use tracing::{debug, error, info, warn};

use crate::prompt;
use crate::types::{
    DirectRagQueryResponse, EMBEDDING_FAILURE_ANSWER, GENERATION_FAILURE_ANSWER,
    NO_DOCUMENTS_ANSWER, RagQuery, SEARCH_FAILURE_ANSWER, Stage, StageOutcome, StageReport,
};

/// Retrieval-augmented answering over a vector collection.
pub struct DirectRagPipeline {
    embedder: Arc<dyn EmbeddingAdapter>,
    search: Arc<dyn VectorSearchAdapter>,
    reranker: Option<Arc<dyn RerankerAdapter>>,
    provider: Arc<dyn ProviderAdapter>,
    selector: ModelSelector,
    context: ContextBuilder,
    config: RagConfig,
}

impl DirectRagPipeline {
    /// Creates a pipeline without a reranker.
    pub fn new(
        embedder: Arc<dyn EmbeddingAdapter>,
        search: Arc<dyn VectorSearchAdapter>,
        provider: Arc<dyn ProviderAdapter>,
        selector: ModelSelector,
        config: RagConfig,
    ) -> Self {
        Self {
            embedder,
            search,
            reranker: None,
            provider,
            selector,
            context: ContextBuilder::from_config(&config),
            config,
        }
    }

    /// Attach a reranker used when a request asks for reranking.
    pub fn with_reranker(mut self, reranker: Arc<dyn RerankerAdapter>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Answer `request` from the target collection. Never fails.
    pub async fn answer_query(&self, request: RagQuery) -> DirectRagQueryResponse {
        let collection = self.resolve_collection(request.collection_override.as_deref());
        let top_k = request.top_k.unwrap_or(self.config.top_k).max(1);
        let use_reranker = request.use_reranker.unwrap_or(self.config.use_reranker);
        let mut trace = Vec::new();

        info!(
            collection = collection.as_str(),
            top_k, use_reranker, "direct retrieval started"
        );

        // Step 1: Embed the query
        let started = Instant::now();
        let embed = self.embedder.embed(&request.query);
        let vector = match with_timeout(secs(self.config.embed_timeout_secs), embed).await {
            Ok(vector) => {
                record(&mut trace, Stage::Embed, StageOutcome::Ok, started, None);
                vector
            }
            Err(e) => {
                error!(error = %e, "query embedding failed");
                record(&mut trace, Stage::Embed, StageOutcome::Failed, started, Some(e.to_string()));
                return terminal(EMBEDDING_FAILURE_ANSWER, trace);
            }
        };

        // Step 2: Vector search
        let started = Instant::now();
        let search = self
            .search
            .search(&collection, &vector, request.filter.as_ref(), top_k);
        let hits = match with_timeout(secs(self.config.search_timeout_secs), search).await {
            Ok(hits) => {
                let detail = format!("{} hits from `{collection}`", hits.len());
                record(&mut trace, Stage::Search, StageOutcome::Ok, started, Some(detail));
                hits
            }
            Err(e) => {
                error!(error = %e, collection = collection.as_str(), "vector search failed");
                record(&mut trace, Stage::Search, StageOutcome::Failed, started, Some(e.to_string()));
                return terminal(SEARCH_FAILURE_ANSWER, trace);
            }
        };

        // Step 3: Extract document text
        let started = Instant::now();
        let total_hits = hits.len();
        let mut documents = extract_documents(hits);
        let detail = (documents.len() < total_hits)
            .then(|| format!("{} of {total_hits} hits had text", documents.len()));
        record(&mut trace, Stage::Extract, StageOutcome::Ok, started, detail);

        // Step 4: Optional rerank
        let started = Instant::now();
        match (&self.reranker, use_reranker, documents.is_empty()) {
            (_, false, _) => {
                record(&mut trace, Stage::Rerank, StageOutcome::Skipped, started, Some("disabled".into()));
            }
            (None, true, _) => {
                record(
                    &mut trace,
                    Stage::Rerank,
                    StageOutcome::Skipped,
                    started,
                    Some("no reranker configured".into()),
                );
            }
            (Some(_), true, true) => {
                record(&mut trace, Stage::Rerank, StageOutcome::Skipped, started, Some("no documents".into()));
            }
            (Some(reranker), true, false) => {
                let rerank = reranker.rerank(&request.query, documents.clone(), top_k);
                match with_timeout(secs(self.config.rerank_timeout_secs), rerank).await {
                    Ok(reranked) => {
                        debug!(before = documents.len(), after = reranked.len(), "documents reranked");
                        documents = reranked;
                        record(&mut trace, Stage::Rerank, StageOutcome::Ok, started, None);
                    }
                    Err(e) => {
                        warn!(error = %e, "reranking failed; keeping search order");
                        record(&mut trace, Stage::Rerank, StageOutcome::Degraded, started, Some(e.to_string()));
                    }
                }
            }
        }

        if documents.is_empty() && self.config.empty_result_policy == EmptyResultPolicy::ShortCircuit {
            info!(collection = collection.as_str(), "no documents found; skipping generation");
            let now = Instant::now();
            record(&mut trace, Stage::Context, StageOutcome::Skipped, now, None);
            record(&mut trace, Stage::Generate, StageOutcome::Skipped, now, Some("no documents".into()));
            return DirectRagQueryResponse {
                answer: NO_DOCUMENTS_ANSWER.to_string(),
                source_documents: documents,
                model: None,
                trace,
            };
        }

        // Step 5: Token-budgeted context
        let started = Instant::now();
        let built = self.context.build(&documents);
        let detail = format!(
            "{} of {} documents, ~{} tokens",
            built.included_documents,
            documents.len(),
            built.estimated_tokens
        );
        record(&mut trace, Stage::Context, StageOutcome::Ok, started, Some(detail));

        // Step 6: Generate
        let started = Instant::now();
        let selection = self.selector.select(&request.query);
        let options = GenerationOptions {
            model: selection.model,
            temperature: self.config.temperature,
            max_tokens: selection.max_tokens,
            task_type: Some("rag".to_string()),
            task_complexity: Some(selection.tier),
        };
        let messages = prompt::build_messages(&request.query, &built.text);
        let generate = self.provider.generate_chat_completion(&messages, &options);
        let (answer, model) =
            match with_timeout(secs(self.config.generation_timeout_secs), generate).await {
                Ok(completion) => {
                    record(&mut trace, Stage::Generate, StageOutcome::Ok, started, None);
                    (completion.content, Some(completion.metadata.model))
                }
                Err(e) => {
                    error!(error = %e, model = options.model.as_str(), "answer generation failed");
                    record(&mut trace, Stage::Generate, StageOutcome::Failed, started, Some(e.to_string()));
                    (GENERATION_FAILURE_ANSWER.to_string(), None)
                }
            };

        info!(
            documents = documents.len(),
            answered = model.is_some(),
            "direct retrieval finished"
        );

        DirectRagQueryResponse {
            answer,
            source_documents: documents,
            model,
            trace,
        }
    }

    fn resolve_collection(&self, collection_override: Option<&str>) -> String {
        collection_override
            .map(normalize_collection_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| normalize_collection_name(&self.config.default_collection))
    }
}

/// Trim, collapse whitespace runs to `_`, and lower-case.
pub fn normalize_collection_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Map search hits to documents, dropping hits with no usable text.
///
/// Text comes from `payload.text`, then `payload.content`, then the hit's
/// own `content`.
pub fn extract_documents(hits: Vec<SearchHit>) -> Vec<RetrievedDocument> {
    hits.into_iter()
        .filter_map(|hit| {
            let text = payload_str(&hit, "text")
                .or_else(|| payload_str(&hit, "content"))
                .or_else(|| hit.content.clone().filter(|c| !c.trim().is_empty()));
            match text {
                Some(text) => Some(RetrievedDocument {
                    id: hit.id,
                    text,
                    score: hit.score,
                    original_payload: hit.payload,
                }),
                None => {
                    warn!(document_id = hit.id.as_str(), "dropping search hit without text");
                    None
                }
            }
        })
        .collect()
}

fn payload_str(hit: &SearchHit, key: &str) -> Option<String> {
    hit.payload
        .as_ref()?
        .get(key)?
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn secs(seconds: u64) -> Duration {
    Duration::from_secs(seconds)
}

fn record(
    trace: &mut Vec<StageReport>,
    stage: Stage,
    outcome: StageOutcome,
    started: Instant,
    detail: Option<String>,
) {
    trace.push(StageReport {
        stage,
        outcome,
        elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        detail,
    });
}

fn terminal(answer: &str, trace: Vec<StageReport>) -> DirectRagQueryResponse {
    DirectRagQueryResponse {
        answer: answer.to_string(),
        source_documents: Vec::new(),
        model: None,
        trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciro_test_utils::{MockEmbedder, MockProvider, MockReranker, MockVectorSearch, search_hit};
    use serde_json::json;

    struct Fixture {
        embedder: Arc<MockEmbedder>,
        search: Arc<MockVectorSearch>,
        provider: Arc<MockProvider>,
        reranker: Arc<MockReranker>,
        config: RagConfig,
    }

    impl Fixture {
        fn new(hits: Vec<SearchHit>) -> Self {
            Self {
                embedder: Arc::new(MockEmbedder::new()),
                search: Arc::new(MockVectorSearch::with_hits(hits)),
                provider: Arc::new(MockProvider::with_responses(vec!["grounded answer".into()])),
                reranker: Arc::new(MockReranker::reversing()),
                config: RagConfig::default(),
            }
        }

        fn pipeline(&self) -> DirectRagPipeline {
            DirectRagPipeline::new(
                self.embedder.clone(),
                self.search.clone(),
                self.provider.clone(),
                ModelSelector::default(),
                self.config.clone(),
            )
            .with_reranker(self.reranker.clone())
        }
    }

    fn three_hits() -> Vec<SearchHit> {
        vec![
            search_hit("a", "Acme raised a seed round.", 0.9),
            search_hit("b", "Globex is based in Springfield.", 0.8),
            search_hit("c", "Initech makes TPS reports.", 0.7),
        ]
    }

    #[test]
    fn collection_names_are_normalized() {
        assert_eq!(normalize_collection_name("  VC   Funds 2024 "), "vc_funds_2024");
        assert_eq!(normalize_collection_name("Docs\tQ1"), "docs_q1");
        assert_eq!(normalize_collection_name("   "), "");
    }

    #[test]
    fn text_extraction_prefers_payload_text_then_content() {
        let hits = vec![
            SearchHit {
                id: "1".into(),
                score: 0.5,
                payload: Some(json!({"text": "from text", "content": "from content"})),
                content: Some("from hit".into()),
            },
            SearchHit {
                id: "2".into(),
                score: 0.4,
                payload: Some(json!({"content": "from content"})),
                content: Some("from hit".into()),
            },
            SearchHit {
                id: "3".into(),
                score: 0.3,
                payload: None,
                content: Some("from hit".into()),
            },
        ];
        let docs = extract_documents(hits);
        let texts: Vec<_> = docs.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, ["from text", "from content", "from hit"]);
        assert!(docs[0].original_payload.is_some());
    }

    #[test]
    #[tracing_test::traced_test]
    fn hits_without_text_are_dropped_and_logged() {
        let hits = vec![
            SearchHit {
                id: "empty".into(),
                score: 0.5,
                payload: Some(json!({"text": "   ", "title": "x"})),
                content: None,
            },
            search_hit("ok", "body", 0.4),
        ];
        let docs = extract_documents(hits);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "ok");
        assert!(logs_contain("dropping search hit without text"));
    }

    #[tokio::test]
    async fn happy_path_reranks_and_generates() {
        let fx = Fixture::new(three_hits());
        let resp = fx.pipeline().answer_query(RagQuery::new("who raised a seed?")).await;

        assert_eq!(resp.answer, "grounded answer");
        assert_eq!(resp.model.as_deref(), Some("gpt-4o-mini"));
        // Reversing reranker flips the order.
        let ids: Vec<_> = resp.source_documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "a"]);
        assert_eq!(resp.outcome_of(Stage::Rerank), Some(StageOutcome::Ok));
        assert_eq!(resp.trace.len(), 6);

        let requests = fx.provider.requests().await;
        assert_eq!(requests.len(), 1);
        let prompt = &requests[0].messages[1].content;
        assert!(prompt.contains("Document 1 (ID: c)"));
        assert_eq!(requests[0].options.task_type.as_deref(), Some("rag"));
    }

    #[tokio::test]
    async fn collection_override_and_top_k_reach_search() {
        let fx = Fixture::new(three_hits());
        fx.pipeline()
            .answer_query(RagQuery::new("q").with_collection(" VC Funds ").with_top_k(2))
            .await;
        let requests = fx.search.requests().await;
        assert_eq!(requests[0].collection, "vc_funds");
        assert_eq!(requests[0].top_k, 2);
    }

    #[tokio::test]
    async fn default_collection_is_used_without_override() {
        let fx = Fixture::new(three_hits());
        fx.pipeline().answer_query(RagQuery::new("q").with_collection("  ")).await;
        assert_eq!(fx.search.requests().await[0].collection, "documents");
    }

    #[tokio::test]
    async fn embedding_failure_is_terminal() {
        let mut fx = Fixture::new(three_hits());
        fx.embedder = Arc::new(MockEmbedder::failing());
        let resp = fx.pipeline().answer_query(RagQuery::new("q")).await;

        assert_eq!(resp.answer, EMBEDDING_FAILURE_ANSWER);
        assert!(resp.source_documents.is_empty());
        assert!(fx.search.requests().await.is_empty());
        assert_eq!(fx.provider.call_count().await, 0);
        assert_eq!(resp.outcome_of(Stage::Embed), Some(StageOutcome::Failed));
    }

    #[tokio::test(start_paused = true)]
    async fn embedding_timeout_is_terminal() {
        let mut fx = Fixture::new(three_hits());
        fx.embedder = Arc::new(MockEmbedder::new().with_delay(Duration::from_secs(600)));
        let resp = fx.pipeline().answer_query(RagQuery::new("q")).await;
        assert_eq!(resp.answer, EMBEDDING_FAILURE_ANSWER);
    }

    #[tokio::test]
    async fn search_failure_is_terminal_and_distinct() {
        let mut fx = Fixture::new(vec![]);
        fx.search = Arc::new(MockVectorSearch::failing());
        let resp = fx.pipeline().answer_query(RagQuery::new("q")).await;

        assert_eq!(resp.answer, SEARCH_FAILURE_ANSWER);
        assert_ne!(resp.answer, EMBEDDING_FAILURE_ANSWER);
        assert!(resp.source_documents.is_empty());
        assert_eq!(fx.provider.call_count().await, 0);
    }

    #[tokio::test]
    async fn zero_results_still_call_generator() {
        let fx = Fixture::new(vec![]);
        let resp = fx.pipeline().answer_query(RagQuery::new("q")).await;

        assert!(resp.source_documents.is_empty());
        assert_eq!(fx.provider.call_count().await, 1);
        assert_eq!(resp.answer, "grounded answer");
        assert_eq!(resp.outcome_of(Stage::Rerank), Some(StageOutcome::Skipped));
    }

    #[tokio::test]
    async fn zero_results_short_circuit_when_configured() {
        let mut fx = Fixture::new(vec![]);
        fx.config.empty_result_policy = EmptyResultPolicy::ShortCircuit;
        let resp = fx.pipeline().answer_query(RagQuery::new("q")).await;

        assert_eq!(resp.answer, NO_DOCUMENTS_ANSWER);
        assert_eq!(fx.provider.call_count().await, 0);
        assert_eq!(resp.outcome_of(Stage::Generate), Some(StageOutcome::Skipped));
    }

    #[tokio::test]
    async fn reranker_failure_keeps_unreranked_documents() {
        let mut fx = Fixture::new(three_hits());
        fx.reranker = Arc::new(MockReranker::failing());
        let resp = fx.pipeline().answer_query(RagQuery::new("q")).await;

        let ids: Vec<_> = resp.source_documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(resp.answer, "grounded answer");
        assert_eq!(resp.outcome_of(Stage::Rerank), Some(StageOutcome::Degraded));
    }

    #[tokio::test(start_paused = true)]
    async fn reranker_timeout_keeps_unreranked_documents() {
        let mut fx = Fixture::new(three_hits());
        fx.reranker = Arc::new(MockReranker::reversing().with_delay(Duration::from_secs(600)));
        let resp = fx.pipeline().answer_query(RagQuery::new("q")).await;
        assert_eq!(resp.source_documents[0].id, "a");
        assert_eq!(resp.outcome_of(Stage::Rerank), Some(StageOutcome::Degraded));
    }

    #[tokio::test]
    async fn reranking_can_be_disabled_per_request() {
        let fx = Fixture::new(three_hits());
        let resp = fx
            .pipeline()
            .answer_query(RagQuery::new("q").with_reranker(false))
            .await;
        assert_eq!(resp.source_documents[0].id, "a");
        assert_eq!(fx.reranker.call_count().await, 0);
    }

    #[tokio::test]
    async fn generation_failure_keeps_documents() {
        let mut fx = Fixture::new(three_hits());
        fx.provider = Arc::new(MockProvider::failing());
        let resp = fx.pipeline().answer_query(RagQuery::new("q")).await;

        assert_eq!(resp.answer, GENERATION_FAILURE_ANSWER);
        assert_eq!(resp.source_documents.len(), 3);
        assert!(resp.model.is_none());
    }

    #[tokio::test]
    async fn context_respects_budget() {
        let mut fx = Fixture::new(three_hits());
        fx.config.context_token_budget = 15;
        let resp = fx
            .pipeline()
            .answer_query(RagQuery::new("q").with_reranker(false))
            .await;

        let prompt = &fx.provider.requests().await[0].messages[1].content;
        assert!(prompt.contains("Acme raised"));
        assert!(!prompt.contains("Globex"));
        // All documents are still reported.
        assert_eq!(resp.source_documents.len(), 3);
    }
}
