// SPDX-FileCopyrightText: 2026 Ciro Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The analytical reason-act-observe loop.
//!
//! Each iteration asks the generator for a reply, executes any Python action
//! in the session sandbox, and feeds the outcome back as an observation.
//! Sandbox trouble never ends the loop; it becomes an observation the model
//! can react to. Generator failures end it, with everything gathered so far
//! returned alongside the error.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use ciro_config::model::AnalyticalConfig;
use ciro_core::{
    CiroError, ComplexityTier, ConversationMessage, GenerationOptions, ProviderAdapter,
    SandboxAdapter, SessionId, with_timeout,
};
use ciro_router::ModelSelector;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::artifacts::ArtifactCollector;
use crate::conversation::Conversation;
use crate::prompt;
use crate::response::{AgentState, AnalyticalResponse, AnalyticalStatus};
use crate::sessions::SessionLocks;
use crate::step::{AgentStep, parse_reply};

const FAILURE_ANSWER: &str = "I encountered an error while analyzing your question.";
const CANCELLED_ANSWER: &str = "The analysis was cancelled before it finished.";

/// Drives the analytical loop against a generator and a code sandbox.
pub struct AnalyticalAgent {
    provider: Arc<dyn ProviderAdapter>,
    sandbox: Arc<dyn SandboxAdapter>,
    selector: ModelSelector,
    config: AnalyticalConfig,
    sessions: Arc<SessionLocks>,
}

/// Everything gathered so far; returned even when the loop fails.
struct Progress {
    state: AgentState,
    steps: Vec<AgentStep>,
    artifacts: ArtifactCollector,
    code_executed: Vec<String>,
    model: String,
}

impl Progress {
    fn new(model: String) -> Self {
        Self {
            state: AgentState::Thinking,
            steps: Vec::new(),
            artifacts: ArtifactCollector::new(),
            code_executed: Vec::new(),
            model,
        }
    }

    fn transition(&mut self, next: AgentState) {
        debug!(from = %self.state, to = %next, "agent state transition");
        self.state = next;
    }
}

enum LoopEnd {
    Completed(String),
    Exhausted,
}

impl AnalyticalAgent {
    /// Creates an agent with its own session lock registry.
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        sandbox: Arc<dyn SandboxAdapter>,
        selector: ModelSelector,
        config: AnalyticalConfig,
    ) -> Self {
        Self {
            provider,
            sandbox,
            selector,
            config,
            sessions: Arc::new(SessionLocks::new()),
        }
    }

    /// Share a session lock registry with other agents using the same sandbox.
    pub fn with_session_locks(mut self, sessions: Arc<SessionLocks>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Answer `query` by writing and running code in the session sandbox.
    pub async fn process_analytical_query(
        &self,
        session_id: &SessionId,
        query: &str,
        context: Option<&str>,
    ) -> AnalyticalResponse {
        self.process_analytical_query_with_cancel(session_id, query, context, CancellationToken::new())
            .await
    }

    /// Like [`process_analytical_query`](Self::process_analytical_query), stopping
    /// early when `cancel` fires.
    pub async fn process_analytical_query_with_cancel(
        &self,
        session_id: &SessionId,
        query: &str,
        context: Option<&str>,
        cancel: CancellationToken,
    ) -> AnalyticalResponse {
        let started = Instant::now();
        let selection = self
            .selector
            .select_with_hint(query, Some(ComplexityTier::Medium));
        let options = GenerationOptions {
            model: selection.model.clone(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            task_type: Some("analytical".to_string()),
            task_complexity: Some(selection.tier),
        };

        info!(
            session_id = %session_id,
            model = options.model.as_str(),
            max_iterations = self.config.max_iterations,
            "analytical query started"
        );

        let mut progress = Progress::new(selection.model);
        let outcome = self
            .run_loop(session_id, query, context, &options, &cancel, &mut progress)
            .await;

        let (status, final_answer, error) = match outcome {
            Ok(LoopEnd::Completed(answer)) => (AnalyticalStatus::Completed, answer, None),
            Ok(LoopEnd::Exhausted) => {
                warn!(
                    session_id = %session_id,
                    iterations = progress.steps.len(),
                    "iteration limit reached without a final answer"
                );
                let answer = exhausted_answer(&progress.steps, self.config.max_iterations);
                (AnalyticalStatus::Exhausted, answer, None)
            }
            Err(CiroError::Cancelled) => {
                info!(session_id = %session_id, "analytical query cancelled");
                (
                    AnalyticalStatus::Cancelled,
                    CANCELLED_ANSWER.to_string(),
                    Some(CiroError::Cancelled.to_string()),
                )
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "analytical query failed");
                (AnalyticalStatus::Failed, FAILURE_ANSWER.to_string(), Some(e.to_string()))
            }
        };

        progress.transition(match status {
            AnalyticalStatus::Completed => AgentState::Completed,
            AnalyticalStatus::Exhausted => AgentState::Exhausted,
            AnalyticalStatus::Failed => AgentState::Failed,
            AnalyticalStatus::Cancelled => AgentState::Cancelled,
        });

        let execution_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            session_id = %session_id,
            status = %status,
            iterations = progress.steps.len(),
            executions = progress.code_executed.len(),
            artifacts = progress.artifacts.artifacts().len(),
            execution_time_ms,
            "analytical query finished"
        );

        AnalyticalResponse {
            final_answer,
            artifacts: progress.artifacts.into_artifacts(),
            code_executed: progress.code_executed,
            reasoning: progress.steps,
            success: matches!(status, AnalyticalStatus::Completed | AnalyticalStatus::Exhausted),
            error,
            execution_time_ms,
            status,
            model: progress.model,
        }
    }

    async fn run_loop(
        &self,
        session_id: &SessionId,
        query: &str,
        context: Option<&str>,
        options: &GenerationOptions,
        cancel: &CancellationToken,
        progress: &mut Progress,
    ) -> Result<LoopEnd, CiroError> {
        let mut conversation = Conversation::new(vec![
            ConversationMessage::system(prompt::SYSTEM_PROMPT),
            prompt::user_message(query, context),
        ]);
        let generation_timeout = Duration::from_secs(self.config.generation_timeout_secs);

        for iteration in 1..=self.config.max_iterations {
            if cancel.is_cancelled() {
                return Err(CiroError::Cancelled);
            }
            progress.transition(AgentState::Thinking);

            let generate = self
                .provider
                .generate_chat_completion(conversation.messages(), options);
            let completion = until_cancelled(cancel, with_timeout(generation_timeout, generate)).await?;
            progress.model = completion.metadata.model;

            let parsed = parse_reply(&completion.content);
            let mut step = parsed.to_step();
            conversation = conversation.with_message(ConversationMessage::assistant(completion.content));
            debug!(
                iteration,
                has_action = parsed.action.is_some(),
                has_final_answer = parsed.final_answer.is_some(),
                "generator replied"
            );

            if let Some(action) = &parsed.action {
                progress.transition(AgentState::Acting);
                progress.code_executed.push(action.code.clone());
                let observation = match self
                    .execute(session_id, &action.code, cancel, &mut progress.artifacts)
                    .await
                {
                    Ok(observation) => observation,
                    Err(e) => {
                        progress.steps.push(step);
                        return Err(e);
                    }
                };
                progress.transition(AgentState::Observing);
                conversation = conversation.with_message(prompt::observation_message(&observation));
                step.observation = Some(observation);
            } else if parsed.final_answer.is_none() {
                conversation = conversation
                    .with_message(prompt::observation_message(prompt::NO_ACTION_OBSERVATION));
            }

            progress.steps.push(step);

            if let Some(answer) = parsed.final_answer {
                let answer = if answer.is_empty() {
                    non_empty_or(&parsed.thought, "The analysis finished without a written answer.")
                } else {
                    answer
                };
                return Ok(LoopEnd::Completed(answer));
            }
        }

        Ok(LoopEnd::Exhausted)
    }

    /// Execute `code` and describe the outcome. Only cancellation is an error.
    async fn execute(
        &self,
        session_id: &SessionId,
        code: &str,
        cancel: &CancellationToken,
        artifacts: &mut ArtifactCollector,
    ) -> Result<String, CiroError> {
        let timeout = Duration::from_secs(self.config.execution_timeout_secs);
        let run = self.sessions.run_exclusive(
            session_id,
            with_timeout(timeout, self.sandbox.execute_code(session_id, code)),
        );

        match until_cancelled(cancel, run).await {
            Ok(result) => {
                let fresh = artifacts.collect(&result.files);
                debug!(
                    session_id = %session_id,
                    success = result.success,
                    new_files = fresh.len(),
                    sandbox_secs = result.execution_time,
                    "code executed"
                );
                Ok(prompt::execution_observation(
                    &result,
                    &fresh,
                    self.config.max_observation_chars,
                ))
            }
            Err(CiroError::Cancelled) => Err(CiroError::Cancelled),
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "sandbox execution failed");
                Ok(prompt::failure_observation(&e))
            }
        }
    }
}

/// Resolve `future`, or fail with [`CiroError::Cancelled`] if `cancel` fires first.
async fn until_cancelled<T>(
    cancel: &CancellationToken,
    future: impl Future<Output = Result<T, CiroError>>,
) -> Result<T, CiroError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CiroError::Cancelled),
        result = future => result,
    }
}

fn exhausted_answer(steps: &[AgentStep], max_iterations: usize) -> String {
    let last_thought = steps
        .iter()
        .rev()
        .map(|step| step.thought.trim())
        .find(|thought| !thought.is_empty());
    match last_thought {
        Some(thought) => format!(
            "I reached the limit of {max_iterations} analysis steps before reaching a final answer. \
             Based on the analysis so far: {thought}"
        ),
        None => format!(
            "I reached the limit of {max_iterations} analysis steps before reaching a final answer."
        ),
    }
}

fn non_empty_or(text: &str, fallback: &str) -> String {
    let text = text.trim();
    let chosen = if text.is_empty() { fallback } else { text };
    chosen.to_string()
}
