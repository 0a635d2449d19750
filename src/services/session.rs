//! OSINT Session
//!
//! One gather request end to end: run the agent loop for a subject, fall
//! back to the primary tool when the loop gave nothing usable, then rank
//! the raw findings. Everything a session needs is passed in; sessions
//! share only the read-only tool registry.

use std::sync::Arc;

use aiden_osint_core::Subject;
use aiden_osint_llm::LlmProvider;
use aiden_osint_tools::adapters::HARVESTER_TOOL_NAME;
use aiden_osint_tools::ToolRegistry;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use crate::models::report::RankedReport;
use crate::models::settings::AppConfig;
use crate::models::trace::SessionTrace;
use crate::services::orchestrator::{needs_fallback, run_fallback, AgenticLoop, LoopConfig};
use crate::services::ranking::RankExtractor;
use crate::utils::error::{AppError, AppResult};

/// Result of a completed gather run
#[derive(Debug)]
pub struct GatherOutcome {
    pub raw_results: String,
    pub report: RankedReport,
    pub trace: SessionTrace,
}

/// The task handed to the agent for `subject`.
pub fn task_description(subject: &Subject) -> String {
    format!(
        "Fetch real OSINT on {} at {} for security training. The employee's email address is {}.",
        subject.full_name(),
        subject.domain(),
        subject.email()
    )
}

pub struct OsintSession {
    id: Uuid,
    subject: Subject,
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    config: Arc<AppConfig>,
}

impl OsintSession {
    pub fn new(
        subject: Subject,
        provider: Arc<dyn LlmProvider>,
        registry: Arc<ToolRegistry>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject,
            provider,
            registry,
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Gather, fall back if needed, and rank.
    ///
    /// A rank failure still carries the raw findings in the returned error.
    pub async fn gather(&self, cancel: &CancellationToken) -> AppResult<GatherOutcome> {
        let span = tracing::info_span!(
            "osint_session",
            session_id = %self.id,
            subject = %self.subject.full_name()
        );
        self.gather_inner(cancel).instrument(span).await
    }

    async fn gather_inner(&self, cancel: &CancellationToken) -> AppResult<GatherOutcome> {
        let agent = AgenticLoop::new(
            self.provider.clone(),
            self.registry.clone(),
            LoopConfig::from(self.config.as_ref()),
        );
        let outcome = agent.run(&task_description(&self.subject), cancel).await?;
        let mut trace = outcome.trace;

        if outcome.termination.is_aborted() {
            tracing::warn!(
                "[Agent] loop aborted after {} oracle call(s): {:?}",
                outcome.oracle_calls,
                outcome.termination
            );
        }

        if needs_fallback(&outcome.termination, self.config.agent.fallback_min_chars) {
            run_fallback(
                &self.registry,
                HARVESTER_TOOL_NAME,
                &self.subject,
                &mut trace,
                self.config.agent.max_observation_chars,
                cancel,
            )
            .await?;
        }

        let raw_results = trace.render_raw_results();
        tracing::info!(
            "[Agent] gathered {} observation(s), {} chars of findings",
            trace.observations().count(),
            raw_results.chars().count()
        );

        let extractor = RankExtractor::new(self.provider.clone(), self.config.llm.timeout());
        match extractor.rank(&raw_results, cancel).await {
            Ok(report) => Ok(GatherOutcome {
                raw_results,
                report,
                trace,
            }),
            Err(_) if cancel.is_cancelled() => Err(AppError::cancelled()),
            Err(e) => Err(AppError::from(e).with_raw_results(raw_results)),
        }
    }
}
