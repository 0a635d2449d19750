//! Deterministic fallback.
//!
//! When the agent loop aborts, or finishes with an answer too short to be
//! useful, the primary tool is called directly with the subject's domain.
//! This is a single fixed call, never another pass through the oracle.

use std::time::Instant;

use aiden_osint_core::Subject;
use aiden_osint_tools::{truncate_chars, ToolRegistry};
use tokio_util::sync::CancellationToken;

use crate::models::trace::{Observation, SessionTrace, Termination};
use crate::utils::error::{AppError, AppResult};

/// Whether a run's result calls for the fallback.
pub fn needs_fallback(termination: &Termination, min_answer_chars: usize) -> bool {
    match termination {
        Termination::Aborted { .. } => true,
        Termination::Finished { answer } => answer.trim().chars().count() < min_answer_chars,
    }
}

/// Invoke `tool_name` with the subject's domain and append the result to
/// `trace` as a fallback observation.
///
/// Fails only when the fallback itself failed and the trace holds no
/// successful observation to fall back on.
pub async fn run_fallback(
    registry: &ToolRegistry,
    tool_name: &str,
    subject: &Subject,
    trace: &mut SessionTrace,
    max_observation_chars: usize,
    cancel: &CancellationToken,
) -> AppResult<()> {
    tracing::info!(
        "[Agent] fallback: calling {} directly for {}",
        tool_name,
        subject.domain()
    );
    let started = Instant::now();
    let result = registry.invoke(tool_name, subject.domain(), cancel).await;
    if cancel.is_cancelled() {
        return Err(AppError::cancelled());
    }

    let content = result.to_content();
    trace.push_observation(
        "",
        Observation {
            tool_name: tool_name.to_string(),
            input: subject.domain().to_string(),
            output: truncate_chars(&content, max_observation_chars).to_string(),
            elapsed: started.elapsed(),
            succeeded: result.success,
            fallback: true,
        },
    );

    if !result.success && !trace.has_successful_observation() {
        tracing::warn!("[Agent] fallback failed and no findings were gathered: {}", content);
        return Err(AppError::orchestration(format!(
            "no findings gathered; fallback {} failed: {}",
            tool_name, content
        )));
    }
    Ok(())
}
