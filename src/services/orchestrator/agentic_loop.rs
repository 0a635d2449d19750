//! Agentic Loop
//!
//! The ReAct decision loop: ask the oracle what to do, parse its reply into
//! a `ReactStep`, run the chosen tool, record the observation, repeat.
//! States follow `Thinking -> ActionSelected -> Observing -> Thinking`
//! until the run reaches `Finished` or `Aborted`.
//!
//! Bounds:
//! - at most `max_iterations` oracle calls per run, parse retries included
//! - at most `max_parse_retries` consecutive unusable replies
//! - every oracle and tool call carries a deadline and the session's
//!   cancellation token

use std::sync::Arc;
use std::time::{Duration, Instant};

use aiden_osint_llm::{complete_text, LlmError, LlmProvider, LlmRequestOptions};
use aiden_osint_tools::{
    build_react_prompt, parse_react_step, truncate_chars, ReactStep, ToolRegistry,
    OBSERVATION_STOP,
};
use tokio_util::sync::CancellationToken;

use crate::models::settings::AppConfig;
use crate::models::trace::{AbortReason, LoopOutcome, Observation, SessionTrace, Termination};
use crate::utils::error::{AppError, AppResult};

/// Bounds for one run of the loop
#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub max_iterations: usize,
    pub max_parse_retries: usize,
    pub max_observation_chars: usize,
    pub oracle_timeout: Duration,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 6,
            max_parse_retries: 2,
            max_observation_chars: 8000,
            oracle_timeout: Duration::from_secs(60),
        }
    }
}

impl From<&AppConfig> for LoopConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_iterations: config.agent.max_iterations,
            max_parse_retries: config.agent.max_parse_retries,
            max_observation_chars: config.agent.max_observation_chars,
            oracle_timeout: config.llm.timeout(),
        }
    }
}

/// Where the loop is between two transitions.
#[derive(Debug)]
enum LoopState {
    /// Ask the oracle for the next step
    Thinking { format_reminder: bool },
    /// The oracle picked a tool
    ActionSelected {
        thought: String,
        tool: String,
        input: String,
    },
    /// A tool returned; record it
    Observing {
        thought: String,
        observation: Observation,
    },
    Finished { thought: String, answer: String },
    Aborted { reason: AbortReason },
}

/// One ReAct run over a shared, read-only tool registry
pub struct AgenticLoop {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    config: LoopConfig,
}

impl AgenticLoop {
    pub fn new(provider: Arc<dyn LlmProvider>, registry: Arc<ToolRegistry>, config: LoopConfig) -> Self {
        Self {
            provider,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Drive the loop for `question` until it finishes or aborts.
    ///
    /// Only cancellation is an error; every other failure either becomes an
    /// observation or ends the run as `Aborted`.
    pub async fn run(&self, question: &str, cancel: &CancellationToken) -> AppResult<LoopOutcome> {
        let tools = self.registry.list();
        let options = LlmRequestOptions::default().with_stop(OBSERVATION_STOP);
        let mut trace = SessionTrace::new(question);
        let mut state = LoopState::Thinking {
            format_reminder: false,
        };
        let mut oracle_calls = 0usize;
        let mut parse_failures = 0usize;

        loop {
            if cancel.is_cancelled() {
                tracing::info!("[Agent] cancelled after {} oracle call(s)", oracle_calls);
                return Err(AppError::cancelled());
            }

            state = match state {
                LoopState::Thinking { format_reminder } => {
                    if oracle_calls >= self.config.max_iterations {
                        tracing::warn!(
                            "[Agent] iteration cap ({}) reached without a final answer",
                            self.config.max_iterations
                        );
                        LoopState::Aborted {
                            reason: AbortReason::IterationCap {
                                iterations: oracle_calls,
                            },
                        }
                    } else {
                        oracle_calls += 1;
                        let prompt = build_react_prompt(
                            &tools,
                            question,
                            &trace.render_scratchpad(),
                            format_reminder,
                        );
                        let reply = complete_text(
                            self.provider.as_ref(),
                            prompt,
                            None,
                            options.clone(),
                            self.config.oracle_timeout,
                            cancel,
                        )
                        .await;

                        let failure = match reply {
                            Ok(text) => match parse_react_step(&text) {
                                ReactStep::Action {
                                    thought,
                                    tool,
                                    input,
                                } => {
                                    parse_failures = 0;
                                    tracing::info!(
                                        "[Agent] step {}: {}('{}')",
                                        oracle_calls,
                                        tool,
                                        input
                                    );
                                    Ok(LoopState::ActionSelected {
                                        thought,
                                        tool,
                                        input,
                                    })
                                }
                                ReactStep::FinalAnswer { thought, answer } => {
                                    tracing::info!("[Agent] step {}: final answer", oracle_calls);
                                    Ok(LoopState::Finished { thought, answer })
                                }
                                ReactStep::Unparseable { reason } => {
                                    tracing::debug!("[Agent] unusable reply: {}", text);
                                    Err(reason)
                                }
                            },
                            Err(LlmError::Cancelled) => return Err(AppError::cancelled()),
                            Err(e) => Err(format!("oracle call failed: {}", e)),
                        };

                        match failure {
                            Ok(next) => next,
                            Err(reason) => {
                                parse_failures += 1;
                                tracing::warn!(
                                    "[Agent] step {}: {} ({}/{} retries used)",
                                    oracle_calls,
                                    reason,
                                    parse_failures,
                                    self.config.max_parse_retries
                                );
                                if parse_failures > self.config.max_parse_retries {
                                    LoopState::Aborted {
                                        reason: AbortReason::ParseFailures {
                                            attempts: parse_failures,
                                            last_error: reason,
                                        },
                                    }
                                } else {
                                    LoopState::Thinking {
                                        format_reminder: true,
                                    }
                                }
                            }
                        }
                    }
                }

                LoopState::ActionSelected {
                    thought,
                    tool,
                    input,
                } => {
                    let started = Instant::now();
                    let result = self.registry.invoke(&tool, &input, cancel).await;
                    if cancel.is_cancelled() {
                        return Err(AppError::cancelled());
                    }
                    let content = result.to_content();
                    let observation = Observation {
                        tool_name: tool,
                        input,
                        output: truncate_chars(&content, self.config.max_observation_chars)
                            .to_string(),
                        elapsed: started.elapsed(),
                        succeeded: result.success,
                        fallback: false,
                    };
                    LoopState::Observing {
                        thought,
                        observation,
                    }
                }

                LoopState::Observing {
                    thought,
                    observation,
                } => {
                    tracing::debug!(
                        "[Agent] observed {} in {:?} (success={})",
                        observation.tool_name,
                        observation.elapsed,
                        observation.succeeded
                    );
                    trace.push_observation(thought, observation);
                    LoopState::Thinking {
                        format_reminder: false,
                    }
                }

                LoopState::Finished { thought, answer } => {
                    trace.push_final_answer(thought, answer.clone());
                    return Ok(LoopOutcome {
                        trace,
                        termination: Termination::Finished { answer },
                        oracle_calls,
                    });
                }

                LoopState::Aborted { reason } => {
                    return Ok(LoopOutcome {
                        trace,
                        termination: Termination::Aborted { reason },
                        oracle_calls,
                    });
                }
            };
        }
    }
}
