//! Session Trace Models
//!
//! The append-only record of one orchestration run: every tool observation
//! in the order it happened, plus the final answer if the oracle gave one.
//! The trace renders both the scratchpad fed back to the oracle and the
//! "raw results" text handed to the rank extractor.

use std::time::Duration;

use aiden_osint_tools::format_scratchpad_entry;
use serde::{Deserialize, Serialize};

/// The recorded result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub tool_name: String,
    pub input: String,
    pub output: String,
    /// Wall-clock time spent in the tool, in milliseconds when serialized
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
    pub succeeded: bool,
    /// Issued by the deterministic fallback rather than chosen by the oracle
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceStep {
    /// Thought, the action it led to, and what the tool returned
    Action {
        thought: String,
        observation: Observation,
    },
    /// The oracle's closing answer
    FinalAnswer { thought: String, answer: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTrace {
    question: String,
    steps: Vec<TraceStep>,
}

impl SessionTrace {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            steps: Vec::new(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn push_observation(&mut self, thought: impl Into<String>, observation: Observation) {
        self.steps.push(TraceStep::Action {
            thought: thought.into(),
            observation,
        });
    }

    pub fn push_final_answer(&mut self, thought: impl Into<String>, answer: impl Into<String>) {
        self.steps.push(TraceStep::FinalAnswer {
            thought: thought.into(),
            answer: answer.into(),
        });
    }

    /// All observations in chronological order.
    pub fn observations(&self) -> impl Iterator<Item = &Observation> {
        self.steps.iter().filter_map(|step| match step {
            TraceStep::Action { observation, .. } => Some(observation),
            TraceStep::FinalAnswer { .. } => None,
        })
    }

    pub fn final_answer(&self) -> Option<&str> {
        self.steps.iter().rev().find_map(|step| match step {
            TraceStep::FinalAnswer { answer, .. } => Some(answer.as_str()),
            TraceStep::Action { .. } => None,
        })
    }

    pub fn has_successful_observation(&self) -> bool {
        self.observations().any(|o| o.succeeded)
    }

    /// History fed back to the oracle after the prompt's opening `Thought: `.
    pub fn render_scratchpad(&self) -> String {
        self.steps
            .iter()
            .filter_map(|step| match step {
                TraceStep::Action {
                    thought,
                    observation,
                } => Some(format_scratchpad_entry(
                    thought,
                    &observation.tool_name,
                    &observation.input,
                    &observation.output,
                )),
                TraceStep::FinalAnswer { .. } => None,
            })
            .collect()
    }

    /// Every step in chronological order: the authoritative findings text.
    pub fn render_raw_results(&self) -> String {
        let mut blocks = Vec::with_capacity(self.steps.len());
        for step in &self.steps {
            match step {
                TraceStep::Action {
                    thought,
                    observation,
                } => {
                    let mut block = String::new();
                    if !thought.is_empty() {
                        block.push_str(&format!("Thought: {}\n", thought));
                    }
                    let label = if observation.fallback {
                        "Fallback Action"
                    } else {
                        "Action"
                    };
                    block.push_str(&format!(
                        "{}: {}\nAction Input: {}\nObservation: {}",
                        label, observation.tool_name, observation.input, observation.output
                    ));
                    blocks.push(block);
                }
                TraceStep::FinalAnswer { thought, answer } => {
                    let mut block = String::new();
                    if !thought.is_empty() {
                        block.push_str(&format!("Thought: {}\n", thought));
                    }
                    block.push_str(&format!("Final Answer: {}", answer));
                    blocks.push(block);
                }
            }
        }
        blocks.join("\n")
    }
}

/// Why a run stopped without a final answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AbortReason {
    IterationCap { iterations: usize },
    ParseFailures { attempts: usize, last_error: String },
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IterationCap { iterations } => {
                write!(f, "iteration cap of {} reached without a final answer", iterations)
            }
            Self::ParseFailures {
                attempts,
                last_error,
            } => write!(
                f,
                "{} consecutive unusable oracle replies (last: {})",
                attempts, last_error
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Termination {
    Finished { answer: String },
    Aborted { reason: AbortReason },
}

impl Termination {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }
}

/// Everything a finished or aborted run hands back.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub trace: SessionTrace,
    pub termination: Termination,
    /// Oracle decision calls made, parse retries included
    pub oracle_calls: usize,
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
