//! ReAct prompt construction and decision parsing.
//!
//! The oracle is driven with the classic Thought / Action / Action Input /
//! Observation text protocol. This module owns both directions of that
//! protocol: building the prompt (tool catalog, format instructions, the
//! scratchpad of earlier steps) and turning a completion back into exactly
//! one `ReactStep`.

use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::trait_def::OsintTool;

/// Stop sequence that keeps the oracle from inventing tool output.
pub const OBSERVATION_STOP: &str = "\nObservation:";

const FORMAT_REMINDER: &str = "Your previous reply did not follow the required format. \
Reply with a Thought followed by either an Action and an Action Input, \
or a Final Answer.";

/// One decision taken from an oracle completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactStep {
    /// Run `tool` with `input`
    Action {
        thought: String,
        tool: String,
        input: String,
    },
    /// Stop and answer
    FinalAnswer { thought: String, answer: String },
    /// The completion matched neither form
    Unparseable { reason: String },
}

fn action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?im)^[ \t]*(?:thought[ \t]*:[ \t]*)?action[ \t]*\d*[ \t]*:([^\n]*?)",
            r"(?:[ \t]*\n\s*|[ \t]+)action[ \t]*\d*[ \t]*input[ \t]*\d*[ \t]*:(?s:(.*))",
        ))
        .expect("action regex is valid")
    })
}

fn action_keyword_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*(?:thought[ \t]*:[ \t]*)?action[ \t]*\d*[ \t]*:")
            .expect("action keyword regex is valid")
    })
}

fn final_answer_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*(?:thought[ \t]*:[ \t]*)?final[ \t]+answer[ \t]*:(?s:(.*))")
            .expect("final answer regex is valid")
    })
}

fn observation_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?im)^[ \t]*observation\s*:").expect("observation regex is valid"))
}

/// Build the full prompt for the next oracle call.
///
/// `scratchpad` is the rendered history of earlier steps (see
/// [`format_scratchpad_entry`]). With `format_reminder` set, a short note
/// asking the oracle to follow the format is placed before the question.
pub fn build_react_prompt(
    tools: &[Arc<dyn OsintTool>],
    question: &str,
    scratchpad: &str,
    format_reminder: bool,
) -> String {
    let catalog = tools
        .iter()
        .map(|tool| format!("{}: {}", tool.name(), tool.description()))
        .collect::<Vec<_>>()
        .join("\n");
    let names = tools
        .iter()
        .map(|tool| tool.name())
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "Answer the following questions as best you can. You have access to the following tools:\n\n\
{catalog}\n\n\
Use the following format:\n\n\
Question: the input question you must answer\n\
Thought: you should always think about what to do\n\
Action: the action to take, should be one of [{names}]\n\
Action Input: the input to the action\n\
Observation: the result of the action\n\
... (this Thought/Action/Action Input/Observation can repeat N times)\n\
Thought: I now know the final answer\n\
Final Answer: the final answer to the original input question\n\n"
    );
    if format_reminder {
        prompt.push_str(FORMAT_REMINDER);
        prompt.push_str("\n\n");
    }
    prompt.push_str(&format!("Begin!\n\nQuestion: {}\nThought: {}", question, scratchpad));
    prompt
}

/// Render one completed step for the scratchpad.
///
/// The result ends with a fresh `Thought: ` so the next completion continues
/// the protocol.
pub fn format_scratchpad_entry(thought: &str, tool: &str, input: &str, observation: &str) -> String {
    let mut entry = String::new();
    if !thought.is_empty() {
        entry.push_str(thought);
        entry.push('\n');
    }
    entry.push_str(&format!(
        "Action: {}\nAction Input: {}\nObservation: {}\nThought: ",
        tool, input, observation
    ));
    entry
}

/// Drop everything from the first line that starts with `Observation:`.
///
/// Observations only ever come from real tool runs; anything the oracle
/// wrote there itself is discarded.
pub fn strip_hallucinated_observation(text: &str) -> &str {
    match observation_regex().find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// Classify an oracle completion.
///
/// Markers only count at the start of a line (optionally after `Thought:`),
/// so prose inside a thought never reads as a decision. When both an action and a final answer are present, whichever appears
/// first wins.
pub fn parse_react_step(text: &str) -> ReactStep {
    let text = strip_hallucinated_observation(text);
    let action = action_regex().captures(text);
    let final_answer = final_answer_regex().captures(text);

    match (action, final_answer) {
        (Some(action), Some(answer)) => {
            if whole_start(&action) < whole_start(&answer) {
                action_step(text, &action)
            } else {
                final_step(text, &answer)
            }
        }
        (Some(action), None) => action_step(text, &action),
        (None, Some(answer)) => final_step(text, &answer),
        (None, None) => {
            let reason = if action_keyword_regex().is_match(text) {
                "Missing 'Action Input:' after 'Action:'"
            } else {
                "Missing 'Action:' or 'Final Answer:'"
            };
            ReactStep::Unparseable {
                reason: reason.to_string(),
            }
        }
    }
}

fn whole_start(captures: &regex::Captures<'_>) -> usize {
    captures.get(0).map(|m| m.start()).unwrap_or(0)
}

fn leading_thought(text: &str, end: usize) -> String {
    let thought = text[..end].trim();
    let thought = match thought.get(..8) {
        Some(prefix) if prefix.eq_ignore_ascii_case("thought:") => &thought[8..],
        _ => thought,
    };
    thought.trim().to_string()
}

fn action_step(text: &str, captures: &regex::Captures<'_>) -> ReactStep {
    let tool = captures
        .get(1)
        .map(|m| clean_tool_name(m.as_str()))
        .unwrap_or_default();
    if tool.is_empty() {
        return ReactStep::Unparseable {
            reason: "Empty action name".to_string(),
        };
    }
    let input = captures
        .get(2)
        .map(|m| clean_action_input(m.as_str()))
        .unwrap_or_default();
    ReactStep::Action {
        thought: leading_thought(text, whole_start(captures)),
        tool,
        input,
    }
}

fn final_step(text: &str, captures: &regex::Captures<'_>) -> ReactStep {
    let answer = captures
        .get(1)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    if answer.is_empty() {
        return ReactStep::Unparseable {
            reason: "Empty final answer".to_string(),
        };
    }
    ReactStep::FinalAnswer {
        thought: leading_thought(text, whole_start(captures)),
        answer,
    }
}

/// Tool names arrive wrapped in markdown or brackets surprisingly often.
fn clean_tool_name(raw: &str) -> String {
    first_line(raw)
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '`' | '"' | '\'' | '[' | ']'))
        .to_string()
}

/// Tool inputs are single-line; only the first non-empty line is kept.
fn clean_action_input(raw: &str) -> String {
    let line = first_line(raw);
    let unquoted = line
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| line.strip_prefix('`').and_then(|s| s.strip_suffix('`')))
        .or_else(|| line.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(line);
    unquoted.trim().to_string()
}

fn first_line(raw: &str) -> &str {
    raw.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}
