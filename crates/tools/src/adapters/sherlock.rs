//! Sherlock adapter: social-media account enumeration by username.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ToolError;
use crate::executor::ToolResult;
use crate::process::{run_command, CommandSpec, ProcessOutcome};
use crate::trait_def::OsintTool;
use crate::username::{generate_username_variants, MAX_USERNAME_VARIANTS};

pub const SHERLOCK_TOOL_NAME: &str = "Sherlock";

pub const SHERLOCK_NO_ACCOUNTS: &str = "No accounts found for any username variant.";

const DESCRIPTION: &str = "Use this to find social media accounts for a person. \
Call it with the person's full name (common username variants are checked) or with one exact username.";

#[derive(Debug, Clone)]
pub struct SherlockConfig {
    /// Sherlock executable
    pub program: String,
    /// Deadline for one username lookup
    pub per_username_timeout: Duration,
    /// Per-site request timeout passed as `--timeout`
    pub site_timeout_secs: u64,
}

impl Default for SherlockConfig {
    fn default() -> Self {
        Self {
            program: "sherlock".to_string(),
            per_username_timeout: Duration::from_secs(60),
            site_timeout_secs: 10,
        }
    }
}

pub struct SherlockTool {
    config: SherlockConfig,
}

/// Result of checking one candidate username.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Lookup {
    Hits(Vec<String>),
    Failed(String),
}

impl SherlockTool {
    pub fn new(config: SherlockConfig) -> Result<Self, ToolError> {
        if config.program.trim().is_empty() {
            return Err(ToolError::configuration(SHERLOCK_TOOL_NAME, "executable path is empty"));
        }
        Ok(Self { config })
    }

    fn command_for(&self, username: &str) -> CommandSpec {
        CommandSpec::new(&self.config.program)
            .arg(username)
            .arg("--print-found")
            .arg("--timeout")
            .arg(self.config.site_timeout_secs.to_string())
    }

    async fn lookup(&self, username: &str, cancel: &CancellationToken) -> Lookup {
        let outcome = run_command(
            &self.command_for(username),
            self.config.per_username_timeout,
            cancel,
        )
        .await;
        match outcome {
            ProcessOutcome::Completed {
                exit_code: 0,
                stdout,
                ..
            } => Lookup::Hits(parse_hits(&stdout)),
            ProcessOutcome::Completed {
                exit_code, stderr, ..
            } => {
                let detail = stderr.trim();
                if detail.is_empty() {
                    Lookup::Failed(format!("exited with status {}", exit_code))
                } else {
                    Lookup::Failed(detail.lines().last().unwrap_or(detail).to_string())
                }
            }
            ProcessOutcome::TimedOut { after } => {
                Lookup::Failed(format!("timed out after {}s", after.as_secs()))
            }
            ProcessOutcome::Cancelled => Lookup::Failed("cancelled".to_string()),
            ProcessOutcome::Failed { message } => Lookup::Failed(message),
        }
    }
}

/// Candidates to look up for a given input.
///
/// A multi-token input is treated as a full name; a single token is used
/// as-is.
pub fn usernames_for_input(input: &str) -> Vec<String> {
    let input = input.trim().trim_matches(|c: char| matches!(c, '"' | '\'' | '`'));
    let tokens: Vec<&str> = input.split_whitespace().collect();
    match tokens.as_slice() {
        [] => Vec::new(),
        [single] => vec![single.trim_start_matches('@').to_string()],
        _ => generate_username_variants(input),
    }
}

/// Lines Sherlock prints for a found account start with `[+]`.
fn parse_hits(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("[+]"))
        .map(str::to_string)
        .collect()
}

/// Build the observation text for a batch of lookups.
fn render_report(lookups: &[(String, Lookup)]) -> ToolResult {
    let checked = lookups
        .iter()
        .map(|(username, _)| username.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![format!(
        "Checked {} username variant(s): {}",
        lookups.len(),
        checked
    )];
    let mut any_hits = false;
    let mut any_completed = false;

    for (username, lookup) in lookups {
        match lookup {
            Lookup::Hits(hits) => {
                any_completed = true;
                if !hits.is_empty() {
                    any_hits = true;
                    lines.push(format!("[{}] {} account(s) found:", username, hits.len()));
                    lines.extend(hits.iter().cloned());
                }
            }
            Lookup::Failed(reason) => {
                lines.push(format!("Sherlock error for '{}': {}", username, reason));
            }
        }
    }

    if !any_hits {
        lines.push(SHERLOCK_NO_ACCOUNTS.to_string());
    }

    let text = lines.join("\n");
    if any_completed {
        ToolResult::ok(text)
    } else {
        ToolResult::err(text)
    }
}

#[async_trait]
impl OsintTool for SherlockTool {
    fn name(&self) -> &str {
        SHERLOCK_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn timeout(&self) -> Duration {
        self.config
            .per_username_timeout
            .saturating_mul(MAX_USERNAME_VARIANTS as u32)
            .saturating_add(Duration::from_secs(5))
    }

    async fn invoke(&self, input: &str, cancel: &CancellationToken) -> ToolResult {
        let usernames = usernames_for_input(input);
        if usernames.is_empty() {
            return ToolResult::err("Sherlock error: no name or username supplied");
        }

        tracing::info!(
            "[Tool:{}] checking {} username(s): {}",
            SHERLOCK_TOOL_NAME,
            usernames.len(),
            usernames.join(", ")
        );

        let mut lookups = Vec::with_capacity(usernames.len());
        for username in usernames {
            if cancel.is_cancelled() {
                break;
            }
            let lookup = self.lookup(&username, cancel).await;
            if let Lookup::Failed(reason) = &lookup {
                tracing::warn!("[Tool:{}] '{}' failed: {}", SHERLOCK_TOOL_NAME, username, reason);
            }
            lookups.push((username, lookup));
        }

        render_report(&lookups)
    }
}
