//! TheHarvester adapter: domain-level public data (emails, hosts, people).
//!
//! This is the primary tool. The orchestration layer also calls it directly
//! when the agent loop produces nothing usable.

use std::path::PathBuf;
use std::time::Duration;

use aiden_osint_core::is_valid_hostname;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ToolError;
use crate::executor::ToolResult;
use crate::process::{run_command, CommandSpec, ProcessOutcome};
use crate::trait_def::OsintTool;

pub const HARVESTER_TOOL_NAME: &str = "TheHarvester";

pub const DEFAULT_HARVESTER_SOURCES: &str = "duckduckgo,yahoo,crtsh,dnsdumpster,hackertarget,otx";

/// Success text when the run completes but prints nothing.
pub const HARVESTER_NO_DATA: &str = "TheHarvester ran but found no public data for this domain.";

const DESCRIPTION: &str = "Use this to gather real OSINT (emails, hosts, employee names, LinkedIn hits) \
for a company domain. Always call it with the domain only, e.g. acme.com.";

/// Extra time granted on top of the process deadline so the adapter's own
/// timeout message wins over the registry's.
const REGISTRY_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct HarvesterConfig {
    /// Interpreter used to run theHarvester.py
    pub python: String,
    /// Checkout directory containing theHarvester.py
    pub working_dir: PathBuf,
    /// Result limit passed as `-l`
    pub limit: u32,
    /// Comma-separated data sources passed as `-b`
    pub sources: String,
    pub timeout: Duration,
}

impl Default for HarvesterConfig {
    fn default() -> Self {
        Self {
            python: "python".to_string(),
            working_dir: PathBuf::from("theHarvester"),
            limit: 300,
            sources: DEFAULT_HARVESTER_SOURCES.to_string(),
            timeout: Duration::from_secs(180),
        }
    }
}

pub struct HarvesterTool {
    config: HarvesterConfig,
}

impl HarvesterTool {
    pub fn new(config: HarvesterConfig) -> Result<Self, ToolError> {
        if config.python.trim().is_empty() {
            return Err(ToolError::configuration(HARVESTER_TOOL_NAME, "python interpreter is empty"));
        }
        if config.limit == 0 {
            return Err(ToolError::configuration(HARVESTER_TOOL_NAME, "result limit must be positive"));
        }
        if config.sources.trim().is_empty() {
            return Err(ToolError::configuration(HARVESTER_TOOL_NAME, "no data sources configured"));
        }
        Ok(Self { config })
    }

    fn command_for(&self, domain: &str) -> CommandSpec {
        CommandSpec::new(&self.config.python)
            .arg("theHarvester.py")
            .arg("-d")
            .arg(domain)
            .arg("-l")
            .arg(self.config.limit.to_string())
            .arg("-b")
            .arg(&self.config.sources)
            .current_dir(&self.config.working_dir)
    }
}

/// The domain is the last whitespace-separated token of the input.
///
/// Surrounding quotes and punctuation, a URL scheme and any path are removed.
pub fn extract_domain(input: &str) -> Option<String> {
    let token = input.split_whitespace().last()?;
    let token = token.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | ',' | ';' | '(' | ')' | '<' | '>'));
    let token = token
        .strip_prefix("https://")
        .or_else(|| token.strip_prefix("http://"))
        .unwrap_or(token);
    let host = token.split('/').next().unwrap_or(token);
    let host = host.trim_end_matches('.').to_lowercase();
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Turn a finished run into the observation text.
fn interpret(outcome: ProcessOutcome) -> ToolResult {
    match outcome {
        ProcessOutcome::Completed {
            exit_code: 0,
            stdout,
            ..
        } => {
            let stdout = stdout.trim();
            if stdout.is_empty() {
                ToolResult::ok(HARVESTER_NO_DATA)
            } else {
                ToolResult::ok(stdout)
            }
        }
        ProcessOutcome::Completed { stdout, stderr, .. } => {
            let detail = if !stderr.trim().is_empty() {
                stderr.trim().to_string()
            } else if !stdout.trim().is_empty() {
                stdout.trim().to_string()
            } else {
                "no output".to_string()
            };
            ToolResult::err(format!("Tool error: {}", detail))
        }
        ProcessOutcome::TimedOut { after } => ToolResult::err(format!(
            "Tool error: {} timed out after {}s",
            HARVESTER_TOOL_NAME,
            after.as_secs()
        )),
        ProcessOutcome::Cancelled => ToolResult::err("Tool error: cancelled"),
        ProcessOutcome::Failed { message } => ToolResult::err(format!("Execution error: {}", message)),
    }
}

#[async_trait]
impl OsintTool for HarvesterTool {
    fn name(&self) -> &str {
        HARVESTER_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn timeout(&self) -> Duration {
        self.config.timeout.saturating_add(REGISTRY_GRACE)
    }

    async fn invoke(&self, input: &str, cancel: &CancellationToken) -> ToolResult {
        let domain = match extract_domain(input) {
            Some(domain) if is_valid_hostname(&domain) => domain,
            Some(other) => return ToolResult::err(format!("Tool error: '{}' is not a domain", other)),
            None => return ToolResult::err("Tool error: no domain supplied"),
        };

        tracing::info!("[Tool:{}] harvesting {}", HARVESTER_TOOL_NAME, domain);
        let outcome = run_command(&self.command_for(&domain), self.config.timeout, cancel).await;
        let result = interpret(outcome);
        if !result.success {
            tracing::warn!("[Tool:{}] {}", HARVESTER_TOOL_NAME, result.to_content());
        }
        result
    }
}
