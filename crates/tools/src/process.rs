//! External process execution for CLI-backed tools.
//!
//! Commands are spawned directly (no shell) with a bounded runtime. The child
//! is killed when its future is dropped, so a timeout or a cancelled session
//! never leaves a reconnaissance process running in the background.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Program, arguments and working directory of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Command line for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a command run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// The process exited on its own
    Completed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    /// The deadline passed and the process was killed
    TimedOut { after: Duration },
    /// The session was cancelled and the process was killed
    Cancelled,
    /// The process could not be started or awaited
    Failed { message: String },
}

/// Run `spec` to completion, bounded by `timeout` and `cancel`.
pub async fn run_command(
    spec: &CommandSpec,
    timeout: Duration,
    cancel: &CancellationToken,
) -> ProcessOutcome {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &spec.cwd {
        cmd.current_dir(dir);
    }

    tracing::debug!("[Process] spawning `{}`", spec.display());
    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            return ProcessOutcome::Failed {
                message: format!("failed to start '{}': {}", spec.program, e),
            };
        }
    };

    // Dropping this future drops the child, which kills it.
    let output = child.wait_with_output();

    tokio::select! {
        biased;
        _ = cancel.cancelled() => ProcessOutcome::Cancelled,
        result = tokio::time::timeout(timeout, output) => match result {
            Ok(Ok(output)) => ProcessOutcome::Completed {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            },
            Ok(Err(e)) => ProcessOutcome::Failed {
                message: format!("failed to wait for '{}': {}", spec.program, e),
            },
            Err(_) => ProcessOutcome::TimedOut { after: timeout },
        },
    }
}
