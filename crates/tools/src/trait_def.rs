//! Tool Trait and Registry
//!
//! Defines the `OsintTool` trait every reconnaissance adapter implements and
//! the `ToolRegistry` the orchestration loop dispatches through. The registry
//! is built once at startup and shared read-only (behind an `Arc`) by every
//! concurrent session.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aiden_osint_core::{CoreError, CoreResult};
use tokio_util::sync::CancellationToken;

use crate::executor::ToolResult;

/// Deadline applied to tools that do not declare their own.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(60);

/// Unified tool interface.
///
/// A tool takes one line of free text and always produces a `ToolResult`.
/// Implementations must not panic on odd input; anything they cannot handle
/// becomes a failed result with a tool-tagged message.
#[async_trait]
pub trait OsintTool: Send + Sync {
    /// Unique name the oracle uses to select this tool (e.g. "TheHarvester")
    fn name(&self) -> &str;

    /// Natural-language description shown to the oracle
    fn description(&self) -> &str;

    /// Upper bound on a single invocation, enforced by the registry.
    fn timeout(&self) -> Duration {
        DEFAULT_TOOL_TIMEOUT
    }

    /// Run the tool against `input`.
    ///
    /// Long-running tools should poll `cancel` between units of work.
    async fn invoke(&self, input: &str, cancel: &CancellationToken) -> ToolResult;
}

/// Registry of available tools.
///
/// O(1) lookup by name; iteration follows registration order so the tool
/// catalog in the prompt is stable.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn OsintTool>>,
    /// Insertion order for deterministic iteration
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. A tool with the same name is replaced in place.
    pub fn register(&mut self, tool: Arc<dyn OsintTool>) {
        let name = tool.name().to_string();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
    }

    /// Look up a tool by exact name.
    pub fn get(&self, name: &str) -> CoreResult<Arc<dyn OsintTool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::not_found(format!("tool '{}'", name)))
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// All tools in registration order.
    pub fn list(&self) -> Vec<Arc<dyn OsintTool>> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .cloned()
            .collect()
    }

    /// Get all registered tool names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name, enforcing its timeout and the session's
    /// cancellation.
    ///
    /// Never fails: an unknown name, a timeout or a cancellation all come
    /// back as a failed `ToolResult` the loop can record as an observation.
    pub async fn invoke(&self, name: &str, input: &str, cancel: &CancellationToken) -> ToolResult {
        let tool = match self.tools.get(name) {
            Some(tool) => tool.clone(),
            None => {
                tracing::warn!("[ToolRegistry] oracle selected unknown tool '{}'", name);
                return ToolResult::err(format!(
                    "Unknown tool '{}'. Available tools: {}",
                    name,
                    self.order.join(", ")
                ));
            }
        };

        let timeout = tool.timeout();
        tracing::info!("[Tool:{}] invoking with input '{}'", name, input);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => ToolResult::err(format!("{} error: cancelled", name)),
            result = tokio::time::timeout(timeout, tool.invoke(input, cancel)) => match result {
                Ok(result) => {
                    tracing::debug!("[Tool:{}] finished (success={})", name, result.success);
                    result
                }
                Err(_) => {
                    tracing::warn!("[Tool:{}] timed out after {:?}", name, timeout);
                    ToolResult::err(format!(
                        "{} error: timed out after {}",
                        name,
                        format_duration(timeout)
                    ))
                }
            },
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 1 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

// ── FunctionTool ─────────────────────────────────────────────────────

/// Type alias for the async handler function used by `FunctionTool`.
pub type FunctionToolHandler =
    Box<dyn Fn(String) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> + Send + Sync>;

/// A tool created from an async closure.
///
/// Handy for fixtures and for tools that need no state of their own.
///
/// # Example
///
/// ```ignore
/// let tool = FunctionTool::new("Echo", "Echoes the input", |input| {
///     Box::pin(async move { ToolResult::ok(input) })
/// });
/// ```
pub struct FunctionTool {
    tool_name: String,
    tool_description: String,
    handler: FunctionToolHandler,
    timeout: Duration,
}

impl FunctionTool {
    /// Create a new FunctionTool from an async closure.
    pub fn new<F>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(String) -> Pin<Box<dyn Future<Output = ToolResult> + Send>> + Send + Sync + 'static,
    {
        Self {
            tool_name: name.into(),
            tool_description: description.into(),
            handler: Box::new(handler),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// Override the invocation deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl OsintTool for FunctionTool {
    fn name(&self) -> &str {
        &self.tool_name
    }

    fn description(&self) -> &str {
        &self.tool_description
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn invoke(&self, input: &str, _cancel: &CancellationToken) -> ToolResult {
        (self.handler)(input.to_string()).await
    }
}
