//! Application State
//!
//! Everything a request needs, built once at startup and shared read-only
//! across concurrent sessions.

use std::sync::Arc;

use aiden_osint_llm::{LlmProvider, OpenAIProvider};
use aiden_osint_tools::adapters::{HarvesterTool, HibpTool, SherlockTool};
use aiden_osint_tools::{ToolError, ToolRegistry};

use crate::models::settings::AppConfig;
use crate::utils::error::AppResult;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Oracle used by the agent loop, ranking and phishing
    provider: Arc<dyn LlmProvider>,
    /// Tool registry; never mutated after startup
    registry: Arc<ToolRegistry>,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(provider: Arc<dyn LlmProvider>, registry: ToolRegistry, config: AppConfig) -> Self {
        Self {
            provider,
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }

    /// Build the OpenAI-compatible provider and the tool registry from
    /// `config`.
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let provider = OpenAIProvider::new(config.llm.provider_config())?;
        let registry = build_tool_registry(&config)?;
        tracing::info!(
            "[ToolRegistry] {} tool(s) available: {}",
            registry.len(),
            registry.names().join(", ")
        );
        Ok(Self::new(Arc::new(provider), registry, config))
    }

    pub fn provider(&self) -> Arc<dyn LlmProvider> {
        self.provider.clone()
    }

    pub fn registry(&self) -> Arc<ToolRegistry> {
        self.registry.clone()
    }

    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }
}

/// Register the reconnaissance tools in prompt order.
///
/// The breach tool needs an API key; without one it is skipped with a
/// warning and the other tools still run.
pub fn build_tool_registry(config: &AppConfig) -> AppResult<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(HarvesterTool::new(config.tools.harvester_config())?));
    registry.register(Arc::new(SherlockTool::new(config.tools.sherlock_config())?));

    match HibpTool::new(config.tools.hibp_config()) {
        Ok(tool) => registry.register(Arc::new(tool)),
        Err(ToolError::Configuration { tool, message }) => {
            tracing::warn!("[ToolRegistry] {} disabled: {}", tool, message);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(registry)
}
