//! Tool construction errors.
//!
//! Only setup can fail with an error; runtime failures are `ToolResult`s.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    /// A required setting or secret is missing or invalid.
    #[error("Configuration error for {tool}: {message}")]
    Configuration { tool: String, message: String },

    /// The HTTP client backing an adapter could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ToolError {
    pub fn configuration(tool: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}
