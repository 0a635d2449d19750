//! Tool Result Types
//!
//! The single text result every tool adapter produces. Adapters never raise
//! errors past their boundary: failures are reported as a `ToolResult` with
//! `success == false` and a human-readable, tool-tagged message, so the
//! orchestration loop always has text to reason over.

use serde::{Deserialize, Serialize};

/// Result of a tool invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the invocation succeeded
    pub success: bool,
    /// Output from the tool (if successful)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Tool-tagged error message (if failed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a successful result
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
        }
    }

    /// Create an error result
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
        }
    }

    /// Convert to the text the oracle sees as an observation.
    ///
    /// Error messages are already tagged by the adapter that produced them.
    pub fn to_content(&self) -> String {
        if self.success {
            self.output.clone().unwrap_or_default()
        } else {
            self.error
                .clone()
                .unwrap_or_else(|| "Unknown tool error".to_string())
        }
    }
}

/// Cut `text` to at most `max_chars` characters, never splitting a char.
///
/// The cut is a plain prefix: the same input always yields the same output.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
