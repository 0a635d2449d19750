//! AIDEN OSINT Tools
//!
//! Reconnaissance tools and the text protocol the agent uses to drive them:
//! - `ToolResult` - the single text result every tool produces
//! - `OsintTool` trait - unified tool interface
//! - `ToolRegistry` - name lookup and bounded dispatch
//! - `FunctionTool` - closure-based tool creation
//! - `adapters` - TheHarvester, Sherlock and HaveIBeenPwned
//! - `react` - ReAct prompt building and step parsing
//!
//! Also includes the username variant generator and the subprocess runner.

pub mod adapters;
pub mod error;
pub mod executor;
pub mod process;
pub mod react;
pub mod trait_def;
pub mod username;

// Re-export core types
pub use error::ToolError;
pub use executor::{truncate_chars, ToolResult};
pub use process::{run_command, CommandSpec, ProcessOutcome};
pub use react::{
    build_react_prompt, format_scratchpad_entry, parse_react_step, strip_hallucinated_observation,
    ReactStep, OBSERVATION_STOP,
};
pub use trait_def::{FunctionTool, OsintTool, ToolRegistry, DEFAULT_TOOL_TIMEOUT};
pub use username::{generate_username_variants, MAX_USERNAME_VARIANTS};
