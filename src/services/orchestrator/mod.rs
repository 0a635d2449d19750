//! Orchestrator
//!
//! The bounded ReAct loop and the deterministic fallback that backs it up.

pub mod agentic_loop;
pub mod fallback;

pub use agentic_loop::{AgenticLoop, LoopConfig};
pub use fallback::{needs_fallback, run_fallback};
