//! Services
//!
//! Business logic called by commands: the agent loop, structured
//! extraction from oracle replies, and the session that wires them.

pub mod extraction;
pub mod orchestrator;
pub mod phishing;
pub mod ranking;
pub mod session;

pub use orchestrator::{AgenticLoop, LoopConfig};
pub use phishing::PhishingSynthesizer;
pub use ranking::RankExtractor;
pub use session::{GatherOutcome, OsintSession};
