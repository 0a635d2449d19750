//! AIDEN OSINT LLM
//!
//! The text-generation oracle consulted by the orchestration loop, the rank
//! extractor and the phishing synthesizer:
//! - `LlmProvider` - the provider trait every oracle implements
//! - `OpenAIProvider` - OpenAI-compatible chat-completions provider
//! - `deadline` - timeout + cancellation wrapper for every oracle call
//!
//! Also includes the HTTP client factory.

pub mod deadline;
pub mod http_client;
pub mod openai;
pub mod provider;
pub mod types;

// Re-export main types
pub use deadline::{call_with_deadline, complete_text};
pub use http_client::build_http_client;
pub use openai::OpenAIProvider;
pub use provider::LlmProvider;
pub use types::*;
