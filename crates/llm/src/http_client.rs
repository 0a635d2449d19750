//! HTTP Client Factory
//!
//! Builds the reqwest client shared by a provider instance.

use std::time::Duration;

use crate::types::{LlmError, LlmResult};

/// Build a `reqwest::Client` with a transport-level timeout.
///
/// The timeout bounds a single HTTP exchange; the caller's deadline
/// (see [`crate::deadline`]) bounds the whole oracle call.
pub fn build_http_client(timeout: Option<Duration>) -> LlmResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(concat!(
        "aiden-osint/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| LlmError::Other {
        message: format!("failed to build HTTP client: {}", e),
    })
}
