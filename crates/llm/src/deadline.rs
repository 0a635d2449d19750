//! Deadline and cancellation for oracle calls.
//!
//! Every oracle request is a suspension point. It must finish before its
//! deadline and must be abandoned as soon as the enclosing session is
//! cancelled. Dropping the request future aborts the underlying HTTP call.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::provider::LlmProvider;
use crate::types::{LlmError, LlmRequestOptions, LlmResult, Message};

/// Race `future` against `timeout` and `cancel`.
///
/// Cancellation wins ties so a cancelled session never starts reasoning over
/// a response that arrived in the same instant.
pub async fn call_with_deadline<T, F>(
    future: F,
    timeout: Duration,
    cancel: &CancellationToken,
) -> LlmResult<T>
where
    F: Future<Output = LlmResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LlmError::Cancelled),
        result = tokio::time::timeout(timeout, future) => match result {
            Ok(inner) => inner,
            Err(_) => Err(LlmError::Timeout {
                seconds: timeout.as_secs(),
            }),
        },
    }
}

/// Send a single prompt and return the generated text.
///
/// A response with no content yields an empty string; deciding whether
/// that is acceptable is left to the caller.
pub async fn complete_text(
    provider: &dyn LlmProvider,
    prompt: String,
    system: Option<String>,
    options: LlmRequestOptions,
    timeout: Duration,
    cancel: &CancellationToken,
) -> LlmResult<String> {
    let response = call_with_deadline(
        provider.send_message(vec![Message::user(prompt)], system, options),
        timeout,
        cancel,
    )
    .await?;
    tracing::debug!(
        "[Oracle] {} ({}) returned {} chars",
        provider.name(),
        response.model,
        response.text().len()
    );
    Ok(response.text().to_string())
}
