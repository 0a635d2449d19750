//! OSINT Commands
//!
//! `gather_osint` and `generate_phishing`, each run as its own session
//! against the shared state.

use aiden_osint_core::Subject;
use tokio_util::sync::CancellationToken;

use crate::models::phishing::PhishingArtifact;
use crate::models::response::{GatherOsintRequest, GatherOsintResponse, GeneratePhishingRequest};
use crate::services::phishing::PhishingSynthesizer;
use crate::services::session::OsintSession;
use crate::state::AppState;
use crate::utils::error::AppResult;

/// Gather findings on a subject and rank them.
pub async fn gather_osint(
    state: &AppState,
    request: GatherOsintRequest,
    cancel: &CancellationToken,
) -> AppResult<GatherOsintResponse> {
    let subject = Subject::new(request.full_name, request.email, request.domain)?;
    let session = OsintSession::new(
        subject,
        state.provider(),
        state.registry(),
        state.config(),
    );
    tracing::info!(
        "[Agent] session {} started for {}",
        session.id(),
        session.subject().domain()
    );

    let outcome = session.gather(cancel).await?;
    Ok(GatherOsintResponse {
        ranked: outcome.report.to_text()?,
        raw_results: outcome.raw_results,
    })
}

/// Build a simulated phishing email from previously gathered findings.
pub async fn generate_phishing(
    state: &AppState,
    request: GeneratePhishingRequest,
    cancel: &CancellationToken,
) -> AppResult<PhishingArtifact> {
    let subject = Subject::from_email(request.full_name, request.email)?;
    let config = state.config();
    let synthesizer = PhishingSynthesizer::new(
        state.provider(),
        config.llm.timeout(),
        config.phishing.max_findings_chars,
    );
    Ok(synthesizer
        .synthesize(&subject, &request.osint_data, cancel)
        .await?)
}
