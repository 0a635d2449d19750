//! Phishing Synthesizer
//!
//! Turns a subject's findings into a simulated spear-phishing email for
//! awareness training. Findings are prefix-cut to a character budget
//! before they reach the oracle.

use std::sync::Arc;
use std::time::Duration;

use aiden_osint_core::Subject;
use aiden_osint_llm::{complete_text, LlmProvider, LlmRequestOptions};
use aiden_osint_tools::truncate_chars;
use tokio_util::sync::CancellationToken;

use crate::models::phishing::PhishingArtifact;
use crate::services::extraction::{parse_json_object, require_string};
use crate::utils::error::ExtractionError;

const PHISHING_SYSTEM_PROMPT: &str = "You write simulated phishing emails for an authorised \
security awareness training programme. Every email you write is educational and is only \
shown to the employee it targets during training. You answer with a single JSON object \
and nothing else.";

/// Deterministic prefix cut; the same input always yields the same output.
pub fn truncate_findings(findings: &str, max_chars: usize) -> &str {
    truncate_chars(findings, max_chars)
}

pub fn build_phishing_prompt(subject: &Subject, findings: &str) -> String {
    format!(
        "Create a realistic but clearly simulated spear-phishing email for security awareness \
training, targeted at {name} <{email}> who works at {domain}.\n\
Base it on the OSINT findings below so the trainee can learn which public details \
attackers exploit.\n\n\
Answer with ONLY a JSON object with exactly these keys:\n\
- subject: the email subject line\n\
- from_name: the spoofed sender display name\n\
- from_email: the spoofed sender address\n\
- body: the email body as simple HTML\n\
- explanation: the red flags a trainee should have noticed and which findings were used\n\
Do not wrap it in markdown and do not add any other text.\n\n\
OSINT findings:\n{findings}",
        name = subject.full_name(),
        email = subject.email(),
        domain = subject.domain(),
        findings = findings,
    )
}

/// Validate an oracle reply against the phishing schema.
pub fn parse_phishing_artifact(text: &str) -> Result<PhishingArtifact, ExtractionError> {
    let map = parse_json_object(text)?;
    Ok(PhishingArtifact {
        subject: require_string(&map, "subject")?,
        from_name: require_string(&map, "from_name")?,
        from_email: require_string(&map, "from_email")?,
        body: require_string(&map, "body")?,
        explanation: require_string(&map, "explanation")?,
    })
}

pub struct PhishingSynthesizer {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
    max_findings_chars: usize,
}

impl PhishingSynthesizer {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration, max_findings_chars: usize) -> Self {
        Self {
            provider,
            timeout,
            max_findings_chars,
        }
    }

    pub async fn synthesize(
        &self,
        subject: &Subject,
        findings: &str,
        cancel: &CancellationToken,
    ) -> Result<PhishingArtifact, ExtractionError> {
        let findings = truncate_findings(findings, self.max_findings_chars);
        tracing::info!(
            "[Phishing] generating simulation for {} ({} chars of findings)",
            subject.email(),
            findings.chars().count()
        );

        let reply = complete_text(
            self.provider.as_ref(),
            build_phishing_prompt(subject, findings),
            Some(PHISHING_SYSTEM_PROMPT.to_string()),
            LlmRequestOptions::default(),
            self.timeout,
            cancel,
        )
        .await
        .map_err(|e| ExtractionError::oracle(&e))?;

        parse_phishing_artifact(&reply).inspect_err(|e| {
            tracing::warn!("[Phishing] rejected oracle reply: {}", e);
        })
    }
}
