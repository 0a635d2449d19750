//! Structured Rank Extractor
//!
//! Asks the oracle to score a session's findings and validates the reply
//! into a `RankedReport`. A reply that does not satisfy the schema is an
//! `ExtractionError`; fields are never defaulted. No retries here.

use std::sync::Arc;
use std::time::Duration;

use aiden_osint_llm::{complete_text, LlmProvider, LlmRequestOptions};
use tokio_util::sync::CancellationToken;

use crate::models::report::{RankedReport, RiskLevel};
use crate::services::extraction::{
    parse_json_object, require_score, require_string, require_string_list,
};
use crate::utils::error::ExtractionError;

const RANK_SYSTEM_PROMPT: &str = "You are a security analyst preparing an internal security \
awareness report. You answer with a single JSON object and nothing else.";

/// Build the ranking prompt for `findings`.
pub fn build_rank_prompt(findings: &str) -> String {
    format!(
        "Rank the following OSINT data for a security awareness report:\n\
- accuracy: integer 1-10, based on source credibility\n\
- usefulness: integer 1-10, value for training (e.g. phishing risk, data exposure)\n\
- risk_level: one of \"Low\", \"Medium\", \"High\", \"Critical\"\n\
- key_findings: list of short strings, the concrete exposures found\n\
- training_recommendations: list of short strings\n\n\
Answer with ONLY a JSON object with exactly these five keys. \
Do not wrap it in markdown and do not add any other text.\n\n\
Data:\n{}",
        findings
    )
}

/// Validate an oracle reply against the report schema.
pub fn parse_ranked_report(text: &str) -> Result<RankedReport, ExtractionError> {
    let map = parse_json_object(text)?;
    let accuracy = require_score(&map, "accuracy")?;
    let usefulness = require_score(&map, "usefulness")?;
    let raw_level = require_string(&map, "risk_level")?;
    let risk_level =
        RiskLevel::parse(&raw_level).ok_or_else(|| ExtractionError::invalid_risk_level(&raw_level))?;
    let key_findings = require_string_list(&map, "key_findings")?;
    let training_recommendations = require_string_list(&map, "training_recommendations")?;

    Ok(RankedReport {
        accuracy,
        usefulness,
        risk_level,
        key_findings,
        training_recommendations,
    })
}

pub struct RankExtractor {
    provider: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl RankExtractor {
    pub fn new(provider: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Score `findings`. Empty findings are still sent; the oracle decides.
    pub async fn rank(
        &self,
        findings: &str,
        cancel: &CancellationToken,
    ) -> Result<RankedReport, ExtractionError> {
        tracing::info!("[Rank] ranking {} chars of findings", findings.chars().count());
        let reply = complete_text(
            self.provider.as_ref(),
            build_rank_prompt(findings),
            Some(RANK_SYSTEM_PROMPT.to_string()),
            LlmRequestOptions::default(),
            self.timeout,
            cancel,
        )
        .await
        .map_err(|e| ExtractionError::oracle(&e))?;

        match parse_ranked_report(&reply) {
            Ok(report) => {
                tracing::info!(
                    "[Rank] accuracy={} usefulness={} risk={}",
                    report.accuracy,
                    report.usefulness,
                    report.risk_level
                );
                Ok(report)
            }
            Err(e) => {
                tracing::warn!("[Rank] rejected oracle reply: {}", e);
                tracing::debug!("[Rank] rejected reply text: {}", reply);
                Err(e)
            }
        }
    }
}
