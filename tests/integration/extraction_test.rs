//! Structured Extraction Integration Tests
//!
//! Rank extractor and phishing synthesizer against a scripted oracle:
//! - valid replies produce fully populated values
//! - every rejection is typed (empty / malformed / missing / out of range)
//! - oracle transport failures surface as `oracle` extraction errors
//! - findings are prefix-cut before reaching the phishing prompt

use std::time::Duration;

use aiden_osint::models::report::RiskLevel;
use aiden_osint::services::phishing::PhishingSynthesizer;
use aiden_osint::services::ranking::RankExtractor;
use aiden_osint::utils::error::ExtractionErrorKind;
use aiden_osint_core::Subject;
use aiden_osint_llm::LlmError;
use tokio_util::sync::CancellationToken;

use crate::common::{failing_provider, ranked_json, ScriptedProvider, PHISHING_JSON};

const TIMEOUT: Duration = Duration::from_secs(5);

fn subject() -> Subject {
    Subject::from_email("Jane Doe", "jane@acme.com").unwrap()
}

// ============================================================================
// Rank extractor
// ============================================================================

#[tokio::test]
async fn test_rank_returns_full_report() {
    let provider = ScriptedProvider::new([ranked_json(7, 8, "Medium", &["Two public hosts"])]);
    let report = RankExtractor::new(provider.clone(), TIMEOUT)
        .rank("Observation: mail.acme.com", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.accuracy, 7);
    assert_eq!(report.usefulness, 8);
    assert_eq!(report.risk_level, RiskLevel::Medium);
    assert_eq!(report.key_findings, vec!["Two public hosts"]);

    let call = &provider.calls()[0];
    assert!(call.prompt.contains("Data:\nObservation: mail.acme.com"));
    assert!(call.system.is_some());
}

#[tokio::test]
async fn test_rank_accepts_empty_findings() {
    let provider = ScriptedProvider::new([ranked_json(1, 1, "Low", &[])]);
    let report = RankExtractor::new(provider, TIMEOUT)
        .rank("", &CancellationToken::new())
        .await
        .unwrap();
    assert!(report.key_findings.is_empty());
    assert_eq!(report.risk_level, RiskLevel::Low);
}

#[tokio::test]
async fn test_rank_never_returns_partial_reports() {
    let cases = [
        (String::new(), ExtractionErrorKind::Empty),
        (
            "Accuracy: 8\nUsefulness: 9\nThe data looks credible.".to_string(),
            ExtractionErrorKind::Malformed,
        ),
        (
            r#"{"accuracy": 8, "usefulness": 9, "risk_level": "High", "key_findings": []}"#.to_string(),
            ExtractionErrorKind::MissingField,
        ),
        (ranked_json(0, 9, "High", &[]), ExtractionErrorKind::OutOfRange),
        (ranked_json(8, 9, "Extreme", &[]), ExtractionErrorKind::InvalidRiskLevel),
    ];

    for (reply, expected) in cases {
        let provider = ScriptedProvider::new([reply.clone()]);
        let err = RankExtractor::new(provider, TIMEOUT)
            .rank("findings", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, expected, "reply: {:?}", reply);
    }
}

#[tokio::test]
async fn test_rank_oracle_failure_is_typed() {
    let provider = failing_provider(LlmError::RateLimited {
        message: "slow down".to_string(),
    });
    let err = RankExtractor::new(provider, TIMEOUT)
        .rank("findings", &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ExtractionErrorKind::Oracle);
    assert_eq!(err.kind.tag(), "oracle");
}

// ============================================================================
// Phishing synthesizer
// ============================================================================

#[tokio::test]
async fn test_synthesize_returns_all_fields() {
    let provider = ScriptedProvider::new([PHISHING_JSON]);
    let artifact = PhishingSynthesizer::new(provider.clone(), TIMEOUT, 4000)
        .synthesize(&subject(), "Found in 1 breach: Adobe", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(artifact.subject, "Urgent: verify your Adobe account");
    assert_eq!(artifact.from_email, "helpdesk@acme-support.com");
    assert!(!artifact.explanation.is_empty());

    let call = &provider.calls()[0];
    assert!(call.prompt.contains("simulated"));
    assert!(call.prompt.contains("Found in 1 breach: Adobe"));
}

#[tokio::test]
async fn test_synthesize_truncates_findings_deterministically() {
    let findings = format!("{}SECRET_TAIL", "x".repeat(50));

    let mut prompts = Vec::new();
    for _ in 0..2 {
        let provider = ScriptedProvider::new([PHISHING_JSON]);
        PhishingSynthesizer::new(provider.clone(), TIMEOUT, 50)
            .synthesize(&subject(), &findings, &CancellationToken::new())
            .await
            .unwrap();
        prompts.push(provider.calls()[0].prompt.clone());
    }

    assert_eq!(prompts[0], prompts[1]);
    assert!(!prompts[0].contains("SECRET_TAIL"));
    assert!(prompts[0].ends_with(&"x".repeat(50)));
}

#[tokio::test]
async fn test_synthesize_distinguishes_empty_from_malformed() {
    let provider = ScriptedProvider::new([""]);
    let err = PhishingSynthesizer::new(provider, TIMEOUT, 4000)
        .synthesize(&subject(), "findings", &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ExtractionErrorKind::Empty);

    let provider = ScriptedProvider::new(["Subject: Verify your account\n\nDear Jane, ..."]);
    let err = PhishingSynthesizer::new(provider, TIMEOUT, 4000)
        .synthesize(&subject(), "findings", &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ExtractionErrorKind::Malformed);
}

#[tokio::test]
async fn test_synthesize_rejects_missing_field() {
    let reply = PHISHING_JSON.replace("\"from_name\": \"Acme IT Helpdesk\",", "");
    let provider = ScriptedProvider::new([reply]);
    let err = PhishingSynthesizer::new(provider, TIMEOUT, 4000)
        .synthesize(&subject(), "findings", &CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ExtractionErrorKind::MissingField);
    assert!(err.message.contains("from_name"));
}
