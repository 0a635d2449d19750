//! End-to-End Scenario Tests
//!
//! Full `gather_osint` runs through the command layer. Where the platform
//! allows it the real adapters are used: TheHarvester and Sherlock run a
//! stand-in executable, and the breach lookup talks to a local HTTP stub.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use aiden_osint::commands::gather_osint;
use aiden_osint::models::report::{RankedReport, RiskLevel};
use aiden_osint::models::response::GatherOsintRequest;
use aiden_osint::state::AppState;
use aiden_osint::utils::error::AppError;
use aiden_osint_tools::adapters::{
    HibpConfig, HibpTool, BREACH_NOT_FOUND, BREACH_TOOL_NAME, HARVESTER_NO_DATA, HARVESTER_TOOL_NAME,
    SHERLOCK_NO_ACCOUNTS, SHERLOCK_TOOL_NAME,
};
use aiden_osint_tools::{FunctionTool, ToolRegistry, ToolResult};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;

use crate::common::{
    action, canned_registry, canned_tool, final_answer, ranked_json, test_config, test_state,
    ScriptedProvider,
};

fn jane_doe() -> GatherOsintRequest {
    GatherOsintRequest {
        full_name: "Jane Doe".to_string(),
        email: "jane@acme.com".to_string(),
        domain: "acme.com".to_string(),
    }
}

/// Serve `GET /api/v3/breachedaccount/:email` with a fixed reply.
async fn spawn_breach_stub(status: StatusCode, body: &'static str) -> String {
    let app = Router::new().route(
        "/api/v3/breachedaccount/:email",
        get(move || async move { (status, body) }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/v3", addr)
}

fn breach_tool(base_url: String) -> Arc<HibpTool> {
    Arc::new(
        HibpTool::new(HibpConfig {
            api_key: Some("test-key".to_string()),
            base_url,
            timeout: Duration::from_secs(5),
            ..Default::default()
        })
        .unwrap(),
    )
}

fn parsed(ranked: &str) -> RankedReport {
    serde_json::from_str(ranked).unwrap()
}

// ============================================================================
// Scenario A: nothing found anywhere
// ============================================================================

#[cfg(unix)]
#[tokio::test]
async fn test_scenario_no_findings_ranks_low() {
    use aiden_osint_tools::adapters::{HarvesterConfig, HarvesterTool, SherlockConfig, SherlockTool};

    // `true` exits 0 with no output: no domain data, no accounts
    let harvester = HarvesterTool::new(HarvesterConfig {
        python: "true".to_string(),
        working_dir: std::env::temp_dir(),
        timeout: Duration::from_secs(10),
        ..Default::default()
    })
    .unwrap();
    let sherlock = SherlockTool::new(SherlockConfig {
        program: "true".to_string(),
        per_username_timeout: Duration::from_secs(10),
        site_timeout_secs: 1,
    })
    .unwrap();
    let base_url = spawn_breach_stub(StatusCode::NOT_FOUND, "").await;

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(harvester));
    registry.register(Arc::new(sherlock));
    registry.register(breach_tool(base_url));

    let provider = ScriptedProvider::new([
        action("Start with the company domain", HARVESTER_TOOL_NAME, "acme.com"),
        action("Look for social accounts", SHERLOCK_TOOL_NAME, "Jane Doe"),
        action("Check known breaches", BREACH_TOOL_NAME, "jane@acme.com"),
        final_answer("No public data, social accounts or breaches were found for Jane Doe."),
        ranked_json(6, 3, "Low", &["No public exposure found"]),
    ]);
    let state = test_state(provider.clone(), registry);

    let response = gather_osint(&state, jane_doe(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(response.raw_results.contains(HARVESTER_NO_DATA));
    assert!(response.raw_results.contains("Checked 8 username variant(s)"));
    assert!(response.raw_results.contains(SHERLOCK_NO_ACCOUNTS));
    assert!(response.raw_results.contains(BREACH_NOT_FOUND));
    assert!(response
        .raw_results
        .contains("Final Answer: No public data, social accounts or breaches were found"));
    assert_eq!(parsed(&response.ranked).risk_level, RiskLevel::Low);

    // the ranking call saw exactly the returned raw results
    let calls = provider.calls();
    assert_eq!(calls.len(), 5);
    assert!(calls[4].prompt.ends_with(&response.raw_results));
}

// ============================================================================
// Scenario B: breaches found
// ============================================================================

const THREE_BREACHES: &str = r#"[
    {"Name": "Adobe", "BreachDate": "2013-10-04", "DataClasses": ["Email addresses", "Passwords"]},
    {"Name": "LinkedIn", "BreachDate": "2012-05-05", "DataClasses": ["Email addresses", "Passwords"]},
    {"Name": "Dropbox", "BreachDate": "2012-07-01", "DataClasses": ["Email addresses"]}
]"#;

#[tokio::test]
async fn test_scenario_breaches_raise_risk() {
    let base_url = spawn_breach_stub(StatusCode::OK, THREE_BREACHES).await;
    let mut registry = ToolRegistry::new();
    registry.register(canned_tool(HARVESTER_TOOL_NAME, "Domain data", ToolResult::ok(HARVESTER_NO_DATA)));
    registry.register(breach_tool(base_url));

    let provider = ScriptedProvider::new([
        action("Check known breaches", BREACH_TOOL_NAME, "jane@acme.com"),
        final_answer("jane@acme.com appears in the Adobe, LinkedIn and Dropbox breaches."),
        ranked_json(
            9,
            9,
            "High",
            &["Credentials exposed in the Adobe, LinkedIn and Dropbox breaches"],
        ),
    ]);
    let state = test_state(provider.clone(), registry);

    let response = gather_osint(&state, jane_doe(), &CancellationToken::new())
        .await
        .unwrap();

    assert!(response
        .raw_results
        .contains("Found in 3 breaches: Adobe, LinkedIn, Dropbox"));
    let report = parsed(&response.ranked);
    assert_ne!(report.risk_level, RiskLevel::Low);
    assert!(report
        .key_findings
        .iter()
        .any(|f| ["Adobe", "LinkedIn", "Dropbox"].iter().any(|b| f.contains(b))));

    let rank_call = provider.calls().pop().unwrap();
    assert!(rank_call.prompt.contains("Found in 3 breaches: Adobe, LinkedIn, Dropbox"));
}

// ============================================================================
// Scenario C: malformed ranking output
// ============================================================================

#[tokio::test]
async fn test_scenario_malformed_rank_is_typed_error_with_partial_results() {
    let registry = canned_registry(
        ToolResult::ok("mail.acme.com"),
        ToolResult::ok(SHERLOCK_NO_ACCOUNTS),
        ToolResult::ok(BREACH_NOT_FOUND),
    );
    let provider = ScriptedProvider::new([
        action("Scan the domain", HARVESTER_TOOL_NAME, "acme.com"),
        final_answer("acme.com exposes a public mail server at mail.acme.com."),
        "Accuracy: 8/10. Usefulness: 7/10. Overall the risk seems moderate.".to_string(),
    ]);
    let state = test_state(provider, registry);

    let err = gather_osint(&state, jane_doe(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), "malformed");
    assert!(matches!(err, AppError::Extraction { .. }));
    let raw = err.raw_results().unwrap();
    assert!(raw.contains("Observation: mail.acme.com"));
}

// ============================================================================
// Scenario D: iteration cap and the fallback
// ============================================================================

/// Harvester stand-in that records every input it receives.
fn recording_harvester(inputs: Arc<Mutex<Vec<String>>>) -> Arc<FunctionTool> {
    Arc::new(FunctionTool::new(HARVESTER_TOOL_NAME, "Domain data", move |input| {
        inputs.lock().unwrap().push(input);
        Box::pin(async { ToolResult::ok("jane.doe@acme.com\nmail.acme.com") })
    }))
}

#[tokio::test]
async fn test_scenario_iteration_cap_triggers_fallback() {
    let inputs = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ToolRegistry::new();
    registry.register(recording_harvester(inputs.clone()));
    registry.register(canned_tool(
        SHERLOCK_TOOL_NAME,
        "Social accounts",
        ToolResult::ok(SHERLOCK_NO_ACCOUNTS),
    ));

    let config = test_config();
    let cap = config.agent.max_iterations;
    let mut replies: Vec<String> = (0..cap)
        .map(|_| action("Keep looking", SHERLOCK_TOOL_NAME, "Jane Doe"))
        .collect();
    replies.push(ranked_json(7, 6, "Medium", &["Email address is public"]));
    let provider = ScriptedProvider::new(replies);
    let state = AppState::new(provider.clone(), registry, config);

    let response = gather_osint(&state, jane_doe(), &CancellationToken::new())
        .await
        .unwrap();

    // cap decision calls plus one ranking call; the fallback never asks the oracle
    assert_eq!(provider.calls().len(), cap + 1);
    assert_eq!(provider.remaining(), 0);
    assert_eq!(*inputs.lock().unwrap(), vec!["acme.com".to_string()]);
    assert!(!response.raw_results.is_empty());
    assert!(response
        .raw_results
        .contains("Fallback Action: TheHarvester\nAction Input: acme.com\nObservation: jane.doe@acme.com"));
}

#[tokio::test]
async fn test_scenario_short_answer_triggers_fallback() {
    let inputs = Arc::new(Mutex::new(Vec::new()));
    let mut registry = ToolRegistry::new();
    registry.register(recording_harvester(inputs.clone()));

    let provider = ScriptedProvider::new([
        final_answer("Nothing."),
        ranked_json(5, 5, "Medium", &["Email address is public"]),
    ]);
    let state = test_state(provider, registry);

    let response = gather_osint(&state, jane_doe(), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(inputs.lock().unwrap().len(), 1);
    assert!(response.raw_results.contains("Final Answer: Nothing."));
    assert!(response.raw_results.contains("Fallback Action: TheHarvester"));
}

#[tokio::test]
async fn test_scenario_failed_fallback_without_findings_is_error() {
    let mut registry = ToolRegistry::new();
    registry.register(canned_tool(
        HARVESTER_TOOL_NAME,
        "Domain data",
        ToolResult::err("Execution error: No such file or directory"),
    ));
    let provider = ScriptedProvider::new(Vec::<String>::new());
    let state = test_state(provider.clone(), registry);

    let err = gather_osint(&state, jane_doe(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Orchestration(_)));
    assert!(err.to_string().contains("No such file or directory"));
    // parse budget exhausted; ranking never ran
    let max_parse_retries = test_config().agent.max_parse_retries;
    assert_eq!(provider.calls().len(), max_parse_retries + 1);
}

// ============================================================================
// Input validation and cancellation
// ============================================================================

#[tokio::test]
async fn test_invalid_subject_is_rejected_before_any_call() {
    let provider = ScriptedProvider::new(Vec::<String>::new());
    let state = test_state(provider.clone(), ToolRegistry::new());
    let request = GatherOsintRequest {
        domain: "not a domain".to_string(),
        ..jane_doe()
    };

    let err = gather_osint(&state, request, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_cancelled_request_reports_cancelled() {
    let provider = ScriptedProvider::new(Vec::<String>::new());
    let state = test_state(provider.clone(), ToolRegistry::new());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = gather_osint(&state, jane_doe(), &cancel).await.unwrap_err();
    assert_eq!(err.to_string(), "Orchestration error: cancelled");
    assert!(provider.calls().is_empty());
}
