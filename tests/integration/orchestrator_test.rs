//! Agent Loop Integration Tests
//!
//! Drives `AgenticLoop` and the fallback against a scripted oracle and
//! canned tools:
//! - tool observations flow back into the next prompt
//! - unknown tools and tool timeouts become failure observations
//! - iteration cap and parse budget end the run as `Aborted`
//! - cancellation stops the run between steps

use std::sync::Arc;
use std::time::Duration;

use aiden_osint::models::trace::{AbortReason, Termination, TraceStep};
use aiden_osint::services::orchestrator::{AgenticLoop, LoopConfig};
use aiden_osint::utils::error::AppError;
use aiden_osint_tools::adapters::{BREACH_TOOL_NAME, HARVESTER_TOOL_NAME};
use aiden_osint_tools::{FunctionTool, ToolRegistry, ToolResult, OBSERVATION_STOP};
use tokio_util::sync::CancellationToken;

use crate::common::{action, canned_registry, final_answer, ScriptedProvider};

fn registry() -> Arc<ToolRegistry> {
    Arc::new(canned_registry(
        ToolResult::ok("mail.acme.com\nvpn.acme.com"),
        ToolResult::ok("No accounts found for any username variant."),
        ToolResult::ok("Found in 1 breach: Adobe"),
    ))
}

fn config(max_iterations: usize) -> LoopConfig {
    LoopConfig {
        max_iterations,
        ..Default::default()
    }
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn test_multi_tool_run_records_trace_in_order() {
    let provider = ScriptedProvider::new([
        action("Start with the domain", HARVESTER_TOOL_NAME, "acme.com"),
        action("Check breaches", BREACH_TOOL_NAME, "jane@acme.com"),
        final_answer("acme.com exposes mail and VPN hosts; jane@acme.com was in the Adobe breach."),
    ]);
    let outcome = AgenticLoop::new(provider.clone(), registry(), config(6))
        .run("Fetch OSINT on Jane Doe", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.oracle_calls, 3);
    let tools: Vec<_> = outcome
        .trace
        .observations()
        .map(|o| o.tool_name.as_str())
        .collect();
    assert_eq!(tools, vec![HARVESTER_TOOL_NAME, BREACH_TOOL_NAME]);
    assert!(matches!(
        outcome.trace.steps().last(),
        Some(TraceStep::FinalAnswer { .. })
    ));

    let calls = provider.calls();
    assert_eq!(calls.len(), 3);
    // every decision call asks the oracle to stop before inventing observations
    assert!(calls.iter().all(|c| c.stop == vec![OBSERVATION_STOP.to_string()]));
    assert!(calls[0].prompt.contains("Question: Fetch OSINT on Jane Doe"));
    assert!(calls[2].prompt.contains("Observation: mail.acme.com\nvpn.acme.com"));
    assert!(calls[2].prompt.contains("Observation: Found in 1 breach: Adobe"));
}

#[tokio::test]
async fn test_hallucinated_observation_is_ignored() {
    let provider = ScriptedProvider::new([
        format!(
            "{}\nObservation: the oracle made this up\nFinal Answer: nothing",
            action("Scan", HARVESTER_TOOL_NAME, "acme.com")
        ),
        final_answer("acme.com exposes mail and VPN hosts to the internet."),
    ]);
    let outcome = AgenticLoop::new(provider, registry(), config(6))
        .run("q", &CancellationToken::new())
        .await
        .unwrap();

    let observation = outcome.trace.observations().next().unwrap();
    assert_eq!(observation.output, "mail.acme.com\nvpn.acme.com");
    assert!(!outcome.trace.render_raw_results().contains("made this up"));
}

#[tokio::test]
async fn test_marker_words_in_thought_do_not_end_the_run() {
    let provider = ScriptedProvider::new([
        "Thought: Before I give a final answer: I should check breaches.\nAction: HaveIBeenPwned\nAction Input: jane@acme.com"
            .to_string(),
        final_answer("jane@acme.com was in the Adobe breach."),
    ]);
    let outcome = AgenticLoop::new(provider, registry(), config(6))
        .run("q", &CancellationToken::new())
        .await
        .unwrap();

    assert!(!outcome.termination.is_aborted());
    assert_eq!(outcome.oracle_calls, 2);
    let observation = outcome.trace.observations().next().unwrap();
    assert_eq!(observation.tool_name, BREACH_TOOL_NAME);
    assert_eq!(observation.input, "jane@acme.com");
    assert_eq!(observation.output, "Found in 1 breach: Adobe");
}

// ============================================================================
// Tool failures are observations
// ============================================================================

#[tokio::test]
async fn test_unknown_tool_becomes_failed_observation() {
    let provider = ScriptedProvider::new([
        action("Try LinkedIn", "LinkedInScraper", "Jane Doe"),
        final_answer("LinkedIn is not available; no further findings were gathered."),
    ]);
    let outcome = AgenticLoop::new(provider, registry(), config(6))
        .run("q", &CancellationToken::new())
        .await
        .unwrap();

    assert!(!outcome.termination.is_aborted());
    let observation = outcome.trace.observations().next().unwrap();
    assert!(!observation.succeeded);
    assert!(observation
        .output
        .starts_with("Unknown tool 'LinkedInScraper'. Available tools: "));
}

#[tokio::test]
async fn test_tool_timeout_becomes_failed_observation() {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(
        FunctionTool::new(HARVESTER_TOOL_NAME, "Domain data", |_| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                ToolResult::ok("too late")
            })
        })
        .with_timeout(Duration::from_millis(50)),
    ));
    let provider = ScriptedProvider::new([
        action("Scan", HARVESTER_TOOL_NAME, "acme.com"),
        final_answer("The domain scan timed out so nothing could be gathered."),
    ]);
    let outcome = AgenticLoop::new(provider.clone(), Arc::new(registry), config(6))
        .run("q", &CancellationToken::new())
        .await
        .unwrap();

    let observation = outcome.trace.observations().next().unwrap();
    assert!(!observation.succeeded);
    assert!(observation.output.contains("timed out"));
    // the loop went back to Thinking and finished normally
    assert_eq!(provider.calls().len(), 2);
    assert!(!outcome.termination.is_aborted());
}

// ============================================================================
// Bounds
// ============================================================================

#[tokio::test]
async fn test_iteration_cap_is_never_exceeded() {
    for cap in [1usize, 3, 6] {
        let replies: Vec<String> = (0..20)
            .map(|_| action("again", HARVESTER_TOOL_NAME, "acme.com"))
            .collect();
        let provider = ScriptedProvider::new(replies);
        let outcome = AgenticLoop::new(provider.clone(), registry(), config(cap))
            .run("q", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(provider.calls().len(), cap);
        assert_eq!(
            outcome.termination,
            Termination::Aborted {
                reason: AbortReason::IterationCap { iterations: cap }
            }
        );
    }
}

#[tokio::test]
async fn test_parse_retry_recovers() {
    let provider = ScriptedProvider::new([
        "Let me think about this for a while.".to_string(),
        final_answer("acme.com has a public mail server and a VPN endpoint."),
    ]);
    let outcome = AgenticLoop::new(provider.clone(), registry(), config(6))
        .run("q", &CancellationToken::new())
        .await
        .unwrap();

    assert!(!outcome.termination.is_aborted());
    let calls = provider.calls();
    assert!(calls[1].prompt.contains("did not follow the required format"));
    assert!(!calls[1].prompt.contains("Let me think about this"));
}

#[tokio::test]
async fn test_parse_budget_exhausted_aborts() {
    let provider = ScriptedProvider::new(Vec::<String>::new());
    let loop_config = LoopConfig {
        max_parse_retries: 1,
        ..Default::default()
    };
    let outcome = AgenticLoop::new(provider.clone(), registry(), loop_config)
        .run("q", &CancellationToken::new())
        .await
        .unwrap();

    match outcome.termination {
        Termination::Aborted {
            reason: AbortReason::ParseFailures { attempts, last_error },
        } => {
            assert_eq!(attempts, 2);
            assert!(!last_error.is_empty());
        }
        other => panic!("unexpected termination: {:?}", other),
    }
    assert_eq!(provider.calls().len(), 2);
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_during_tool_call_stops_the_run() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FunctionTool::new(HARVESTER_TOOL_NAME, "Domain data", move |_| {
        let trigger = trigger.clone();
        Box::pin(async move {
            trigger.cancel();
            tokio::time::sleep(Duration::from_secs(30)).await;
            ToolResult::ok("never seen")
        })
    })));
    let provider = ScriptedProvider::new([
        action("Scan", HARVESTER_TOOL_NAME, "acme.com"),
        final_answer("unreachable"),
    ]);

    let err = AgenticLoop::new(provider.clone(), Arc::new(registry), config(6))
        .run("q", &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Orchestration(ref m) if m == "cancelled"));
    // no oracle call after the cancelled tool
    assert_eq!(provider.calls().len(), 1);
}
