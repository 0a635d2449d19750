//! Shared test doubles: a scripted oracle and canned tools.

use std::sync::{Arc, Mutex};

use aiden_osint::models::settings::AppConfig;
use aiden_osint::state::AppState;
use aiden_osint_llm::{
    LlmError, LlmProvider, LlmRequestOptions, LlmResponse, LlmResult, Message, ProviderConfig,
};
use aiden_osint_tools::adapters::{BREACH_TOOL_NAME, HARVESTER_TOOL_NAME, SHERLOCK_TOOL_NAME};
use aiden_osint_tools::{FunctionTool, ToolRegistry, ToolResult};
use async_trait::async_trait;

/// A prompt the oracle received, with the system prompt it came with.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub system: Option<String>,
    pub stop: Vec<String>,
}

/// Oracle that replays queued replies in order and records every call.
///
/// Once the queue is empty it keeps answering with text that matches no
/// expected format.
pub struct ScriptedProvider {
    replies: Mutex<Vec<LlmResult<String>>>,
    calls: Mutex<Vec<RecordedCall>>,
    config: ProviderConfig,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())).collect())
    }

    pub fn with_results(replies: Vec<LlmResult<String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
            config: ProviderConfig::default(),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }

    async fn send_message(
        &self,
        messages: Vec<Message>,
        system: Option<String>,
        request_options: LlmRequestOptions,
    ) -> LlmResult<LlmResponse> {
        let prompt = messages
            .into_iter()
            .map(|m| m.content)
            .collect::<Vec<_>>()
            .join("\n");
        self.calls.lock().unwrap().push(RecordedCall {
            prompt,
            system,
            stop: request_options.stop,
        });

        let next = {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                None
            } else {
                Some(replies.remove(0))
            }
        };
        match next {
            Some(Ok(text)) => Ok(LlmResponse::from_text(text, "scripted-model")),
            Some(Err(e)) => Err(e),
            None => Ok(LlmResponse::from_text("I am not sure what to do.", "scripted-model")),
        }
    }

    fn config(&self) -> &ProviderConfig {
        &self.config
    }
}

/// Oracle whose every call fails with the given error.
pub fn failing_provider(error: LlmError) -> Arc<ScriptedProvider> {
    ScriptedProvider::with_results((0..32).map(|_| Err(error.clone())).collect())
}

/// A tool that always returns `result`.
pub fn canned_tool(name: &str, description: &str, result: ToolResult) -> Arc<FunctionTool> {
    Arc::new(FunctionTool::new(name, description, move |_| {
        let result = result.clone();
        Box::pin(async move { result })
    }))
}

/// The three reconnaissance tools with fixed outputs.
pub fn canned_registry(harvester: ToolResult, sherlock: ToolResult, breach: ToolResult) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(canned_tool(HARVESTER_TOOL_NAME, "Domain data", harvester));
    registry.register(canned_tool(SHERLOCK_TOOL_NAME, "Social accounts", sherlock));
    registry.register(canned_tool(BREACH_TOOL_NAME, "Breach lookup", breach));
    registry
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.llm.api_key = Some("test-key".to_string());
    config
}

pub fn test_state(provider: Arc<ScriptedProvider>, registry: ToolRegistry) -> AppState {
    AppState::new(provider, registry, test_config())
}

pub fn action(thought: &str, tool: &str, input: &str) -> String {
    format!("{}\nAction: {}\nAction Input: {}", thought, tool, input)
}

pub fn final_answer(answer: &str) -> String {
    format!("I now know the final answer\nFinal Answer: {}", answer)
}

pub fn ranked_json(accuracy: u8, usefulness: u8, risk: &str, findings: &[&str]) -> String {
    serde_json::json!({
        "accuracy": accuracy,
        "usefulness": usefulness,
        "risk_level": risk,
        "key_findings": findings,
        "training_recommendations": ["Review what personal data is public"],
    })
    .to_string()
}

pub const PHISHING_JSON: &str = r#"{
    "subject": "Urgent: verify your Adobe account",
    "from_name": "Acme IT Helpdesk",
    "from_email": "helpdesk@acme-support.com",
    "body": "<p>Hi Jane,</p><p>Your account was part of a recent incident.</p>",
    "explanation": "Look-alike sender domain, urgency, and a breach the target really was in."
}"#;
