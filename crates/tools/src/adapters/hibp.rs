//! HaveIBeenPwned adapter: breach lookup for an email address.
//!
//! Requires an API key. "Not found" is an ordinary negative result; only
//! transport, auth and quota problems are reported as failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::error::ToolError;
use crate::executor::ToolResult;
use crate::trait_def::OsintTool;

pub const BREACH_TOOL_NAME: &str = "HaveIBeenPwned";

pub const BREACH_NOT_FOUND: &str = "Email not found in any known breaches.";

pub const DEFAULT_HIBP_BASE_URL: &str = "https://haveibeenpwned.com/api/v3";

const DESCRIPTION: &str = "Use this to check whether an email address appears in known data breaches. \
Call it with the email address only.";

#[derive(Debug, Clone)]
pub struct HibpConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for HibpConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_HIBP_BASE_URL.to_string(),
            user_agent: "AIDEN-OSINT-Agent".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

pub struct HibpTool {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

/// Subset of the breach model returned with `truncateResponse=false`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BreachRecord {
    name: String,
    #[serde(default)]
    breach_date: Option<String>,
    #[serde(default)]
    data_classes: Vec<String>,
}

impl HibpTool {
    pub fn new(config: HibpConfig) -> Result<Self, ToolError> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ToolError::configuration(BREACH_TOOL_NAME, "HIBP_API_KEY is not set"))?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            api_key,
            base_url: config.base_url,
            user_agent: config.user_agent,
            timeout: config.timeout,
        })
    }

    fn lookup_url(&self, email: &str) -> Result<Url, String> {
        let mut url = Url::parse(self.base_url.trim_end_matches('/'))
            .map_err(|e| format!("invalid base URL: {}", e))?;
        url.path_segments_mut()
            .map_err(|_| "invalid base URL: cannot hold a path".to_string())?
            .push("breachedaccount")
            .push(email);
        url.query_pairs_mut().append_pair("truncateResponse", "false");
        Ok(url)
    }
}

/// Map an HTTP status and body to the observation text.
pub fn format_breach_response(status: u16, body: &str) -> ToolResult {
    match status {
        200 => match serde_json::from_str::<Vec<BreachRecord>>(body) {
            Ok(breaches) if breaches.is_empty() => ToolResult::ok(BREACH_NOT_FOUND),
            Ok(breaches) => {
                let names = breaches
                    .iter()
                    .map(|b| b.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                let noun = if breaches.len() == 1 { "breach" } else { "breaches" };
                let mut lines = vec![format!("Found in {} {}: {}", breaches.len(), noun, names)];
                for breach in &breaches {
                    let date = breach.breach_date.as_deref().unwrap_or("unknown date");
                    if breach.data_classes.is_empty() {
                        lines.push(format!("- {} ({})", breach.name, date));
                    } else {
                        lines.push(format!(
                            "- {} ({}): {}",
                            breach.name,
                            date,
                            breach.data_classes.join(", ")
                        ));
                    }
                }
                ToolResult::ok(lines.join("\n"))
            }
            Err(e) => ToolResult::err(format!("Breach lookup error: unexpected response ({})", e)),
        },
        404 => ToolResult::ok(BREACH_NOT_FOUND),
        401 => ToolResult::err("Breach lookup error: invalid API key"),
        429 => ToolResult::err("Breach lookup error: rate limited"),
        other => ToolResult::err(format!("Breach lookup error: HTTP {}", other)),
    }
}

fn clean_email(input: &str) -> Option<&str> {
    let email = input
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '<' | '>'));
    let (local, domain) = email.split_once('@')?;
    if local.is_empty() || domain.is_empty() || email.contains(char::is_whitespace) {
        return None;
    }
    Some(email)
}

#[async_trait]
impl OsintTool for HibpTool {
    fn name(&self) -> &str {
        BREACH_TOOL_NAME
    }

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn timeout(&self) -> Duration {
        self.timeout.saturating_add(Duration::from_secs(5))
    }

    async fn invoke(&self, input: &str, _cancel: &CancellationToken) -> ToolResult {
        let Some(email) = clean_email(input) else {
            return ToolResult::err(format!(
                "Breach lookup error: '{}' is not an email address",
                input.trim()
            ));
        };
        let url = match self.lookup_url(email) {
            Ok(url) => url,
            Err(message) => return ToolResult::err(format!("Breach lookup error: {}", message)),
        };

        tracing::info!("[Tool:{}] looking up {}", BREACH_TOOL_NAME, email);
        let response = match self
            .client
            .get(url)
            .header("hibp-api-key", &self.api_key)
            .header("user-agent", &self.user_agent)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("[Tool:{}] request failed: {}", BREACH_TOOL_NAME, e);
                return ToolResult::err(format!("Breach lookup error: {}", e));
            }
        };

        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return ToolResult::err(format!("Breach lookup error: {}", e)),
        };
        format_breach_response(status, &body)
    }
}
