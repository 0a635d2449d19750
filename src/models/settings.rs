//! Settings Models
//!
//! Service configuration. Values come from, in increasing precedence:
//! built-in defaults, an optional TOML file named by `AIDEN_CONFIG`, and
//! environment variables (a `.env` file is loaded into the environment by
//! the binary before any of this runs).

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use aiden_osint_llm::ProviderConfig;
use aiden_osint_tools::adapters::{
    HarvesterConfig, HibpConfig, SherlockConfig, DEFAULT_HARVESTER_SOURCES, DEFAULT_HIBP_BASE_URL,
};
use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};

/// Environment variable naming the optional TOML config file
pub const CONFIG_PATH_ENV: &str = "AIDEN_CONFIG";

/// Upper bound for every configured timeout (one day)
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    /// OpenAI-compatible endpoint; `None` means api.openai.com
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Deadline for one oracle call
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: "gpt-4o".to_string(),
            temperature: 0.2,
            max_tokens: 2048,
            timeout_secs: 60,
        }
    }
}

impl LlmSettings {
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout_secs: self.timeout_secs,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Cap on oracle decision calls per session, parse retries included
    pub max_iterations: usize,
    /// Consecutive unusable replies tolerated before aborting
    pub max_parse_retries: usize,
    /// Final answers shorter than this trigger the fallback
    pub fallback_min_chars: usize,
    /// Per-observation cap on tool output kept in the trace
    pub max_observation_chars: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 6,
            max_parse_retries: 2,
            fallback_min_chars: 30,
            max_observation_chars: 8000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub harvester_dir: PathBuf,
    pub harvester_python: String,
    pub harvester_sources: String,
    pub harvester_limit: u32,
    pub harvester_timeout_secs: u64,
    pub sherlock_bin: String,
    pub sherlock_timeout_secs: u64,
    pub sherlock_site_timeout_secs: u64,
    pub hibp_api_key: Option<String>,
    pub hibp_base_url: String,
    pub hibp_timeout_secs: u64,
    pub hibp_user_agent: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            harvester_dir: PathBuf::from("theHarvester"),
            harvester_python: "python".to_string(),
            harvester_sources: DEFAULT_HARVESTER_SOURCES.to_string(),
            harvester_limit: 300,
            harvester_timeout_secs: 180,
            sherlock_bin: "sherlock".to_string(),
            sherlock_timeout_secs: 60,
            sherlock_site_timeout_secs: 10,
            hibp_api_key: None,
            hibp_base_url: DEFAULT_HIBP_BASE_URL.to_string(),
            hibp_timeout_secs: 20,
            hibp_user_agent: "AIDEN-OSINT-Agent".to_string(),
        }
    }
}

impl ToolSettings {
    pub fn harvester_config(&self) -> HarvesterConfig {
        HarvesterConfig {
            python: self.harvester_python.clone(),
            working_dir: self.harvester_dir.clone(),
            limit: self.harvester_limit,
            sources: self.harvester_sources.clone(),
            timeout: Duration::from_secs(self.harvester_timeout_secs),
        }
    }

    pub fn sherlock_config(&self) -> SherlockConfig {
        SherlockConfig {
            program: self.sherlock_bin.clone(),
            per_username_timeout: Duration::from_secs(self.sherlock_timeout_secs),
            site_timeout_secs: self.sherlock_site_timeout_secs,
        }
    }

    pub fn hibp_config(&self) -> HibpConfig {
        HibpConfig {
            api_key: self.hibp_api_key.clone(),
            base_url: self.hibp_base_url.clone(),
            user_agent: self.hibp_user_agent.clone(),
            timeout: Duration::from_secs(self.hibp_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhishingSettings {
    /// Findings are prefix-cut to this many chars before prompting
    pub max_findings_chars: usize,
}

impl Default for PhishingSettings {
    fn default() -> Self {
        Self {
            max_findings_chars: 4000,
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub agent: AgentSettings,
    pub tools: ToolSettings,
    pub phishing: PhishingSettings,
}

impl AppConfig {
    /// Load from the process environment: TOML file (if `AIDEN_CONFIG` is
    /// set) then environment overrides.
    pub fn load() -> AppResult<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
        Self::load_with(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load with an explicit file and variable lookup.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(lookup)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; absent keys keep their defaults.
    pub fn load_from_file(path: &Path) -> AppResult<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| AppError::config(format!("invalid config file {}: {}", path.display(), e)))
    }

    /// Apply environment overrides. Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Some(model) = get("AIDEN_MODEL") {
            self.llm.model = model;
        }
        if let Some(key) = get("HIBP_API_KEY") {
            self.tools.hibp_api_key = Some(key);
        }
        if let Some(host) = get("AIDEN_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("AIDEN_PORT") {
            self.server.port = parse_env("AIDEN_PORT", &port)?;
        }
        if let Some(dir) = get("THEHARVESTER_DIR") {
            self.tools.harvester_dir = PathBuf::from(dir);
        }
        if let Some(bin) = get("SHERLOCK_BIN") {
            self.tools.sherlock_bin = bin;
        }
        if let Some(iterations) = get("AIDEN_MAX_ITERATIONS") {
            self.agent.max_iterations = parse_env("AIDEN_MAX_ITERATIONS", &iterations)?;
        }
        Ok(())
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> AppResult<()> {
        if self
            .llm
            .api_key
            .as_deref()
            .map_or(true, |key| key.trim().is_empty())
        {
            return Err(AppError::config("OPENAI_API_KEY is not set"));
        }
        if self.llm.model.trim().is_empty() {
            return Err(AppError::config("llm.model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AppError::config(format!(
                "llm.temperature must be between 0 and 2, got {}",
                self.llm.temperature
            )));
        }
        check_timeout("llm.timeout_secs", self.llm.timeout_secs)?;
        if self.agent.max_iterations == 0 {
            return Err(AppError::config("agent.max_iterations must be at least 1"));
        }
        if self.agent.max_observation_chars == 0 {
            return Err(AppError::config("agent.max_observation_chars must be positive"));
        }
        if self.phishing.max_findings_chars == 0 {
            return Err(AppError::config("phishing.max_findings_chars must be positive"));
        }
        check_timeout("tools.harvester_timeout_secs", self.tools.harvester_timeout_secs)?;
        check_timeout("tools.sherlock_timeout_secs", self.tools.sherlock_timeout_secs)?;
        check_timeout("tools.sherlock_site_timeout_secs", self.tools.sherlock_site_timeout_secs)?;
        check_timeout("tools.hibp_timeout_secs", self.tools.hibp_timeout_secs)?;
        Ok(())
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn check_timeout(key: &str, secs: u64) -> AppResult<()> {
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(AppError::config(format!(
            "{} must be between 1 and {}, got {}",
            key, MAX_TIMEOUT_SECS, secs
        )));
    }
    Ok(())
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::config(format!("{} has an invalid value: '{}'", key, value)))
}
