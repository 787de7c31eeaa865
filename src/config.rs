//! Configuration management for compose-watch
//!
//! All settings are read once at process entry into a [`WatchConfig`], which
//! is then handed to every component that needs it. Nothing reads the
//! environment after startup.
//!
//! # Environment Variables
//!
//! ## Credentials and integrations
//! - `GEMINI_API_KEY`: model credential; AI analysis is disabled without it
//! - `MY_GITHUB_TOKEN`: optional GitHub token (rate limits only)
//! - `SLACK_WEBHOOK_URL`: optional Slack webhook; notification is skipped without it
//! - `GITHUB_REPOSITORY` / `GITHUB_RUN_ID`: used to link the run log
//!
//! ## compose-watch settings
//! - `COMPOSE_WATCH_BASE_URL`: compose listing root - default: kojipkgs IoT composes
//! - `COMPOSE_WATCH_VERSIONS`: comma-separated versions - default: "43,42,41"
//! - `COMPOSE_WATCH_COMPOSE_PREFIX`: compose directory prefix - default: "Fedora-IoT"
//! - `COMPOSE_WATCH_WATCH_TASK_PREFIX`: watch-task log prefix - default: "IoT"
//! - `COMPOSE_WATCH_KOJI_HOST`: host of Koji task pages - default: "koji.fedoraproject.org"
//! - `COMPOSE_WATCH_KOJI_FILES_BASE`: base for relative task file links
//! - `COMPOSE_WATCH_RETRY_COUNT`: listing fetch attempts - default: "3"
//! - `COMPOSE_WATCH_RETRY_DELAY`: seconds between attempts - default: "60"
//! - `COMPOSE_WATCH_REQUEST_TIMEOUT`: HTTP/model timeout in seconds - default: "60"
//! - `COMPOSE_WATCH_MODEL`: model identifier - default: "gemini-2.5-flash"
//! - `COMPOSE_WATCH_LOG_TAIL_CHARS`: global log tail sent to the model - default: "5000"
//! - `COMPOSE_WATCH_LOG_LEVEL`: logging level - default: "info"
//! - `COMPOSE_WATCH_LOG_JSON`: JSON log output (true|false) - default: "false"
//!
//! # Example
//!
//! ```no_run
//! use compose_watch::WatchConfig;
//!
//! let config = WatchConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("{}", config.run_url());
//! ```

use crate::diagnosis::{AiSummarizer, EscalationSettings};
use crate::fetch::RetryPolicy;
use crate::llm::{GenAIClient, LLMClient};
use reqwest::Url;
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_BASE_URL: &str = "https://kojipkgs.fedoraproject.org/compose/iot/";
const DEFAULT_VERSIONS: &[&str] = &["43", "42", "41"];
const DEFAULT_COMPOSE_PREFIX: &str = "Fedora-IoT";
const DEFAULT_WATCH_TASK_PREFIX: &str = "IoT";
const DEFAULT_KOJI_HOST: &str = "koji.fedoraproject.org";
const DEFAULT_KOJI_FILES_BASE: &str = "https://kojipkgs.fedoraproject.org/";
const DEFAULT_RETRY_COUNT: u32 = 3;
const DEFAULT_RETRY_DELAY_SECS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_LOG_TAIL_CHARS: usize = 5000;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_GITHUB_REPOSITORY: &str = "your/repo";
const DEFAULT_GITHUB_RUN_ID: &str = "local";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// A URL setting is not an absolute URL
    #[error("Invalid URL for {field}: {value}")]
    InvalidUrl { field: String, value: String },

    /// A pattern built from the settings does not compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Main configuration structure for compose-watch
#[derive(Clone)]
pub struct WatchConfig {
    /// Directory listing that holds the compose directories
    pub base_url: String,

    /// Versions to check, in report order
    pub versions: Vec<String>,

    /// Compose directory prefix (`<prefix>-<version>-<date>.<n>/`)
    pub compose_prefix: String,

    /// Watch-task log prefix (`<prefix>-<n>-watch-task.log`)
    pub watch_task_prefix: String,

    /// Host serving Koji task pages
    pub koji_host: String,

    /// Base URL for host-relative links on Koji task pages
    pub koji_files_base: String,

    /// Attempts for the initial listing fetch
    pub retry_count: u32,

    /// Delay between listing attempts in seconds
    pub retry_delay_secs: u64,

    /// Timeout for HTTP and model requests in seconds
    pub request_timeout_secs: u64,

    /// Model identifier
    pub model: String,

    /// Trailing characters of the global log sent to the model
    pub log_tail_chars: usize,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// JSON log output
    pub log_json: bool,

    pub gemini_api_key: Option<String>,

    pub github_token: Option<String>,

    pub slack_webhook_url: Option<String>,

    pub github_repository: String,

    pub github_run_id: String,
}

impl Default for WatchConfig {
    /// Loads the configuration from the process environment
    fn default() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }
}

impl WatchConfig {
    /// Builds the configuration from an arbitrary key lookup
    ///
    /// Empty values count as unset. Unparseable numbers fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let string_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let versions = get("COMPOSE_WATCH_VERSIONS")
            .map(|v| parse_versions(&v))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VERSIONS.iter().map(|v| v.to_string()).collect());

        let retry_count = get("COMPOSE_WATCH_RETRY_COUNT")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRY_COUNT);

        let retry_delay_secs = get("COMPOSE_WATCH_RETRY_DELAY")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_DELAY_SECS);

        let request_timeout_secs = get("COMPOSE_WATCH_REQUEST_TIMEOUT")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let log_tail_chars = get("COMPOSE_WATCH_LOG_TAIL_CHARS")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_LOG_TAIL_CHARS);

        let log_json = get("COMPOSE_WATCH_LOG_JSON")
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            base_url: string_or("COMPOSE_WATCH_BASE_URL", DEFAULT_BASE_URL),
            versions,
            compose_prefix: string_or("COMPOSE_WATCH_COMPOSE_PREFIX", DEFAULT_COMPOSE_PREFIX),
            watch_task_prefix: string_or(
                "COMPOSE_WATCH_WATCH_TASK_PREFIX",
                DEFAULT_WATCH_TASK_PREFIX,
            ),
            koji_host: string_or("COMPOSE_WATCH_KOJI_HOST", DEFAULT_KOJI_HOST),
            koji_files_base: string_or("COMPOSE_WATCH_KOJI_FILES_BASE", DEFAULT_KOJI_FILES_BASE),
            retry_count,
            retry_delay_secs,
            request_timeout_secs,
            model: string_or("COMPOSE_WATCH_MODEL", DEFAULT_MODEL),
            log_tail_chars,
            log_level: string_or("COMPOSE_WATCH_LOG_LEVEL", DEFAULT_LOG_LEVEL).to_lowercase(),
            log_json,
            gemini_api_key: get("GEMINI_API_KEY"),
            github_token: get("MY_GITHUB_TOKEN"),
            slack_webhook_url: get("SLACK_WEBHOOK_URL"),
            github_repository: string_or("GITHUB_REPOSITORY", DEFAULT_GITHUB_REPOSITORY),
            github_run_id: string_or("GITHUB_RUN_ID", DEFAULT_GITHUB_RUN_ID),
        }
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any validation fails
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.versions.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "At least one version must be configured".to_string(),
            ));
        }

        if self.retry_count == 0 {
            return Err(ConfigError::ValidationFailed(
                "Retry count must be at least 1".to_string(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        if self.request_timeout_secs > 600 {
            return Err(ConfigError::ValidationFailed(
                "Request timeout cannot exceed 10 minutes".to_string(),
            ));
        }

        self.compose_base_url()?;
        parse_url("COMPOSE_WATCH_KOJI_FILES_BASE", &self.koji_files_base)?;

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Link to this run's log, embedded in the chat message
    pub fn run_url(&self) -> String {
        format!(
            "https://github.com/{}/actions/runs/{}",
            self.github_repository, self.github_run_id
        )
    }

    pub fn compose_base_url(&self) -> Result<Url, ConfigError> {
        parse_url("COMPOSE_WATCH_BASE_URL", &self.base_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, Duration::from_secs(self.retry_delay_secs))
    }

    pub fn escalation_settings(&self) -> Result<EscalationSettings, ConfigError> {
        Ok(EscalationSettings::new(
            &self.watch_task_prefix,
            &self.koji_host,
            parse_url("COMPOSE_WATCH_KOJI_FILES_BASE", &self.koji_files_base)?,
            self.log_tail_chars,
        )?)
    }

    /// Model client, or `None` when no credential is configured
    pub fn create_llm_client(&self) -> Option<Arc<dyn LLMClient>> {
        let api_key = self.gemini_api_key.clone()?;
        Some(Arc::new(GenAIClient::new(
            api_key,
            self.model.clone(),
            self.request_timeout(),
        )))
    }

    /// Summarizer for this run; disabled (and logged) without a credential
    pub fn create_summarizer(&self) -> AiSummarizer {
        match self.create_llm_client() {
            Some(client) => {
                info!("AI analysis enabled with model {}", self.model);
                AiSummarizer::new(client)
            }
            None => {
                warn!("GEMINI_API_KEY not found in environment. AI analysis will be disabled.");
                AiSummarizer::disabled()
            }
        }
    }

    /// Log which optional integrations are active
    pub fn log_integrations(&self) {
        match &self.github_token {
            Some(_) => info!("GitHub token configured"),
            None => warn!(
                "MY_GITHUB_TOKEN not found. Using unauthenticated GitHub API with stricter rate limits."
            ),
        }

        match &self.slack_webhook_url {
            Some(url) => info!("SLACK_WEBHOOK_URL found: {}", mask(url)),
            None => warn!("SLACK_WEBHOOK_URL not set. The summary will not be posted."),
        }
    }
}

impl fmt::Debug for WatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchConfig")
            .field("base_url", &self.base_url)
            .field("versions", &self.versions)
            .field("compose_prefix", &self.compose_prefix)
            .field("retry_count", &self.retry_count)
            .field("retry_delay_secs", &self.retry_delay_secs)
            .field("model", &self.model)
            .field("gemini_api_key", &self.gemini_api_key.as_ref().map(|_| "***"))
            .field("github_token", &self.github_token.as_ref().map(|_| "***"))
            .field("slack_webhook_url", &self.slack_webhook_url.as_deref().map(mask))
            .finish_non_exhaustive()
    }
}

impl fmt::Display for WatchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = |set: bool| if set { "configured" } else { "not set" };
        writeln!(f, "compose-watch Configuration:")?;
        writeln!(f, "  Base URL: {}", self.base_url)?;
        writeln!(f, "  Versions: {}", self.versions.join(", "))?;
        writeln!(
            f,
            "  Retry: {} attempt(s), {}s apart",
            self.retry_count, self.retry_delay_secs
        )?;
        writeln!(f, "  Request Timeout: {}s", self.request_timeout_secs)?;
        writeln!(f, "  Model: {}", self.model)?;
        writeln!(f, "  Model Credential: {}", state(self.gemini_api_key.is_some()))?;
        writeln!(f, "  GitHub Token: {}", state(self.github_token.is_some()))?;
        writeln!(f, "  Slack Webhook: {}", state(self.slack_webhook_url.is_some()))?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}

/// Splits a comma-separated version list, dropping blanks
pub fn parse_versions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|_| ConfigError::InvalidUrl {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// First 25 and last 4 characters of a secret URL
fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= 29 {
        return "***".to_string();
    }
    let head: String = chars[..25].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
