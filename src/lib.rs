//! compose-watch - daily IoT compose monitor with AI-assisted failure diagnosis
//!
//! Checks the day's Fedora IoT composes on the public artifact server, walks
//! the logs of any failed compose down to the Koji task that broke it, asks a
//! generative model to explain the failure and posts one summary to Slack.
//!
//! # Example Usage
//!
//! ```no_run
//! use compose_watch::{ComposeWatcher, WatchConfig, WatchContext};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = WatchConfig::default();
//! config.validate()?;
//!
//! let watcher = ComposeWatcher::new(WatchContext::from_config(&config, None)?);
//! let outcome = watcher.run(chrono::Utc::now().date_naive()).await;
//! std::process::exit(outcome.exit_code());
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`fetch`]: HTTP content fetching behind the [`ContentFetcher`] seam
//! - [`compose`]: listing scraping, compose lookup and `STATUS` classification
//! - [`llm`]: generative-model client abstraction
//! - [`diagnosis`]: escalation chain, summarizer and per-version reports
//! - [`notify`]: Slack notification
//! - [`pipeline`]: the orchestrated check

pub mod cli;
pub mod compose;
pub mod config;
pub mod diagnosis;
pub mod fetch;
pub mod llm;
pub mod notify;
pub mod pipeline;
pub mod util;

pub use compose::{ComposeLocator, ComposeTarget, StatusFailure, StatusOutcome};
pub use config::{ConfigError, WatchConfig};
pub use diagnosis::{AiSummarizer, Diagnosis, DiagnosticEscalator, DiagnosticReport, ReportOutcome};
pub use fetch::{ContentFetcher, FetchError, HttpFetcher};
pub use llm::{BackendError, GenAIClient, LLMClient};
pub use notify::{NotifyOutcome, Notifier, SlackNotifier};
pub use pipeline::{ComposeWatcher, RunOutcome, RunSummary, WatchContext};
pub use util::{init_logging, init_with, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
