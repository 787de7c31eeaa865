//! Run context owning every long-lived dependency of a check

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::compose::ComposeLocator;
use crate::config::WatchConfig;
use crate::diagnosis::{AiSummarizer, EscalationSettings};
use crate::fetch::{ContentFetcher, HttpFetcher, RetryPolicy};
use crate::notify::{Notifier, SlackNotifier};

/// Everything a [`ComposeWatcher`](super::ComposeWatcher) needs, built once at startup
pub struct WatchContext {
    /// Source of every remote artifact
    pub fetcher: Arc<dyn ContentFetcher>,

    /// Model-backed (or disabled) summarizer
    pub summarizer: AiSummarizer,

    /// Receives the single message of a run
    pub notifier: Arc<dyn Notifier>,

    pub locator: ComposeLocator,

    pub escalation: EscalationSettings,

    /// Retry policy for the initial listing fetch
    pub retry: RetryPolicy,

    /// Versions to inspect, in report order
    pub versions: Vec<String>,
}

impl WatchContext {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        summarizer: AiSummarizer,
        notifier: Arc<dyn Notifier>,
        locator: ComposeLocator,
        escalation: EscalationSettings,
        retry: RetryPolicy,
        versions: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            notifier,
            locator,
            escalation,
            retry,
            versions,
        }
    }

    /// Production context: HTTP fetcher, Gemini summarizer, Slack notifier
    ///
    /// `notifier` replaces the Slack notifier when given.
    pub fn from_config(config: &WatchConfig, notifier: Option<Arc<dyn Notifier>>) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.request_timeout())
            .context("Failed to build HTTP client")?;

        let notifier: Arc<dyn Notifier> = match notifier {
            Some(notifier) => notifier,
            None => Arc::new(SlackNotifier::new(
                fetcher.client().clone(),
                config.slack_webhook_url.clone(),
                config.run_url(),
            )),
        };

        let locator = ComposeLocator::new(config.compose_base_url()?, &config.compose_prefix);

        Ok(Self::new(
            Arc::new(fetcher),
            config.create_summarizer(),
            notifier,
            locator,
            config.escalation_settings()?,
            config.retry_policy(),
            config.versions.clone(),
        ))
    }
}
