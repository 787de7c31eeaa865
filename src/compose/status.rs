//! `STATUS` marker classification

use super::locator::ComposeTarget;
use crate::fetch::ContentFetcher;
use anyhow::Result;
use std::fmt;
use tracing::info;

/// Why a compose counts as failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFailure {
    /// The compose published a status other than `STARTED`/`FINISHED`
    Reported(String),
    /// The `STATUS` file could not be fetched or was empty
    Unavailable,
}

/// Outcome of one compose's `STATUS` marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusOutcome {
    InProgress,
    Succeeded,
    Failed(StatusFailure),
}

impl StatusOutcome {
    /// Classify raw `STATUS` text; surrounding whitespace is ignored
    pub fn classify(raw: &str) -> Self {
        match raw.trim() {
            "STARTED" => StatusOutcome::InProgress,
            "FINISHED" => StatusOutcome::Succeeded,
            "" => StatusOutcome::Failed(StatusFailure::Unavailable),
            other => StatusOutcome::Failed(StatusFailure::Reported(other.to_string())),
        }
    }
}

impl fmt::Display for StatusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusOutcome::InProgress => write!(f, "STARTED"),
            StatusOutcome::Succeeded => write!(f, "FINISHED"),
            StatusOutcome::Failed(StatusFailure::Reported(status)) => write!(f, "{}", status),
            StatusOutcome::Failed(StatusFailure::Unavailable) => write!(f, "<unavailable>"),
        }
    }
}

/// Fetch and classify the `STATUS` file of `target`
pub async fn fetch_status(
    fetcher: &dyn ContentFetcher,
    target: &ComposeTarget,
) -> Result<StatusOutcome> {
    let url = target.status_url()?;
    let outcome = match fetcher.fetch_optional(url.as_str()).await {
        Some(body) => StatusOutcome::classify(&body),
        None => StatusOutcome::Failed(StatusFailure::Unavailable),
    };
    info!("Status of {}: {}", target.name, outcome);
    Ok(outcome)
}
