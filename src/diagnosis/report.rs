//! Per-version report lines

use super::escalator::Diagnosis;
use std::fmt;

/// What happened to one version during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    InProgress,
    Succeeded,
    /// The compose published a failure status and was diagnosed
    Failed { status: String, diagnosis: Diagnosis },
    /// The `STATUS` file could not be fetched
    StatusUnavailable,
    /// No compose directory exists for the date (`YYYY-MM-DD`)
    NotFound { date: String },
    /// Inspection itself broke
    Error { message: String },
}

/// Report for one configured version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub version: String,
    /// Display name, e.g. `Fedora-IoT-43`
    pub name: String,
    pub outcome: ReportOutcome,
    /// Most specific URL to look at when the version failed
    pub source_url: Option<String>,
}

impl DiagnosticReport {
    pub fn new(version: impl Into<String>, name: impl Into<String>, outcome: ReportOutcome) -> Self {
        Self {
            version: version.into(),
            name: name.into(),
            outcome,
            source_url: None,
        }
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Everything except in-progress and succeeded counts as a failure
    pub fn has_failed(&self) -> bool {
        !matches!(
            self.outcome,
            ReportOutcome::InProgress | ReportOutcome::Succeeded
        )
    }

    /// Model-generated text, if any was produced
    pub fn ai_text(&self) -> Option<&str> {
        match &self.outcome {
            ReportOutcome::Failed { diagnosis, .. } => diagnosis.analysis.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for DiagnosticReport {
    /// Slack mrkdwn section for the summary message
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = &self.name;
        match &self.outcome {
            ReportOutcome::InProgress => write!(f, "⏳ *{}:* Compose is in progress.", name),
            ReportOutcome::Succeeded => {
                write!(f, "✅ *{}:* Compose finished successfully.", name)
            }
            ReportOutcome::Failed { status, diagnosis } => {
                write!(f, "🔥 *{}:* Failed with status `{}`.{}", name, status, diagnosis)
            }
            ReportOutcome::StatusUnavailable => {
                write!(f, "❌ *{}:* Could not fetch STATUS file.", name)
            }
            ReportOutcome::NotFound { date } => write!(
                f,
                "❌ *{}:* No compose found for the current date ({}). \
                 This could be a failure or the build has not started yet.",
                name, date
            ),
            ReportOutcome::Error { message } => {
                write!(f, "❌ *{}:* An unexpected error occurred: {}", name, message)
            }
        }
    }
}
