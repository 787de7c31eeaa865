use super::{NotifyOutcome, Notifier};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
enum NotifyError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook answered HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Slack incoming-webhook payload
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlackMessage {
    pub text: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Section { text: TextObject },
    Context { elements: Vec<TextObject> },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl TextObject {
    fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            kind: "mrkdwn",
            text: text.into(),
        }
    }
}

impl SlackMessage {
    /// Summary section plus a context line linking to the run log
    pub fn new(summary: &str, run_url: &str) -> Self {
        Self {
            text: summary.to_string(),
            blocks: vec![
                Block::Section {
                    text: TextObject::mrkdwn(summary),
                },
                Block::Context {
                    elements: vec![TextObject::mrkdwn(format!(
                        "For full details, see the <{}|GitHub Actions run log>.",
                        run_url
                    ))],
                },
            ],
        }
    }
}

/// Posts run summaries to a Slack incoming webhook
#[derive(Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
    run_url: String,
}

impl SlackNotifier {
    pub fn new(client: reqwest::Client, webhook_url: Option<String>, run_url: String) -> Self {
        Self {
            client,
            webhook_url,
            run_url,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    async fn post(&self, webhook_url: &str, message: &SlackMessage) -> Result<(), NotifyError> {
        let response = self.client.post(webhook_url).json(message).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, message: &str) -> NotifyOutcome {
        let Some(webhook_url) = &self.webhook_url else {
            warn!("SLACK_WEBHOOK_URL not set. Skipping Slack notification.");
            return NotifyOutcome::Skipped;
        };

        info!("Sending summary to Slack webhook...");
        let payload = SlackMessage::new(message, &self.run_url);
        match self.post(webhook_url, &payload).await {
            Ok(()) => {
                info!("Slack notification sent successfully");
                NotifyOutcome::Sent
            }
            Err(e) => {
                error!("Error sending Slack notification: {}", e);
                NotifyOutcome::Failed(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for SlackNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackNotifier")
            .field("configured", &self.is_configured())
            .field("run_url", &self.run_url)
            .finish()
    }
}
