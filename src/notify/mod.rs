//! Chat notification
//!
//! One message is posted per run. Notification never fails a run: a missing
//! webhook skips the post and a rejected post is logged.

mod console;
mod recording;
mod slack;

pub use console::ConsoleNotifier;
pub use recording::RecordingNotifier;
pub use slack::{Block, SlackMessage, SlackNotifier, TextObject};

use async_trait::async_trait;

/// What happened to a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyOutcome {
    Sent,
    /// No webhook configured
    Skipped,
    Failed(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> NotifyOutcome;
}
