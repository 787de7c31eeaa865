use super::{NotifyOutcome, Notifier};
use async_trait::async_trait;
use std::sync::Mutex;

/// Notifier that keeps every message in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> NotifyOutcome {
        self.messages.lock().unwrap().push(message.to_string());
        NotifyOutcome::Sent
    }
}
