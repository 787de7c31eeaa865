use super::{NotifyOutcome, Notifier};
use async_trait::async_trait;
use tracing::info;

/// Prints the message to stdout instead of posting it
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, message: &str) -> NotifyOutcome {
        info!("Notification disabled; printing the message instead");
        println!("{}\n", message);
        NotifyOutcome::Skipped
    }
}
