//! Check orchestration
//!
//! A [`ComposeWatcher`] fetches the compose listing, inspects each configured
//! version in order and posts one summary through the configured notifier.

pub mod context;
pub mod orchestrator;

pub use context::WatchContext;
pub use orchestrator::{compose_message, ComposeWatcher, RunOutcome, RunSummary, CRITICAL_MESSAGE};
