use compose_watch::compose::ComposeLocator;
use compose_watch::diagnosis::{AiSummarizer, EscalationSettings};
use compose_watch::fetch::{ContentFetcher, RetryPolicy};
use compose_watch::notify::Notifier;
use compose_watch::pipeline::WatchContext;
use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;

#[allow(dead_code)]
pub const BASE: &str = "https://kojipkgs.fedoraproject.org/compose/iot/";
#[allow(dead_code)]
pub const DATE: &str = "20250701";

#[allow(dead_code)]
pub fn compose_watch_binary() -> std::path::PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.join("compose-watch")
}

/// Apache-style directory listing with one anchor per entry
pub fn listing(entries: &[&str]) -> String {
    let rows: String = entries
        .iter()
        .map(|e| format!("<a href=\"{e}\">{e}</a>  01-Jul-2025 04:12    -\n"))
        .collect();
    format!(
        "<html><head><title>Index</title></head><body><pre><a href=\"../\">../</a>\n{rows}</pre></body></html>"
    )
}

#[allow(dead_code)]
pub fn compose_dir(version: &str) -> String {
    format!("Fedora-IoT-{}-{}.0/", version, DATE)
}

#[allow(dead_code)]
pub fn compose_url(version: &str, relative: &str) -> String {
    format!("{}{}{}", BASE, compose_dir(version), relative)
}

#[allow(dead_code)]
pub fn context(
    fetcher: Arc<dyn ContentFetcher>,
    summarizer: AiSummarizer,
    notifier: Arc<dyn Notifier>,
    versions: &[&str],
    retry: RetryPolicy,
) -> WatchContext {
    WatchContext::new(
        fetcher,
        summarizer,
        notifier,
        ComposeLocator::new(Url::parse(BASE).unwrap(), "Fedora-IoT"),
        EscalationSettings::new(
            "IoT",
            "koji.fedoraproject.org",
            Url::parse("https://kojipkgs.fedoraproject.org/").unwrap(),
            5000,
        )
        .unwrap(),
        retry,
        versions.iter().map(|v| v.to_string()).collect(),
    )
}

#[allow(dead_code)]
pub fn default_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_secs(60))
}
