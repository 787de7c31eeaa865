use super::context::WatchContext;
use crate::compose::{extract_links, fetch_status, StatusFailure, StatusOutcome};
use crate::diagnosis::{DiagnosticEscalator, DiagnosticReport, ReportOutcome};
use crate::fetch::{fetch_with_retry, FetchError};
use crate::notify::NotifyOutcome;
use anyhow::Result;
use chrono::NaiveDate;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::{error, info, warn};

/// Sent instead of a summary when the compose listing cannot be reached
pub const CRITICAL_MESSAGE: &str =
    "❌ Critical Error: Could not fetch the main Fedora IoT compose page to begin the inspection.";

/// Result of a run that reached the compose listing
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Inspected date as `YYYYMMDD`
    pub date: String,
    /// One report per configured version, in configured order
    pub reports: Vec<DiagnosticReport>,
    /// The chat message built from the reports
    pub message: String,
    pub notification: NotifyOutcome,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(DiagnosticReport::has_failed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &DiagnosticReport> {
        self.reports.iter().filter(|r| r.has_failed())
    }
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Completed(RunSummary),
    /// Every attempt at the compose listing failed
    ListingUnavailable {
        error: FetchError,
        notification: NotifyOutcome,
    },
}

impl RunOutcome {
    /// Process exit code: detected compose failures still count as a completed run
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed(_) => 0,
            RunOutcome::ListingUnavailable { .. } => 1,
        }
    }
}

/// Drives one check: listing, per-version inspection, one notification
pub struct ComposeWatcher {
    context: WatchContext,
}

impl ComposeWatcher {
    pub fn new(context: WatchContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &WatchContext {
        &self.context
    }

    pub async fn run(&self, date: NaiveDate) -> RunOutcome {
        let start = Instant::now();
        let stamp = date.format("%Y%m%d").to_string();
        info!(
            "Starting compose inspection for {} ({} version(s))",
            stamp,
            self.context.versions.len()
        );

        let listing_url = self.context.locator.base_url().as_str();
        let listing = match fetch_with_retry(
            self.context.fetcher.as_ref(),
            listing_url,
            self.context.retry,
        )
        .await
        {
            Ok(listing) => listing,
            Err(e) => {
                error!("Could not fetch the compose listing: {}", e);
                let notification = self.context.notifier.notify(CRITICAL_MESSAGE).await;
                return RunOutcome::ListingUnavailable {
                    error: e,
                    notification,
                };
            }
        };

        let hrefs = extract_links(&listing);
        let mut reports = Vec::with_capacity(self.context.versions.len());
        for version in &self.context.versions {
            reports.push(self.inspect_guarded(version, date, &hrefs).await);
        }

        let message = compose_message(&stamp, &reports);
        let notification = self.context.notifier.notify(&message).await;

        let summary = RunSummary {
            date: stamp,
            reports,
            message,
            notification,
        };
        info!(
            "Inspection finished in {:.1}s ({} failure(s))",
            start.elapsed().as_secs_f64(),
            summary.failures().count()
        );
        RunOutcome::Completed(summary)
    }

    /// Inspect one version; errors and panics become an error report
    async fn inspect_guarded(
        &self,
        version: &str,
        date: NaiveDate,
        hrefs: &[String],
    ) -> DiagnosticReport {
        let name = self.context.locator.display_name(version);
        let message = match AssertUnwindSafe(self.inspect(version, date, hrefs))
            .catch_unwind()
            .await
        {
            Ok(Ok(report)) => return report,
            Ok(Err(e)) => format!("{:#}", e),
            Err(panic) => panic_message(panic.as_ref()),
        };

        error!("Unexpected error while checking {}: {}", name, message);
        DiagnosticReport::new(version, name, ReportOutcome::Error { message })
    }

    async fn inspect(
        &self,
        version: &str,
        date: NaiveDate,
        hrefs: &[String],
    ) -> Result<DiagnosticReport> {
        let ctx = &self.context;
        let name = ctx.locator.display_name(version);

        let stamp = date.format("%Y%m%d").to_string();
        let Some(target) = ctx.locator.locate(version, &stamp, hrefs)? else {
            warn!("No compose found for {} on {}", name, stamp);
            return Ok(DiagnosticReport::new(
                version,
                name,
                ReportOutcome::NotFound {
                    date: date.format("%Y-%m-%d").to_string(),
                },
            ));
        };
        info!("Found compose: {}", target.url);

        let report = match fetch_status(ctx.fetcher.as_ref(), &target).await? {
            StatusOutcome::InProgress => {
                DiagnosticReport::new(version, name, ReportOutcome::InProgress)
            }
            StatusOutcome::Succeeded => {
                DiagnosticReport::new(version, name, ReportOutcome::Succeeded)
            }
            StatusOutcome::Failed(StatusFailure::Unavailable) => {
                DiagnosticReport::new(version, name, ReportOutcome::StatusUnavailable)
                    .with_source_url(target.url.as_str())
            }
            StatusOutcome::Failed(StatusFailure::Reported(status)) => {
                let diagnosis =
                    DiagnosticEscalator::new(ctx.fetcher.as_ref(), &ctx.summarizer, &ctx.escalation)
                        .diagnose(&target)
                        .await;
                let source_url = diagnosis
                    .task_url()
                    .map(str::to_string)
                    .unwrap_or_else(|| target.url.to_string());
                DiagnosticReport::new(version, name, ReportOutcome::Failed { status, diagnosis })
                    .with_source_url(source_url)
            }
        };
        Ok(report)
    }
}

/// Chat message for a completed run: header, then one section per version
pub fn compose_message(date: &str, reports: &[DiagnosticReport]) -> String {
    let header = format!("📰 *Fedora IoT Compose Status Summary - {}*", date);
    std::iter::once(header)
        .chain(reports.iter().map(ToString::to_string))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "inspection panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::ComposeLocator;
    use crate::diagnosis::{AiSummarizer, DiagnosisSource, EscalationSettings};
    use crate::fetch::{ContentFetcher, MockFetcher, RetryPolicy};
    use crate::llm::{MockLLMClient, MockResponse};
    use crate::notify::{Notifier, RecordingNotifier};
    use async_trait::async_trait;
    use reqwest::Url;
    use std::sync::Arc;
    use std::time::Duration;

    const BASE: &str = "https://kojipkgs.fedoraproject.org/compose/iot/";

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
    }

    fn listing(dirs: &[&str]) -> String {
        dirs.iter()
            .map(|d| format!("<a href=\"{d}\">{d}</a>\n"))
            .collect()
    }

    fn compose_url(dir: &str, relative: &str) -> String {
        format!("{}{}{}", BASE, dir, relative)
    }

    fn context(
        fetcher: Arc<dyn ContentFetcher>,
        summarizer: AiSummarizer,
        notifier: Arc<dyn Notifier>,
        versions: &[&str],
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
            RetryPolicy::new(3, Duration::from_secs(60)),
            versions.iter().map(|v| v.to_string()).collect(),
        )
    }

    #[test]
    fn test_compose_message_layout() {
        let reports = vec![
            DiagnosticReport::new("43", "Fedora-IoT-43", ReportOutcome::Succeeded),
            DiagnosticReport::new("42", "Fedora-IoT-42", ReportOutcome::InProgress),
        ];
        assert_eq!(
            compose_message("20250701", &reports),
            "📰 *Fedora IoT Compose Status Summary - 20250701*\n\n\
             ✅ *Fedora-IoT-43:* Compose finished successfully.\n\n\
             ⏳ *Fedora-IoT-42:* Compose is in progress."
        );
    }

    #[test]
    fn test_exit_codes() {
        let completed = RunOutcome::Completed(RunSummary {
            date: "20250701".to_string(),
            reports: vec![DiagnosticReport::new(
                "43",
                "Fedora-IoT-43",
                ReportOutcome::StatusUnavailable,
            )],
            message: String::new(),
            notification: NotifyOutcome::Skipped,
        });
        assert_eq!(completed.exit_code(), 0);

        let unavailable = RunOutcome::ListingUnavailable {
            error: FetchError::Status {
                url: BASE.to_string(),
                status: 503,
            },
            notification: NotifyOutcome::Sent,
        };
        assert_eq!(unavailable.exit_code(), 1);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "inspection panicked");
    }

    #[tokio::test]
    async fn test_all_finished() {
        let fetcher = MockFetcher::new()
            .with_page(
                BASE,
                listing(&["Fedora-IoT-43-20250701.0/", "Fedora-IoT-42-20250701.0/"]),
            )
            .with_page(compose_url("Fedora-IoT-43-20250701.0/", "STATUS"), "FINISHED\n")
            .with_page(compose_url("Fedora-IoT-42-20250701.0/", "STATUS"), "FINISHED");
        let notifier = Arc::new(RecordingNotifier::new());
        let watcher = ComposeWatcher::new(context(
            Arc::new(fetcher),
            AiSummarizer::disabled(),
            notifier.clone(),
            &["43", "42"],
        ));

        let outcome = watcher.run(date()).await;

        assert_eq!(outcome.exit_code(), 0);
        let RunOutcome::Completed(summary) = outcome else {
            panic!("expected a completed run");
        };
        assert!(!summary.has_failures());
        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(!messages[0].contains('❌'));
        assert!(!messages[0].contains('🔥'));
    }

    #[tokio::test]
    async fn test_latest_same_day_compose_is_inspected() {
        let fetcher = Arc::new(
            MockFetcher::new()
                .with_page(
                    BASE,
                    listing(&[
                        "Fedora-IoT-43-20250701.0/",
                        "Fedora-IoT-43-20250701.1/",
                        "Fedora-IoT-43-20250630.3/",
                    ]),
                )
                .with_page(compose_url("Fedora-IoT-43-20250701.1/", "STATUS"), "STARTED"),
        );
        let watcher = ComposeWatcher::new(context(
            fetcher.clone(),
            AiSummarizer::disabled(),
            Arc::new(RecordingNotifier::new()),
            &["43"],
        ));

        let RunOutcome::Completed(summary) = watcher.run(date()).await else {
            panic!("expected a completed run");
        };

        assert_eq!(summary.reports[0].outcome, ReportOutcome::InProgress);
        assert_eq!(
            fetcher.calls_to(&compose_url("Fedora-IoT-43-20250701.0/", "STATUS")),
            0
        );
    }

    #[tokio::test]
    async fn test_missing_compose_is_a_failure() {
        let fetcher = MockFetcher::new().with_page(BASE, listing(&["Fedora-IoT-43-20250630.0/"]));
        let watcher = ComposeWatcher::new(context(
            Arc::new(fetcher),
            AiSummarizer::disabled(),
            Arc::new(RecordingNotifier::new()),
            &["43"],
        ));

        let RunOutcome::Completed(summary) = watcher.run(date()).await else {
            panic!("expected a completed run");
        };

        assert!(summary.has_failures());
        assert_eq!(
            summary.reports[0].outcome,
            ReportOutcome::NotFound {
                date: "2025-07-01".to_string()
            }
        );
        assert!(summary.message.contains("No compose found for the current date (2025-07-01)"));
    }

    #[tokio::test]
    async fn test_doomed_without_logs_reports_unavailable_deep_analysis() {
        let dir = "Fedora-IoT-42-20250701.0/";
        let fetcher = MockFetcher::new()
            .with_page(BASE, listing(&["Fedora-IoT-43-20250701.0/", dir]))
            .with_page(compose_url("Fedora-IoT-43-20250701.0/", "STATUS"), "FINISHED")
            .with_page(compose_url(dir, "STATUS"), "DOOMED")
            .with_status(compose_url(dir, "logs/global/pungi.global.log"), 404)
            .with_status(compose_url(dir, "logs/global/osbuild/"), 500);
        let llm = Arc::new(MockLLMClient::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let watcher = ComposeWatcher::new(context(
            Arc::new(fetcher),
            AiSummarizer::new(llm.clone()),
            notifier.clone(),
            &["43", "42"],
        ));

        let outcome = watcher.run(date()).await;
        assert_eq!(outcome.exit_code(), 0);
        let RunOutcome::Completed(summary) = outcome else {
            panic!("expected a completed run");
        };

        let report = &summary.reports[1];
        match &report.outcome {
            ReportOutcome::Failed { status, diagnosis } => {
                assert_eq!(status, "DOOMED");
                assert_eq!(diagnosis.source, DiagnosisSource::Unavailable);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(report.source_url.as_deref(), Some(compose_url(dir, "").as_str()));
        assert_eq!(llm.call_count(), 0);

        let message = &notifier.messages()[0];
        assert!(message.contains("🔥 *Fedora-IoT-42:* Failed with status `DOOMED`."));
        assert!(message.contains("Could not find a Koji task URL to perform deep analysis."));
    }

    #[tokio::test]
    async fn test_failed_compose_uses_global_log_diagnosis() {
        let dir = "Fedora-IoT-43-20250701.0/";
        let fetcher = MockFetcher::new()
            .with_page(BASE, listing(&[dir]))
            .with_page(compose_url(dir, "STATUS"), "FINISHED_INCOMPLETE")
            .with_page(compose_url(dir, "logs/global/pungi.global.log"), "No space left on device");
        let llm = Arc::new(MockLLMClient::new());
        llm.add_response(MockResponse::text("High-level compose issue: disk full."));
        let watcher = ComposeWatcher::new(context(
            Arc::new(fetcher),
            AiSummarizer::new(llm.clone()),
            Arc::new(RecordingNotifier::new()),
            &["43"],
        ));

        let RunOutcome::Completed(summary) = watcher.run(date()).await else {
            panic!("expected a completed run");
        };

        assert_eq!(
            summary.reports[0].ai_text(),
            Some("High-level compose issue: disk full.")
        );
        assert!(summary
            .message
            .contains("*AI Diagnosis (from pungi.global.log):*\n```High-level compose issue: disk full.```"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_listing_sends_critical_message_once() {
        let fetcher = Arc::new(MockFetcher::new().with_status(BASE, 503));
        let notifier = Arc::new(RecordingNotifier::new());
        let watcher = ComposeWatcher::new(context(
            fetcher.clone(),
            AiSummarizer::disabled(),
            notifier.clone(),
            &["43"],
        ));

        let outcome = watcher.run(date()).await;

        assert_ne!(outcome.exit_code(), 0);
        assert!(matches!(outcome, RunOutcome::ListingUnavailable { .. }));
        assert_eq!(fetcher.calls_to(BASE), 3);
        assert_eq!(notifier.messages(), vec![CRITICAL_MESSAGE.to_string()]);
    }

    struct PanickingFetcher {
        inner: MockFetcher,
    }

    #[async_trait]
    impl ContentFetcher for PanickingFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
            if url.ends_with("STATUS") && url.contains("-42-") {
                panic!("parser blew up");
            }
            self.inner.fetch_text(url).await
        }
    }

    #[tokio::test]
    async fn test_panic_in_one_version_does_not_stop_others() {
        let inner = MockFetcher::new()
            .with_page(
                BASE,
                listing(&["Fedora-IoT-42-20250701.0/", "Fedora-IoT-41-20250701.0/"]),
            )
            .with_page(compose_url("Fedora-IoT-41-20250701.0/", "STATUS"), "FINISHED");
        let watcher = ComposeWatcher::new(context(
            Arc::new(PanickingFetcher { inner }),
            AiSummarizer::disabled(),
            Arc::new(RecordingNotifier::new()),
            &["42", "41"],
        ));

        let RunOutcome::Completed(summary) = watcher.run(date()).await else {
            panic!("expected a completed run");
        };

        assert_eq!(
            summary.reports[0].outcome,
            ReportOutcome::Error {
                message: "parser blew up".to_string()
            }
        );
        assert_eq!(summary.reports[1].outcome, ReportOutcome::Succeeded);
        assert!(summary
            .message
            .contains("❌ *Fedora-IoT-42:* An unexpected error occurred: parser blew up"));
    }
}
