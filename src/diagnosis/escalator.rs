//! Diagnostic escalation chain
//!
//! Stages run strictly in order and never go back:
//!
//! 1. `GlobalLog`: triage the tail of `pungi.global.log`. The answer is
//!    final unless it mentions deeper analysis or Koji.
//! 2. `KojiDiscovery`: scan the osbuild watch-task logs for the first Koji
//!    task URL.
//! 3. `KojiStatusJson`: fetch the task's `compose-status.json` and ask for a
//!    final diagnosis.
//! 4. `Exhausted`: no task URL was found; deep analysis is not possible.
//!
//! A fetch failure only means "this source yielded nothing".

use super::prompts::{GLOBAL_LOG_TRIAGE, KOJI_STATUS_SYNTHESIS};
use super::summarizer::AiSummarizer;
use crate::compose::{extract_links_matching, find_first_link, ComposeTarget};
use crate::fetch::ContentFetcher;
use futures_util::stream::{self, StreamExt};
use regex::Regex;
use reqwest::Url;
use std::fmt;
use tracing::{debug, info, warn};

/// Substrings of a global-log analysis that call for the Koji stages.
///
/// Matching keywords in free model output is a fragile heuristic; it is kept
/// because the triage prompt asks the model for exactly this wording.
const ESCALATION_KEYWORDS: [&str; 2] = ["deeper", "koji"];

/// Where the final diagnosis came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosisSource {
    /// Accepted at the global-log stage
    GlobalLog,
    /// Synthesized from a Koji task's `compose-status.json`
    KojiTask { task_id: String, task_url: String },
    /// No Koji task URL could be found
    Unavailable,
}

/// Result of walking the escalation chain for one failed compose
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnosis {
    pub source: DiagnosisSource,
    /// Model output, absent when the chain was exhausted
    pub analysis: Option<String>,
}

impl Diagnosis {
    pub fn from_global_log(analysis: String) -> Self {
        Self {
            source: DiagnosisSource::GlobalLog,
            analysis: Some(analysis),
        }
    }

    pub fn from_koji_task(task_url: &str, analysis: String) -> Self {
        let task_id = task_url.rsplit('=').next().unwrap_or(task_url).to_string();
        Self {
            source: DiagnosisSource::KojiTask {
                task_id,
                task_url: task_url.to_string(),
            },
            analysis: Some(analysis),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            source: DiagnosisSource::Unavailable,
            analysis: None,
        }
    }

    pub fn task_url(&self) -> Option<&str> {
        match &self.source {
            DiagnosisSource::KojiTask { task_url, .. } => Some(task_url),
            _ => None,
        }
    }
}

impl fmt::Display for Diagnosis {
    /// Slack mrkdwn block appended to a failure line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let analysis = self.analysis.as_deref().unwrap_or_default();
        match &self.source {
            DiagnosisSource::GlobalLog => write!(
                f,
                "\n\n*AI Diagnosis (from pungi.global.log):*\n```{}```",
                analysis
            ),
            DiagnosisSource::KojiTask { task_id, .. } => write!(
                f,
                "\n\n*AI Diagnosis (from Koji Task {}):*\n```{}```",
                task_id, analysis
            ),
            DiagnosisSource::Unavailable => write!(
                f,
                "\n> _Could not find a Koji task URL to perform deep analysis._"
            ),
        }
    }
}

/// Patterns and limits used by the chain
#[derive(Debug, Clone)]
pub struct EscalationSettings {
    /// Trailing characters of the global log sent to the model
    pub log_tail_chars: usize,
    /// Matches watch-task log names in the osbuild listing
    pub watch_task_log: Regex,
    /// Matches a Koji task page URL inside a watch-task log
    pub koji_task_url: Regex,
    /// Matches the `compose-status.json` anchor on a task page
    pub compose_status_link: Regex,
    /// Base for host-relative `compose-status.json` hrefs
    pub koji_files_base: Url,
}

impl EscalationSettings {
    pub fn new(
        watch_task_prefix: &str,
        koji_host: &str,
        koji_files_base: Url,
        log_tail_chars: usize,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            log_tail_chars,
            watch_task_log: Regex::new(&format!(
                r"{}-\d+-watch-task\.log$",
                regex::escape(watch_task_prefix)
            ))?,
            koji_task_url: Regex::new(&format!(
                r"https://{}/koji/taskinfo\?taskID=\d+",
                regex::escape(koji_host)
            ))?,
            compose_status_link: Regex::new(r"compose-status\.json$")?,
            koji_files_base,
        })
    }
}

enum Stage {
    GlobalLog,
    KojiDiscovery,
    KojiStatusJson { task_url: String },
    Exhausted,
}

pub struct DiagnosticEscalator<'a> {
    fetcher: &'a dyn ContentFetcher,
    summarizer: &'a AiSummarizer,
    settings: &'a EscalationSettings,
}

impl<'a> DiagnosticEscalator<'a> {
    pub fn new(
        fetcher: &'a dyn ContentFetcher,
        summarizer: &'a AiSummarizer,
        settings: &'a EscalationSettings,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            settings,
        }
    }

    /// Walk the chain for a failed compose
    pub async fn diagnose(&self, target: &ComposeTarget) -> Diagnosis {
        info!("Failure detected for {}. Starting sequential diagnosis...", target.name);

        let mut stage = Stage::GlobalLog;
        loop {
            stage = match stage {
                Stage::GlobalLog => match self.analyze_global_log(target).await {
                    Some(analysis) => return Diagnosis::from_global_log(analysis),
                    None => Stage::KojiDiscovery,
                },
                Stage::KojiDiscovery => match self.discover_koji_task(target).await {
                    Some(task_url) => Stage::KojiStatusJson { task_url },
                    None => Stage::Exhausted,
                },
                Stage::KojiStatusJson { task_url } => {
                    let analysis = self.analyze_koji_task(&task_url).await;
                    return Diagnosis::from_koji_task(&task_url, analysis);
                }
                Stage::Exhausted => return Diagnosis::unavailable(),
            };
        }
    }

    /// Stage 1. `Some` when the global-log analysis is accepted as final.
    async fn analyze_global_log(&self, target: &ComposeTarget) -> Option<String> {
        info!("Diagnosis step 1: analyzing pungi.global.log");
        let url = resolved(target.global_log_url())?;
        let log = self.fetch_nonblank(url.as_str()).await?;

        let tail = tail_chars(&log, self.settings.log_tail_chars);
        let analysis = self.summarizer.summarize(tail, GLOBAL_LOG_TRIAGE).await;
        debug!("Global log analysis: {}", analysis);

        if needs_escalation(&analysis) {
            info!("Global log analysis asks for deeper Koji analysis");
            None
        } else {
            Some(analysis)
        }
    }

    /// Stage 2. First Koji task URL found across the watch-task logs.
    async fn discover_koji_task(&self, target: &ComposeTarget) -> Option<String> {
        info!("Diagnosis step 2: finding the Koji task");
        let dir_url = resolved(target.osbuild_logs_url())?;
        info!("Searching for Koji task URL in: {}", dir_url);
        let listing = self.fetch_nonblank(dir_url.as_str()).await?;

        let candidates = extract_links_matching(&listing, &self.settings.watch_task_log);
        debug!("Found {} watch-task log(s)", candidates.len());

        let task_urls = stream::iter(candidates).filter_map(|href| {
            let dir_url = &dir_url;
            async move {
                let log_url = dir_url.join(&href).ok()?;
                info!("Reading {}...", href);
                let log = self.fetch_nonblank(log_url.as_str()).await?;
                self.settings
                    .koji_task_url
                    .find(&log)
                    .map(|m| m.as_str().to_string())
            }
        });
        let found = std::pin::pin!(task_urls).next().await;

        match &found {
            Some(task_url) => info!("Found Koji task URL: {}", task_url),
            None => warn!("No Koji task URL found in any of the watch-task logs"),
        }
        found
    }

    /// Stage 3. Analysis of the task's `compose-status.json`, or of the
    /// reason it could not be retrieved.
    async fn analyze_koji_task(&self, task_url: &str) -> String {
        info!("Diagnosis step 3: drilling into Koji task {}", task_url);
        let evidence = self.koji_status_evidence(task_url).await;
        self.summarizer
            .summarize(&evidence, KOJI_STATUS_SYNTHESIS)
            .await
    }

    async fn koji_status_evidence(&self, task_url: &str) -> String {
        let Some(page) = self.fetch_nonblank(task_url).await else {
            return "Could not fetch the Koji task page.".to_string();
        };

        let Some(href) = find_first_link(&page, &self.settings.compose_status_link) else {
            return "Could not find 'compose-status.json' link on the Koji task page.".to_string();
        };

        let json_url = if href.starts_with("http") {
            href
        } else {
            match self.settings.koji_files_base.join(&href) {
                Ok(url) => url.to_string(),
                Err(e) => {
                    warn!("Could not resolve {}: {}", href, e);
                    return format!("Could not fetch content from {}.", href);
                }
            }
        };
        info!("Found definitive error log: {}", json_url);

        match self.fetch_nonblank(&json_url).await {
            Some(content) => pretty_json(&content),
            None => format!("Could not fetch content from {}.", json_url),
        }
    }

    /// Fetch `url`; a failed fetch and a blank body both yield nothing
    async fn fetch_nonblank(&self, url: &str) -> Option<String> {
        let body = self.fetcher.fetch_optional(url).await?;
        if body.trim().is_empty() {
            warn!("{} is empty", url);
            return None;
        }
        Some(body)
    }
}

fn resolved(url: anyhow::Result<Url>) -> Option<Url> {
    match url {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("{:#}", e);
            None
        }
    }
}

fn needs_escalation(analysis: &str) -> bool {
    let lower = analysis.to_lowercase();
    ESCALATION_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Last `max` characters of `text`, respecting char boundaries
fn tail_chars(text: &str, max: usize) -> &str {
    if max == 0 {
        return "";
    }
    match text.char_indices().rev().nth(max - 1) {
        Some((start, _)) => &text[start..],
        None => text,
    }
}

/// Re-serialize JSON with 2-space indentation; non-JSON passes through
fn pretty_json(content: &str) -> String {
    serde_json::from_str::<serde_json::Value>(content)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| content.to_string())
}
