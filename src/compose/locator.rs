//! Compose directory lookup
//!
//! Compose directories are named `<prefix>-<version>-<YYYYMMDD>.<N>/`. Several
//! composes can exist for the same day; the lexicographically greatest name is
//! taken as the most recent one.

use anyhow::{Context, Result};
use regex::Regex;
use reqwest::Url;
use tracing::{debug, info};

/// A compose directory resolved for one version during one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeTarget {
    /// Version identifier as configured, e.g. `43`
    pub version: String,
    /// Display name, e.g. `Fedora-IoT-43`
    pub name: String,
    /// Directory href as listed, e.g. `Fedora-IoT-43-20250701.1/`
    pub directory: String,
    /// Absolute URL of the directory
    pub url: Url,
}

impl ComposeTarget {
    /// URL of a file or directory below this compose
    pub fn join(&self, relative: &str) -> Result<Url> {
        self.url
            .join(relative)
            .with_context(|| format!("Failed to resolve {} against {}", relative, self.url))
    }

    pub fn status_url(&self) -> Result<Url> {
        self.join("STATUS")
    }

    pub fn global_log_url(&self) -> Result<Url> {
        self.join("logs/global/pungi.global.log")
    }

    pub fn osbuild_logs_url(&self) -> Result<Url> {
        self.join("logs/global/osbuild/")
    }
}

/// Finds the compose directory for a version and date among listing hrefs
#[derive(Debug, Clone)]
pub struct ComposeLocator {
    base_url: Url,
    prefix: String,
}

impl ComposeLocator {
    pub fn new(base_url: Url, prefix: impl Into<String>) -> Self {
        Self {
            base_url,
            prefix: prefix.into(),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Display name used in reports for `version`
    pub fn display_name(&self, version: &str) -> String {
        format!("{}-{}", self.prefix, version)
    }

    /// Latest matching href for `version` on `date` (`YYYYMMDD`), if any
    pub fn select_latest<'a>(
        &self,
        version: &str,
        date: &str,
        hrefs: &'a [String],
    ) -> Result<Option<&'a str>> {
        let pattern = Regex::new(&format!(
            r"^{}-{}-{}\.\d+/",
            regex::escape(&self.prefix),
            regex::escape(version),
            regex::escape(date)
        ))
        .context("Failed to build compose directory pattern")?;

        Ok(hrefs
            .iter()
            .map(String::as_str)
            .filter(|href| pattern.is_match(href))
            .max())
    }

    /// Resolve today's compose for `version`; `None` when nothing matches
    pub fn locate(
        &self,
        version: &str,
        date: &str,
        hrefs: &[String],
    ) -> Result<Option<ComposeTarget>> {
        info!(
            "Searching for compose on {} for {}...",
            date,
            self.display_name(version)
        );

        let Some(directory) = self.select_latest(version, date, hrefs)? else {
            debug!("No compose directory matched for version {}", version);
            return Ok(None);
        };

        let url = self
            .base_url
            .join(directory)
            .with_context(|| format!("Failed to resolve compose directory {}", directory))?;
        info!("Found compose for current date: {}", directory);

        Ok(Some(ComposeTarget {
            version: version.to_string(),
            name: self.display_name(version),
            directory: directory.to_string(),
            url,
        }))
    }
}
