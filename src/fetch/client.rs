use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while fetching a remote artifact
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The URL could not be parsed or joined
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Transport-level failure (DNS, connect, TLS, timeout)
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The response body could not be read as text
    #[error("Failed to read body from {url}: {message}")]
    Body { url: String, message: String },
}

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch `url` and return its body as text
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;

    /// Fail-soft variant: logs the failure and yields `None`
    async fn fetch_optional(&self, url: &str) -> Option<String> {
        match self.fetch_text(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Could not fetch {}: {}", url, e);
                None
            }
        }
    }
}
