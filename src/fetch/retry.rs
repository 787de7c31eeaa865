use super::client::{ContentFetcher, FetchError};
use std::time::Duration;
use tracing::{error, info, warn};

/// Bounded linear retry with a fixed delay between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub attempts: u32,
    /// Sleep between consecutive attempts
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

/// Fetch `url`, retrying up to `policy.attempts` times.
///
/// Returns the last error when every attempt failed.
pub async fn fetch_with_retry(
    fetcher: &dyn ContentFetcher,
    url: &str,
    policy: RetryPolicy,
) -> Result<String, FetchError> {
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;

    loop {
        info!("Fetching {} (attempt {}/{})", url, attempt, attempts);
        match fetcher.fetch_text(url).await {
            Ok(body) => {
                info!("Fetched {} successfully", url);
                return Ok(body);
            }
            Err(e) if attempt < attempts => {
                warn!("Attempt {} failed: {}", attempt, e);
                info!("Retrying in {} seconds...", policy.delay.as_secs());
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(e) => {
                error!("Attempt {} failed: {}", attempt, e);
                error!("Giving up on {} after {} attempts", url, attempts);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MockFetcher;

    const URL: &str = "https://kojipkgs.example.org/compose/iot/";

    #[tokio::test]
    async fn test_first_attempt_succeeds() {
        let fetcher = MockFetcher::new().with_page(URL, "<html></html>");
        let body = fetch_with_retry(&fetcher, URL, RetryPolicy::new(3, Duration::ZERO))
            .await
            .unwrap();

        assert_eq!(body, "<html></html>");
        assert_eq!(fetcher.calls_to(URL), 1);
    }

    #[tokio::test]
    async fn test_recovers_before_exhaustion() {
        let fetcher = MockFetcher::new().with_flaky_page(URL, 2, "<html></html>");
        let body = fetch_with_retry(&fetcher, URL, RetryPolicy::new(3, Duration::ZERO)).await;

        assert!(body.is_ok());
        assert_eq!(fetcher.calls_to(URL), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_all_attempts() {
        let fetcher = MockFetcher::new().with_status(URL, 500);
        let result = fetch_with_retry(&fetcher, URL, RetryPolicy::new(3, Duration::ZERO)).await;

        assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
        assert_eq!(fetcher.calls_to(URL), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_between_attempts() {
        let fetcher = MockFetcher::new().with_status(URL, 500);
        let started = tokio::time::Instant::now();

        let _ = fetch_with_retry(&fetcher, URL, RetryPolicy::new(3, Duration::from_secs(60))).await;

        assert!(started.elapsed() >= Duration::from_secs(120));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts, 1);
    }
}
