use super::client::{ContentFetcher, FetchError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone)]
struct Route {
    body: Result<String, u16>,
    failures_left: usize,
}

/// In-memory fetcher serving scripted pages keyed by exact URL
///
/// Unknown URLs answer HTTP 404. Every request is recorded in order.
#[derive(Debug, Default)]
pub struct MockFetcher {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(url.into(), Ok(body.into()), 0);
        self
    }

    /// Answer `url` with a non-success HTTP status
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.insert(url.into(), Err(status), 0);
        self
    }

    /// Fail the first `failures` requests for `url` with HTTP 503, then serve `body`
    pub fn with_flaky_page(
        self,
        url: impl Into<String>,
        failures: usize,
        body: impl Into<String>,
    ) -> Self {
        self.insert(url.into(), Ok(body.into()), failures);
        self
    }

    fn insert(&self, url: String, body: Result<String, u16>, failures_left: usize) {
        self.routes.lock().unwrap().insert(
            url,
            Route {
                body,
                failures_left,
            },
        );
    }

    /// Every URL requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        let mut routes = self.routes.lock().unwrap();
        let Some(route) = routes.get_mut(url) else {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            });
        };

        if route.failures_left > 0 {
            route.failures_left -= 1;
            return Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            });
        }

        route.body.clone().map_err(|status| FetchError::Status {
            url: url.to_string(),
            status,
        })
    }
}
