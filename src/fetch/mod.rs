//! Content fetching
//!
//! Every remote artifact (directory listings, STATUS files, logs, Koji pages,
//! JSON) is retrieved through the [`ContentFetcher`] trait so the diagnosis
//! flow can be exercised against scripted pages in tests.

mod client;
mod http;
mod mock;
mod retry;

pub use client::{ContentFetcher, FetchError};
pub use http::HttpFetcher;
pub use mock::MockFetcher;
pub use retry::{fetch_with_retry, RetryPolicy};
