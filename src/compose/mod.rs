//! Compose discovery on the public artifact server
//!
//! - [`links`]: anchor extraction from HTML directory listings and pages
//! - [`locator`]: picks today's compose directory for a version
//! - [`status`]: reads and classifies a compose's `STATUS` marker

pub mod links;
pub mod locator;
pub mod status;

pub use links::{extract_links, extract_links_matching, find_first_link};
pub use locator::{ComposeLocator, ComposeTarget};
pub use status::{fetch_status, StatusFailure, StatusOutcome};
