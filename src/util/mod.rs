//! Utility modules for compose-watch

pub mod logging;

pub use logging::{init_logging, init_with, LoggingConfig};
