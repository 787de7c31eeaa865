//! Structured logging setup for compose-watch
//!
//! Progress and diagnostics go to stderr through `tracing`; stdout is kept
//! for the console summary printed at the end of a run.
//!
//! # Example
//!
//! ```no_run
//! use compose_watch::util::logging;
//!
//! logging::init_with("info", false);
//!
//! use tracing::{info, warn};
//! info!("Checking compose for Fedora-IoT 43");
//! warn!(version = "42", "STATUS file not found");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Noisy transport crates held at `warn` unless `RUST_LOG` says otherwise
const QUIET_CRATES: &[&str] = &["h2", "hyper", "hyper_util", "reqwest", "html5ever", "selectors"];

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level for compose-watch's own events
    pub level: Level,

    /// Use JSON output format (for log collectors in CI)
    pub use_json: bool,

    /// Include the module target (e.g., compose_watch::diagnosis) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// JSON output with targets and locations, for CI log collectors
    pub fn structured(level: Level) -> Self {
        Self {
            level,
            use_json: true,
            include_target: true,
            include_location: true,
        }
    }
}

/// Parses a log level from a string
///
/// Unknown values fall back to `Level::INFO`.
///
/// ```
/// use compose_watch::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("chatty"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Builds the event filter; a set `RUST_LOG` replaces our own directives
fn build_filter(level: Level) -> EnvFilter {
    let filter = EnvFilter::from_default_env();
    if env::var("RUST_LOG").is_ok() {
        return filter;
    }

    std::iter::once(format!("compose_watch={}", level))
        .chain(QUIET_CRATES.iter().map(|c| format!("{}=warn", c)))
        .filter_map(|d| d.parse().ok())
        .fold(filter, |filter, directive| {
            filter.add_directive(directive)
        })
}

/// Initializes the logging system; later calls are ignored
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .with_file(config.include_location)
                        .with_line_number(config.include_location),
                )
                .init();
        }
    });
}

/// Initializes logging from an explicit level string and format flag
pub fn init_with(level_str: &str, use_json: bool) {
    let level = parse_level(level_str);
    let config = if use_json {
        LoggingConfig::structured(level)
    } else {
        LoggingConfig::with_level(level)
    };
    init_logging(config);
}
