use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Daily IoT compose monitor with AI-assisted failure diagnosis
#[derive(Parser, Debug)]
#[command(
    name = "compose-watch",
    about = "Daily IoT compose monitor with AI-assisted failure diagnosis",
    version,
    author,
    long_about = "compose-watch checks today's Fedora IoT composes, walks the compose and \
                  Koji logs of any failed compose, asks a generative model to explain the \
                  failure and posts one summary to a Slack webhook."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - only log errors"
    )]
    pub quiet: bool,
}

impl CliArgs {
    /// Log level picked by the global flags; `--log-level` wins over `-v`/`-q`
    pub fn log_level_override(&self) -> Option<&str> {
        match (&self.log_level, self.verbose, self.quiet) {
            (Some(level), _, _) => Some(level.as_str()),
            (None, true, _) => Some("debug"),
            (None, _, true) => Some("error"),
            (None, false, false) => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Check today's composes and post a summary",
        long_about = "Fetches the compose listing, inspects the latest compose of each \
                      configured version for the date and diagnoses failures.\n\n\
                      Examples:\n  \
                      compose-watch check\n  \
                      compose-watch check --versions 43,42 --no-notify\n  \
                      compose-watch check --date 20250701 --retry-count 1"
    )]
    Check(CheckArgs),

    #[command(
        about = "Ask the model a question about a local log file",
        long_about = "Reads a log file and prints the model's answer to a question about it.\n\n\
                      Examples:\n  \
                      compose-watch analyze\n  \
                      compose-watch analyze \"Which package failed?\" --log build.log"
    )]
    Analyze(AnalyzeArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct CheckArgs {
    #[arg(
        long,
        value_name = "LIST",
        help = "Comma-separated versions to check (overrides COMPOSE_WATCH_VERSIONS)"
    )]
    pub versions: Option<String>,

    #[arg(
        long,
        value_name = "YYYYMMDD",
        value_parser = parse_compose_date,
        help = "Compose date to inspect (defaults to today, UTC)"
    )]
    pub date: Option<NaiveDate>,

    #[arg(long, value_name = "N", help = "Attempts for the compose listing fetch")]
    pub retry_count: Option<u32>,

    #[arg(long, value_name = "SECONDS", help = "Delay between listing attempts")]
    pub retry_delay: Option<u64>,

    #[arg(long, help = "Print the summary message instead of posting it")]
    pub no_notify: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    #[arg(value_name = "QUESTION", help = "Question to ask about the log")]
    pub question: Option<String>,

    #[arg(
        short = 'l',
        long,
        value_name = "FILE",
        default_value = "log.txt",
        help = "Log file to analyze"
    )]
    pub log: PathBuf,
}

fn parse_compose_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|e| format!("Invalid date '{}': {} (expected YYYYMMDD)", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_default_check_args() {
        let args = CliArgs::parse_from(["compose-watch", "check"]);
        match args.command {
            Commands::Check(check_args) => {
                assert!(check_args.versions.is_none());
                assert!(check_args.date.is_none());
                assert!(check_args.retry_count.is_none());
                assert!(!check_args.no_notify);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_check_with_options() {
        let args = CliArgs::parse_from([
            "compose-watch",
            "check",
            "--versions",
            "43,42",
            "--date",
            "20250701",
            "--retry-count",
            "1",
            "--retry-delay",
            "0",
            "--no-notify",
        ]);

        match args.command {
            Commands::Check(check_args) => {
                assert_eq!(check_args.versions.as_deref(), Some("43,42"));
                assert_eq!(check_args.date, NaiveDate::from_ymd_opt(2025, 7, 1));
                assert_eq!(check_args.retry_count, Some(1));
                assert_eq!(check_args.retry_delay, Some(0));
                assert!(check_args.no_notify);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let result = CliArgs::try_parse_from(["compose-watch", "check", "--date", "2025-07-01"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_analyze_defaults() {
        let args = CliArgs::parse_from(["compose-watch", "analyze"]);
        match args.command {
            Commands::Analyze(analyze_args) => {
                assert!(analyze_args.question.is_none());
                assert_eq!(analyze_args.log, PathBuf::from("log.txt"));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_with_question_and_log() {
        let args = CliArgs::parse_from([
            "compose-watch",
            "analyze",
            "Which package failed?",
            "--log",
            "/tmp/build.log",
        ]);
        match args.command {
            Commands::Analyze(analyze_args) => {
                assert_eq!(analyze_args.question.as_deref(), Some("Which package failed?"));
                assert_eq!(analyze_args.log, PathBuf::from("/tmp/build.log"));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["compose-watch", "-v", "check"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["compose-watch", "check", "-q"]);
        assert!(args.quiet);

        let args = CliArgs::parse_from(["compose-watch", "--log-level", "debug", "check"]);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_log_level_override() {
        let args = CliArgs::parse_from(["compose-watch", "check"]);
        assert_eq!(args.log_level_override(), None);

        let args = CliArgs::parse_from(["compose-watch", "-v", "check"]);
        assert_eq!(args.log_level_override(), Some("debug"));

        let args = CliArgs::parse_from(["compose-watch", "--quiet", "check"]);
        assert_eq!(args.log_level_override(), Some("error"));

        let args = CliArgs::parse_from(["compose-watch", "-v", "--log-level", "trace", "check"]);
        assert_eq!(args.log_level_override(), Some("trace"));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = CliArgs::try_parse_from(["compose-watch", "-v", "-q", "check"]);
        assert!(result.is_err());
    }
}
