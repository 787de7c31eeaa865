use super::commands::{AnalyzeArgs, CheckArgs};
use super::output::render_outcome;
use crate::config::{parse_versions, WatchConfig};
use crate::diagnosis::prompts::{log_question_prompt, DEFAULT_LOG_QUESTION};
use crate::llm::{LLMClient, LLMRequest};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::pipeline::{ComposeWatcher, WatchContext};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Exit code for invalid configuration or arguments
pub const EXIT_CONFIG_ERROR: i32 = 2;

pub async fn handle_check(args: &CheckArgs) -> i32 {
    let mut config = WatchConfig::default();
    apply_check_overrides(&mut config, args);

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        eprintln!("Error: {}", e);
        return EXIT_CONFIG_ERROR;
    }
    debug!("{}", config);
    config.log_integrations();

    let notifier: Option<Arc<dyn Notifier>> = if args.no_notify {
        Some(Arc::new(ConsoleNotifier))
    } else {
        None
    };

    let context = match WatchContext::from_config(&config, notifier) {
        Ok(context) => context,
        Err(e) => {
            error!("Failed to initialize: {:#}", e);
            eprintln!("Error: {:#}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let date = args.date.unwrap_or_else(|| Utc::now().date_naive());
    let outcome = ComposeWatcher::new(context).run(date).await;

    print!("{}", render_outcome(&outcome));
    outcome.exit_code()
}

pub async fn handle_analyze(args: &AnalyzeArgs) -> i32 {
    let config = WatchConfig::default();

    let result = match config.create_llm_client() {
        Some(client) => analyze_log_file(client.as_ref(), args).await,
        None => Err(anyhow!("GEMINI_API_KEY is not set")),
    };

    match result {
        Ok(answer) => {
            println!("{}", answer);
            0
        }
        Err(e) => {
            error!("Log analysis failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

fn apply_check_overrides(config: &mut WatchConfig, args: &CheckArgs) {
    if let Some(versions) = &args.versions {
        config.versions = parse_versions(versions);
    }
    if let Some(count) = args.retry_count {
        config.retry_count = count;
    }
    if let Some(delay) = args.retry_delay {
        config.retry_delay_secs = delay;
    }
}

async fn analyze_log_file(client: &dyn LLMClient, args: &AnalyzeArgs) -> Result<String> {
    let log = tokio::fs::read_to_string(&args.log)
        .await
        .with_context(|| format!("Failed to read log file {}", args.log.display()))?;

    let question = args.question.as_deref().unwrap_or(DEFAULT_LOG_QUESTION);
    info!(
        "Asking {} about {} ({} bytes)",
        client.name(),
        args.log.display(),
        log.len()
    );

    let response = client
        .chat(LLMRequest::prompt(log_question_prompt(question, &log)))
        .await
        .context("Model request failed")?;
    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{MockLLMClient, MockResponse};
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn check_args() -> CheckArgs {
        CheckArgs {
            versions: None,
            date: None,
            retry_count: None,
            retry_delay: None,
            no_notify: false,
        }
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let mut config = WatchConfig::from_lookup(|_| None);
        let args = CheckArgs {
            versions: Some("44, 43".to_string()),
            retry_count: Some(1),
            retry_delay: Some(5),
            ..check_args()
        };

        apply_check_overrides(&mut config, &args);

        assert_eq!(config.versions, vec!["44", "43"]);
        assert_eq!(config.retry_count, 1);
        assert_eq!(config.retry_delay_secs, 5);
    }

    #[test]
    fn test_empty_versions_override_fails_validation() {
        let mut config = WatchConfig::from_lookup(|_| None);
        let args = CheckArgs {
            versions: Some(" , ".to_string()),
            ..check_args()
        };

        apply_check_overrides(&mut config, &args);

        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_analyze_log_file_sends_question_and_log() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "error: package shadow-utils not found").unwrap();

        let client = MockLLMClient::new();
        client.add_response(MockResponse::text("shadow-utils is missing"));
        let args = AnalyzeArgs {
            question: None,
            log: file.path().to_path_buf(),
        };

        let answer = analyze_log_file(&client, &args).await.unwrap();

        assert_eq!(answer, "shadow-utils is missing");
        let prompt = &client.prompts()[0];
        assert!(prompt.contains(DEFAULT_LOG_QUESTION));
        assert!(prompt.contains("package shadow-utils not found"));
    }

    #[tokio::test]
    async fn test_analyze_missing_file_is_an_error() {
        let client = MockLLMClient::new();
        let args = AnalyzeArgs {
            question: Some("why?".to_string()),
            log: PathBuf::from("/nonexistent/compose-watch/log.txt"),
        };

        let err = analyze_log_file(&client, &args).await.unwrap_err();

        assert!(err.to_string().contains("Failed to read log file"));
        assert_eq!(client.call_count(), 0);
    }
}
