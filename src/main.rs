use compose_watch::cli::commands::{CliArgs, Commands};
use compose_watch::cli::handlers::{handle_analyze, handle_check};
use compose_watch::util::logging::init_with;
use compose_watch::{WatchConfig, VERSION};

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    let args = CliArgs::parse();

    let config = WatchConfig::default();
    init_with(
        args.log_level_override().unwrap_or(&config.log_level),
        config.log_json,
    );

    debug!("compose-watch v{} starting", VERSION);
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => debug!("Failed to load .env file: {}", e),
    }
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Check(check_args) => handle_check(check_args).await,
        Commands::Analyze(analyze_args) => handle_analyze(analyze_args).await,
    };

    std::process::exit(exit_code);
}
