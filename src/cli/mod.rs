pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{AnalyzeArgs, CheckArgs, CliArgs, Commands};
pub use handlers::{handle_analyze, handle_check};
pub use output::render_outcome;
