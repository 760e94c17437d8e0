//! Command-line interface for StoryNest
//!
//! Handles argument parsing and logging configuration.

use crate::services::gemini::{DEFAULT_BASE_URL, DEFAULT_SPEECH_MODEL, DEFAULT_TEXT_MODEL};
use clap::Parser;
use log::LevelFilter;

/// StoryNest - Bedtime stories with narration
#[derive(Parser, Debug)]
#[command(name = "storynest")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Gemini API key (falls back to the API_KEY environment variable)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the Gemini REST API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Model used for ideas and stories
    #[arg(long, default_value = DEFAULT_TEXT_MODEL)]
    pub text_model: String,

    /// Model used for narration
    #[arg(long, default_value = DEFAULT_SPEECH_MODEL)]
    pub speech_model: String,

    /// Number of ideas requested per fetch
    #[arg(long, default_value_t = 18, value_parser = clap::value_parser!(u16).range(1..))]
    pub idea_count: u16,

    /// Increase logging verbosity
    /// -v = info, -vv = debug, -vvv = trace, -vvvv = all deps
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Get the log level filter based on verbosity flags
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else {
            match self.verbose {
                0 => LevelFilter::Warn,
                1 => LevelFilter::Info,
                2 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }
}

/// Initialize the logging system based on CLI arguments
pub fn init_logging(args: &Args) {
    let mut builder = env_logger::Builder::new();

    // Base level for all modules - keep at warn to suppress noisy deps
    builder.filter_level(LevelFilter::Warn);

    builder.filter_module("storynest", args.log_level());

    // GUI framework modules only at -vvvv (very verbose)
    if args.verbose >= 4 {
        builder.filter_module("naga", args.log_level());
        builder.filter_module("blade_graphics", args.log_level());
        builder.filter_module("gpui", args.log_level());
        builder.filter_module("fontdb", args.log_level());
        builder.filter_module("reqwest", args.log_level());
    }

    builder.format_timestamp_millis().init();
}
