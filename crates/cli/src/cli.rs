//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Hedge Search - replicated search with a collection deadline
#[derive(Parser, Debug)]
#[command(
    name = "hedge-search",
    author,
    version,
    about = "Hedged search across replicated backends",
    long_about = "Sends a query to every category of backends at once.\n\n\
                  Inside a category the same query is raced against every replica and \n\
                  the first success wins. Results are collected until every category \n\
                  has answered or the deadline elapses, whichever comes first."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "HEDGE_SEARCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "HEDGE_SEARCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a hedged search
    Search(SearchArgs),

    /// Validate configuration file without searching
    Validate(ValidateArgs),

    /// Display category and backend information
    Info(InfoArgs),
}

/// Arguments for the `search` command
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Query sent to every category
    pub query: String,

    /// Path to configuration file (TOML or JSON); built-in demo topology if omitted
    #[arg(short, long, env = "HEDGE_SEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the collection deadline in milliseconds
    #[arg(long, env = "HEDGE_SEARCH_DEADLINE_MS")]
    pub deadline_ms: Option<u64>,

    /// Number of times to run the search
    #[arg(long, default_value = "1", env = "HEDGE_SEARCH_REPEAT", value_parser = clap::value_parser!(u32).range(1..))]
    pub repeat: u32,

    /// Print each dispatch result as JSON
    #[arg(long)]
    pub json: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "HEDGE_SEARCH_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml", env = "HEDGE_SEARCH_CONFIG")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; built-in demo topology if omitted
    #[arg(short, long, env = "HEDGE_SEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show per-backend latency and failure settings
    #[arg(long)]
    pub backends: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

impl Cli {
    /// Logging setup implied by `-v`, `-q` and `--log-format`
    pub fn observability_config(&self) -> observability::ObservabilityConfig {
        observability::ObservabilityConfig::from_verbosity(
            self.verbose,
            self.quiet,
            self.log_format.into(),
        )
    }
}
