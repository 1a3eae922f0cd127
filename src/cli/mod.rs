//! CLI module for llm-pulse
//!
//! # Commands
//!
//! - `serve` - Start the dashboard server and the background sweeper
//! - `check` - Probe every configured model once and print the results
//! - `config init` - Write an example `pulse.toml`
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start the dashboard with a static models file
//! pulse serve --models config.json
//!
//! # One-shot check for scripts
//! pulse check --models config.json --json
//! ```

pub mod check;
pub mod completions;
pub mod config;
pub mod output;
pub mod serve;

pub use check::handle_check;
pub use completions::handle_completions;
pub use config::handle_config_init;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// llm-pulse - LLM endpoint availability dashboard
#[derive(Parser, Debug)]
#[command(
    name = "pulse",
    version,
    about = "Availability and latency dashboard for LLM API endpoints"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the dashboard server
    Serve(ServeArgs),
    /// Probe every configured model once
    Check(CheckArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "pulse.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "PULSE_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "PULSE_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PULSE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Static models config (JSON)
    #[arg(short, long, env = "PULSE_MODELS")]
    pub models: Option<PathBuf>,

    /// Disable the periodic sweep timer (manual checks still work)
    #[arg(long)]
    pub no_health_check: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "pulse.toml")]
    pub config: PathBuf,

    /// Models config to check (JSON); defaults to the configured sources
    #[arg(short, long, env = "PULSE_MODELS")]
    pub models: Option<PathBuf>,

    /// Override the per-probe timeout in milliseconds
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "pulse.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
