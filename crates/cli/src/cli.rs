//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Line Sender - batch metrics to a line-protocol endpoint
#[derive(Parser, Debug)]
#[command(
    name = "line-sender",
    author,
    version,
    about = "Batch metrics and ship them as InfluxDB line protocol",
    long_about = "Reads metrics as JSON lines, groups them into batches by size and time,\n\
                  and writes each batch to a TCP endpoint (e.g. a Telegraf socket listener)."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LINE_SENDER_VERBOSE")]
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
        env = "LINE_SENDER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send metrics read as JSON lines
    Send(SendArgs),

    /// Validate configuration file without sending
    Validate(ValidateArgs),
}

/// Arguments for the `send` command
#[derive(Parser, Debug, Clone)]
pub struct SendArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, env = "LINE_SENDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the endpoint (host:port)
    #[arg(short, long, env = "LINE_SENDER_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Override the batch size (0 = size trigger disabled)
    #[arg(long, env = "LINE_SENDER_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Override the batch timeout in milliseconds (0 = timer disabled)
    #[arg(long, env = "LINE_SENDER_BATCH_TIMEOUT_MS")]
    pub batch_timeout_ms: Option<u64>,

    /// JSON-lines input file ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    pub input: PathBuf,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LINE_SENDER_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "sender.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
