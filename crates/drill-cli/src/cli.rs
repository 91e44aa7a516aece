//! CLI argument definitions for the scope drill tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use drill_model::{ScopeLevel, TimeRange, ViewMode};

#[derive(Parser)]
#[command(
    name = "scope-drill",
    version,
    about = "Scope drill navigation - decode, encode, and replay drill paths",
    long_about = "Inspect and exercise the drill navigation core.\n\n\
                  Decodes address-bar query strings into canonical drill stacks,\n\
                  encodes drill paths into shareable queries, and replays intent\n\
                  scripts against an in-memory browser history."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub root: RootArgs,

    /// Navigator configuration file (TOML).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Output format for results.
    #[arg(long = "format", value_enum, default_value = "table", global = true)]
    pub format: OutputFormatArg,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Decode a query string into the canonical stack and filters.
    Decode(DecodeArgs),

    /// Encode a drill path and filters into a query string.
    Encode(EncodeArgs),

    /// Replay an intent script against an in-memory history.
    Replay(ReplayArgs),
}

/// The fixed root scope and default filters.
#[derive(Args, Clone)]
pub struct RootArgs {
    /// Level of the root scope.
    #[arg(long = "root-level", default_value = "root", global = true)]
    pub root_level: ScopeLevel,

    /// Id of the root scope.
    #[arg(long = "root-id", default_value = "all", global = true)]
    pub root_id: String,

    /// Label of the root scope.
    #[arg(long = "root-label", default_value = "All regions", global = true)]
    pub root_label: String,

    /// Metric used when the query names none.
    #[arg(long = "default-metric", default_value = "power", global = true)]
    pub default_metric: String,
}

#[derive(Parser)]
pub struct DecodeArgs {
    /// Query string, with or without a leading `?`.
    #[arg(value_name = "QUERY")]
    pub query: String,
}

#[derive(Parser)]
pub struct EncodeArgs {
    /// Level of each drilled scope, outermost first.
    #[arg(long = "level", value_name = "LEVEL")]
    pub levels: Vec<ScopeLevel>,

    /// Id of each drilled scope, paired with `--level` by position.
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<String>,

    /// Label of each drilled scope (defaults to the id).
    #[arg(long = "label", value_name = "LABEL")]
    pub labels: Vec<String>,

    /// Selected metric.
    #[arg(long = "metric", value_name = "METRIC")]
    pub metric: Option<String>,

    /// Time range preset.
    #[arg(long = "range", value_name = "RANGE")]
    pub range: Option<TimeRange>,

    /// Visualization mode.
    #[arg(long = "view", value_name = "VIEW")]
    pub view: Option<ViewMode>,

    /// Map overlay; pass an empty value to clear it.
    #[arg(long = "overlay", value_name = "OVERLAY")]
    pub overlay: Option<String>,
}

#[derive(Parser)]
pub struct ReplayArgs {
    /// Intent script, one step per line.
    #[arg(value_name = "SCRIPT")]
    pub script: PathBuf,

    /// Initial address-bar query.
    #[arg(long = "initial", value_name = "QUERY", default_value = "")]
    pub initial: String,

    /// Print only the final state, not the per-step transcript.
    #[arg(long = "quiet-steps")]
    pub quiet_steps: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    Table,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
