//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// wikiprobe: end-to-end scenarios for wiki-style websites
#[derive(Parser, Debug)]
#[command(name = "wikiprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Config file (defaults to ./wikiprobe.yaml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List scenarios grouped by suite
    List(ListArgs),

    /// Run scenarios
    Run(RunArgs),

    /// Show the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the list command
#[derive(Parser, Debug, Default)]
pub struct ListArgs {
    /// Only scenarios whose "suite > name" contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunArgs {
    /// Only scenarios whose "suite > name" contains this text
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Site origin
    #[arg(long, env = "WIKIPROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Scenarios in flight at once
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Extra attempts after a failure
    #[arg(long)]
    pub retries: Option<u32>,

    /// Wait budget for one query, action or expectation
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Delay between attempts while waiting
    #[arg(long)]
    pub poll_ms: Option<u64>,

    /// Budget for one scenario attempt
    #[arg(long)]
    pub scenario_timeout_ms: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the Chromium sandbox (containers/CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Chromium executable
    #[arg(long, env = "WIKIPROBE_CHROMIUM_PATH")]
    pub chromium_path: Option<PathBuf>,

    /// Report format
    #[arg(long, default_value = "text")]
    pub format: ReportFormatArg,

    /// Directory for report.json
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also run scenarios marked as skipped
    #[arg(long)]
    pub include_skipped: bool,

    /// Run against the built-in offline copy of the wiki instead of a browser
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug, Default)]
pub struct ConfigArgs {
    /// Print the defaults instead of the effective configuration
    #[arg(long)]
    pub defaults: bool,
}

/// Report format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
}

impl From<ReportFormatArg> for crate::output::OutputFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Text => Self::Text,
            ReportFormatArg::Json => Self::Json,
        }
    }
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
