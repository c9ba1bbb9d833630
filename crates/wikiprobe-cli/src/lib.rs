//! wikiprobe CLI library
//!
//! Argument parsing, configuration layering and report output for the
//! `wikiprobe` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
mod output;

pub use commands::{Cli, ColorArg, Commands, ConfigArgs, ListArgs, ReportFormatArg, RunArgs};
pub use config::{apply_run_args, load_probe_config, CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{
    render_json_report, render_listing, render_summary, render_text_report, write_report,
    OutputFormat, ProgressReporter, REPORT_FILE_NAME,
};
