//! CLI configuration
//!
//! Suite settings are layered: defaults, then the YAML file, then
//! environment variables, then flags. Environment variables reach us through
//! clap's `env` fallback, so a flag always beats its variable.

use std::path::Path;
use wikiprobe::{ProbeConfig, CONFIG_FILE_NAME};

use crate::commands::RunArgs;
use crate::error::CliResult;

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Quiet - minimal output
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - extra output
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    /// From the `-v` count and `-q` flag
    #[must_use]
    pub const fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Tracing filter used when `RUST_LOG` is unset
    #[must_use]
    pub const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "wikiprobe=info",
            Self::Debug => "wikiprobe=debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => console::Term::stderr().features().colors_supported(),
        }
    }
}

/// Output settings shared by every command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }
}

/// Read the config file: `path` when given, else `./wikiprobe.yaml` when it
/// exists, else defaults
pub fn load_probe_config(path: Option<&Path>) -> CliResult<ProbeConfig> {
    match path {
        Some(path) => Ok(ProbeConfig::load(path)?),
        None => {
            let default = Path::new(CONFIG_FILE_NAME);
            if default.is_file() {
                Ok(ProbeConfig::load(default)?)
            } else {
                Ok(ProbeConfig::default())
            }
        }
    }
}

/// Layer `run` flags (and their environment fallbacks) over `config`
pub fn apply_run_args(mut config: ProbeConfig, args: &RunArgs) -> CliResult<ProbeConfig> {
    if let Some(base_url) = &args.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if let Some(retries) = args.retries {
        config.retries = retries;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(poll_ms) = args.poll_ms {
        config.poll_interval_ms = poll_ms;
    }
    if let Some(ms) = args.scenario_timeout_ms {
        config.scenario_timeout_ms = ms;
    }
    if args.headed {
        config.headless = false;
    }
    if args.no_sandbox {
        config.sandbox = false;
    }
    if let Some(path) = &args.chromium_path {
        config.chromium_path = Some(path.clone());
    }
    if let Some(dir) = &args.output {
        config.output_dir.clone_from(dir);
    }
    config.validate()?;
    Ok(config)
}
