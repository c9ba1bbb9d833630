//! wikiprobe CLI: end-to-end scenarios for wiki-style websites
//!
//! ## Usage
//!
//! ```bash
//! wikiprobe list                          # Show the scenario catalog
//! wikiprobe run                           # Run everything in Chromium
//! wikiprobe run --filter search -j 4      # Only search scenarios, 4 tabs at once
//! wikiprobe run --offline --format json   # Built-in offline wiki, JSON report
//! wikiprobe config                        # Effective configuration as YAML
//! ```

use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wikiprobe::fake::{wiki_site, FakeBrowser};
use wikiprobe::{
    catalog, PageFactory, ProbeConfig, ProbeResult, RunnerConfig, ScenarioRunner,
    SuiteReport,
};
use wikiprobe_cli::{
    apply_run_args, load_probe_config, render_json_report, render_listing, render_text_report,
    write_report, Cli, CliConfig, CliError, CliResult, ColorChoice, Commands, ConfigArgs, ListArgs,
    OutputFormat, ProgressReporter, RunArgs, Verbosity,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is_reported() {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_tracing(config.verbosity);

    match cli.command {
        Commands::List(ref args) => {
            run_list(args);
            Ok(())
        }
        Commands::Config(ref args) => run_config(&cli, args),
        Commands::Run(ref args) => run_scenarios(&config, &cli, args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.verbose, cli.quiet))
        .with_color(ColorChoice::from(cli.color))
}

fn init_tracing(verbosity: Verbosity) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.log_filter()));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn run_list(args: &ListArgs) {
    let scenarios = catalog();
    let filter = RunnerConfig::new().with_filter(args.filter.clone());
    let selected: Vec<_> = scenarios
        .iter()
        .filter(|s| filter.selects(s))
        .collect();
    print!("{}", render_listing(&selected));
}

fn run_config(cli: &Cli, args: &ConfigArgs) -> CliResult<()> {
    let probe = if args.defaults {
        ProbeConfig::default()
    } else {
        load_probe_config(cli.config.as_deref())?
    };
    print!("{}", probe.to_yaml_string()?);
    Ok(())
}

fn run_scenarios(config: &CliConfig, cli: &Cli, args: &RunArgs) -> CliResult<()> {
    let probe = apply_run_args(load_probe_config(cli.config.as_deref())?, args)?;
    let runner_config = probe
        .runner_config()
        .with_filter(args.filter.clone())
        .with_include_skipped(args.include_skipped);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let report = runtime.block_on(async {
        if args.offline {
            tracing::info!("using the offline wiki");
            let runner = ScenarioRunner::new(FakeBrowser::new(wiki_site()), runner_config);
            Ok(execute(&runner, config).await)
        } else {
            run_in_browser(&probe, runner_config, config).await
        }
    })?;

    let use_color = config.color.should_color();
    match OutputFormat::from(args.format) {
        OutputFormat::Text => print!("{}", render_text_report(&report, use_color)),
        OutputFormat::Json => println!("{}", render_json_report(&report)?),
    }

    let path = write_report(&probe.output_dir, &report)?;
    tracing::info!(path = %path.display(), "report written");

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failed(),
            total: report.total(),
        })
    }
}

#[cfg(feature = "browser")]
async fn run_in_browser(
    probe: &ProbeConfig,
    runner_config: RunnerConfig,
    config: &CliConfig,
) -> CliResult<SuiteReport> {
    let browser = wikiprobe::Browser::launch(probe.browser_config()).await?;
    let runner = ScenarioRunner::new(browser, runner_config);
    let report = execute(&runner, config).await;
    let closed = runner.into_factory().close().await;
    Ok(keep_report(report, closed))
}

/// A browser that fails to shut down does not cost the run its report
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn keep_report(report: SuiteReport, closed: ProbeResult<()>) -> SuiteReport {
    if let Err(e) = closed {
        tracing::warn!(error = %e, "browser did not close cleanly");
    }
    report
}

#[cfg(not(feature = "browser"))]
async fn run_in_browser(
    _probe: &ProbeConfig,
    _runner_config: RunnerConfig,
    _config: &CliConfig,
) -> CliResult<SuiteReport> {
    Err(CliError::config(
        "browser support not enabled; rebuild with --features browser or pass --offline",
    ))
}

async fn execute<F: PageFactory>(runner: &ScenarioRunner<F>, config: &CliConfig) -> SuiteReport {
    let scenarios = catalog();
    let total = scenarios.iter().filter(|s| runner.config().selects(s)).count();

    let use_color = config.color.should_color();
    let mut reporter = ProgressReporter::new(use_color, config.verbosity.is_quiet());
    reporter.header("wikiprobe");
    reporter.info(&format!(
        "{total} scenarios against {}",
        runner.config().base_url
    ));
    reporter.start_progress(total as u64, "Running scenarios");

    let report = runner
        .run_observed(&scenarios, |done| reporter.scenario_done(done))
        .await;
    reporter.finish();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikiprobe::ProbeError;

    #[test]
    fn test_close_failure_keeps_report() {
        let report = SuiteReport {
            base_url: "https://en.wikipedia.org".to_string(),
            ..SuiteReport::default()
        };
        let closed = Err(ProbeError::BrowserLaunch {
            message: "connection reset".to_string(),
        });
        let kept = keep_report(report, closed);
        assert_eq!(kept.base_url, "https://en.wikipedia.org");
        assert!(kept.all_passed());
    }
}
