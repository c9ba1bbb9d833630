//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wikiprobe::{Scenario, ScenarioReport, ScenarioStatus, StepOutcome, StepRecord, SuiteReport};

use crate::error::CliResult;

/// File name of the report written to the output directory
pub const REPORT_FILE_NAME: &str = "report.json";

/// Output format for run reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Live progress on stderr while scenarios run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar for `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    fn line(&self, message: &str) {
        match self.progress_bar {
            Some(ref pb) => pb.println(message),
            None => {
                let _ = self.term.write_line(message);
            }
        }
    }

    fn prefix(&self, symbol: &str, plain: &str, color: fn(&str) -> String) -> String {
        if self.use_color {
            color(symbol)
        } else {
            plain.to_string()
        }
    }

    /// One scenario has finished
    pub fn scenario_done(&self, report: &ScenarioReport) {
        match report.status {
            ScenarioStatus::Passed => self.success(&format!(
                "{} ({}ms)",
                report.full_name(),
                report.duration_ms
            )),
            ScenarioStatus::Failed => self.failure(&format!(
                "{}: {}",
                report.full_name(),
                report.error.as_deref().unwrap_or("unknown error")
            )),
            ScenarioStatus::Skipped => self.skipped(&report.full_name()),
        }
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("✓", "PASS", |s| style(s).green().bold().to_string());
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = self.prefix("✗", "FAIL", |s| style(s).red().bold().to_string());
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a skipped message
    pub fn skipped(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("-", "SKIP", |s| style(s).yellow().to_string());
        self.line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.prefix("ℹ", "INFO", |s| style(s).blue().bold().to_string());
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        self.line("");
        self.line(&styled);
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Summary line for a finished run
#[must_use]
pub fn render_summary(report: &SuiteReport, use_color: bool) -> String {
    let (passed, failed, skipped) = (report.passed(), report.failed(), report.skipped());
    let secs = Duration::from_millis(report.duration_ms).as_secs_f64();
    if use_color {
        let passed_style = Style::new().green().bold();
        let failed_style = Style::new().red().bold();
        let skipped_style = Style::new().yellow();
        let status = if failed > 0 {
            failed_style.apply_to("FAILED")
        } else {
            passed_style.apply_to("PASSED")
        };
        format!(
            "{status} {} scenarios in {secs:.2}s ({} passed, {} failed, {} skipped)",
            report.total(),
            passed_style.apply_to(passed),
            if failed > 0 {
                failed_style.apply_to(failed).to_string()
            } else {
                failed.to_string()
            },
            skipped_style.apply_to(skipped)
        )
    } else {
        let status = if failed > 0 { "FAILED" } else { "PASSED" };
        format!(
            "{status} {} scenarios in {secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped)",
            report.total()
        )
    }
}

fn render_steps(out: &mut String, steps: &[StepRecord], indent: usize) {
    for step in steps {
        let pad = "  ".repeat(indent);
        let _ = match &step.outcome {
            StepOutcome::Passed => writeln!(out, "{pad}✓ {} ({}ms)", step.name, step.duration_ms),
            StepOutcome::Failed(message) => {
                writeln!(out, "{pad}✗ {} ({}ms): {message}", step.name, step.duration_ms)
            }
            StepOutcome::Running => writeln!(out, "{pad}… {}", step.name),
        };
        render_steps(out, &step.children, indent + 1);
    }
}

/// Text report: one line per scenario, the step tree under each failure
#[must_use]
pub fn render_text_report(report: &SuiteReport, use_color: bool) -> String {
    let mut out = String::new();
    let mut suite = "";
    for scenario in &report.scenarios {
        if scenario.suite != suite {
            suite = scenario.suite.as_str();
            let _ = writeln!(out, "{suite}");
        }
        match scenario.status {
            ScenarioStatus::Passed => {
                let _ = writeln!(out, "  PASS {} ({}ms)", scenario.name, scenario.duration_ms);
            }
            ScenarioStatus::Skipped => {
                let _ = writeln!(
                    out,
                    "  SKIP {} ({})",
                    scenario.name,
                    scenario.skip_reason.as_deref().unwrap_or("skipped")
                );
            }
            ScenarioStatus::Failed => {
                let _ = writeln!(
                    out,
                    "  FAIL {} after {} attempt(s): {}",
                    scenario.name,
                    scenario.attempts,
                    scenario.error.as_deref().unwrap_or("unknown error")
                );
                render_steps(&mut out, &scenario.steps, 3);
            }
        }
    }
    let _ = writeln!(out);
    out.push_str(&render_summary(report, use_color));
    out.push('\n');
    out
}

/// Pretty JSON report
pub fn render_json_report(report: &SuiteReport) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Write `report.json` into `dir`, creating it as needed
pub fn write_report(dir: &Path, report: &SuiteReport) -> CliResult<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(REPORT_FILE_NAME);
    std::fs::write(&path, render_json_report(report)?)?;
    Ok(path)
}

/// Scenario listing grouped by suite
#[must_use]
pub fn render_listing(scenarios: &[&Scenario]) -> String {
    let mut out = String::new();
    let mut suite = "";
    for scenario in scenarios {
        if scenario.suite != suite {
            suite = scenario.suite;
            let _ = writeln!(out, "{suite}");
        }
        match scenario.skip {
            Some(reason) => {
                let _ = writeln!(out, "  {} (skipped: {reason})", scenario.name);
            }
            None => {
                let _ = writeln!(out, "  {}", scenario.name);
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wikiprobe::catalog;

    fn scenario(suite: &str, name: &str, status: ScenarioStatus) -> ScenarioReport {
        ScenarioReport {
            suite: suite.to_string(),
            name: name.to_string(),
            status,
            attempts: u32::from(status != ScenarioStatus::Skipped),
            duration_ms: 40,
            error: (status == ScenarioStatus::Failed).then(|| "Expected X: expected a, got b".to_string()),
            error_kind: None,
            skip_reason: (status == ScenarioStatus::Skipped).then(|| "no account".to_string()),
            steps: vec![StepRecord {
                name: "MainPage.check".to_string(),
                depth: 0,
                started_at_ms: 0,
                duration_ms: 12,
                outcome: if status == ScenarioStatus::Failed {
                    StepOutcome::Failed("bad".into())
                } else {
                    StepOutcome::Passed
                },
                children: Vec::new(),
            }],
        }
    }

    fn report() -> SuiteReport {
        SuiteReport {
            base_url: "https://en.wikipedia.org".to_string(),
            scenarios: vec![
                scenario("Search", "hit", ScenarioStatus::Passed),
                scenario("Search", "miss", ScenarioStatus::Failed),
                scenario("Login", "valid", ScenarioStatus::Skipped),
            ],
            duration_ms: 1500,
        }
    }

    mod report_tests {
        use super::*;

        #[test]
        fn test_text_report_groups_and_details_failures() {
            let text = render_text_report(&report(), false);
            let lines: Vec<&str> = text.lines().collect();
            assert_eq!(lines[0], "Search");
            assert_eq!(lines[1], "  PASS hit (40ms)");
            assert!(lines[2].starts_with("  FAIL miss after 1 attempt(s): Expected X"));
            assert_eq!(lines[3], "      ✗ MainPage.check (12ms): bad");
            assert_eq!(lines[4], "Login");
            assert_eq!(lines[5], "  SKIP valid (no account)");
            assert!(text.contains("FAILED 3 scenarios in 1.50s (1 passed, 1 failed, 1 skipped)"));
        }

        #[test]
        fn test_summary_passed() {
            let mut passing = report();
            passing.scenarios.remove(1);
            assert!(render_summary(&passing, false).starts_with("PASSED 2 scenarios"));
        }

        #[test]
        fn test_json_report_parses_back() {
            let json = render_json_report(&report()).unwrap();
            let back: SuiteReport = serde_json::from_str(&json).unwrap();
            assert_eq!(back.failed(), 1);
        }

        #[test]
        fn test_write_report_creates_dir() {
            let dir = tempfile::tempdir().unwrap();
            let path = write_report(&dir.path().join("nested"), &report()).unwrap();
            assert!(path.ends_with(REPORT_FILE_NAME));
            assert!(std::fs::read_to_string(path).unwrap().contains("\"miss\""));
        }

        #[test]
        fn test_listing_marks_skipped() {
            let all = catalog();
            let refs: Vec<&Scenario> = all.iter().collect();
            let text = render_listing(&refs);
            assert!(text.starts_with("Main Menu Functionality\n"));
            assert!(text.contains("  Successful login (skipped: "));
            assert_eq!(text.lines().filter(|l| !l.starts_with(' ')).count(), 6);
        }
    }

    mod progress_reporter_tests {
        use super::*;

        #[test]
        fn test_new_reporter() {
            let reporter = ProgressReporter::new(true, false);
            assert!(reporter.use_color);
            assert!(!reporter.quiet);
        }

        #[test]
        fn test_progress_bar() {
            let mut reporter = ProgressReporter::new(false, false);
            reporter.start_progress(3, "Running scenarios");
            for s in report().scenarios {
                reporter.scenario_done(&s);
            }
            reporter.finish();
            // No panic = success
        }

        #[test]
        fn test_quiet_mode_suppresses_output() {
            let mut reporter = ProgressReporter::new(false, true);
            reporter.start_progress(10, "Running scenarios");
            assert!(reporter.progress_bar.is_none());
            reporter.success("hidden");
            reporter.info("hidden");
            reporter.header("hidden");
            // Failure is still printed
            reporter.failure("shown");
        }
    }
}
