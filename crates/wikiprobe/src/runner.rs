//! Scenario runner
//!
//! Runs catalog scenarios concurrently, each attempt on a fresh tab from a
//! [`PageFactory`], and collects a serializable [`SuiteReport`].

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;

use crate::app::Application;
use crate::driver::PageFactory;
use crate::handle::PageHandle;
use crate::page_object::Page;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::{Scenario, ScenarioContext, START_PATH};
use crate::step::StepRecord;
use crate::wait::WaitPolicy;

/// Default per-attempt budget for a whole scenario (2 minutes)
pub const DEFAULT_SCENARIO_TIMEOUT_MS: u64 = 120_000;

/// Default site origin
pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";

// =============================================================================
// CONFIG
// =============================================================================

/// Runner settings
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Site origin
    pub base_url: String,
    /// Wait policy for every tab
    pub wait: WaitPolicy,
    /// Scenarios in flight at once
    pub jobs: usize,
    /// Extra attempts after a failure
    pub retries: u32,
    /// Run scenarios marked as skipped
    pub include_skipped: bool,
    /// Substring filter on `suite > name`
    pub filter: Option<String>,
    /// Budget for one attempt including the before-each navigation
    pub scenario_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            wait: WaitPolicy::default(),
            jobs: 1,
            retries: 0,
            include_skipped: false,
            filter: None,
            scenario_timeout: Duration::from_millis(DEFAULT_SCENARIO_TIMEOUT_MS),
        }
    }
}

impl RunnerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub const fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    #[must_use]
    pub const fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub const fn with_include_skipped(mut self, include: bool) -> Self {
        self.include_skipped = include;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub const fn with_scenario_timeout(mut self, timeout: Duration) -> Self {
        self.scenario_timeout = timeout;
        self
    }

    /// Whether `scenario` passes the filter
    #[must_use]
    pub fn selects(&self, scenario: &Scenario) -> bool {
        self.filter.as_deref().map_or(true, |f| scenario.matches(f))
    }
}

// =============================================================================
// REPORTS
// =============================================================================

/// Final status of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub suite: String,
    pub name: String,
    pub status: ScenarioStatus,
    /// Attempts made (0 when skipped)
    pub attempts: u32,
    pub duration_ms: u64,
    /// Error of the last attempt
    pub error: Option<String>,
    /// [`ProbeError::kind`] of the last attempt
    pub error_kind: Option<String>,
    /// Reason for skipping
    pub skip_reason: Option<String>,
    /// Step tree of the last attempt
    pub steps: Vec<StepRecord>,
}

impl ScenarioReport {
    fn skipped(scenario: &Scenario, reason: &str) -> Self {
        Self {
            suite: scenario.suite.to_string(),
            name: scenario.name.to_string(),
            status: ScenarioStatus::Skipped,
            attempts: 0,
            duration_ms: 0,
            error: None,
            error_kind: None,
            skip_reason: Some(reason.to_string()),
            steps: Vec::new(),
        }
    }

    /// `suite > name`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} > {}", self.suite, self.name)
    }
}

/// Results of a whole run, in catalog order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuiteReport {
    pub base_url: String,
    pub scenarios: Vec<ScenarioReport>,
    pub duration_ms: u64,
}

impl SuiteReport {
    fn count(&self, status: ScenarioStatus) -> usize {
        self.scenarios.iter().filter(|s| s.status == status).count()
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(ScenarioStatus::Passed)
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(ScenarioStatus::Failed)
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(ScenarioStatus::Skipped)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.scenarios.len()
    }

    /// No selected scenario failed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioReport> {
        self.scenarios
            .iter()
            .filter(|s| s.status == ScenarioStatus::Failed)
            .collect()
    }
}

// =============================================================================
// RUNNER
// =============================================================================

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Runs scenarios against tabs from `F`
#[derive(Debug)]
pub struct ScenarioRunner<F: PageFactory> {
    factory: F,
    config: RunnerConfig,
}

impl<F: PageFactory> ScenarioRunner<F> {
    #[must_use]
    pub const fn new(factory: F, config: RunnerConfig) -> Self {
        Self { factory, config }
    }

    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Give back the factory, e.g. to close the browser
    #[must_use]
    pub fn into_factory(self) -> F {
        self.factory
    }

    /// Run every selected scenario
    pub async fn run(&self, scenarios: &[Scenario]) -> SuiteReport {
        self.run_observed(scenarios, |_| {}).await
    }

    /// Run every selected scenario, calling `on_done` as each one finishes
    pub async fn run_observed<O>(&self, scenarios: &[Scenario], on_done: O) -> SuiteReport
    where
        O: Fn(&ScenarioReport),
    {
        let start = Instant::now();
        let selected: Vec<&Scenario> = scenarios.iter().filter(|s| self.config.selects(s)).collect();
        tracing::info!(
            selected = selected.len(),
            jobs = self.config.jobs,
            base_url = %self.config.base_url,
            "running scenarios"
        );

        let mut reports: Vec<(usize, ScenarioReport)> = stream::iter(selected.into_iter().enumerate())
            .map(|(index, scenario)| async move { (index, self.run_scenario(scenario).await) })
            .buffer_unordered(self.config.jobs.max(1))
            .inspect(|(_, report)| on_done(report))
            .collect()
            .await;
        reports.sort_by_key(|(index, _)| *index);

        SuiteReport {
            base_url: self.config.base_url.clone(),
            scenarios: reports.into_iter().map(|(_, report)| report).collect(),
            duration_ms: millis(start.elapsed()),
        }
    }

    /// Run one scenario, retrying failed attempts on fresh tabs
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioReport {
        if let Some(reason) = scenario.skip.filter(|_| !self.config.include_skipped) {
            tracing::info!(scenario = %scenario.full_name(), reason, "skipped");
            return ScenarioReport::skipped(scenario, reason);
        }

        let start = Instant::now();
        let max_attempts = self.config.retries.saturating_add(1);
        let mut attempts = 0;
        let mut last_error: Option<ProbeError> = None;
        let mut steps = Vec::new();

        while attempts < max_attempts {
            attempts += 1;
            let span = tracing::info_span!("scenario", name = %scenario.full_name(), attempt = attempts);
            let (result, attempt_steps) = self.attempt(scenario).instrument(span).await;
            steps = attempt_steps;
            match result {
                Ok(()) => {
                    last_error = None;
                    break;
                }
                Err(e) => {
                    tracing::warn!(scenario = %scenario.full_name(), attempt = attempts, error = %e, "attempt failed");
                    last_error = Some(e);
                }
            }
        }

        let status = if last_error.is_some() {
            ScenarioStatus::Failed
        } else {
            ScenarioStatus::Passed
        };
        tracing::info!(scenario = %scenario.full_name(), ?status, attempts, "finished");

        ScenarioReport {
            suite: scenario.suite.to_string(),
            name: scenario.name.to_string(),
            status,
            attempts,
            duration_ms: millis(start.elapsed()),
            error: last_error.as_ref().map(ToString::to_string),
            error_kind: last_error.as_ref().map(|e| e.kind().to_string()),
            skip_reason: None,
            steps,
        }
    }

    async fn attempt(&self, scenario: &Scenario) -> (ProbeResult<()>, Vec<StepRecord>) {
        let driver = match self.factory.new_page().await {
            Ok(driver) => driver,
            Err(e) => return (Err(e), Vec::new()),
        };
        let page = PageHandle::new(driver).with_wait_policy(self.config.wait);
        let app = Application::new(page.clone());
        let ctx = ScenarioContext::new(self.config.base_url.clone());

        let body = async {
            app.main_page.open(&ctx.url(START_PATH)?).await?;
            scenario.run(&app, &ctx).await
        };
        let timeout = self.config.scenario_timeout;
        let result = match tokio::time::timeout(timeout, body).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout {
                ms: millis(timeout),
            }),
        };
        (result, page.steps().finish())
    }
}
