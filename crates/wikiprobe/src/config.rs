//! Suite configuration file (`wikiprobe.yaml`).
//!
//! Every key is optional; missing keys take the defaults below.
//!
//! ```yaml
//! base_url: https://en.wikipedia.org
//! timeout_ms: 5000
//! poll_interval_ms: 50
//! jobs: 2
//! retries: 1
//! headless: true
//! sandbox: true
//! chromium_path: /usr/bin/chromium
//! viewport: { width: 1280, height: 720 }
//! output_dir: target/wikiprobe
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::browser::BrowserConfig;
use crate::result::{ProbeError, ProbeResult};
use crate::runner::{RunnerConfig, DEFAULT_BASE_URL, DEFAULT_SCENARIO_TIMEOUT_MS};
use crate::wait::{WaitPolicy, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};

/// Default config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "wikiprobe.yaml";

/// Browser window size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Settings of a suite run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    /// Site origin
    pub base_url: String,
    /// Wait budget for one query, action or expectation
    pub timeout_ms: u64,
    /// Delay between attempts while waiting
    pub poll_interval_ms: u64,
    /// Budget for one scenario attempt
    pub scenario_timeout_ms: u64,
    /// Scenarios in flight at once
    pub jobs: usize,
    /// Extra attempts after a failure
    pub retries: u32,
    /// Run the browser without a window
    pub headless: bool,
    /// Keep the Chromium sandbox enabled
    pub sandbox: bool,
    /// Chromium executable (auto-detected when unset)
    pub chromium_path: Option<PathBuf>,
    /// Window size
    pub viewport: Viewport,
    /// Where reports are written
    pub output_dir: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            scenario_timeout_ms: DEFAULT_SCENARIO_TIMEOUT_MS,
            jobs: 1,
            retries: 0,
            headless: true,
            sandbox: true,
            chromium_path: None,
            viewport: Viewport::default(),
            output_dir: PathBuf::from("target/wikiprobe"),
        }
    }
}

impl ProbeConfig {
    /// Parse YAML text
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    pub fn to_yaml_string(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject values no run can use
    pub fn validate(&self) -> ProbeResult<()> {
        let url = url::Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ProbeError::config(format!(
                "base_url must be http(s), got {}",
                self.base_url
            )));
        }
        if self.jobs == 0 {
            return Err(ProbeError::config("jobs must be at least 1"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ProbeError::config("poll_interval_ms must be positive"));
        }
        if self.poll_interval_ms > self.timeout_ms {
            return Err(ProbeError::config(format!(
                "poll_interval_ms ({}) exceeds timeout_ms ({})",
                self.poll_interval_ms, self.timeout_ms
            )));
        }
        Ok(())
    }

    #[must_use]
    pub const fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::from_millis(self.timeout_ms, self.poll_interval_ms)
    }

    /// Runner settings (filter and skip handling are left to the caller)
    #[must_use]
    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig::new()
            .with_base_url(self.base_url.clone())
            .with_wait_policy(self.wait_policy())
            .with_jobs(self.jobs)
            .with_retries(self.retries)
            .with_scenario_timeout(Duration::from_millis(self.scenario_timeout_ms))
    }

    /// Browser launch settings
    #[must_use]
    pub fn browser_config(&self) -> BrowserConfig {
        let mut config = BrowserConfig::default()
            .with_headless(self.headless)
            .with_viewport(self.viewport.width, self.viewport.height);
        if !self.sandbox {
            config = config.with_no_sandbox();
        }
        if let Some(path) = &self.chromium_path {
            config = config.with_chromium_path(path.clone());
        }
        config
    }
}
