//! wikiprobe: page-object end-to-end tests for wiki-style websites
//!
//! Each screen or widget of the wiki is a page object holding deferred
//! [`Locator`]s and async actions and checks built from them. Scenarios
//! compose page objects through an [`Application`] bound to one browser tab.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   WIKIPROBE Architecture                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │   ┌────────────┐    ┌────────────┐    ┌────────────┐            │
//! │   │ Scenario   │    │ Page       │    │ PageDriver │            │
//! │   │ catalog    │───►│ objects    │───►│ CDP / fake │            │
//! │   │ + runner   │    │ (Locator)  │    │            │            │
//! │   └────────────┘    └────────────┘    └────────────┘            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wikiprobe::fake::{wiki_site, FakePage};
//! use wikiprobe::{Application, Page, PageHandle};
//!
//! # async fn demo() -> wikiprobe::ProbeResult<()> {
//! let page = PageHandle::new(Arc::new(FakePage::new(Arc::new(wiki_site()))));
//! let app = Application::new(page);
//! app.main_page.open("https://en.wikipedia.org/wiki/Main_Page").await?;
//! app.navbar.search("Kurube Kanga ruins").await?;
//! app.article_page.check_article_elements_visibility(None).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod assertion;
mod browser;
mod config;
mod driver;
mod expect;
mod handle;
mod locator;
mod page_object;
mod result;
mod step;
mod wait;

#[allow(missing_docs, clippy::missing_errors_doc)]
mod app;

/// Header widgets shared by every page
#[allow(missing_docs, clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod components;

/// In-memory page driver and the offline copy of the wiki
#[allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]
pub mod fake;

/// Wiki pages, one page object per screen
#[allow(missing_docs, clippy::missing_errors_doc, clippy::must_use_candidate)]
pub mod pages;

#[allow(missing_docs, clippy::missing_errors_doc)]
mod runner;

/// The scenario catalog
#[allow(missing_docs)]
pub mod scenario;

pub use app::Application;
pub use assertion::{Assertion, AssertionResult};
pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::{Browser, CdpPage};
pub use config::{ProbeConfig, Viewport, CONFIG_FILE_NAME};
pub use driver::{PageDriver, PageFactory};
pub use expect::{expect, expect_url_contains, LocatorExpectation};
pub use handle::PageHandle;
pub use locator::{normalize_whitespace, text_matches, Locator, Query, QueryStep};
pub use page_object::{
    expect_all_visible, join_url, probe_count, probe_text, probe_visible, Component, Page,
};
pub use result::{ProbeError, ProbeResult};
pub use runner::{
    RunnerConfig, ScenarioReport, ScenarioRunner, ScenarioStatus, SuiteReport,
    DEFAULT_BASE_URL, DEFAULT_SCENARIO_TIMEOUT_MS,
};
pub use scenario::{catalog, Scenario, ScenarioContext, ScenarioFn, START_PATH};
pub use step::{step, StepOutcome, StepRecord, StepReporter, StepToken};
pub use wait::{WaitPolicy, WaitTimeout, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS};

/// Prelude for scenario code
pub mod prelude {
    pub use crate::components::{MainMenu, NavBar};
    pub use crate::pages::{ArticlePage, LoginPage, MainPage, SearchResultPage};
    pub use crate::{
        expect, expect_url_contains, step, Application, Component, Locator, Page, PageHandle,
        ProbeError, ProbeResult, WaitPolicy,
    };
}
