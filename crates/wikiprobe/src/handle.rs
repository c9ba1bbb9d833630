//! Shared handle to one live browser tab.

use std::fmt;
use std::sync::Arc;

use crate::driver::PageDriver;
use crate::locator::{Locator, Query, QueryStep};
use crate::result::ProbeResult;
use crate::step::StepReporter;
use crate::wait::WaitPolicy;

/// One live tab plus the wait policy and step sink every component on it uses.
///
/// Clones share the same driver and the same step log. Components receive a
/// clone at construction; nothing reaches the tab through global state.
#[derive(Clone)]
pub struct PageHandle {
    driver: Arc<dyn PageDriver>,
    wait: WaitPolicy,
    steps: StepReporter,
}

impl fmt::Debug for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageHandle")
            .field("driver", &self.driver)
            .field("wait", &self.wait)
            .field("steps", &self.steps.len())
            .finish()
    }
}

impl PageHandle {
    /// Wrap a driver with the default wait policy and a fresh step log
    #[must_use]
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            driver,
            wait: WaitPolicy::default(),
            steps: StepReporter::new(),
        }
    }

    /// Set the wait policy
    #[must_use]
    pub const fn with_wait_policy(mut self, wait: WaitPolicy) -> Self {
        self.wait = wait;
        self
    }

    /// Use an existing step reporter
    #[must_use]
    pub fn with_step_reporter(mut self, steps: StepReporter) -> Self {
        self.steps = steps;
        self
    }

    /// The page driver
    #[must_use]
    pub fn driver(&self) -> &dyn PageDriver {
        self.driver.as_ref()
    }

    /// The wait policy
    #[must_use]
    pub const fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }

    /// The step reporter
    #[must_use]
    pub const fn steps(&self) -> &StepReporter {
        &self.steps
    }

    /// Whether `other` drives the same tab
    #[must_use]
    pub fn same_page(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.driver, &other.driver)
    }

    /// Locator for a CSS selector at the document root
    #[must_use]
    pub fn locator(&self, selector: impl Into<String>) -> Locator {
        Locator::new(self.clone(), Query::css(selector))
    }

    /// Locator for the innermost elements containing `text`
    #[must_use]
    pub fn get_by_text(&self, text: impl Into<String>) -> Locator {
        Locator::new(self.clone(), Query::new().then(QueryStep::Text(text.into())))
    }

    /// Navigate the tab
    pub async fn goto(&self, url: &str) -> ProbeResult<()> {
        tracing::debug!(%url, "goto");
        self.driver.goto(url).await
    }

    /// Current URL of the tab
    pub async fn url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakePage, FakeSite};

    fn fake() -> Arc<dyn PageDriver> {
        Arc::new(FakePage::new(Arc::new(FakeSite::new())))
    }

    #[test]
    fn test_clones_share_page() {
        let page = PageHandle::new(fake());
        let other = page.clone();
        assert!(page.same_page(&other));
        assert!(!page.same_page(&PageHandle::new(fake())));
    }

    #[test]
    fn test_locators_inherit_handle() {
        let page = PageHandle::new(fake());
        let a = page.locator("#a");
        let b = page.get_by_text("b").locator("span");
        assert!(a.same_page(&b));
        assert_eq!(b.to_string(), "text=b >> css=span");
    }

    #[test]
    fn test_wait_policy_override() {
        let page = PageHandle::new(fake()).with_wait_policy(WaitPolicy::fast());
        assert_eq!(page.wait_policy(), WaitPolicy::fast());
    }

    #[tokio::test]
    async fn test_steps_shared_between_clones() {
        let page = PageHandle::new(fake());
        let clone = page.clone();
        let token = clone.steps().begin("X.y");
        clone.steps().end(token, crate::step::StepOutcome::Passed);
        assert_eq!(page.steps().len(), 1);
    }
}
