//! Page Object Model support.
//!
//! Two capability traits: every UI fragment is a [`Component`] that can
//! check it is loaded; navigable screens are additionally a [`Page`] with a
//! static path and an `open` action. Concrete page objects hold their
//! locators and a clone of the shared [`PageHandle`].
//!
//! # Example
//!
//! ```ignore
//! struct Footer {
//!     page: PageHandle,
//!     links: Locator,
//! }
//!
//! #[async_trait]
//! impl Component for Footer {
//!     fn name(&self) -> &'static str {
//!         "Footer"
//!     }
//!
//!     fn loaded_message(&self) -> &'static str {
//!         "Expected Footer to be loaded"
//!     }
//!
//!     fn page(&self) -> &PageHandle {
//!         &self.page
//!     }
//!
//!     fn defining_locators(&self) -> Vec<&Locator> {
//!         vec![&self.links]
//!     }
//! }
//! ```

use async_trait::async_trait;
use url::Url;

use crate::handle::PageHandle;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};

/// A UI fragment that can verify it is present on the page
#[async_trait]
pub trait Component: Send + Sync {
    /// Name used in errors and step names
    fn name(&self) -> &'static str;

    /// Default failure message for [`expect_loaded`](Self::expect_loaded)
    fn loaded_message(&self) -> &'static str;

    /// The shared page handle
    fn page(&self) -> &PageHandle;

    /// Elements that must all be visible for the fragment to count as loaded,
    /// in the order they are checked
    fn defining_locators(&self) -> Vec<&Locator>;

    /// Wait until every defining element is visible.
    ///
    /// Fails with [`ProbeError::NotLoaded`] naming the first element that
    /// does not become visible within the wait policy. Never navigates.
    async fn expect_loaded(&self, message: Option<&str>) -> ProbeResult<()> {
        let message = message.unwrap_or_else(|| self.loaded_message());
        expect_all_visible(self.name(), message, &self.defining_locators()).await
    }
}

/// A navigable screen with a static path
#[async_trait]
pub trait Page: Component {
    /// Path of the page relative to the site root
    const PAGE_PATH: &'static str;

    /// Navigate the shared page handle to `url`
    async fn open(&self, url: &str) -> ProbeResult<()> {
        self.page().goto(url).await
    }

    /// Absolute URL of this page on `base_url`
    fn url_for(&self, base_url: &str) -> ProbeResult<String> {
        join_url(base_url, Self::PAGE_PATH)
    }
}

/// Join a site-relative path (with optional query) onto a base URL
pub fn join_url(base_url: &str, path: &str) -> ProbeResult<String> {
    Ok(Url::parse(base_url)?.join(path)?.to_string())
}

/// Check `locators` in order, failing on the first one that is not visible
pub async fn expect_all_visible(
    component: &str,
    message: &str,
    locators: &[&Locator],
) -> ProbeResult<()> {
    for locator in locators {
        if locator.wait_for_visible().await.is_err() {
            return Err(ProbeError::NotLoaded {
                component: component.to_string(),
                message: message.to_string(),
                locator: locator.to_string(),
            });
        }
    }
    Ok(())
}

// =============================================================================
// Folding probes used by the page-object query methods
// =============================================================================

/// Immediate visibility; driver failures read as not visible
pub async fn probe_visible(locator: &Locator) -> bool {
    locator.is_visible().await.unwrap_or(false)
}

/// Text content; absence and failures read as empty
pub async fn probe_text(locator: &Locator) -> String {
    locator.text_content().await.ok().flatten().unwrap_or_default()
}

/// Immediate count; driver failures read as zero
pub async fn probe_count(locator: &Locator) -> usize {
    locator.count().await.unwrap_or(0)
}
