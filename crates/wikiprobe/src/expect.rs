//! Auto-retrying expectations on locators and the page URL.
//!
//! ```ignore
//! expect(&login.error_message)
//!     .with_message("login should fail")
//!     .to_have_text("Incorrect username or password entered. Please try again.")
//!     .await?;
//! ```

use std::time::Duration;

use crate::handle::PageHandle;
use crate::locator::{normalize_whitespace, Locator};
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitPolicy;

const NO_ELEMENT: &str = "<no element>";

/// Begin an expectation on `locator`
#[must_use]
pub fn expect(locator: &Locator) -> LocatorExpectation<'_> {
    LocatorExpectation {
        locator,
        message: None,
        wait: locator.page().wait_policy(),
    }
}

/// Pending expectation on a locator, polled with the page's wait policy
#[derive(Debug)]
#[must_use]
pub struct LocatorExpectation<'a> {
    locator: &'a Locator,
    message: Option<String>,
    wait: WaitPolicy,
}

impl<'a> LocatorExpectation<'a> {
    /// Message reported on failure
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Override the timeout for this expectation only
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.wait = self.wait.with_timeout(timeout);
        self
    }

    fn message_or(&self, default: impl FnOnce() -> String) -> String {
        self.message.clone().unwrap_or_else(default)
    }

    /// The first match becomes visible
    pub async fn to_be_visible(self) -> ProbeResult<()> {
        self.visibility(true).await
    }

    /// The first match is hidden or absent
    pub async fn to_be_hidden(self) -> ProbeResult<()> {
        self.visibility(false).await
    }

    async fn visibility(self, want: bool) -> ProbeResult<()> {
        let driver = self.locator.page().driver();
        let query = self.locator.query();
        let outcome = self
            .wait
            .poll_until(|| async move {
                match driver.is_visible(query).await {
                    Ok(seen) if seen == want => Ok(()),
                    Ok(seen) => Err(if seen { "visible" } else { "hidden" }.to_string()),
                    Err(e) => Err(e.to_string()),
                }
            })
            .await;
        outcome.map_err(|timeout| {
            let expected = if want { "visible" } else { "hidden" };
            let message =
                self.message_or(|| format!("expected {} to be {expected}", self.locator));
            ProbeError::mismatch(message, expected, timeout.last)
        })
    }

    /// The first match's text equals `expected` after whitespace normalization
    pub async fn to_have_text(self, expected: &str) -> ProbeResult<()> {
        let wanted = normalize_whitespace(expected);
        self.text_matching(expected, |actual| normalize_whitespace(actual) == wanted)
            .await
    }

    /// The first match's text contains `expected`
    pub async fn to_contain_text(self, expected: &str) -> ProbeResult<()> {
        let wanted = normalize_whitespace(expected);
        self.text_matching(expected, |actual| normalize_whitespace(actual).contains(&wanted))
            .await
    }

    async fn text_matching<P>(self, expected: &str, accept: P) -> ProbeResult<()>
    where
        P: Fn(&str) -> bool,
    {
        let driver = self.locator.page().driver();
        let query = self.locator.query();
        let accept = &accept;
        let outcome = self
            .wait
            .poll_until(|| async move {
                match driver.text_content(query).await {
                    Ok(Some(text)) if accept(&text) => Ok(()),
                    Ok(Some(text)) => Err(format!("{:?}", normalize_whitespace(&text))),
                    Ok(None) => Err(NO_ELEMENT.to_string()),
                    Err(e) => Err(e.to_string()),
                }
            })
            .await;
        outcome.map_err(|timeout| {
            let message = self.message_or(|| format!("expected text of {}", self.locator));
            ProbeError::mismatch(message, format!("{expected:?}"), timeout.last)
        })
    }

    /// The locator resolves to exactly `expected` elements
    pub async fn to_have_count(self, expected: usize) -> ProbeResult<()> {
        let driver = self.locator.page().driver();
        let query = self.locator.query();
        let outcome = self
            .wait
            .poll_until(|| async move {
                match driver.count(query).await {
                    Ok(n) if n == expected => Ok(()),
                    Ok(n) => Err(n.to_string()),
                    Err(e) => Err(e.to_string()),
                }
            })
            .await;
        outcome.map_err(|timeout| {
            let message = self.message_or(|| format!("expected count of {}", self.locator));
            ProbeError::mismatch(message, expected.to_string(), timeout.last)
        })
    }
}

/// Wait until the page URL contains `fragment`
pub async fn expect_url_contains(
    page: &PageHandle,
    fragment: &str,
    message: Option<&str>,
) -> ProbeResult<()> {
    let outcome = page
        .wait_policy()
        .poll_until(|| async move {
            match page.url().await {
                Ok(url) if url.contains(fragment) => Ok(()),
                Ok(url) => Err(url),
                Err(e) => Err(e.to_string()),
            }
        })
        .await;
    outcome.map_err(|timeout| {
        let message = message.map_or_else(
            || format!("expected URL to contain {fragment:?}"),
            str::to_string,
        );
        ProbeError::mismatch(message, format!("*{fragment}*"), timeout.last)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{El, FakeDocument, FakePage, FakeResponse, FakeSite};
    use std::sync::Arc;

    async fn page_with(body: Vec<El>) -> PageHandle {
        let doc = FakeDocument::new(body);
        let mut site = FakeSite::new();
        site.route("/", move |_| FakeResponse::Document(doc.clone()));
        let page = PageHandle::new(Arc::new(FakePage::new(Arc::new(site))))
            .with_wait_policy(WaitPolicy::from_millis(300, 50));
        page.goto("https://wiki.test/").await.unwrap();
        page
    }

    #[tokio::test(start_paused = true)]
    async fn test_to_be_visible_passes_and_fails() {
        let page = page_with(vec![
            El::new("div").id("shown").text("hi"),
            El::new("div").id("gone").hidden(),
        ])
        .await;
        expect(&page.locator("#shown")).to_be_visible().await.unwrap();
        let err = expect(&page.locator("#gone"))
            .with_message("custom")
            .to_be_visible()
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ProbeError::AssertionMismatch { ref message, ref actual, .. }
                if message == "custom" && actual == "hidden"
        ));
        expect(&page.locator("#gone")).to_be_hidden().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_to_have_text_normalizes_whitespace() {
        let page = page_with(vec![El::new("p").id("msg").text("  There were\n no results ")])
            .await;
        expect(&page.locator("#msg"))
            .to_have_text("There were no results")
            .await
            .unwrap();
        let err = expect(&page.locator("#msg"))
            .to_have_text("There were")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("\"There were no results\""));
        expect(&page.locator("#msg"))
            .to_contain_text("no results")
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_element_reports_no_element() {
        let page = page_with(vec![]).await;
        let err = expect(&page.locator("#nope"))
            .to_have_text("x")
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::AssertionMismatch { ref actual, .. } if actual == NO_ELEMENT));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_text_within_budget() {
        let page = page_with(vec![El::new("h1")
            .id("late")
            .text("Late")
            .appears_after(Duration::from_millis(120))])
        .await;
        expect(&page.locator("#late")).to_have_text("Late").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_to_have_count() {
        let page = page_with(vec![
            El::new("li").class("item"),
            El::new("li").class("item"),
        ])
        .await;
        expect(&page.locator(".item")).to_have_count(2).await.unwrap();
        assert!(expect(&page.locator(".item")).to_have_count(3).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expect_url_contains() {
        let page = page_with(vec![]).await;
        expect_url_contains(&page, "wiki.test", None).await.unwrap();
        let err = expect_url_contains(&page, "/wiki/Wikipedia:Contents", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("https://wiki.test/"));
    }
}
