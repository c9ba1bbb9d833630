//! Locator abstraction for element selection and interaction.
//!
//! A [`Locator`] is a deferred [`Query`] bound to a [`PageHandle`]. Nothing is
//! resolved when a locator is built; every query or action re-evaluates it
//! against the live page.
//!
//! # Design Philosophy
//!
//! - **Auto-Waiting**: actions wait for the target to be attached and visible
//! - **Lazy**: locators never cache a snapshot of the page
//! - **Fluent API**: chainable scoping (`locator`, `filter_has_text`, `nth`)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::handle::PageHandle;
use crate::result::{ProbeError, ProbeResult};

/// One stage of a query pipeline
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryStep {
    /// CSS selector evaluated under every current scope element
    Css(String),
    /// Keep elements whose text contains the string (case-insensitive)
    HasText(String),
    /// Innermost descendants whose text contains the string (`text=` engine)
    Text(String),
    /// Keep only the element at this index
    Nth(usize),
}

impl fmt::Display for QueryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::HasText(t) => write!(f, "has-text={t:?}"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::Nth(i) => write!(f, "nth={i}"),
        }
    }
}

/// Ordered pipeline of [`QueryStep`]s starting at the document root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    steps: Vec<QueryStep>,
}

impl Query {
    /// Empty query (resolves to the document itself)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Query with a single CSS step
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new().then(QueryStep::Css(selector.into()))
    }

    /// Append a step
    #[must_use]
    pub fn then(mut self, step: QueryStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Steps in evaluation order
    #[must_use]
    pub fn steps(&self) -> &[QueryStep] {
        &self.steps
    }

    /// Whether the query has no steps
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// JavaScript expression evaluating to the array of matched elements,
    /// in document order.
    #[must_use]
    pub fn to_js(&self) -> String {
        let mut js = String::from(
            "(() => {\
             const norm = s => (s || '').replace(/\\s+/g, ' ').trim().toLowerCase();\
             const order = (a, b) => (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING) ? -1 : 1;\
             let scopes = [document];",
        );
        for step in &self.steps {
            js.push_str(&step_js(step));
        }
        js.push_str("return scopes; })()");
        js
    }
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

fn step_js(step: &QueryStep) -> String {
    match step {
        QueryStep::Css(selector) => format!(
            "scopes = (() => {{ const out = []; \
             for (const root of scopes) for (const el of root.querySelectorAll({sel})) \
             if (!out.includes(el)) out.push(el); \
             return out.sort(order); }})();",
            sel = js_string(selector)
        ),
        QueryStep::HasText(text) => format!(
            "scopes = scopes.filter(el => norm(el.textContent).includes(norm({t})));",
            t = js_string(text)
        ),
        QueryStep::Text(text) => format!(
            "scopes = (() => {{ const needle = norm({t}); \
             const hit = el => norm(el.textContent).includes(needle); \
             const out = []; \
             for (const root of scopes) for (const el of root.querySelectorAll('*')) \
             if (hit(el) && !Array.from(el.children).some(hit) && !out.includes(el)) out.push(el); \
             return out.sort(order); }})();",
            t = js_string(text)
        ),
        QueryStep::Nth(index) => {
            format!("scopes = scopes.length > {index} ? [scopes[{index}]] : [];")
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "document");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, " >> ")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Collapse runs of whitespace and trim, as text assertions compare
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive, whitespace-normalized containment used by text filters
#[must_use]
pub fn text_matches(haystack: &str, needle: &str) -> bool {
    normalize_whitespace(haystack)
        .to_lowercase()
        .contains(&normalize_whitespace(needle).to_lowercase())
}

/// A deferred element query bound to one page handle.
#[derive(Debug, Clone)]
pub struct Locator {
    page: PageHandle,
    query: Query,
}

impl Locator {
    /// Create a locator for a query on a page
    #[must_use]
    pub fn new(page: PageHandle, query: Query) -> Self {
        Self { page, query }
    }

    fn with_step(&self, step: QueryStep) -> Self {
        Self {
            page: self.page.clone(),
            query: self.query.clone().then(step),
        }
    }

    /// Sub-scope: elements matching `selector` inside this locator's matches
    #[must_use]
    pub fn locator(&self, selector: impl Into<String>) -> Self {
        self.with_step(QueryStep::Css(selector.into()))
    }

    /// Keep matches whose text contains `text`
    #[must_use]
    pub fn filter_has_text(&self, text: impl Into<String>) -> Self {
        self.with_step(QueryStep::HasText(text.into()))
    }

    /// Innermost descendants containing `text`
    #[must_use]
    pub fn get_by_text(&self, text: impl Into<String>) -> Self {
        self.with_step(QueryStep::Text(text.into()))
    }

    /// The match at `index` (0-based)
    #[must_use]
    pub fn nth(&self, index: usize) -> Self {
        self.with_step(QueryStep::Nth(index))
    }

    /// The first match
    #[must_use]
    pub fn first(&self) -> Self {
        self.nth(0)
    }

    /// The underlying query
    #[must_use]
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// The page handle this locator resolves against
    #[must_use]
    pub const fn page(&self) -> &PageHandle {
        &self.page
    }

    /// Whether both locators resolve against the same page handle
    #[must_use]
    pub fn same_page(&self, other: &Self) -> bool {
        self.page.same_page(&other.page)
    }

    // -------------------------------------------------------------------------
    // Immediate queries
    // -------------------------------------------------------------------------

    /// Whether the first match is visible right now (false if none)
    pub async fn is_visible(&self) -> ProbeResult<bool> {
        self.page.driver().is_visible(&self.query).await
    }

    /// Number of matches right now
    pub async fn count(&self) -> ProbeResult<usize> {
        self.page.driver().count(&self.query).await
    }

    // -------------------------------------------------------------------------
    // Auto-waiting reads
    // -------------------------------------------------------------------------

    /// Text content of the first match, waiting for it to be attached
    pub async fn text_content(&self) -> ProbeResult<Option<String>> {
        let driver = self.page.driver();
        let query = &self.query;
        self.page
            .wait_policy()
            .poll_until(|| async move {
                match driver.count(query).await {
                    Ok(n) if n > 0 => driver.text_content(query).await.map_err(|e| e.to_string()),
                    Ok(_) => Err("not attached".to_string()),
                    Err(e) => Err(e.to_string()),
                }
            })
            .await
            .map_err(|_| self.timeout("text_content"))
    }

    /// Current value of the first matching form field
    pub async fn input_value(&self) -> ProbeResult<String> {
        let driver = self.page.driver();
        let query = &self.query;
        self.page
            .wait_policy()
            .poll_until(|| async move {
                match driver.input_value(query).await {
                    Ok(Some(value)) => Ok(value),
                    Ok(None) => Err("not attached".to_string()),
                    Err(e) => Err(e.to_string()),
                }
            })
            .await
            .map_err(|_| self.timeout("input_value"))
    }

    // -------------------------------------------------------------------------
    // Auto-waiting actions
    // -------------------------------------------------------------------------

    /// Wait until the first match is visible
    pub async fn wait_for_visible(&self) -> ProbeResult<()> {
        let driver = self.page.driver();
        let query = &self.query;
        self.page
            .wait_policy()
            .poll_until(|| async move {
                match driver.is_visible(query).await {
                    Ok(true) => Ok(()),
                    _ => Err(()),
                }
            })
            .await
            .map_err(|_| self.timeout("wait_for_visible"))
    }

    /// Click the first match once it is visible
    pub async fn click(&self) -> ProbeResult<()> {
        tracing::debug!(locator = %self.query, "click");
        self.act("click", |driver, query| async move { driver.click(query).await })
            .await
    }

    /// Replace the value of the first match once it is visible
    pub async fn fill(&self, text: &str) -> ProbeResult<()> {
        tracing::debug!(locator = %self.query, len = text.len(), "fill");
        self.act("fill", |driver, query| async move {
            driver.fill(query, text).await
        })
        .await
    }

    async fn act<'a, F, Fut>(&'a self, action: &str, perform: F) -> ProbeResult<()>
    where
        F: Fn(&'a dyn crate::driver::PageDriver, &'a Query) -> Fut,
        Fut: std::future::Future<Output = ProbeResult<()>>,
    {
        let driver = self.page.driver();
        let query = &self.query;
        let perform = &perform;
        self.page
            .wait_policy()
            .poll_until(|| async move {
                match driver.is_visible(query).await {
                    Ok(true) => perform(driver, query).await.map_err(|e| e.to_string()),
                    Ok(false) => Err("not visible".to_string()),
                    Err(e) => Err(e.to_string()),
                }
            })
            .await
            .map_err(|_| self.timeout(action))
    }

    fn timeout(&self, action: &str) -> ProbeError {
        ProbeError::InteractionTimeout {
            action: action.to_string(),
            locator: self.query.to_string(),
            ms: self.page.wait_policy().timeout_ms(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.query.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod query_tests {
        use super::*;

        #[test]
        fn test_display_chain() {
            let query = Query::css("#userloginForm")
                .then(QueryStep::Css("#wpName1".into()))
                .then(QueryStep::Nth(0));
            assert_eq!(query.to_string(), "css=#userloginForm >> css=#wpName1 >> nth=0");
        }

        #[test]
        fn test_empty_query_is_document() {
            assert!(Query::new().is_empty());
            assert_eq!(Query::new().to_string(), "document");
        }

        #[test]
        fn test_to_js_escapes_selectors() {
            let js = Query::css(r#"[aria-label="Main menu"]"#).to_js();
            assert!(js.contains(r#"querySelectorAll("[aria-label=\"Main menu\"]")"#));
            assert!(js.ends_with("return scopes; })()"));
        }

        #[test]
        fn test_to_js_nth_and_text() {
            let js = Query::css(".mw-list-item")
                .then(QueryStep::Text("Contents".into()))
                .then(QueryStep::Nth(2))
                .to_js();
            assert!(js.contains("norm(\"Contents\")"));
            assert!(js.contains("scopes.length > 2 ? [scopes[2]] : []"));
        }
    }

    mod text_tests {
        use super::*;

        #[test]
        fn test_normalize_whitespace() {
            assert_eq!(normalize_whitespace("  a \n\t b  "), "a b");
            assert_eq!(normalize_whitespace(""), "");
        }

        #[test]
        fn test_text_matches_case_insensitive() {
            assert!(text_matches("Full  article...", "full article"));
            assert!(!text_matches("Quantum", "Classical"));
        }

        proptest! {
            #[test]
            fn prop_text_matches_itself(s in "[a-zA-Z ]{0,24}") {
                prop_assert!(text_matches(&s, &s));
            }

            #[test]
            fn prop_normalize_is_idempotent(s in "\\PC{0,32}") {
                let once = normalize_whitespace(&s);
                prop_assert_eq!(normalize_whitespace(&once), once.clone());
            }
        }
    }
}
