//! Route table and [`PageDriver`] over fake documents.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::time::Instant;
use url::Url;

use super::dom::{ClickBehavior, FakeDocument, FormValue};
use crate::driver::{PageDriver, PageFactory};
use crate::locator::Query;
use crate::result::{ProbeError, ProbeResult};

/// Redirects followed before a navigation fails
pub const MAX_REDIRECTS: usize = 10;

const BLANK: &str = "about:blank";

/// A request to the fake site
#[derive(Debug, Clone)]
pub struct FakeRequest {
    /// Full request URL
    pub url: Url,
}

impl FakeRequest {
    /// URL path
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// First value of a query parameter
    #[must_use]
    pub fn param(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// Whether a query parameter is present
    #[must_use]
    pub fn has_param(&self, name: &str) -> bool {
        self.url.query_pairs().any(|(k, _)| k == name)
    }
}

/// Response of a fake route
#[derive(Debug, Clone)]
pub enum FakeResponse {
    /// Serve a document
    Document(FakeDocument),
    /// Redirect to a URL resolved against the request URL
    Redirect(String),
}

/// Route handler
pub type Handler = Arc<dyn Fn(&FakeRequest) -> FakeResponse + Send + Sync>;

/// Path-based route table. Hosts are ignored.
#[derive(Default)]
pub struct FakeSite {
    exact: HashMap<String, Handler>,
    prefixes: Vec<(String, Handler)>,
    fallback: Option<Handler>,
}

impl fmt::Debug for FakeSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut exact: Vec<&String> = self.exact.keys().collect();
        exact.sort();
        f.debug_struct("FakeSite")
            .field("exact", &exact)
            .field(
                "prefixes",
                &self.prefixes.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            )
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl FakeSite {
    /// Site with no routes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `path` exactly
    pub fn route<F>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(&FakeRequest) -> FakeResponse + Send + Sync + 'static,
    {
        let _ = self.exact.insert(path.to_string(), Arc::new(handler));
        self
    }

    /// Serve every path starting with `prefix`; the longest prefix wins
    pub fn route_prefix<F>(&mut self, prefix: &str, handler: F) -> &mut Self
    where
        F: Fn(&FakeRequest) -> FakeResponse + Send + Sync + 'static,
    {
        self.prefixes.push((prefix.to_string(), Arc::new(handler)));
        self.prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    /// Serve every path no other route matches
    pub fn fallback<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&FakeRequest) -> FakeResponse + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(handler));
        self
    }

    fn handler(&self, path: &str) -> Option<&Handler> {
        self.exact
            .get(path)
            .or_else(|| {
                self.prefixes
                    .iter()
                    .find(|(prefix, _)| path.starts_with(prefix.as_str()))
                    .map(|(_, h)| h)
            })
            .or(self.fallback.as_ref())
    }

    /// Answer a request, or `None` when no route matches
    #[must_use]
    pub fn respond(&self, request: &FakeRequest) -> Option<FakeResponse> {
        self.handler(request.path()).map(|h| h(request))
    }
}

#[derive(Debug)]
struct FakeState {
    url: String,
    doc: FakeDocument,
    loaded_at: Instant,
    offline: bool,
    calls: Vec<String>,
}

/// One fake browser tab on a [`FakeSite`]
#[derive(Debug)]
pub struct FakePage {
    site: Arc<FakeSite>,
    state: Mutex<FakeState>,
}

impl FakePage {
    /// A blank tab
    #[must_use]
    pub fn new(site: Arc<FakeSite>) -> Self {
        Self {
            site,
            state: Mutex::new(FakeState {
                url: BLANK.to_string(),
                doc: FakeDocument::empty(),
                loaded_at: Instant::now(),
                offline: false,
                calls: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every driver call fail, as a crashed tab would
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Driver calls so far, in order
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Record a call, refresh delayed elements and hand out the live state
    fn begin(&self, call: String) -> ProbeResult<MutexGuard<'_, FakeState>> {
        let mut state = self.state();
        if state.offline {
            return Err(ProbeError::driver("page is offline"));
        }
        state.calls.push(call);
        let elapsed = state.loaded_at.elapsed();
        state.doc.refresh(elapsed);
        Ok(state)
    }

    fn load(&self, state: &mut FakeState, url: &str) -> ProbeResult<()> {
        if url == BLANK {
            state.url = BLANK.to_string();
            state.doc = FakeDocument::empty();
            state.loaded_at = Instant::now();
            return Ok(());
        }
        let navigation = |message: String| ProbeError::Navigation {
            url: url.to_string(),
            message,
        };
        let mut target = resolve(&state.url, url).map_err(|e| navigation(e.to_string()))?;
        for _ in 0..=MAX_REDIRECTS {
            let request = FakeRequest {
                url: target.clone(),
            };
            match self.site.respond(&request) {
                Some(FakeResponse::Document(doc)) => {
                    tracing::trace!(url = %target, "fake load");
                    state.url = target.to_string();
                    state.doc = doc;
                    state.loaded_at = Instant::now();
                    return Ok(());
                }
                Some(FakeResponse::Redirect(location)) => {
                    target = target
                        .join(&location)
                        .map_err(|e| navigation(e.to_string()))?;
                }
                None => return Err(navigation(format!("no route for {}", target.path()))),
            }
        }
        Err(navigation(format!("more than {MAX_REDIRECTS} redirects")))
    }

    fn submit_url(
        state: &FakeState,
        action: &str,
        params: &[(String, FormValue)],
    ) -> ProbeResult<String> {
        let mut url = resolve(&state.url, action)?;
        for (name, value) in params {
            let value = match value {
                FormValue::Literal(v) => v.clone(),
                FormValue::Field(selector) => {
                    match state.doc.first(&Query::css(selector.clone()))? {
                        Some(field) => state.doc.input_value(field)?,
                        None => String::new(),
                    }
                }
            };
            let _ = url.query_pairs_mut().append_pair(name, &value);
        }
        Ok(url.to_string())
    }
}

fn resolve(current: &str, target: &str) -> Result<Url, url::ParseError> {
    match Url::parse(target) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(current)?.join(target),
        Err(e) => Err(e),
    }
}

fn first_match(doc: &FakeDocument, query: &Query) -> ProbeResult<usize> {
    doc.first(query)?
        .ok_or_else(|| ProbeError::driver(format!("no element matches {query}")))
}

#[async_trait]
impl PageDriver for FakePage {
    async fn goto(&self, url: &str) -> ProbeResult<()> {
        let mut state = self.begin(format!("goto {url}"))?;
        self.load(&mut state, url)
    }

    async fn current_url(&self) -> ProbeResult<String> {
        let state = self.state();
        if state.offline {
            return Err(ProbeError::driver("page is offline"));
        }
        Ok(state.url.clone())
    }

    async fn count(&self, query: &Query) -> ProbeResult<usize> {
        let state = self.begin(format!("count {query}"))?;
        Ok(state.doc.resolve(query)?.len())
    }

    async fn is_visible(&self, query: &Query) -> ProbeResult<bool> {
        let state = self.begin(format!("is_visible {query}"))?;
        Ok(state
            .doc
            .first(query)?
            .is_some_and(|i| state.doc.is_visible(i)))
    }

    async fn text_content(&self, query: &Query) -> ProbeResult<Option<String>> {
        let state = self.begin(format!("text_content {query}"))?;
        Ok(state.doc.first(query)?.map(|i| state.doc.text_content(i)))
    }

    async fn input_value(&self, query: &Query) -> ProbeResult<Option<String>> {
        let state = self.begin(format!("input_value {query}"))?;
        state
            .doc
            .first(query)?
            .map(|i| state.doc.input_value(i))
            .transpose()
    }

    async fn click(&self, query: &Query) -> ProbeResult<()> {
        let mut state = self.begin(format!("click {query}"))?;
        let target = first_match(&state.doc, query)?;
        if !state.doc.is_visible(target) {
            return Err(ProbeError::driver(format!("{query} is not visible")));
        }
        match state.doc.click_behavior(target) {
            None => Ok(()),
            Some(ClickBehavior::Navigate(url)) => self.load(&mut state, &url),
            Some(ClickBehavior::Submit { action, params }) => {
                let url = Self::submit_url(&state, &action, &params)?;
                self.load(&mut state, &url)
            }
            Some(ClickBehavior::Reveal(selector)) => state.doc.set_hidden(&selector, false),
        }
    }

    async fn fill(&self, query: &Query, text: &str) -> ProbeResult<()> {
        let mut state = self.begin(format!("fill {query} = {text:?}"))?;
        let target = first_match(&state.doc, query)?;
        state.doc.fill(target, text)
    }
}

/// [`PageFactory`] opening fresh [`FakePage`]s on one site
#[derive(Debug, Clone)]
pub struct FakeBrowser {
    site: Arc<FakeSite>,
}

impl FakeBrowser {
    /// Browser serving `site`
    #[must_use]
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
        }
    }

    /// The served site
    #[must_use]
    pub fn site(&self) -> Arc<FakeSite> {
        Arc::clone(&self.site)
    }
}

#[async_trait]
impl PageFactory for FakeBrowser {
    async fn new_page(&self) -> ProbeResult<Arc<dyn PageDriver>> {
        Ok(Arc::new(FakePage::new(self.site())))
    }
}
