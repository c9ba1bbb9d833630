//! Browser control for live runs.
//!
//! Rust-native CDP (Chrome `DevTools` Protocol) page driver. With the
//! `browser` feature, [`Browser`] launches Chromium through chromiumoxide and
//! hands out [`CdpPage`] tabs, each in its own browser context. Queries are
//! resolved by evaluating [`Query::to_js`](crate::Query::to_js) in the page;
//! clicks and typing go through CDP input events on a marked element.

use std::path::PathBuf;

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<PathBuf>,
    /// User agent string
    pub user_agent: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            user_agent: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::significant_drop_tightening)]
mod cdp {
    use super::BrowserConfig;
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::target::{
        CreateBrowserContextParams, CreateTargetParams,
    };
    use chromiumoxide::page::Page as ChromiumPage;
    use futures::StreamExt;
    use serde::de::DeserializeOwned;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    use crate::driver::{PageDriver, PageFactory};
    use crate::locator::Query;
    use crate::result::{ProbeError, ProbeResult};

    /// Attribute used to hand a resolved element to CDP input events
    const TARGET_ATTR: &str = "data-wikiprobe-target";

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct Browser {
        config: BrowserConfig,
        inner: Arc<Mutex<CdpBrowser>>,
        handle: tokio::task::JoinHandle<()>,
    }

    impl Browser {
        /// Launch a new browser instance
        pub async fn launch(config: BrowserConfig) -> ProbeResult<Self> {
            let mut builder =
                CdpConfig::builder().window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            if let Some(ref ua) = config.user_agent {
                builder = builder.arg(format!("--user-agent={ua}"));
            }

            let cdp_config = builder
                .build()
                .map_err(|message| ProbeError::BrowserLaunch { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                ProbeError::BrowserLaunch {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });
            tracing::info!(headless = config.headless, "browser launched");

            Ok(Self {
                config,
                inner: Arc::new(Mutex::new(browser)),
                handle,
            })
        }

        /// Open a blank tab in a fresh browser context
        pub async fn open_tab(&self) -> ProbeResult<CdpPage> {
            let mut browser = self.inner.lock().await;
            let context = browser
                .create_browser_context(CreateBrowserContextParams::default())
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            let target = CreateTargetParams::builder()
                .url("about:blank")
                .browser_context_id(context)
                .build()
                .map_err(ProbeError::driver)?;
            let page = browser
                .new_page(target)
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            Ok(CdpPage { inner: page })
        }

        /// Get the browser configuration
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser and stop its event handler task
        pub async fn close(self) -> ProbeResult<()> {
            let closed = self.inner.lock().await.close().await;
            self.handle.abort();
            closed.map_err(|e| ProbeError::BrowserLaunch {
                message: e.to_string(),
            })?;
            Ok(())
        }
    }

    #[async_trait]
    impl PageFactory for Browser {
        async fn new_page(&self) -> ProbeResult<Arc<dyn PageDriver>> {
            Ok(Arc::new(self.open_tab().await?))
        }
    }

    /// One tab driven over CDP
    #[derive(Debug, Clone)]
    pub struct CdpPage {
        inner: ChromiumPage,
    }

    impl CdpPage {
        async fn eval<T: DeserializeOwned>(&self, script: String) -> ProbeResult<T> {
            self.inner
                .evaluate(script)
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?
                .into_value()
                .map_err(|e| ProbeError::driver(e.to_string()))
        }

        /// Tag the first match with a fresh marker; `None` when nothing matches
        async fn mark(&self, query: &Query) -> ProbeResult<Option<String>> {
            let marker = uuid::Uuid::new_v4().to_string();
            let script = format!(
                "(() => {{ const el = {q}[0]; if (!el) return false; \
                 el.setAttribute('{TARGET_ATTR}', '{marker}'); return true; }})()",
                q = query.to_js()
            );
            let found: bool = self.eval(script).await?;
            Ok(found.then_some(marker))
        }

        async fn unmark(&self, marker: &str) {
            let script = format!(
                "(() => {{ const el = document.querySelector('[{TARGET_ATTR}=\"{marker}\"]'); \
                 if (el) el.removeAttribute('{TARGET_ATTR}'); return true; }})()"
            );
            // The click may have navigated away, taking the marker with it
            let _ = self.eval::<bool>(script).await;
        }

        async fn marked(&self, query: &Query) -> ProbeResult<(String, chromiumoxide::Element)> {
            let marker = self
                .mark(query)
                .await?
                .ok_or_else(|| ProbeError::driver(format!("no element matches {query}")))?;
            let element = self
                .inner
                .find_element(format!("[{TARGET_ATTR}=\"{marker}\"]"))
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            Ok((marker, element))
        }
    }

    #[async_trait]
    impl PageDriver for CdpPage {
        async fn goto(&self, url: &str) -> ProbeResult<()> {
            self.inner
                .goto(url)
                .await
                .map_err(|e| ProbeError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn current_url(&self) -> ProbeResult<String> {
            let url = self
                .inner
                .url()
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            Ok(url.unwrap_or_else(|| "about:blank".to_string()))
        }

        async fn count(&self, query: &Query) -> ProbeResult<usize> {
            self.eval(format!("{}.length", query.to_js())).await
        }

        async fn is_visible(&self, query: &Query) -> ProbeResult<bool> {
            self.eval(format!(
                "(() => {{ const el = {q}[0]; if (!el) return false; \
                 const style = getComputedStyle(el); \
                 if (style.visibility === 'hidden') return false; \
                 const rect = el.getBoundingClientRect(); \
                 return rect.width > 0 && rect.height > 0; }})()",
                q = query.to_js()
            ))
            .await
        }

        async fn text_content(&self, query: &Query) -> ProbeResult<Option<String>> {
            self.eval(format!(
                "(() => {{ const el = {q}[0]; return el ? el.textContent : null; }})()",
                q = query.to_js()
            ))
            .await
        }

        async fn input_value(&self, query: &Query) -> ProbeResult<Option<String>> {
            self.eval(format!(
                "(() => {{ const el = {q}[0]; return el ? String(el.value ?? '') : null; }})()",
                q = query.to_js()
            ))
            .await
        }

        async fn click(&self, query: &Query) -> ProbeResult<()> {
            let (marker, element) = self.marked(query).await?;
            tracing::debug!(%query, "cdp click");
            element
                .click()
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            self.unmark(&marker).await;
            Ok(())
        }

        async fn fill(&self, query: &Query, text: &str) -> ProbeResult<()> {
            let (marker, element) = self.marked(query).await?;
            tracing::debug!(%query, "cdp fill");
            self.eval::<bool>(format!(
                "(() => {{ const el = document.querySelector('[{TARGET_ATTR}=\"{marker}\"]'); \
                 el.value = ''; el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
                 return true; }})()"
            ))
            .await?;
            element
                .click()
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?
                .type_str(text)
                .await
                .map_err(|e| ProbeError::driver(e.to_string()))?;
            self.unmark(&marker).await;
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::{Browser, CdpPage};
