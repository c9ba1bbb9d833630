//! PageDriver - abstract page automation trait
//!
//! The primitives a live tab must offer to the page-object layer. Each call is
//! a single attempt against the current document; waiting and timeouts live
//! in [`Locator`](crate::Locator) and the expectations, never here.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  PageDriver (Abstract Trait)                                  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌────────────────────┐        ┌────────────────────┐        │
//! │  │  CdpPage           │        │  FakePage          │        │
//! │  │  (feature browser) │        │  (always built)    │        │
//! │  │  chromiumoxide CDP │        │  in-memory DOM     │        │
//! │  └────────────────────┘        └────────────────────┘        │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::locator::Query;
use crate::result::ProbeResult;

/// Primitive operations on one live browser tab
#[async_trait]
pub trait PageDriver: Send + Sync + Debug {
    /// Navigate the tab to `url`
    async fn goto(&self, url: &str) -> ProbeResult<()>;

    /// Current URL of the tab
    async fn current_url(&self) -> ProbeResult<String>;

    /// Number of elements the query resolves to
    async fn count(&self, query: &Query) -> ProbeResult<usize>;

    /// Whether the first match is visible (false when nothing matches)
    async fn is_visible(&self, query: &Query) -> ProbeResult<bool>;

    /// Text content of the first match (`None` when nothing matches)
    async fn text_content(&self, query: &Query) -> ProbeResult<Option<String>>;

    /// Value of the first matching form field (`None` when nothing matches)
    async fn input_value(&self, query: &Query) -> ProbeResult<Option<String>>;

    /// Click the first match
    async fn click(&self, query: &Query) -> ProbeResult<()>;

    /// Replace the value of the first match with `text`, as typed input
    async fn fill(&self, query: &Query, text: &str) -> ProbeResult<()>;
}

/// Source of fresh, isolated tabs (one per scenario attempt)
#[async_trait]
pub trait PageFactory: Send + Sync + Debug {
    /// Open a new isolated tab
    async fn new_page(&self) -> ProbeResult<Arc<dyn PageDriver>>;
}
