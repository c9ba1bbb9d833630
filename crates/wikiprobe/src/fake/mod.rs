//! In-memory page driver.
//!
//! [`FakePage`] implements [`PageDriver`](crate::PageDriver) over
//! [`FakeDocument`]s served by a [`FakeSite`] route table. Documents support
//! hidden and late-attaching elements, click behaviors and fields that
//! reveal other elements as they are typed into, which is enough to exercise
//! every page object without a browser. [`wiki_site`] is a ready-made site
//! with the wiki markup.

mod dom;
mod page;
mod wiki;

pub use dom::{ClickBehavior, El, FakeDocument, FormValue};
pub use page::{FakeBrowser, FakePage, FakeRequest, FakeResponse, FakeSite, Handler, MAX_REDIRECTS};
pub use wiki::{
    wiki_site, LOGIN_ERROR_MESSAGE, LOGIN_SUCCESS_MESSAGE, NO_RESULTS_MESSAGE, VALID_PASSWORD,
    VALID_USERNAME,
};
