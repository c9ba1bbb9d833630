//! Scenario catalog: the user journeys the suite runs against the wiki.
//!
//! Each [`Scenario`] receives a fresh [`Application`] whose tab already shows
//! the main page, plus a [`ScenarioContext`] with the base URL.

use futures::future::{BoxFuture, FutureExt};
use std::fmt;

use crate::app::Application;
use crate::expect::{expect, expect_url_contains};
use crate::page_object::{join_url, Page};
use crate::result::ProbeResult;

/// Path every scenario starts from
pub const START_PATH: &str = "/wiki/Main_Page";

/// Body of a scenario
pub type ScenarioFn =
    for<'a> fn(&'a Application, &'a ScenarioContext) -> BoxFuture<'a, ProbeResult<()>>;

/// Per-run data handed to each scenario
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    /// Site origin, e.g. `https://en.wikipedia.org`
    pub base_url: String,
}

impl ScenarioContext {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Absolute URL for a site path
    pub fn url(&self, path: &str) -> ProbeResult<String> {
        join_url(&self.base_url, path)
    }
}

/// One named user journey
#[derive(Clone, Copy)]
pub struct Scenario {
    /// Suite the scenario belongs to
    pub suite: &'static str,
    /// Scenario title
    pub name: &'static str,
    /// Reason the scenario is skipped by default
    pub skip: Option<&'static str>,
    run: ScenarioFn,
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("suite", &self.suite)
            .field("name", &self.name)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

impl Scenario {
    #[must_use]
    pub const fn new(suite: &'static str, name: &'static str, run: ScenarioFn) -> Self {
        Self {
            suite,
            name,
            skip: None,
            run,
        }
    }

    /// Mark as skipped by default
    #[must_use]
    pub const fn skipped(mut self, reason: &'static str) -> Self {
        self.skip = Some(reason);
        self
    }

    /// `suite > name`
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} > {}", self.suite, self.name)
    }

    /// Case-insensitive substring match on [`full_name`](Self::full_name)
    #[must_use]
    pub fn matches(&self, filter: &str) -> bool {
        self.full_name()
            .to_lowercase()
            .contains(&filter.to_lowercase())
    }

    /// Run the body (the caller has already opened the start page)
    pub fn run<'a>(
        &self,
        app: &'a Application,
        ctx: &'a ScenarioContext,
    ) -> BoxFuture<'a, ProbeResult<()>> {
        (self.run)(app, ctx)
    }
}

/// Every scenario, grouped by suite in declaration order
#[must_use]
pub fn catalog() -> Vec<Scenario> {
    vec![
        Scenario::new(MAIN_MENU, "Navigate to \"Contents\" section", menu_contents),
        Scenario::new(MAIN_MENU, "Verify navigation to \"Random article\"", menu_random_article),
        Scenario::new(MAIN_MENU, "Verify navigation with an invalid URL", invalid_url),
        Scenario::new(SEARCH, "Search for an existing term", search_existing_term),
        Scenario::new(SEARCH, "Search with autocomplete", search_autocomplete),
        Scenario::new(SEARCH, "Search for a non-existent term", search_missing_term),
        Scenario::new(LOGIN, "Successful login", login_valid)
            .skipped("needs a registered account"),
        Scenario::new(LOGIN, "Login with incorrect credentials", login_invalid),
        Scenario::new(
            ARTICLES,
            "Opening an article from the \"Featured article\" section",
            featured_article,
        ),
        Scenario::new(ARTICLES, "Open an article through search", article_through_search),
        Scenario::new(ARTICLES, "Attempt to open a deleted article", deleted_article),
        Scenario::new(
            CONTENT,
            "Verify the presence of the main elements on the homepage",
            main_elements,
        ),
        Scenario::new(
            CONTENT,
            "Verify the presence of the \"Did you know\" section",
            did_you_know,
        ),
        Scenario::new(LINKS, "Verify internal links on the homepage", internal_link),
        Scenario::new(LINKS, "Verify external links", external_link),
    ]
}

const MAIN_MENU: &str = "Main Menu Functionality";
const SEARCH: &str = "Search System";
const LOGIN: &str = "Login";
const ARTICLES: &str = "Opening Articles";
const CONTENT: &str = "Content Verification on Page";
const LINKS: &str = "External Resources and Internal Linking";

// =============================================================================
// MAIN MENU
// =============================================================================

fn menu_contents<'a>(app: &'a Application, _: &'a ScenarioContext) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.main_menu.navigate_to_main_menu_item("Contents").await?;
        expect_url_contains(app.page(), "/wiki/Wikipedia:Contents", None).await
    }
    .boxed()
}

fn menu_random_article<'a>(
    app: &'a Application,
    _: &'a ScenarioContext,
) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.main_menu.navigate_to_main_menu_item("Random article").await?;
        app.article_page.check_article_elements_visibility(None).await
    }
    .boxed()
}

fn invalid_url<'a>(app: &'a Application, ctx: &'a ScenarioContext) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.main_page.open(&ctx.url("/wiki/Invalid_UR_L")?).await?;
        app.main_page.check_no_article_text_is_visible(None).await
    }
    .boxed()
}

// =============================================================================
// SEARCH
// =============================================================================

fn search_existing_term<'a>(
    app: &'a Application,
    _: &'a ScenarioContext,
) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.navbar.search_for_all_pages_containing("Quantum").await?;
        let results = &app.search_result_page;
        results.check_search_results_elements_visibility(None).await?;
        results.check_search_results_text_content_not_empty(None).await?;
        results.check_search_results_contain_text("Quantum", None).await
    }
    .boxed()
}

fn search_autocomplete<'a>(
    app: &'a Application,
    _: &'a ScenarioContext,
) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.navbar.fill_search_field("Quan").await?;
        app.navbar.expect_search_results_modal_visible(None).await?;
        app.navbar.expect_search_results_item_visible("Quantum mechanics", None).await
    }
    .boxed()
}

fn search_missing_term<'a>(
    app: &'a Application,
    _: &'a ScenarioContext,
) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.navbar.search("Random123sdfg").await?;
        expect(&app.search_result_page.none_found_results)
            .to_have_text("There were no results matching the query.")
            .await
    }
    .boxed()
}

// =============================================================================
// LOGIN
// =============================================================================

fn login_valid<'a>(app: &'a Application, _: &'a ScenarioContext) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.navbar.click_login_link().await?;
        app.login_page.login("username", "Test@password123").await?;
        app.login_page.expect_success_message_to_be_visible(None).await?;
        app.login_page
            .expect_success_message_text_to_be("You are now logged in.", None)
            .await
    }
    .boxed()
}

fn login_invalid<'a>(app: &'a Application, _: &'a ScenarioContext) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.navbar.click_login_link().await?;
        app.login_page
            .login("incorrect_username", "incorrect_password")
            .await?;
        app.login_page.expect_error_message_to_be_visible(None).await?;
        app.login_page
            .expect_error_message_text_to_be(
                "Incorrect username or password entered. Please try again.",
                None,
            )
            .await
    }
    .boxed()
}

// =============================================================================
// ARTICLES
// =============================================================================

fn featured_article<'a>(
    app: &'a Application,
    _: &'a ScenarioContext,
) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.main_page.click_open_full_featured_article().await?;
        app.article_page.check_article_elements_visibility(None).await?;
        app.article_page.check_article_text_content_not_empty(None).await
    }
    .boxed()
}

fn article_through_search<'a>(
    app: &'a Application,
    _: &'a ScenarioContext,
) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.navbar.search("Kurube Kanga ruins").await?;
        app.article_page.expect_title_text("Kurube Kanga ruins", None).await?;
        app.article_page.check_article_elements_visibility(None).await?;
        app.article_page.check_article_text_content_not_empty(None).await
    }
    .boxed()
}

fn deleted_article<'a>(
    app: &'a Application,
    ctx: &'a ScenarioContext,
) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.page().goto(&ctx.url("/wiki/Deleted_Article")?).await?;
        app.main_page.check_no_article_text_is_visible(None).await
    }
    .boxed()
}

// =============================================================================
// CONTENT
// =============================================================================

fn main_elements<'a>(app: &'a Application, _: &'a ScenarioContext) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.main_page.check_main_page_elements_visibility(None).await?;
        app.main_page.check_elements_text_not_empty(None).await
    }
    .boxed()
}

fn did_you_know<'a>(app: &'a Application, _: &'a ScenarioContext) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.main_page.check_did_you_know_section_visibility(None).await?;
        app.main_page.check_did_you_know_section_text_not_empty(None).await
    }
    .boxed()
}

// =============================================================================
// LINKS
// =============================================================================

fn internal_link<'a>(app: &'a Application, _: &'a ScenarioContext) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.main_page.click_random_internal_link().await?;
        app.article_page.check_article_elements_visibility(None).await
    }
    .boxed()
}

fn external_link<'a>(app: &'a Application, _: &'a ScenarioContext) -> BoxFuture<'a, ProbeResult<()>> {
    async move {
        app.main_page.click_media_wiki_link().await?;
        expect_url_contains(app.page(), "www.mediawiki.org/wiki/MediaWiki", None).await
    }
    .boxed()
}
