//! Full-text search results.

use async_trait::async_trait;

use crate::assertion::Assertion;
use crate::expect::expect;
use crate::handle::PageHandle;
use crate::locator::Locator;
use crate::page_object::{expect_all_visible, probe_count, probe_text, Component, Page};
use crate::result::ProbeResult;
use crate::step::step;

/// Search results page; every locator is scoped to the content container
#[derive(Debug, Clone)]
pub struct SearchResultPage {
    page: PageHandle,
    pub content_container: Locator,
    pub title: Locator,
    pub no_results_message: Locator,
    pub search_input: Locator,
    pub search_button: Locator,
    pub search_results_container: Locator,
    pub search_results_item: Locator,
    pub search_results_item_title: Locator,
    pub search_results_item_body: Locator,
    pub none_found_results: Locator,
}

impl SearchResultPage {
    #[must_use]
    pub fn new(page: &PageHandle) -> Self {
        let content_container = page.locator(".mw-content-container");
        let search_results_item = content_container.locator(".mw-search-result");
        Self {
            page: page.clone(),
            title: content_container.locator("#firstHeading"),
            no_results_message: content_container.locator(".mw-search-nonefound"),
            search_input: content_container.locator("#searchText"),
            search_button: content_container.locator(r#"[type="submit"]"#),
            search_results_container: content_container.locator(".mw-search-results"),
            search_results_item_title: search_results_item.locator(".mw-search-result-heading"),
            search_results_item_body: search_results_item.locator(".searchresult"),
            search_results_item,
            none_found_results: content_container.locator(".mw-search-nonefound"),
            content_container,
        }
    }

    /// Search box, button and result list are visible and the results have text
    pub async fn check_search_results_elements_visibility(
        &self,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        step(&self.page, "SearchResultPage.check_search_results_elements_visibility", async {
            let targets = [
                (&self.search_input, "Expected search input to be visible"),
                (&self.search_button, "Expected search button to be visible"),
                (&self.search_results_container, "Expected search results to be visible"),
            ];
            for (locator, default) in targets {
                expect(locator)
                    .with_message(message.unwrap_or(default))
                    .to_be_visible()
                    .await?;
            }
            self.check_search_results_text_content_not_empty(message).await
        })
        .await
    }

    /// At least one result, and the first has a title and a snippet
    pub async fn check_search_results_text_content_not_empty(
        &self,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        step(&self.page, "SearchResultPage.check_search_results_text_content_not_empty", async {
            Assertion::greater_than(
                self.get_search_results_count().await,
                0,
                "Expected at least one search result",
            )
            .with_message_override(message)
            .into_result()?;
            Assertion::not_empty(
                &probe_text(&self.search_results_item_title.first()).await,
                "Expected first search result title to have text",
            )
            .with_message_override(message)
            .into_result()?;
            Assertion::not_empty(
                &probe_text(&self.search_results_item_body.first()).await,
                "Expected first search result snippet to have text",
            )
            .with_message_override(message)
            .into_result()
        })
        .await
    }

    /// The first result title contains `text`
    pub async fn check_search_results_contain_text(
        &self,
        text: &str,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        let message = message.map_or_else(
            || format!("Expected first search result to contain {text:?}"),
            str::to_string,
        );
        step(&self.page, "SearchResultPage.check_search_results_contain_text", async {
            expect(&self.search_results_item_title.first().filter_has_text(text))
                .with_message(message)
                .to_be_visible()
                .await
        })
        .await
    }

    /// The none-found notice reads exactly `text`
    pub async fn expect_no_results_message(
        &self,
        text: &str,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        expect(&self.none_found_results)
            .with_message(message.unwrap_or("Expected no-results message to be visible"))
            .to_have_text(text)
            .await
    }

    pub async fn get_search_results_count(&self) -> usize {
        probe_count(&self.search_results_item).await
    }
}

#[async_trait]
impl Component for SearchResultPage {
    fn name(&self) -> &'static str {
        "SearchResultPage"
    }

    fn loaded_message(&self) -> &'static str {
        "Expected Search results page to be loaded"
    }

    fn page(&self) -> &PageHandle {
        &self.page
    }

    fn defining_locators(&self) -> Vec<&Locator> {
        vec![&self.title, &self.search_input, &self.search_button]
    }

    /// Recorded as a step, unlike the other components' load checks
    async fn expect_loaded(&self, message: Option<&str>) -> ProbeResult<()> {
        let message = message.unwrap_or_else(|| self.loaded_message());
        let locators = self.defining_locators();
        step(
            &self.page,
            "SearchResultPage.expect_loaded",
            expect_all_visible(self.name(), message, &locators),
        )
        .await
    }
}

#[async_trait]
impl Page for SearchResultPage {
    const PAGE_PATH: &'static str = "/w/index.php?search";
}
