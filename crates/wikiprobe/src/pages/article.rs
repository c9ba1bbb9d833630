//! A single encyclopedia article.

use async_trait::async_trait;

use crate::assertion::Assertion;
use crate::expect::expect;
use crate::handle::PageHandle;
use crate::locator::Locator;
use crate::page_object::{probe_count, probe_text, Component, Page};
use crate::result::ProbeResult;
use crate::step::step;

#[derive(Debug, Clone)]
pub struct ArticlePage {
    page: PageHandle,
    pub title: Locator,
    pub content: Locator,
    pub references: Locator,
    pub info_box: Locator,
    pub categories: Locator,
    pub external_links: Locator,
    pub see_also_sections: Locator,
}

impl ArticlePage {
    #[must_use]
    pub fn new(page: &PageHandle) -> Self {
        Self {
            page: page.clone(),
            title: page.locator("#firstHeading"),
            content: page.locator("#mw-content-text .mw-parser-output"),
            references: page.locator("#References"),
            info_box: page.locator(".infobox"),
            categories: page.locator("#mw-normal-catlinks ul li"),
            external_links: page.locator("span#External_links ~ ul li"),
            see_also_sections: page.locator("span#See_also ~ ul li"),
        }
    }

    pub async fn expect_title_to_be_visible(&self, message: Option<&str>) -> ProbeResult<()> {
        expect(&self.title)
            .with_message(message.unwrap_or("Expected article title to be visible"))
            .to_be_visible()
            .await
    }

    pub async fn expect_content_to_be_visible(&self, message: Option<&str>) -> ProbeResult<()> {
        expect(&self.content)
            .with_message(message.unwrap_or("Expected article content to be visible"))
            .to_be_visible()
            .await
    }

    pub async fn expect_references_to_be_visible(&self, message: Option<&str>) -> ProbeResult<()> {
        expect(&self.references)
            .with_message(message.unwrap_or("Expected references section to be visible"))
            .to_be_visible()
            .await
    }

    pub async fn expect_info_box_to_be_visible(&self, message: Option<&str>) -> ProbeResult<()> {
        expect(&self.info_box)
            .with_message(message.unwrap_or("Expected infobox to be visible"))
            .to_be_visible()
            .await
    }

    /// The heading reads exactly `text`
    pub async fn expect_title_text(&self, text: &str, message: Option<&str>) -> ProbeResult<()> {
        let message = message.map_or_else(
            || format!("Expected article title to read {text:?}"),
            str::to_string,
        );
        expect(&self.title).with_message(message).to_have_text(text).await
    }

    pub async fn get_title_text(&self) -> String {
        probe_text(&self.title).await
    }

    pub async fn get_content_text(&self) -> String {
        probe_text(&self.content).await
    }

    pub async fn get_info_box_text(&self) -> String {
        probe_text(&self.info_box).await
    }

    pub async fn get_categories_count(&self) -> usize {
        probe_count(&self.categories).await
    }

    pub async fn get_external_links_count(&self) -> usize {
        probe_count(&self.external_links).await
    }

    pub async fn get_see_also_sections_count(&self) -> usize {
        probe_count(&self.see_also_sections).await
    }

    /// Title, content and references become visible
    pub async fn check_article_elements_visibility(
        &self,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        step(&self.page, "ArticlePage.check_article_elements_visibility", async {
            self.expect_title_to_be_visible(message).await?;
            self.expect_content_to_be_visible(message).await?;
            self.expect_references_to_be_visible(message).await
        })
        .await
    }

    /// Title, content and infobox all have text
    pub async fn check_article_text_content_not_empty(
        &self,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        step(&self.page, "ArticlePage.check_article_text_content_not_empty", async {
            let checks = [
                (self.get_title_text().await, "Expected article title to have text"),
                (self.get_content_text().await, "Expected article content to have text"),
                (self.get_info_box_text().await, "Expected infobox to have text"),
            ];
            for (text, default) in checks {
                Assertion::not_empty(&text, default)
                    .with_message_override(message)
                    .into_result()?;
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl Component for ArticlePage {
    fn name(&self) -> &'static str {
        "ArticlePage"
    }

    fn loaded_message(&self) -> &'static str {
        "Expected Article to be loaded"
    }

    fn page(&self) -> &PageHandle {
        &self.page
    }

    fn defining_locators(&self) -> Vec<&Locator> {
        vec![&self.title, &self.content, &self.references]
    }
}

#[async_trait]
impl Page for ArticlePage {
    const PAGE_PATH: &'static str = "/wiki/";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{wiki_site, FakePage};
    use crate::result::ProbeError;
    use crate::wait::WaitPolicy;
    use std::sync::Arc;

    async fn article(path: &str) -> ArticlePage {
        let page = PageHandle::new(Arc::new(FakePage::new(Arc::new(wiki_site()))))
            .with_wait_policy(WaitPolicy::fast());
        let article = ArticlePage::new(&page);
        article
            .open(&format!("https://en.wikipedia.org{path}"))
            .await
            .unwrap();
        article
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_page_path_then_loaded() {
        let a = article(ArticlePage::PAGE_PATH).await;
        a.expect_loaded(None).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_article_checks_and_counts() {
        let a = article("/wiki/Quantum_mechanics").await;
        a.check_article_elements_visibility(None).await.unwrap();
        a.check_article_text_content_not_empty(None).await.unwrap();
        a.expect_info_box_to_be_visible(None).await.unwrap();
        a.expect_title_text("Quantum mechanics", None).await.unwrap();
        assert_eq!(a.get_categories_count().await, 2);
        assert_eq!(a.get_external_links_count().await, 2);
        assert_eq!(a.get_see_also_sections_count().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_compound_check_surfaces_first_failure() {
        let a = article("/wiki/Deleted_Article").await;
        let err = a.check_article_elements_visibility(None).await.unwrap_err();
        // the missing-article page still has a heading, so content fails first
        assert!(err.to_string().starts_with("Expected article content to be visible"), "{err}");
        let err = a
            .check_article_elements_visibility(Some("deleted article has no body"))
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("deleted article has no body"), "{err}");
        let err = a.expect_loaded(None).await.unwrap_err();
        assert!(matches!(err, ProbeError::NotLoaded { ref locator, .. } if locator.contains("mw-parser-output")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_title_mismatch_reports_actual() {
        let a = article("/wiki/Tea").await;
        let err = a.expect_title_text("Coffee", None).await.unwrap_err();
        assert!(matches!(err, ProbeError::AssertionMismatch { ref actual, .. } if actual == "\"Tea\""));
        assert!(err.to_string().starts_with("Expected article title to read \"Coffee\""), "{err}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_check_custom_message() {
        let a = article("/wiki/Deleted_Article").await;
        let err = a.check_article_text_content_not_empty(None).await.unwrap_err();
        assert!(err.to_string().starts_with("Expected article"), "{err}");
        let err = a
            .check_article_text_content_not_empty(Some("article must have text"))
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::AssertionMismatch { ref message, .. } if message == "article must have text"));
    }
}
