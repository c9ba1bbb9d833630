//! The wiki front page and its sections.

use async_trait::async_trait;
use rand::Rng;

use crate::assertion::Assertion;
use crate::handle::PageHandle;
use crate::locator::Locator;
use crate::page_object::{probe_count, probe_text, probe_visible, Component, Page};
use crate::result::ProbeResult;
use crate::step::step;

/// Internal links eligible for [`MainPage::click_random_internal_link`]
pub const RANDOM_LINK_POOL: usize = 10;

fn random_index(count: usize) -> usize {
    let upper = count.min(RANDOM_LINK_POOL);
    if upper == 0 {
        0
    } else {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Front page: featured article, news, did you know, picture, on this day
#[derive(Debug, Clone)]
pub struct MainPage {
    page: PageHandle,
    pub featured_article_title: Locator,
    pub featured_article_content: Locator,
    pub in_the_news_title: Locator,
    pub in_the_news_content: Locator,
    pub did_you_know_title: Locator,
    pub did_you_know_content: Locator,
    pub featured_picture_title: Locator,
    pub featured_picture_content: Locator,
    pub on_this_day_title: Locator,
    pub on_this_day_content: Locator,
    /// Shown in place of an article that does not exist
    pub no_article_text: Locator,
    /// Link to the MediaWiki project
    pub media_wiki_link: Locator,
    /// Internal links inside paragraphs
    pub internal_links: Locator,
}

impl MainPage {
    /// Bind the front page locators to `page`
    #[must_use]
    pub fn new(page: &PageHandle) -> Self {
        Self {
            page: page.clone(),
            featured_article_title: page.locator(".MainPageBG #mp-tfa-h2"),
            featured_article_content: page.locator(".MainPageBG #mp-tfa"),
            in_the_news_title: page.locator("#In_the_news"),
            in_the_news_content: page.locator("#mp-itn"),
            did_you_know_title: page.locator("#mp-dyk-h2"),
            did_you_know_content: page.locator("#mp-dyk"),
            featured_picture_title: page.locator("#mp-tfp-h2"),
            featured_picture_content: page.locator("#mp-tfp"),
            on_this_day_title: page.locator("#On_this_day"),
            on_this_day_content: page.locator("#mp-right #mp-otd"),
            no_article_text: page.locator("#noarticletext"),
            media_wiki_link: page.locator(r#"[title="mw:"]"#),
            internal_links: page.locator(r#"p a[href*="wiki"]"#),
        }
    }

    // -------------------------------------------------------------------------
    // Clicks
    // -------------------------------------------------------------------------

    /// Click one of the first ten internal paragraph links, chosen at random
    pub async fn click_random_internal_link(&self) -> ProbeResult<()> {
        step(&self.page, "MainPage.click_random_internal_link", async {
            let index = random_index(probe_count(&self.internal_links).await);
            tracing::debug!(index, "random internal link");
            self.internal_links.nth(index).click().await
        })
        .await
    }

    /// Click "Full article..." in the featured article
    pub async fn click_open_full_featured_article(&self) -> ProbeResult<()> {
        step(&self.page, "MainPage.click_open_full_featured_article", async {
            self.featured_article_content
                .locator("a")
                .filter_has_text("Full article...")
                .click()
                .await
        })
        .await
    }

    /// Click the MediaWiki link
    pub async fn click_media_wiki_link(&self) -> ProbeResult<()> {
        step(
            &self.page,
            "MainPage.click_media_wiki_link",
            self.media_wiki_link.click(),
        )
        .await
    }

    // -------------------------------------------------------------------------
    // Text
    // -------------------------------------------------------------------------

    pub async fn get_in_the_news_text(&self) -> String {
        probe_text(&self.in_the_news_content).await
    }

    pub async fn get_featured_article_text(&self) -> String {
        probe_text(&self.featured_article_content).await
    }

    pub async fn get_did_you_know_text(&self) -> String {
        probe_text(&self.did_you_know_content).await
    }

    /// Caption of the featured picture section
    pub async fn get_featured_picture_text(&self) -> String {
        probe_text(&self.featured_picture_title).await
    }

    pub async fn get_on_this_day_text(&self) -> String {
        probe_text(&self.on_this_day_content).await
    }

    // -------------------------------------------------------------------------
    // Visibility
    // -------------------------------------------------------------------------

    pub async fn is_on_this_day_title_visible(&self) -> bool {
        probe_visible(&self.on_this_day_title).await
    }

    pub async fn is_featured_article_title_visible(&self) -> bool {
        probe_visible(&self.featured_article_title).await
    }

    pub async fn is_did_you_know_title_visible(&self) -> bool {
        probe_visible(&self.did_you_know_title).await
    }

    pub async fn is_featured_article_visible(&self) -> bool {
        probe_visible(&self.featured_article_content).await
    }

    pub async fn is_in_the_news_title_visible(&self) -> bool {
        probe_visible(&self.in_the_news_title).await
    }

    pub async fn is_in_the_news_visible(&self) -> bool {
        probe_visible(&self.in_the_news_content).await
    }

    pub async fn is_did_you_know_visible(&self) -> bool {
        probe_visible(&self.did_you_know_content).await
    }

    /// Featured picture heading
    pub async fn is_featured_picture_visible(&self) -> bool {
        probe_visible(&self.featured_picture_title).await
    }

    pub async fn is_on_this_day_visible(&self) -> bool {
        probe_visible(&self.on_this_day_content).await
    }

    pub async fn is_no_article_text_visible(&self) -> bool {
        probe_visible(&self.no_article_text).await
    }

    // -------------------------------------------------------------------------
    // Checks
    // -------------------------------------------------------------------------

    /// All front page sections are visible right now
    ///
    /// `message` replaces the per-section failure message.
    pub async fn check_main_page_elements_visibility(
        &self,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        step(&self.page, "MainPage.check_main_page_elements_visibility", async {
            let checks = [
                (self.is_featured_article_title_visible().await, "featured article title"),
                (self.is_featured_article_visible().await, "featured article"),
                (self.is_in_the_news_title_visible().await, "in the news title"),
                (self.is_in_the_news_visible().await, "in the news"),
                (self.is_did_you_know_title_visible().await, "did you know title"),
                (self.is_did_you_know_visible().await, "did you know"),
                (self.is_featured_picture_visible().await, "featured picture"),
                (self.is_on_this_day_title_visible().await, "on this day title"),
                (self.is_on_this_day_visible().await, "on this day"),
            ];
            for (visible, what) in checks {
                Assertion::is_true(visible, &format!("Expected {what} to be visible"))
                    .with_message_override(message)
                    .into_result()?;
            }
            Ok(())
        })
        .await
    }

    /// Every front page section has text
    pub async fn check_elements_text_not_empty(&self, message: Option<&str>) -> ProbeResult<()> {
        step(&self.page, "MainPage.check_elements_text_not_empty", async {
            let checks = [
                (self.get_featured_article_text().await, "featured article"),
                (self.get_in_the_news_text().await, "in the news"),
                (self.get_did_you_know_text().await, "did you know"),
                (self.get_featured_picture_text().await, "featured picture"),
                (self.get_on_this_day_text().await, "on this day"),
            ];
            for (text, what) in checks {
                Assertion::not_empty(&text, &format!("Expected {what} to have text"))
                    .with_message_override(message)
                    .into_result()?;
            }
            Ok(())
        })
        .await
    }

    /// The missing-article notice is visible right now
    pub async fn check_no_article_text_is_visible(&self, message: Option<&str>) -> ProbeResult<()> {
        step(&self.page, "MainPage.check_no_article_text_is_visible", async {
            Assertion::is_true(
                self.is_no_article_text_visible().await,
                "Expected no-article text to be visible",
            )
            .with_message_override(message)
            .into_result()
        })
        .await
    }

    /// "Did you know" title and content are visible right now
    pub async fn check_did_you_know_section_visibility(
        &self,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        step(&self.page, "MainPage.check_did_you_know_section_visibility", async {
            Assertion::is_true(
                self.is_did_you_know_title_visible().await,
                "Expected did you know title to be visible",
            )
            .with_message_override(message)
            .into_result()?;
            Assertion::is_true(
                self.is_did_you_know_visible().await,
                "Expected did you know to be visible",
            )
            .with_message_override(message)
            .into_result()
        })
        .await
    }

    /// "Did you know" has text
    pub async fn check_did_you_know_section_text_not_empty(
        &self,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        step(&self.page, "MainPage.check_did_you_know_section_text_not_empty", async {
            let text = self.get_did_you_know_text().await;
            Assertion::not_empty(&text, "Expected did you know to have text")
                .with_message_override(message)
                .into_result()
        })
        .await
    }
}

#[async_trait]
impl Component for MainPage {
    fn name(&self) -> &'static str {
        "MainPage"
    }

    fn loaded_message(&self) -> &'static str {
        "Expected Main page to be loaded"
    }

    fn page(&self) -> &PageHandle {
        &self.page
    }

    fn defining_locators(&self) -> Vec<&Locator> {
        vec![
            &self.featured_article_title,
            &self.featured_article_content,
            &self.in_the_news_title,
            &self.in_the_news_content,
            &self.did_you_know_title,
            &self.did_you_know_content,
            &self.featured_picture_title,
            &self.featured_picture_content,
            &self.on_this_day_title,
            &self.on_this_day_content,
        ]
    }
}

#[async_trait]
impl Page for MainPage {
    const PAGE_PATH: &'static str = "/";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{wiki_site, FakePage};
    use crate::result::ProbeError;
    use crate::wait::WaitPolicy;
    use std::sync::Arc;

    const BASE: &str = "https://en.wikipedia.org";

    async fn main_page(path: &str) -> MainPage {
        let page = PageHandle::new(Arc::new(FakePage::new(Arc::new(wiki_site()))))
            .with_wait_policy(WaitPolicy::fast());
        let main = MainPage::new(&page);
        main.open(&format!("{BASE}{path}")).await.unwrap();
        main
    }

    #[test]
    fn test_random_index_bounds() {
        assert_eq!(random_index(0), 0);
        assert_eq!(random_index(1), 0);
        for _ in 0..100 {
            assert!(random_index(50) < RANDOM_LINK_POOL);
            assert!(random_index(3) < 3);
        }
    }

    mod check_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_open_page_path_then_loaded() {
            let main = main_page(MainPage::PAGE_PATH).await;
            main.expect_loaded(None).await.unwrap();
            main.check_main_page_elements_visibility(None).await.unwrap();
            main.check_elements_text_not_empty(None).await.unwrap();
            main.check_did_you_know_section_visibility(None).await.unwrap();
            main.check_did_you_know_section_text_not_empty(None).await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_queries_are_idempotent() {
            let main = main_page("/wiki/Main_Page").await;
            assert_eq!(main.get_in_the_news_text().await, main.get_in_the_news_text().await);
            assert_eq!(main.is_in_the_news_visible().await, main.is_in_the_news_visible().await);
        }

        #[tokio::test(start_paused = true)]
        async fn test_no_article_text() {
            let main = main_page("/wiki/Invalid_UR_L").await;
            main.check_no_article_text_is_visible(None).await.unwrap();
            let err = main.check_main_page_elements_visibility(None).await.unwrap_err();
            assert!(err.to_string().starts_with("Expected featured article title to be visible"));
            let err = main
                .check_main_page_elements_visibility(Some("front page sections missing"))
                .await
                .unwrap_err();
            assert!(err.to_string().starts_with("front page sections missing"));
            let err = main.check_elements_text_not_empty(None).await.unwrap_err();
            assert!(err.to_string().starts_with("Expected featured article to have text"));
            let err = main.expect_loaded(Some("front page")).await.unwrap_err();
            assert!(matches!(err, ProbeError::NotLoaded { ref message, .. } if message == "front page"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_no_article_text_absent_on_main_page() {
            let main = main_page("/wiki/Main_Page").await;
            let err = main.check_no_article_text_is_visible(None).await.unwrap_err();
            assert!(err.to_string().starts_with("Expected no-article text to be visible"));
            let err = main
                .check_no_article_text_is_visible(Some("article should be missing"))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                ProbeError::AssertionMismatch { ref message, .. } if message == "article should be missing"
            ));
        }
    }

    mod click_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_full_featured_article() {
            let main = main_page("/wiki/Main_Page").await;
            main.click_open_full_featured_article().await.unwrap();
            assert!(main.page.url().await.unwrap().ends_with("/wiki/Kurube_Kanga_ruins"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_random_internal_link_leaves_main_page() {
            let main = main_page("/wiki/Main_Page").await;
            main.click_random_internal_link().await.unwrap();
            let url = main.page.url().await.unwrap();
            assert!(!url.ends_with("/wiki/Main_Page"), "{url}");
        }

        #[tokio::test(start_paused = true)]
        async fn test_random_internal_link_without_links_times_out() {
            let main = main_page("/wiki/Deleted_Article").await;
            let err = main.click_random_internal_link().await.unwrap_err();
            assert!(matches!(err, ProbeError::InteractionTimeout { .. }));
        }

        #[tokio::test(start_paused = true)]
        async fn test_media_wiki_link() {
            let main = main_page("/wiki/Main_Page").await;
            main.click_media_wiki_link().await.unwrap();
            assert!(main
                .page
                .url()
                .await
                .unwrap()
                .contains("www.mediawiki.org/wiki/MediaWiki"));
        }
    }
}
