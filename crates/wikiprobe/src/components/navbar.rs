//! Site header: logo, main menu button, search box and account links.

use async_trait::async_trait;

use crate::assertion::Assertion;
use crate::expect::expect;
use crate::handle::PageHandle;
use crate::locator::Locator;
use crate::page_object::{probe_visible, Component};
use crate::result::ProbeResult;
use crate::step::step;

/// The header bar present on every page
#[derive(Debug, Clone)]
pub struct NavBar {
    page: PageHandle,
    /// Button opening the main menu
    pub main_menu_button: Locator,
    /// Site logo
    pub logo: Locator,
    /// Search input
    pub search_field: Locator,
    /// Button submitting the search box
    pub search_button: Locator,
    /// Autocomplete dropdown
    pub search_results_modal: Locator,
    /// Suggestion titles inside the dropdown
    pub search_results_item: Locator,
    /// "Search for pages containing" entry of the dropdown
    pub search_modal_footer: Locator,
    /// Create account link
    pub create_account_link: Locator,
    /// Log in link
    pub login_link: Locator,
}

impl NavBar {
    /// Bind the header locators to `page`
    #[must_use]
    pub fn new(page: &PageHandle) -> Self {
        let search_results_modal = page.locator(".cdx-menu");
        Self {
            page: page.clone(),
            main_menu_button: page.locator(r#"[aria-label="Main menu"]"#),
            logo: page.locator(".mw-logo"),
            search_field: page.locator(r#"[aria-label="Search Wikipedia"]"#),
            search_button: page.locator(".cdx-search-input__end-button"),
            search_results_item: search_results_modal.locator(".cdx-search-result-title"),
            search_results_modal,
            search_modal_footer: page.locator(".cdx-typeahead-search__search-footer__text"),
            create_account_link: page.locator("#pt-createaccount-2"),
            login_link: page.locator("#pt-login-2"),
        }
    }

    // -------------------------------------------------------------------------
    // Composite actions
    // -------------------------------------------------------------------------

    /// Wait for the header, then open the main menu
    pub async fn open_main_menu(&self) -> ProbeResult<()> {
        step(&self.page, "NavBar.open_main_menu", async {
            self.expect_loaded(None).await?;
            self.main_menu_button.click().await
        })
        .await
    }

    /// Type `text` and submit with the search button
    pub async fn search(&self, text: &str) -> ProbeResult<()> {
        step(&self.page, "NavBar.search", async {
            self.expect_loaded(None).await?;
            self.search_field.fill(text).await?;
            self.search_button.click().await
        })
        .await
    }

    /// Type `text` and pick "Search for pages containing" from the dropdown
    pub async fn search_for_all_pages_containing(&self, text: &str) -> ProbeResult<()> {
        step(&self.page, "NavBar.search_for_all_pages_containing", async {
            self.expect_loaded(None).await?;
            self.search_field.fill(text).await?;
            self.search_modal_footer.click().await
        })
        .await
    }

    /// Type into the search field without submitting
    pub async fn fill_search_field(&self, text: &str) -> ProbeResult<()> {
        step(&self.page, "NavBar.fill_search_field", self.search_field.fill(text)).await
    }

    /// Current content of the search field
    pub async fn get_search_field_value(&self) -> ProbeResult<String> {
        self.search_field.input_value().await
    }

    // -------------------------------------------------------------------------
    // Visibility queries
    // -------------------------------------------------------------------------

    /// Whether the main menu button is visible
    pub async fn is_main_menu_visible(&self) -> bool {
        probe_visible(&self.main_menu_button).await
    }

    /// Whether the logo is visible
    pub async fn is_logo_visible(&self) -> bool {
        probe_visible(&self.logo).await
    }

    /// Whether the search field is visible
    pub async fn is_search_field_visible(&self) -> bool {
        probe_visible(&self.search_field).await
    }

    /// Whether the create account link is visible
    pub async fn is_create_account_link_visible(&self) -> bool {
        probe_visible(&self.create_account_link).await
    }

    /// Whether the log in link is visible
    pub async fn is_login_link_visible(&self) -> bool {
        probe_visible(&self.login_link).await
    }

    // -------------------------------------------------------------------------
    // Clicks
    // -------------------------------------------------------------------------

    /// Click the main menu button
    pub async fn click_main_menu(&self) -> ProbeResult<()> {
        self.main_menu_button.click().await
    }

    /// Click the logo
    pub async fn click_logo(&self) -> ProbeResult<()> {
        self.logo.click().await
    }

    /// Click the search button
    pub async fn click_search_button(&self) -> ProbeResult<()> {
        self.search_button.click().await
    }

    /// Click the create account link
    pub async fn click_create_account_link(&self) -> ProbeResult<()> {
        self.create_account_link.click().await
    }

    /// Click the log in link
    pub async fn click_login_link(&self) -> ProbeResult<()> {
        self.login_link.click().await
    }

    /// Click the first suggestion whose title contains `text`
    pub async fn click_search_result_with_text(&self, text: &str) -> ProbeResult<()> {
        self.search_results_item.filter_has_text(text).click().await
    }

    // -------------------------------------------------------------------------
    // Assertions
    // -------------------------------------------------------------------------

    /// Every header element is visible right now
    ///
    /// `message` replaces the per-element failure message.
    pub async fn check_navbar_elements_visibility(&self, message: Option<&str>) -> ProbeResult<()> {
        step(&self.page, "NavBar.check_navbar_elements_visibility", async {
            let checks = [
                (self.is_main_menu_visible().await, "Expected main menu button visible"),
                (self.is_logo_visible().await, "Expected logo visible"),
                (self.is_search_field_visible().await, "Expected search field visible"),
                (
                    self.is_create_account_link_visible().await,
                    "Expected create account link visible",
                ),
                (self.is_login_link_visible().await, "Expected log in link visible"),
            ];
            for (visible, default) in checks {
                Assertion::is_true(visible, default)
                    .with_message_override(message)
                    .into_result()?;
            }
            Ok(())
        })
        .await
    }

    /// The autocomplete dropdown becomes visible
    pub async fn expect_search_results_modal_visible(
        &self,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        expect(&self.search_results_modal)
            .with_message(message.unwrap_or("Expected search suggestions to be visible"))
            .to_be_visible()
            .await
    }

    /// The second suggestion reads exactly `text`
    pub async fn expect_search_results_item_visible(
        &self,
        text: &str,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        let message = message.map_or_else(
            || format!("Expected search suggestion {text:?} to be visible"),
            str::to_string,
        );
        expect(&self.search_results_item.nth(1))
            .with_message(message)
            .to_have_text(text)
            .await
    }
}

#[async_trait]
impl Component for NavBar {
    fn name(&self) -> &'static str {
        "NavBar"
    }

    fn loaded_message(&self) -> &'static str {
        "Expected NavBar to be loaded"
    }

    fn page(&self) -> &PageHandle {
        &self.page
    }

    fn defining_locators(&self) -> Vec<&Locator> {
        vec![
            &self.main_menu_button,
            &self.logo,
            &self.search_field,
            &self.search_button,
            &self.create_account_link,
            &self.login_link,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{wiki_site, FakePage};
    use crate::result::ProbeError;
    use crate::wait::WaitPolicy;
    use std::sync::Arc;

    async fn navbar() -> (NavBar, Arc<FakePage>) {
        let fake = Arc::new(FakePage::new(Arc::new(wiki_site())));
        let page = PageHandle::new(fake.clone()).with_wait_policy(WaitPolicy::fast());
        page.goto("https://en.wikipedia.org/wiki/Main_Page").await.unwrap();
        (NavBar::new(&page), fake)
    }

    mod action_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_fill_then_read_round_trip() {
            let (nav, _) = navbar().await;
            nav.fill_search_field("Quan").await.unwrap();
            assert_eq!(nav.get_search_field_value().await.unwrap(), "Quan");
            nav.fill_search_field("").await.unwrap();
            assert_eq!(nav.get_search_field_value().await.unwrap(), "");
        }

        #[tokio::test(start_paused = true)]
        async fn test_search_calls_in_order() {
            let (nav, fake) = navbar().await;
            nav.search("Kurube Kanga ruins").await.unwrap();
            let calls = fake.calls();
            let fill = calls.iter().position(|c| c.starts_with("fill")).unwrap();
            let click = calls.iter().rposition(|c| c.starts_with("click")).unwrap();
            assert!(fill < click);
            let url = nav.page.url().await.unwrap();
            assert!(url.ends_with("/wiki/Kurube_Kanga_ruins"), "{url}");
        }

        #[tokio::test(start_paused = true)]
        async fn test_search_records_step() {
            let (nav, _) = navbar().await;
            nav.search("Random123sdfg").await.unwrap();
            let records = nav.page.steps().records();
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].name, "NavBar.search");
        }

        #[tokio::test(start_paused = true)]
        async fn test_search_fails_fast_when_not_loaded() {
            let fake = Arc::new(FakePage::new(Arc::new(wiki_site())));
            let page = PageHandle::new(fake.clone()).with_wait_policy(WaitPolicy::fast());
            page.goto("https://en.wikipedia.org/w/index.php?title=Special:UserLogin")
                .await
                .unwrap();
            fake.set_offline(true);
            let err = NavBar::new(&page).search("x").await.unwrap_err();
            assert!(matches!(err, ProbeError::NotLoaded { ref component, .. } if component == "NavBar"));
            fake.set_offline(false);
            assert!(!fake.calls().iter().any(|c| c.starts_with("fill")));
        }
    }

    mod assertion_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_autocomplete_suggestions() {
            let (nav, _) = navbar().await;
            let err = nav.expect_search_results_modal_visible(None).await.unwrap_err();
            assert!(err.to_string().starts_with("Expected search suggestions to be visible"));
            nav.fill_search_field("Quan").await.unwrap();
            nav.expect_search_results_modal_visible(None).await.unwrap();
            nav.expect_search_results_item_visible("Quantum mechanics", None)
                .await
                .unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_custom_messages_replace_defaults() {
            let (nav, fake) = navbar().await;
            let err = nav
                .expect_search_results_modal_visible(Some("dropdown should open"))
                .await
                .unwrap_err();
            assert!(err.to_string().starts_with("dropdown should open"));
            nav.fill_search_field("Quan").await.unwrap();
            let err = nav
                .expect_search_results_item_visible("Nothing like it", None)
                .await
                .unwrap_err();
            assert!(err
                .to_string()
                .starts_with("Expected search suggestion \"Nothing like it\" to be visible"));
            fake.set_offline(true);
            let err = nav
                .check_navbar_elements_visibility(Some("header missing"))
                .await
                .unwrap_err();
            assert!(err.to_string().starts_with("header missing"));
        }

        #[tokio::test(start_paused = true)]
        async fn test_elements_visibility() {
            let (nav, _) = navbar().await;
            nav.check_navbar_elements_visibility(None).await.unwrap();
            nav.expect_loaded(None).await.unwrap();
        }

        #[tokio::test(start_paused = true)]
        async fn test_queries_fold_driver_failure() {
            let (nav, fake) = navbar().await;
            assert!(nav.is_logo_visible().await);
            fake.set_offline(true);
            assert!(!nav.is_logo_visible().await);
            let err = nav.check_navbar_elements_visibility(None).await.unwrap_err();
            assert!(err.to_string().starts_with("Expected main menu button visible"));
        }
    }
}
