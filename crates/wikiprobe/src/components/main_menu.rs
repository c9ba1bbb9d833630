//! The collapsible main menu.

use async_trait::async_trait;

use crate::handle::PageHandle;
use crate::locator::Locator;
use crate::page_object::Component;
use crate::result::ProbeResult;
use crate::step::step;

/// Main menu button and the menu it opens
#[derive(Debug, Clone)]
pub struct MainMenu {
    page: PageHandle,
    /// Button opening the menu
    pub main_menu_button: Locator,
    /// The menu panel
    pub main_menu_modal: Locator,
    /// "move to sidebar" pin button
    pub move_to_sidebar_button: Locator,
    /// Menu entries
    pub main_menu_item: Locator,
}

impl MainMenu {
    /// Bind the menu locators to `page`
    #[must_use]
    pub fn new(page: &PageHandle) -> Self {
        let main_menu_modal = page.locator("#vector-main-menu");
        Self {
            page: page.clone(),
            main_menu_button: page.locator(r#"[aria-label="Main menu"]"#),
            move_to_sidebar_button: main_menu_modal.locator(".vector-pinnable-header-pin-button"),
            main_menu_item: main_menu_modal.locator(".mw-list-item"),
            main_menu_modal,
        }
    }

    /// Click the menu button
    pub async fn open_main_menu(&self) -> ProbeResult<()> {
        self.main_menu_button.click().await
    }

    /// Open the menu and click the entry labelled `item`
    pub async fn navigate_to_main_menu_item(&self, item: &str) -> ProbeResult<()> {
        step(&self.page, "MainMenu.navigate_to_main_menu_item", async {
            self.expect_loaded(None).await?;
            self.open_main_menu().await?;
            self.main_menu_item.get_by_text(item).click().await
        })
        .await
    }
}

#[async_trait]
impl Component for MainMenu {
    fn name(&self) -> &'static str {
        "MainMenu"
    }

    fn loaded_message(&self) -> &'static str {
        "Expected Header to be loaded"
    }

    fn page(&self) -> &PageHandle {
        &self.page
    }

    fn defining_locators(&self) -> Vec<&Locator> {
        vec![&self.main_menu_button]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{wiki_site, FakePage};
    use crate::result::ProbeError;
    use crate::wait::WaitPolicy;
    use std::sync::Arc;

    async fn menu() -> MainMenu {
        let page = PageHandle::new(Arc::new(FakePage::new(Arc::new(wiki_site()))))
            .with_wait_policy(WaitPolicy::fast());
        page.goto("https://en.wikipedia.org/wiki/Main_Page").await.unwrap();
        MainMenu::new(&page)
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigate_to_contents() {
        let menu = menu().await;
        menu.navigate_to_main_menu_item("Contents").await.unwrap();
        let url = menu.page.url().await.unwrap();
        assert!(url.contains("/wiki/Wikipedia:Contents"), "{url}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_hidden_until_opened() {
        let menu = menu().await;
        assert!(!menu.main_menu_item.first().is_visible().await.unwrap());
        menu.open_main_menu().await.unwrap();
        assert!(menu.main_menu_modal.is_visible().await.unwrap());
        assert!(menu.move_to_sidebar_button.is_visible().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_item_times_out() {
        let menu = menu().await;
        let err = menu
            .navigate_to_main_menu_item("No such entry")
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::InteractionTimeout { ref action, .. } if action == "click"));
        let records = menu.page.steps().records();
        assert!(records[0].has_failure());
    }
}
