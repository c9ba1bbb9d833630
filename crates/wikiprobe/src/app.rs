//! Composition root for one scenario.

use crate::components::{MainMenu, NavBar};
use crate::handle::PageHandle;
use crate::pages::{ArticlePage, LoginPage, MainPage, SearchResultPage};

/// Every page object of the wiki, all bound to the same tab
#[derive(Debug, Clone)]
pub struct Application {
    page: PageHandle,
    /// Header bar
    pub navbar: NavBar,
    /// Landing page
    pub main_page: MainPage,
    /// Site navigation drawer
    pub main_menu: MainMenu,
    /// Article view
    pub article_page: ArticlePage,
    /// Full-text search results
    pub search_result_page: SearchResultPage,
    /// Login form
    pub login_page: LoginPage,
}

impl Application {
    #[must_use]
    pub fn new(page: PageHandle) -> Self {
        Self {
            navbar: NavBar::new(&page),
            main_page: MainPage::new(&page),
            main_menu: MainMenu::new(&page),
            article_page: ArticlePage::new(&page),
            search_result_page: SearchResultPage::new(&page),
            login_page: LoginPage::new(&page),
            page,
        }
    }

    /// The tab every page object drives
    #[must_use]
    pub const fn page(&self) -> &PageHandle {
        &self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakePage, FakeSite};
    use crate::page_object::Component;
    use std::sync::Arc;

    #[test]
    fn test_all_components_share_one_page() {
        let page = PageHandle::new(Arc::new(FakePage::new(Arc::new(FakeSite::new()))));
        let app = Application::new(page.clone());
        assert!(app.page().same_page(&page));
        assert!(app.navbar.page().same_page(&page));
        assert!(app.main_page.page().same_page(&page));
        assert!(app.main_menu.page().same_page(&page));
        assert!(app.article_page.page().same_page(&page));
        assert!(app.search_result_page.page().same_page(&page));
        assert!(app.login_page.page().same_page(&page));
    }

    #[test]
    fn test_separate_applications_do_not_share() {
        let fake = || PageHandle::new(Arc::new(FakePage::new(Arc::new(FakeSite::new()))));
        let a = Application::new(fake());
        let b = Application::new(fake());
        assert!(!a.page().same_page(b.page()));
    }
}
