//! Navigable screens of the wiki.

mod article;
mod login;
mod main_page;
mod search_result;

pub use article::ArticlePage;
pub use login::LoginPage;
pub use main_page::{MainPage, RANDOM_LINK_POOL};
pub use search_result::SearchResultPage;
