//! Account login form.

use async_trait::async_trait;

use crate::expect::expect;
use crate::handle::PageHandle;
use crate::locator::Locator;
use crate::page_object::{Component, Page};
use crate::result::ProbeResult;
use crate::step::step;

/// Login form; every field is scoped to `#userloginForm`
#[derive(Debug, Clone)]
pub struct LoginPage {
    page: PageHandle,
    pub user_login_form: Locator,
    pub username_input: Locator,
    pub password_input: Locator,
    pub login_button: Locator,
    pub login_error_message: Locator,
    pub login_success_message: Locator,
}

impl LoginPage {
    #[must_use]
    pub fn new(page: &PageHandle) -> Self {
        let user_login_form = page.locator("#userloginForm");
        Self {
            page: page.clone(),
            username_input: user_login_form.locator("#wpName1"),
            password_input: user_login_form.locator("#wpPassword1"),
            login_button: user_login_form.locator("#wpLoginAttempt"),
            login_error_message: user_login_form.locator(".cdx-message--error"),
            login_success_message: user_login_form.locator(".cdx-message--success"),
            user_login_form,
        }
    }

    pub async fn fill_username_field(&self, username: &str) -> ProbeResult<()> {
        self.expect_loaded(None).await?;
        self.username_input.fill(username).await
    }

    pub async fn fill_password_field(&self, password: &str) -> ProbeResult<()> {
        self.expect_loaded(None).await?;
        self.password_input.fill(password).await
    }

    pub async fn click_login_button(&self) -> ProbeResult<()> {
        self.login_button.click().await
    }

    /// Fill both fields and submit
    pub async fn login(&self, username: &str, password: &str) -> ProbeResult<()> {
        step(&self.page, "LoginPage.login", async {
            self.fill_username_field(username).await?;
            self.fill_password_field(password).await?;
            self.click_login_button().await
        })
        .await
    }

    pub async fn expect_error_message_to_be_visible(
        &self,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        expect(&self.login_error_message)
            .with_message(message.unwrap_or("Expected login error message to be visible"))
            .to_be_visible()
            .await
    }

    pub async fn expect_error_message_text_to_be(
        &self,
        text: &str,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        expect(&self.login_error_message)
            .with_message(message.unwrap_or("Expected login error message text"))
            .to_have_text(text)
            .await
    }

    pub async fn expect_success_message_to_be_visible(
        &self,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        expect(&self.login_success_message)
            .with_message(message.unwrap_or("Expected login success message to be visible"))
            .to_be_visible()
            .await
    }

    pub async fn expect_success_message_text_to_be(
        &self,
        text: &str,
        message: Option<&str>,
    ) -> ProbeResult<()> {
        expect(&self.login_success_message)
            .with_message(message.unwrap_or("Expected login success message text"))
            .to_have_text(text)
            .await
    }
}

#[async_trait]
impl Component for LoginPage {
    fn name(&self) -> &'static str {
        "LoginPage"
    }

    fn loaded_message(&self) -> &'static str {
        "Expected Login page to be loaded"
    }

    fn page(&self) -> &PageHandle {
        &self.page
    }

    fn defining_locators(&self) -> Vec<&Locator> {
        vec![
            &self.user_login_form,
            &self.username_input,
            &self.password_input,
            &self.login_button,
        ]
    }
}

#[async_trait]
impl Page for LoginPage {
    const PAGE_PATH: &'static str = "/w/index.php?title=Special:UserLogin";
}
