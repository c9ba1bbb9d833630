//! Scenario catalog against the real site through Chromium
//!
//! Needs a Chromium install and network access:
//!
//! ```text
//! cargo test -p wikiprobe --features browser --test live_wiki -- --ignored
//! ```

#![cfg(feature = "browser")]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use wikiprobe::{catalog, Browser, BrowserConfig, ProbeConfig, ScenarioRunner};

async fn launch() -> Browser {
    let mut config = BrowserConfig::default().with_no_sandbox();
    if let Ok(path) = std::env::var("WIKIPROBE_CHROMIUM_PATH") {
        config = config.with_chromium_path(path);
    }
    Browser::launch(config).await.expect("chromium should launch")
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires chromium and network access"]
async fn test_catalog_against_live_site() {
    let browser = launch().await;
    let runner = ScenarioRunner::new(browser, ProbeConfig::default().runner_config().with_retries(1));
    let report = runner.run(&catalog()).await;
    for failure in report.failures() {
        eprintln!("{}: {:?}", failure.full_name(), failure.error);
    }
    runner.into_factory().close().await.unwrap();
    assert!(report.all_passed());
}

#[tokio::test(flavor = "multi_thread")]
#[ignore = "requires chromium and network access"]
async fn test_tabs_are_isolated() {
    use wikiprobe::{PageDriver, PageFactory};

    let browser = launch().await;
    let a = browser.new_page().await.unwrap();
    let b = browser.new_page().await.unwrap();
    a.goto("https://en.wikipedia.org/wiki/Main_Page").await.unwrap();
    assert_eq!(b.current_url().await.unwrap(), "about:blank");
    browser.close().await.unwrap();
}
