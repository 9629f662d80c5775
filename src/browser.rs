//! chromiumoxide で課題検索ページを開き、HTMLを取得する

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::ReportError;
use crate::traits::PageLoader;

/// 待機対象の要素を探す間隔
const WAIT_POLL_INTERVAL_MS: u64 = 250;

pub struct BrowserLoader {
    headless: bool,
    browser: Option<Browser>,
    page: Option<Page>,
}

impl BrowserLoader {
    pub fn new(headless: bool) -> Self {
        Self {
            headless,
            browser: None,
            page: None,
        }
    }

    fn get_page(&self) -> Result<&Page, ReportError> {
        self.page
            .as_ref()
            .ok_or_else(|| ReportError::BrowserInit("Browser not initialized".into()))
    }

    /// 待機対象が揃うまで待つ。タイムアウトしても処理は続ける。
    async fn wait_for(page: &Page, target: WaitTarget<'_>, timeout: Duration) -> bool {
        info!("Waiting for {} (timeout: {:?})...", target, timeout);
        let start = Instant::now();

        loop {
            if Self::is_ready(page, target).await {
                debug!("{} ready after {:?}", target, start.elapsed());
                return true;
            }

            if start.elapsed() >= timeout {
                warn!(
                    "Timeout waiting for {} after {:?}, proceeding anyway",
                    target,
                    start.elapsed()
                );
                return false;
            }

            sleep(Duration::from_millis(WAIT_POLL_INTERVAL_MS)).await;
        }
    }

    async fn is_ready(page: &Page, target: WaitTarget<'_>) -> bool {
        match target {
            WaitTarget::Element(selector) => match page.find_element(selector).await {
                Ok(_) => true,
                Err(e) => {
                    debug!("Element {} not present yet: {}", selector, e);
                    false
                }
            },
            WaitTarget::DocumentReady => match page.evaluate("document.readyState").await {
                Ok(state) => state.into_value::<String>().unwrap_or_default() == "complete",
                Err(e) => {
                    debug!("Cannot read document.readyState: {}", e);
                    false
                }
            },
        }
    }
}

/// ページ読み込み完了の判定方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WaitTarget<'a> {
    /// セレクタに一致する要素が現れるまで
    Element(&'a str),
    /// `document.readyState` が `complete` になるまで
    DocumentReady,
}

impl<'a> WaitTarget<'a> {
    fn from_selector(selector: &'a str) -> Self {
        match selector.trim() {
            "" => WaitTarget::DocumentReady,
            selector => WaitTarget::Element(selector),
        }
    }
}

impl fmt::Display for WaitTarget<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitTarget::Element(selector) => write!(f, "element {}", selector),
            WaitTarget::DocumentReady => f.write_str("document ready"),
        }
    }
}

#[async_trait]
impl PageLoader for BrowserLoader {
    async fn initialize(&mut self) -> Result<(), ReportError> {
        info!("Initializing browser...");

        let mut builder = BrowserConfig::builder().window_size(1920, 1080);

        if let Ok(path) = std::env::var("CHROME_PATH").or_else(|_| std::env::var("CHROMIUM_PATH")) {
            builder = builder.chrome_executable(path);
        }
        if !self.headless {
            builder = builder.with_head();
        }

        let config = builder
            .arg("--disable-gpu")
            .build()
            .map_err(|e| ReportError::BrowserInit(format!("Invalid browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ReportError::BrowserInit(e.to_string()))?;

        // ブラウザイベントハンドラをバックグラウンドで実行
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ReportError::BrowserInit(e.to_string()))?;

        self.browser = Some(browser);
        self.page = Some(page);

        info!("Browser initialized");
        Ok(())
    }

    async fn load(
        &mut self,
        url: &str,
        wait_selector: &str,
        timeout: Duration,
    ) -> Result<String, ReportError> {
        let page = self.get_page()?;
        info!("Navigating to: {}", url);

        page.goto(url)
            .await
            .map_err(|e| ReportError::Navigation(format!("{}: {}", url, e)))?;

        Self::wait_for(page, WaitTarget::from_selector(wait_selector), timeout).await;

        if let Ok(Some(title)) = page.get_title().await {
            info!("Current page title: {}", title);
        }

        page.content()
            .await
            .map_err(|e| ReportError::Navigation(format!("Failed to read page content: {}", e)))
    }

    async fn close(&mut self) -> Result<(), ReportError> {
        info!("Closing browser...");

        self.page = None;
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!("Browser did not close cleanly: {}", e);
            }
        }

        info!("Browser closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::IssueTable;
    use crate::record::build;

    #[test]
    fn test_browser_loader_new() {
        let loader = BrowserLoader::new(true);
        assert!(loader.browser.is_none());
        assert!(loader.page.is_none());
    }

    #[test]
    fn test_wait_target_from_selector() {
        assert_eq!(
            WaitTarget::from_selector(" .issue-table-wrapper "),
            WaitTarget::Element(".issue-table-wrapper")
        );
        assert_eq!(WaitTarget::from_selector(""), WaitTarget::DocumentReady);
        assert_eq!(WaitTarget::from_selector("   "), WaitTarget::DocumentReady);
        assert_eq!(WaitTarget::DocumentReady.to_string(), "document ready");
    }

    #[tokio::test]
    async fn test_load_before_initialize_fails() {
        let mut loader = BrowserLoader::new(true);
        let result = loader
            .load("https://jira.example.com", "#issuetable", Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(ReportError::BrowserInit(_))));
    }

    #[tokio::test]
    #[ignore] // 実環境テスト用: JIRA_TEST_URL=... cargo test test_live_issue_table -- --ignored --nocapture
    async fn test_live_issue_table() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("info,issue_report=debug")
            .try_init();

        let url = std::env::var("JIRA_TEST_URL").expect("JIRA_TEST_URL not set");

        let mut loader = BrowserLoader::new(true);
        loader.initialize().await.expect("Failed to initialize browser");
        let html = loader
            .load(&url, ".issue-table-wrapper", Duration::from_secs(10))
            .await
            .expect("Failed to load page");
        loader.close().await.unwrap();

        let table = IssueTable::parse(&html, Some(&url));
        let dataset = build("LIVE", table.rows());
        println!("Issues: {}", dataset.len());
    }
}
