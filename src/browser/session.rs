use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;

use super::launcher;

/// The shared CDP browser connection.
///
/// Launched once on first use and reused for the life of the process. Pages
/// are per-call: every tool that needs the browser opens its own page and
/// closes it when done, so no page state leaks between invocations.
pub struct BrowserSession {
    browser: Browser,
    _handler_task: tokio::task::JoinHandle<()>,
    // Chrome profile dir, deleted when the session drops
    _user_data_dir: tempfile::TempDir,
    headless: bool,
}

impl BrowserSession {
    /// Launch a new browser and establish the CDP connection.
    pub async fn launch(headless: bool) -> Result<Self> {
        let chrome = launcher::find_chrome_binary()?;
        let user_data_dir =
            tempfile::tempdir().context("Failed to create Chrome profile dir")?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(&chrome)
            .user_data_dir(user_data_dir.path());

        if headless {
            builder = builder.arg("--headless=new");
        }

        // Sandboxing is disabled so the server runs inside containers and
        // other restricted environments.
        builder = builder
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-background-networking")
            .arg("--disable-default-apps")
            .arg("--disable-extensions")
            .arg("--disable-hang-monitor")
            .arg("--disable-popup-blocking")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--metrics-recording-only")
            .window_size(1280, 720);

        let config = builder.build().map_err(|e| anyhow::anyhow!("{}", e))?;

        let (browser, mut handler) =
            Browser::launch(config).await.context("Failed to launch Chrome")?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {
                // Drain CDP events to keep the connection alive
            }
        });

        tracing::info!("Browser session started (headless: {})", headless);

        Ok(Self {
            browser,
            _handler_task: handler_task,
            _user_data_dir: user_data_dir,
            headless,
        })
    }

    /// Open a fresh, isolated page.
    pub async fn new_page(&self) -> Result<Page> {
        self.browser
            .new_page("about:blank")
            .await
            .context("Failed to create page")
    }

    /// Close the browser, releasing the Chrome process.
    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await.context("Failed to close browser")?;
        let _ = self.browser.wait().await;
        Ok(())
    }

    pub fn is_headless(&self) -> bool {
        self.headless
    }
}
