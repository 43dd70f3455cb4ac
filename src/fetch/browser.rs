// src/fetch/browser.rs

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

use super::{FetchError, PageSource, ReadyPolicy};
use crate::extract::has_target_table;

fn navigate_error(url: &str, e: CdpError) -> FetchError {
    FetchError::Navigate {
        url: url.to_string(),
        detail: e.to_string(),
    }
}

/// Where the Chromium instance lives.
#[derive(Debug, Clone)]
pub enum BrowserTarget {
    /// Spawn a local process. `None` lets chromiumoxide look for an installed binary.
    Local {
        executable: Option<PathBuf>,
        headless: bool,
    },
    /// Attach to a running browser through its DevTools websocket.
    Remote { ws_url: String },
}

/// Renders the page in Chromium and polls until the occupation table shows up.
pub struct ChromiumSource {
    target: BrowserTarget,
    ready: ReadyPolicy,
}

impl ChromiumSource {
    pub fn new(target: BrowserTarget, ready: ReadyPolicy) -> Self {
        Self { target, ready }
    }

    async fn start(&self) -> Result<(Browser, JoinHandle<()>), FetchError> {
        let (browser, mut handler) = match &self.target {
            BrowserTarget::Local {
                executable,
                headless,
            } => {
                let mut builder = BrowserConfig::builder()
                    .request_timeout(self.ready.timeout)
                    .arg("--no-sandbox")
                    .arg("--disable-dev-shm-usage")
                    .arg("--disable-gpu");
                builder = if *headless {
                    builder.headless_mode(HeadlessMode::default())
                } else {
                    builder.with_head()
                };
                if let Some(exe) = executable {
                    builder = builder.chrome_executable(exe);
                }
                let config = builder.build().map_err(FetchError::Launch)?;
                info!(?executable, headless, "launching chromium");
                Browser::launch(config)
                    .await
                    .map_err(|e| FetchError::Launch(e.to_string()))?
            }
            BrowserTarget::Remote { ws_url } => {
                info!(%ws_url, "connecting to remote chromium");
                Browser::connect(ws_url.clone())
                    .await
                    .map_err(|e| FetchError::Launch(format!("{ws_url}: {e}")))?
            }
        };

        // The CDP handler has to be driven for any page call to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler: {e}");
                }
            }
        });
        Ok((browser, handler_task))
    }

    async fn render(&self, browser: &Browser, url: &str) -> Result<String, FetchError> {
        let page = browser.new_page(url).await.map_err(|e| navigate_error(url, e))?;
        let outcome = self.wait_ready(&page, url).await;
        if let Err(e) = page.close().await {
            debug!("closing page: {e}");
        }
        outcome
    }

    async fn wait_ready(&self, page: &Page, url: &str) -> Result<String, FetchError> {
        let deadline = Instant::now() + self.ready.timeout;
        let mut polls = 0u32;
        for interval in self.ready.intervals() {
            polls += 1;
            let html = page.content().await.map_err(|e| navigate_error(url, e))?;
            if has_target_table(&html) {
                info!(polls, bytes = html.len(), "occupation table rendered");
                return Ok(html);
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            sleep(interval.min(deadline - now)).await;
        }

        warn!(polls, "gave up waiting for the occupation table");
        Err(FetchError::NotReady {
            url: url.to_string(),
            timeout: self.ready.timeout,
        })
    }
}

#[async_trait]
impl PageSource for ChromiumSource {
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let (mut browser, handler_task) = self.start().await?;
        let result = self.render(&browser, url).await;

        // A remote browser is shared; only a process we spawned gets closed.
        if matches!(self.target, BrowserTarget::Local { .. }) {
            if let Err(e) = browser.close().await {
                warn!("closing browser: {e}");
            }
        }
        handler_task.abort();
        result
    }
}
