// src/fetch/render.rs
// =============================================================================
// Browser rendering for pages that build their content with JavaScript.
//
// ChromeRenderer launches a fresh headless Chrome for every call, loads the
// page, waits a short settle period for scripts to finish, and returns the
// resulting DOM as HTML. Nothing is shared between calls, so one broken page
// cannot poison the next.
//
// The Renderer trait is the seam: the crawl only knows "something that turns
// a URL into rendered HTML". Tests plug in a fake.
// =============================================================================

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::RenderError;

#[async_trait]
pub trait Renderer: Send + Sync {
    /// Returns the fully rendered HTML of `url`
    async fn render(&self, url: &str) -> Result<String, RenderError>;
}

// Headless Chrome via the DevTools protocol
#[derive(Debug, Clone)]
pub struct ChromeRenderer {
    settle: Duration,
    chrome_path: Option<PathBuf>,
}

impl ChromeRenderer {
    pub fn new(settle: Duration, chrome_path: Option<PathBuf>) -> Self {
        Self { settle, chrome_path }
    }

    fn browser_config(&self, url: &str) -> Result<BrowserConfig, RenderError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(Duration::from_secs(30))
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if let Some(path) = &self.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder.build().map_err(|e| RenderError::new(url, e))
    }

    async fn load(&self, browser: &Browser, url: &str) -> Result<String, RenderError> {
        let page = browser
            .new_page(url)
            .await
            .map_err(|e| RenderError::new(url, e))?;

        page.wait_for_navigation()
            .await
            .map_err(|e| RenderError::new(url, e))?;

        // Give late scripts a moment to fill in the DOM
        tokio::time::sleep(self.settle).await;

        page.content().await.map_err(|e| RenderError::new(url, e))
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<String, RenderError> {
        let config = self.browser_config(url)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::new(url, format!("could not launch browser: {}", e)))?;

        // The handler drives the DevTools websocket; it must be polled for
        // anything on the browser to make progress
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = self.load(&browser, url).await;

        if let Err(e) = browser.close().await {
            tracing::debug!(url, error = %e, "browser did not close cleanly");
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!(url, error = %e, "browser process did not exit cleanly");
        }
        if let Err(e) = events.await {
            tracing::debug!(url, error = %e, "browser event loop ended abnormally");
        }

        result
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why spawn the handler?
//    - chromiumoxide talks to Chrome over a websocket
//    - The Handler is a stream of events that must keep being polled, or
//      every browser call waits forever
//
// 2. Why #[async_trait]?
//    - It lets the trait have async methods AND be used as dyn Renderer
//    - The macro rewrites them to return boxed futures
// -----------------------------------------------------------------------------
