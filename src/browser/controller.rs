//! Browser lifecycle management
//!
//! One Chromium process serves every render. Each render gets its own tab,
//! emulating the request's user agent and viewport before anything loads.
//! Tabs are handed to exactly one caller, and that caller closes them.

use crate::document::RenderRequest;
use crate::error::{BrowserError, Error, Result};
use chromiumoxide::browser::{Browser, BrowserConfig as CdpBrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::Page;
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Process-level launch settings. Anything that varies per page lives on
/// [`RenderRequest`].
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run without a window (default: true)
    pub headless: bool,
    /// Keep the Chromium sandbox on (default: true)
    pub sandbox: bool,
    /// Chrome/Chromium executable; auto-detected when `None`
    pub chrome_path: Option<String>,
    /// Extra navigation attempts per render (default: 0)
    pub navigation_retries: u32,
    /// Additional command line switches
    pub extra_args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chrome_path: None,
            navigation_retries: 0,
            extra_args: Vec::new(),
        }
    }
}

impl BrowserConfig {
    fn to_cdp(&self) -> Result<CdpBrowserConfig> {
        let mut builder = CdpBrowserConfig::builder();
        if !self.headless {
            builder = builder.with_head();
        }
        if !self.sandbox {
            builder = builder.arg("--no-sandbox");
        }
        if let Some(ref path) = self.chrome_path {
            builder = builder.chrome_executable(path);
        }
        for arg in &self.extra_args {
            builder = builder.arg(arg);
        }
        builder
            .build()
            .map_err(|e| BrowserError::ConfigError(e.to_string()).into())
    }
}

/// CDP commands that make a tab look like the request's client
pub fn emulation_for(
    request: &RenderRequest,
) -> (SetUserAgentOverrideParams, SetDeviceMetricsOverrideParams) {
    (
        SetUserAgentOverrideParams::new(request.user_agent.clone()),
        SetDeviceMetricsOverrideParams::new(
            i64::from(request.viewport.width),
            i64::from(request.viewport.height),
            1.0,
            false,
        ),
    )
}

/// A tab owned by a single render
pub struct PageHandle {
    pub(crate) page: Page,
    open_pages: Arc<AtomicUsize>,
}

impl PageHandle {
    /// The underlying chromiumoxide page
    pub fn inner(&self) -> &Page {
        &self.page
    }

    /// Close the tab
    pub async fn close(self) -> Result<()> {
        self.open_pages.fetch_sub(1, Ordering::Relaxed);
        self.page.close().await.map_err(|e| Error::cdp(e.to_string()))
    }
}

/// Running browser plus its CDP event loop
pub struct BrowserController {
    browser: Browser,
    handler: JoinHandle<()>,
    config: BrowserConfig,
    open_pages: Arc<AtomicUsize>,
}

impl BrowserController {
    /// Launch Chromium
    #[instrument(skip(config), fields(headless = config.headless))]
    pub async fn launch(config: BrowserConfig) -> Result<Self> {
        let cdp_config = config.to_cdp()?;

        let (browser, mut handler) = Browser::launch(cdp_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("Browser handler event error");
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        info!("Browser launched");

        Ok(Self {
            browser,
            handler: handler_task,
            config,
            open_pages: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Open a blank tab set up for `request`
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn open_page(&self, request: &RenderRequest) -> Result<PageHandle> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::PageCreationFailed(e.to_string()))?;

        self.open_pages.fetch_add(1, Ordering::Relaxed);
        let handle = PageHandle {
            page,
            open_pages: self.open_pages.clone(),
        };

        let (user_agent, metrics) = emulation_for(request);
        let emulated = async {
            handle.page.execute(user_agent).await?;
            handle.page.execute(metrics).await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        }
        .await;

        if let Err(e) = emulated {
            if let Err(close_err) = handle.close().await {
                warn!("Failed to close page after setup error: {}", close_err);
            }
            return Err(BrowserError::PageCreationFailed(e.to_string()).into());
        }

        debug!(
            "Opened page at {}x{}",
            request.viewport.width, request.viewport.height
        );
        Ok(handle)
    }

    /// Launch settings
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Tabs handed out and not yet closed
    pub fn open_pages(&self) -> usize {
        self.open_pages.load(Ordering::Relaxed)
    }

    /// Shut the browser down
    #[instrument(skip(self))]
    pub async fn close(mut self) -> Result<()> {
        let leaked = self.open_pages();
        if leaked > 0 {
            warn!("{} page(s) still open at shutdown", leaked);
        }

        self.browser
            .close()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?;

        let _ = tokio::time::timeout(Duration::from_secs(5), self.handler).await;

        info!("Browser closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_default() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert_eq!(config.navigation_retries, 0);
        assert!(config.chrome_path.is_none());
        assert!(config.extra_args.is_empty());
    }

    #[test]
    fn test_emulation_follows_request() {
        let request = RenderRequest::new("https://example.com/")
            .user_agent("TestBot/1.0")
            .viewport(375, 812);
        let (user_agent, metrics) = emulation_for(&request);

        assert_eq!(user_agent.user_agent, "TestBot/1.0");
        assert_eq!(metrics.width, 375);
        assert_eq!(metrics.height, 812);
        assert!(!metrics.mobile);
    }
}
