//! Chrome DevTools Protocol renderer

use std::sync::Arc;
use std::time::Duration;

use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};

use crate::{CaptureConfig, Error, Renderer, Result};

/// CDP-based renderer (uses the `headless_chrome` crate)
///
/// Launches a headless Chrome instance with its window sized to the
/// viewport and drives a single tab. Dropping the browser handle kills the
/// Chrome process, so `close` only has to let go of it.
pub struct CdpRenderer {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl Renderer for CdpRenderer {
    fn launch(config: &CaptureConfig) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .idle_browser_timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

        debug!(
            "launched headless chrome with a {}x{} window",
            config.viewport.width, config.viewport.height
        );

        Ok(Self {
            browser: Some(browser),
            tab,
        })
    }

    fn load_document(&mut self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .map_err(|e| Error::LoadError(format!("Navigation failed: {}", e)))?;

        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::LoadError(format!("Wait for navigation failed: {}", e)))?;

        Ok(())
    }

    fn render_png(&self) -> Result<Vec<u8>> {
        if self.browser.is_none() {
            return Err(Error::CdpError("renderer already closed".into()));
        }
        let png = self
            .tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| Error::CdpError(format!("Screenshot failed: {}", e)))?;
        Ok(png)
    }

    fn close(&mut self) -> Result<()> {
        if let Some(browser) = self.browser.take() {
            if let Err(e) = self.tab.close(false) {
                warn!("Failed to close tab cleanly: {}", e);
            }
            drop(browser);
            debug!("headless chrome terminated");
        }
        Ok(())
    }
}
