//! Renderer session: one engine, one surface, one navigation.

use std::time::Duration;

use log::{info, warn};

use crate::{CaptureConfig, Renderer, Result};

/// Exclusive owner of an open renderer for the duration of a capture.
///
/// The renderer is released by [`CaptureSession::close`] on the normal path
/// and by `Drop` on every other path, including errors and unwinding.
pub struct CaptureSession<R: Renderer> {
    renderer: R,
    closed: bool,
}

impl<R: Renderer> CaptureSession<R> {
    /// Launch the engine, load the configured document and wait for it to settle.
    pub fn open(config: &CaptureConfig) -> Result<Self> {
        let url = config.document_url()?;

        let renderer = R::launch(config)?;
        // From here on the renderer is released on drop.
        let mut session = Self { renderer, closed: false };

        info!("loading {}", url);
        session.renderer.load_document(&url)?;

        if config.settle_ms > 0 {
            std::thread::sleep(Duration::from_millis(config.settle_ms));
        }
        Ok(session)
    }

    /// Wrap an already-launched renderer. Nothing is loaded.
    pub fn from_renderer(renderer: R) -> Self {
        Self { renderer, closed: false }
    }

    /// Request one raster snapshot of the surface as PNG bytes.
    pub fn snapshot(&self) -> Result<Vec<u8>> {
        self.renderer.render_png()
    }

    /// Release the renderer on the normal completion path.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.renderer.close()
    }
}

impl<R: Renderer> Drop for CaptureSession<R> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.renderer.close() {
            warn!("failed to release renderer: {}", e);
        }
    }
}
