//! Chrome DevTools Protocol renderer (uses the `headless_chrome` crate)

use crate::{ConvertConfig, Error, Renderer, Result, Viewport};
use anyhow::Context;
use base64::Engine as Base64Engine;
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::debug;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Reveals every slide of a staged section and lifts height clipping.
const SECTION_REVEAL_JS: &str = r#"
(function() {
    const slides = document.querySelectorAll('.slide');
    slides.forEach(slide => {
        slide.style.display = 'block';
        slide.classList.add('active');
        slide.style.maxHeight = 'none';
        slide.style.overflow = 'visible';
    });
    if (document.body) {
        document.body.style.overflow = 'visible';
    }
    const container = document.querySelector('.slide-container');
    if (container) {
        container.style.overflow = 'visible';
    }
    return true;
})()
"#;

/// Lifts height restrictions on the whole document before a full-page capture.
const DOCUMENT_REVEAL_JS: &str = r#"
(function() {
    document.querySelectorAll('*').forEach(el => {
        if (el.style.maxHeight) {
            el.style.maxHeight = 'none';
        }
        if (el.style.overflow === 'hidden' || el.style.overflow === 'auto') {
            el.style.overflow = 'visible';
        }
    });
    if (document.body) {
        document.body.style.overflow = 'visible';
    }
    document.documentElement.style.overflow = 'visible';
    return true;
})()
"#;

const SCROLL_SIZE_JS: &str = r#"
(function() {
    const doc = document.documentElement;
    const body = document.body || doc;
    return JSON.stringify([
        Math.max(doc.scrollWidth, body.scrollWidth, doc.clientWidth),
        Math.max(doc.scrollHeight, body.scrollHeight, doc.clientHeight)
    ]);
})()
"#;

/// Headless Chrome renderer
///
/// Launches one browser with a single tab for the whole run. The browser
/// process is terminated when the renderer is closed or dropped.
pub struct CdpRenderer {
    browser: Browser,
    tab: Arc<Tab>,
    settle: Duration,
    transition: Duration,
}

impl CdpRenderer {
    /// Launch headless Chrome with its window sized to `viewport`
    pub fn launch(config: &ConvertConfig, viewport: Viewport) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((viewport.width, viewport.height)))
            .build()
            .map_err(|e| Error::InitializationError(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::InitializationError(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::InitializationError(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

        debug!("Launched headless Chrome at {}x{}", viewport.width, viewport.height);

        Ok(Self {
            browser,
            tab,
            settle: Duration::from_millis(config.settle_ms),
            transition: Duration::from_millis(config.transition_ms),
        })
    }

    fn load(&self, url: &str) -> Result<()> {
        self.tab
            .navigate_to(url)
            .with_context(|| format!("Navigation to {} failed", url))?;
        self.tab.wait_until_navigated().context("Wait for navigation failed")?;
        Ok(())
    }

    /// Settle, run the reveal script, then wait out CSS transitions.
    /// A failed reveal aborts the render.
    fn reveal(&self, script: &str) -> Result<()> {
        std::thread::sleep(self.settle);
        self.tab.evaluate(script, false).context("Reveal script failed")?;
        std::thread::sleep(self.transition);
        Ok(())
    }

    fn scroll_size(&self) -> Result<(f64, f64)> {
        let eval = self
            .tab
            .evaluate(SCROLL_SIZE_JS, false)
            .context("Page size evaluation failed")?;

        let raw = eval
            .value
            .and_then(|v| v.as_str().map(str::to_string))
            .ok_or_else(|| Error::RenderError("No page size returned from evaluation".into()))?;

        let dims: [f64; 2] = serde_json::from_str(&raw)
            .map_err(|e| Error::RenderError(format!("Malformed page size '{}': {}", raw, e)))?;
        Ok((dims[0].max(1.0), dims[1].max(1.0)))
    }

    fn capture_full_page(&self, output: &Path) -> Result<()> {
        let (width, height) = self.scroll_size()?;
        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale: 1.0,
        };

        // Tab::capture_screenshot never asks for content past the window, so
        // clips taller than the viewport go through the raw protocol call.
        let shot = self
            .tab
            .call_method(Page::CaptureScreenshot {
                format: Some(Page::CaptureScreenshotFormatOption::Png),
                quality: None,
                clip: Some(clip),
                from_surface: Some(true),
                capture_beyond_viewport: Some(true),
                optimize_for_speed: None,
            })
            .context("Screenshot failed")?;

        let png = base64::engine::general_purpose::STANDARD
            .decode(shot.data)
            .map_err(|e| Error::RenderError(format!("Malformed screenshot payload: {}", e)))?;

        std::fs::write(output, png)?;
        debug!("Captured {}x{} page to {}", width, height, output.display());
        Ok(())
    }
}

impl Renderer for CdpRenderer {
    fn render_document(&mut self, source: &Path, output: &Path) -> Result<()> {
        let url = url::Url::from_file_path(source)
            .map_err(|_| Error::RenderError(format!("Not an absolute path: {}", source.display())))?;

        self.load(url.as_str())?;
        self.reveal(DOCUMENT_REVEAL_JS)?;
        self.capture_full_page(output)
    }

    fn render_section(&mut self, staged_html: &str, output: &Path) -> Result<()> {
        // Kept alive until the capture completes.
        let mut staged = tempfile::Builder::new()
            .prefix("slideshot-")
            .suffix(".html")
            .tempfile()?;
        staged.write_all(staged_html.as_bytes())?;
        staged.flush()?;

        let url = url::Url::from_file_path(staged.path())
            .map_err(|_| Error::RenderError(format!("Not an absolute path: {}", staged.path().display())))?;

        self.load(url.as_str())?;
        self.reveal(SECTION_REVEAL_JS)?;
        self.capture_full_page(output)
    }

    fn close(self) -> Result<()> {
        // Dropping the browser terminates the Chrome child process.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}
