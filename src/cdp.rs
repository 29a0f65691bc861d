//! Chrome DevTools Protocol rasterizer

use crate::{Error, ExportConfig, Rasterizer, RenderTarget, Result};
use base64::Engine as Base64Engine;
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use image::RgbaImage;
use std::sync::Arc;
use std::time::Duration;

/// Rasterizer backed by a headless Chrome tab (uses the `headless_chrome` crate)
///
/// The composed document is written into a blank tab, external images are
/// awaited, and the target element's border box is captured with the
/// requested device scale.
pub struct ChromeRasterizer {
    browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeRasterizer {
    pub fn new(config: &ExportConfig) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((config.viewport.width, config.viewport.height)))
            .idle_browser_timeout(Duration::from_millis(config.timeout_ms.max(30000)))
            .build()
            .map_err(|e| Error::BackendUnavailable(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::BackendUnavailable(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::BackendUnavailable(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(config.timeout_ms));

        Ok(Self { browser, tab })
    }

    fn load_document(&self, html: &str) -> Result<()> {
        self.tab
            .navigate_to("about:blank")
            .map_err(|e| Error::RenderError(format!("Navigation failed: {}", e)))?
            .wait_until_navigated()
            .map_err(|e| Error::RenderError(format!("Wait for navigation failed: {}", e)))?;

        // The markup travels base64-encoded so it can be embedded in the
        // script without escaping; TextDecoder restores the UTF-8.
        let b64 = Base64Engine::encode(&base64::engine::general_purpose::STANDARD, html);
        let template = r#"(async function(){
            const bytes = Uint8Array.from(atob("{{B64_TOKEN}}"), c => c.charCodeAt(0));
            document.open();
            document.write(new TextDecoder().decode(bytes));
            document.close();
            await Promise.all(Array.from(document.images)
                .filter(img => !img.complete)
                .map(img => new Promise(resolve => { img.onload = resolve; img.onerror = resolve; })));
            return true;
        })()"#;
        let script = template.replace("{{B64_TOKEN}}", &b64);

        self.tab
            .evaluate(&script, true)
            .map_err(|e| Error::RenderError(format!("Failed to write document: {}", e)))?;
        Ok(())
    }
}

impl Rasterizer for ChromeRasterizer {
    fn rasterize(&mut self, target: &RenderTarget, scale: f32) -> Result<RgbaImage> {
        self.load_document(&target.document)?;

        let element = self
            .tab
            .wait_for_element(&target.selector)
            .map_err(|e| Error::RenderError(format!("Target '{}' not found: {}", target.selector, e)))?;
        let model = element
            .get_box_model()
            .map_err(|e| Error::RenderError(format!("Failed to measure target: {}", e)))?;

        let mut clip = model.border_viewport();
        clip.scale = scale as f64;

        let png = self
            .tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, Some(clip), true)
            .map_err(|e| Error::RenderError(format!("Screenshot failed: {}", e)))?;

        Ok(image::load_from_memory(&png)?.to_rgba8())
    }

    fn close(self: Box<Self>) -> Result<()> {
        // Drop the tab before the browser so the child process exits promptly.
        let this = *self;
        drop(this.tab);
        drop(this.browser);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrome_rasterizer_capture() {
        // This test requires Chrome to be installed, so we skip it in CI
        if std::env::var("CI").is_ok() {
            return;
        }
        let mut r = match ChromeRasterizer::new(&ExportConfig::default()) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Skipping Chrome rasterizer test because Chrome is not available: {}", e);
                return;
            }
        };
        let target = RenderTarget {
            document: "<html><body><div id=\"t\" style=\"width:50px;height:20px;background:#f00\"></div></body></html>".into(),
            selector: "#t".into(),
        };
        let img = r.rasterize(&target, 2.0).expect("capture failed");
        assert_eq!(img.dimensions(), (100, 40));
    }
}
