//! Infografia
//!
//! Turn HTML exported from a design tool into a previewable document and
//! export the rendered result as a PNG image or a single-page PDF.
//!
//! # Pipeline
//!
//! - **Extraction**: [`extract::extract`] splits raw markup into body markup,
//!   inline styles and whitelisted head resources
//! - **Preview**: [`preview::PreviewPage`] composes the document around an
//!   `#infografia` target container
//! - **Export**: [`export::Exporter`] rasterizes the target through a
//!   [`Rasterizer`] backend and hands the encoded file to a [`DownloadSink`]
//!
//! # Example
//!
//! ```no_run
//! use infografia::extract::{extract, ExtractPolicy};
//!
//! let html = r#"<html><head><style>p{color:red}</style></head><body><p>Hi</p></body></html>"#;
//! let doc = extract(Some(html), &ExtractPolicy::default()).expect("non-empty input");
//! assert_eq!(doc.inline_styles, "p{color:red}");
//! ```

use image::RgbaImage;
use std::path::{Path, PathBuf};

pub mod error;
pub use error::{Error, Result};

pub mod export;
pub mod extract;
pub mod pdf;
pub mod preview;
pub mod relay;
pub mod rendering;
pub mod session;
mod serialize;
pub mod worker;

#[cfg(feature = "cdp")]
pub mod cdp;

pub use export::{Artifact, ExportFormat, Exporter};
pub use extract::{ExternalResource, ExtractPolicy, ExtractedDocument};
pub use worker::RasterHandle;

/// Configuration for rasterization and export
///
/// The defaults mirror what the preview screen has always used: a 2x
/// supersampling factor and a 100ms pause before capture so the control bar
/// can disappear first.
///
/// # Examples
///
/// ```
/// let cfg = infografia::ExportConfig::default();
/// assert_eq!(cfg.scale, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Supersampling factor applied when rasterizing
    pub scale: f32,
    /// Pause between hiding the controls and capturing, in milliseconds
    pub capture_delay_ms: u64,
    /// Layout viewport for the rasterizer
    pub viewport: Viewport,
    /// Timeout for backend operations in milliseconds
    pub timeout_ms: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            capture_delay_ms: 100,
            viewport: Viewport::default(),
            timeout_ms: 30000,
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// A composed document plus the selector of the subtree to capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTarget {
    pub document: String,
    pub selector: String,
}

/// Turns a render target into a bitmap.
pub trait Rasterizer {
    /// Rasterize the subtree matched by `target.selector` at `scale` device
    /// pixels per CSS pixel.
    fn rasterize(&mut self, target: &RenderTarget, scale: f32) -> Result<RgbaImage>;

    /// Release backend resources
    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// User-facing, blocking notifications.
pub trait Notifier {
    fn alert(&self, message: &str);
}

/// Writes alerts to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn alert(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Destination for finished artifacts.
pub trait DownloadSink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<()>;
}

/// Saves artifacts into a directory under their fixed filenames.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }
}

impl DownloadSink for DirectorySink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(filename), bytes)?;
        Ok(())
    }
}

/// Available rasterization backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Built-in block renderer; always available
    Wireframe,
    /// Headless Chrome over CDP; needs the `cdp` feature and a Chrome binary
    Chrome,
}

/// Create a rasterizer for `backend`.
pub fn new_rasterizer(backend: Backend, config: &ExportConfig) -> Result<Box<dyn Rasterizer>> {
    match backend {
        Backend::Wireframe => Ok(Box::new(rendering::WireframeRasterizer::new(config.viewport))),
        #[cfg(feature = "cdp")]
        Backend::Chrome => Ok(Box::new(cdp::ChromeRasterizer::new(config)?)),
        #[cfg(not(feature = "cdp"))]
        Backend::Chrome => Err(Error::BackendUnavailable(
            "built without the `cdp` feature".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExportConfig::default();
        assert_eq!(config.viewport.width, 1280);
        assert_eq!(config.viewport.height, 720);
        assert_eq!(config.capture_delay_ms, 100);
    }

    #[test]
    fn directory_sink_writes_fixed_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path().join("out"));
        sink.save("visualizacion.png", b"png").unwrap();
        assert_eq!(std::fs::read(sink.path_for("visualizacion.png")).unwrap(), b"png");
    }

    #[cfg(not(feature = "cdp"))]
    #[test]
    fn chrome_backend_requires_feature() {
        let err = new_rasterizer(Backend::Chrome, &ExportConfig::default()).err().unwrap();
        assert!(matches!(err, Error::BackendUnavailable(_)));
    }
}
