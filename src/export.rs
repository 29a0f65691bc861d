//! Export of the rendered preview as PNG or PDF.

use crate::pdf::{encode_pdf, Orientation};
use crate::preview::PreviewPage;
use crate::{DownloadSink, Error, ExportConfig, Notifier, RasterHandle, Result};
use image::{ImageFormat, RgbaImage};
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::time::Duration;

pub const EXPORT_FAILED_MESSAGE: &str =
    "Something went wrong while generating the file. The HTML may contain elements that cannot be rendered.";
pub const BACKEND_MISSING_MESSAGE: &str =
    "Error: the export backend could not be loaded. Check the log for details.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Pdf,
}

impl ExportFormat {
    /// Fixed download name for this format.
    pub fn filename(&self) -> &'static str {
        match self {
            ExportFormat::Png => "visualizacion.png",
            ExportFormat::Pdf => "visualizacion.pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(Error::ConfigError(format!("unknown export format '{}'", other))),
        }
    }
}

/// An encoded export, alive until the sink has it.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// Encode `bitmap` in `format`.
    pub fn encode(bitmap: &RgbaImage, format: ExportFormat) -> Result<Self> {
        let bytes = match format {
            ExportFormat::Png => encode_png(bitmap)?,
            ExportFormat::Pdf => encode_pdf(bitmap)?,
        };
        Ok(Self {
            format,
            width: bitmap.width(),
            height: bitmap.height(),
            bytes,
        })
    }

    pub fn filename(&self) -> &'static str {
        self.format.filename()
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::for_size(self.width, self.height)
    }

    /// Hex SHA-256 of the encoded bytes.
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}

pub fn encode_png(bitmap: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    bitmap.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Drives one export at a time for a preview page.
///
/// `backend` is `None` when the rasterizer could not be started; every
/// export then ends in a single fatal alert.
pub struct Exporter<N: Notifier, S: DownloadSink> {
    backend: Option<RasterHandle>,
    notifier: N,
    sink: S,
    config: ExportConfig,
}

impl<N: Notifier, S: DownloadSink> Exporter<N, S> {
    pub fn new(backend: Option<RasterHandle>, notifier: N, sink: S, config: ExportConfig) -> Self {
        Self {
            backend,
            notifier,
            sink,
            config,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Rasterize the page's target, encode it and hand it to the sink.
    ///
    /// Returns the saved artifact. Failures are logged and alerted, never
    /// returned; the page's `downloading` flag is always cleared on exit.
    pub async fn export(&mut self, page: &mut PreviewPage, format: ExportFormat) -> Option<Artifact> {
        let Some(backend) = self.backend.clone() else {
            log::error!("Export requested but no rasterization backend is loaded");
            self.notifier.alert(BACKEND_MISSING_MESSAGE);
            return None;
        };
        if page.render_target().is_none() {
            return None;
        }

        page.set_downloading(true);
        let result = self.run(&backend, page, format).await;
        page.set_downloading(false);

        match result {
            Ok(artifact) => Some(artifact),
            Err(e) => {
                log::error!("Error while generating {}: {}", format.filename(), e);
                self.notifier.alert(EXPORT_FAILED_MESSAGE);
                None
            }
        }
    }

    async fn run(&mut self, backend: &RasterHandle, page: &PreviewPage, format: ExportFormat) -> Result<Artifact> {
        tokio::time::sleep(Duration::from_millis(self.config.capture_delay_ms)).await;

        let target = page
            .render_target()
            .ok_or_else(|| Error::RenderError("render target disappeared".into()))?;
        let bitmap = backend.rasterize(target, self.config.scale).await?;
        log::debug!("Rasterized {}x{} at scale {}", bitmap.width(), bitmap.height(), self.config.scale);

        let artifact = Artifact::encode(&bitmap, format)?;
        self.sink.save(artifact.filename(), &artifact.bytes)?;
        log::info!(
            "Saved {} ({}, {} bytes, sha256 {})",
            artifact.filename(),
            artifact.format.mime_type(),
            artifact.bytes.len(),
            artifact.digest()
        );
        Ok(artifact)
    }
}
