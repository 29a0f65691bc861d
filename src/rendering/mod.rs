//! Built-in wireframe renderer.
//!
//! Lays out the target subtree as stacked blocks, builds a display list, and
//! paints it into a bitmap. Fonts, CSS cascade and external resources are not
//! loaded; use the `cdp` backend for faithful output.

pub mod layout;
pub mod paint;
pub mod raster;

use crate::{Error, Rasterizer, RenderTarget, Result, Viewport};
use image::RgbaImage;
use scraper::{Html, Selector};

/// Pure-Rust [`Rasterizer`]; the bitmap is as wide as the viewport and as
/// tall as the content.
#[derive(Debug, Clone)]
pub struct WireframeRasterizer {
    viewport: Viewport,
}

impl WireframeRasterizer {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }
}

impl Rasterizer for WireframeRasterizer {
    fn rasterize(&mut self, target: &RenderTarget, scale: f32) -> Result<RgbaImage> {
        if scale.is_nan() || scale <= 0.0 {
            return Err(Error::RenderError(format!("invalid scale {}", scale)));
        }
        let document = Html::parse_document(&target.document);
        let selector = Selector::parse(&target.selector)
            .map_err(|e| Error::RenderError(format!("bad selector '{}': {:?}", target.selector, e)))?;
        let root = document
            .select(&selector)
            .next()
            .ok_or_else(|| Error::RenderError(format!("no element matches '{}'", target.selector)))?;

        let nodes = layout::layout_subtree(root, self.viewport.width);
        let height = layout::content_height(&nodes);
        let commands = paint::build_display_list(&nodes);
        log::debug!(
            "Wireframe: {} boxes, {} paint commands, {}x{} css px",
            nodes.len(),
            commands.len(),
            self.viewport.width,
            height
        );
        Ok(raster::rasterize(&commands, self.viewport.width, height, scale))
    }
}
