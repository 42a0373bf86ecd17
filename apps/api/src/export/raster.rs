//! Rasterizing phase: SVG capture → opaque RGB pixels.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use resvg::tiny_skia::{Color, Pixmap, Transform};
use resvg::usvg::{self, fontdb};
use tracing::info;

use crate::export::ExportError;

/// Device pixels per CSS pixel when capturing.
pub const CAPTURE_SCALE: f32 = 2.0;

/// Upper bound on either raster dimension.
const MAX_DIMENSION: u32 = 16_384;

/// An opaque raster snapshot. `rgb` holds `width * height * 3` bytes, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

#[cfg(test)]
impl RasterImage {
    /// A solid white image of the given size.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgb: vec![0xff; width as usize * height as usize * 3],
        }
    }
}

/// Turns a captured SVG document into pixels. The default implementation is
/// `SvgRasterizer`; tests substitute fixed-size fakes.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(&self, svg: String) -> Result<RasterImage, ExportError>;
}

// ────────────────────────────────────────────────────────────────────────────
// resvg implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct SvgRasterizer {
    fonts: Arc<fontdb::Database>,
    scale: f32,
}

impl SvgRasterizer {
    /// Loads system fonts plus any fonts under `font_dir`.
    pub fn new(font_dir: Option<&Path>) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        if let Some(dir) = font_dir {
            db.load_fonts_dir(dir);
        }
        info!("Rasterizer font database loaded ({} faces)", db.len());
        Self {
            fonts: Arc::new(db),
            scale: CAPTURE_SCALE,
        }
    }

    fn render(svg: &str, fonts: Arc<fontdb::Database>, scale: f32) -> Result<RasterImage, ExportError> {
        let options = usvg::Options {
            fontdb: fonts,
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|e| ExportError::Rasterize(format!("invalid capture: {e}")))?;

        let size = tree.size();
        let width = (size.width() * scale).ceil() as u32;
        let height = (size.height() * scale).ceil() as u32;
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(ExportError::Rasterize(format!(
                "capture size {width}x{height} is out of range"
            )));
        }

        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| ExportError::Rasterize("could not allocate pixmap".to_string()))?;
        // Opaque white first so transparent regions do not come out black.
        pixmap.fill(Color::WHITE);
        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

        Ok(RasterImage {
            width,
            height,
            rgb: drop_alpha(pixmap.data()),
        })
    }
}

#[async_trait]
impl Rasterizer for SvgRasterizer {
    async fn rasterize(&self, svg: String) -> Result<RasterImage, ExportError> {
        let fonts = Arc::clone(&self.fonts);
        let scale = self.scale;
        tokio::task::spawn_blocking(move || Self::render(&svg, fonts, scale))
            .await
            .map_err(|e| ExportError::Rasterize(format!("rasterizer task failed: {e}")))?
    }
}

/// RGBA → RGB. The pixmap is fully opaque so premultiplication is a no-op.
fn drop_alpha(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}
