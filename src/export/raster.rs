//! Rasterization: layout -> bitmap
//!
//! The layout is serialized to SVG and drawn with resvg onto an opaque white
//! pixmap at `scale` pixels per card unit.

use crate::config::RenderConfig;
use crate::render::CardLayout;
use base64::Engine;
use std::fmt;
use std::sync::Arc;

/// Errors turning a layout into pixels
#[derive(Debug)]
pub enum RasterError {
    /// Template serialization or SVG parsing failed
    Svg(String),
    /// Zero-sized or oversized canvas
    Canvas { width: u32, height: u32 },
    /// PNG encoding failed
    Encode(String),
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Svg(e) => write!(f, "failed to build card image: {}", e),
            Self::Canvas { width, height } => {
                write!(f, "cannot allocate {}x{} canvas", width, height)
            }
            Self::Encode(e) => write!(f, "failed to encode PNG: {}", e),
        }
    }
}

impl std::error::Error for RasterError {}

/// An opaque RGBA bitmap of the card
#[derive(Debug, Clone)]
pub struct Bitmap {
    pixmap: tiny_skia::Pixmap,
}

impl Bitmap {
    /// Blank white bitmap
    pub fn blank(width: u32, height: u32) -> Result<Self, RasterError> {
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(RasterError::Canvas { width, height })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Straight (non-premultiplied) RGBA bytes, row-major
    pub fn rgba(&self) -> Vec<u8> {
        self.pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    /// RGBA of one pixel, if in bounds
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    pub fn encode_png(&self) -> Result<Vec<u8>, RasterError> {
        self.pixmap
            .encode_png()
            .map_err(|e| RasterError::Encode(e.to_string()))
    }

    /// `data:image/png;base64,...`
    pub fn data_uri(&self) -> Result<String, RasterError> {
        let png = self.encode_png()?;
        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }
}

/// Turns a layout into a bitmap
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, layout: &CardLayout) -> Result<Bitmap, RasterError>;
}

/// resvg-backed rasterizer
pub struct ResvgRasterizer {
    fontdb: Arc<fontdb::Database>,
    scale: f32,
}

impl ResvgRasterizer {
    /// Load system fonts plus any configured font directories
    pub fn new(render: &RenderConfig, scale: f32) -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        for dir in &render.font_dirs {
            db.load_fonts_dir(dir);
        }
        tracing::debug!(faces = db.len(), "Font database loaded");
        if db.is_empty() {
            tracing::warn!("No fonts found; card text will not be drawn");
        }
        Self::with_fontdb(db, scale)
    }

    pub fn with_fontdb(fontdb: fontdb::Database, scale: f32) -> Self {
        Self {
            fontdb: Arc::new(fontdb),
            scale,
        }
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, layout: &CardLayout) -> Result<Bitmap, RasterError> {
        let svg = layout.to_svg().map_err(|e| RasterError::Svg(e.to_string()))?;

        let options = usvg::Options {
            fontdb: self.fontdb.clone(),
            ..Default::default()
        };
        let tree = usvg::Tree::from_str(&svg, &options)
            .map_err(|e| RasterError::Svg(format!("failed to parse SVG: {}", e)))?;

        let width = (layout.width() * self.scale).ceil() as u32;
        let height = (layout.height() * self.scale).ceil() as u32;
        let mut bitmap = Bitmap::blank(width, height)?;

        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(self.scale, self.scale),
            &mut bitmap.pixmap.as_mut(),
        );

        Ok(bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::fixtures::card;
    use crate::render::{render, RenderContext};
    use chrono::NaiveDate;

    fn layout() -> CardLayout {
        let ctx = RenderContext {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        };
        render(&card(3), &ctx)
    }

    #[test]
    fn test_raster_is_scaled_and_opaque() {
        let layout = layout();
        let rasterizer = ResvgRasterizer::with_fontdb(fontdb::Database::new(), 2.0);
        let bitmap = rasterizer.rasterize(&layout).unwrap();

        assert_eq!(bitmap.width(), 1500);
        assert_eq!(bitmap.height(), (layout.height() * 2.0).ceil() as u32);

        // Rounded corner leaves the white backdrop showing
        assert_eq!(bitmap.pixel(0, 0), Some([255, 255, 255, 255]));
        // Left padding of the card body is the palette background (#f7f9fc)
        assert_eq!(bitmap.pixel(20, 1200), Some([0xf7, 0xf9, 0xfc, 255]));
        assert!(bitmap.rgba().chunks(4).all(|px| px[3] == 255));
    }

    #[test]
    fn test_control_chars_in_card_text_still_rasterize() {
        let mut json = crate::card::fixtures::card_json(3);
        json["title"] = "深度\u{0001}工作".into();
        json["stages"][0]["description"] = "第一步\u{001F}描述".into();
        let card = crate::card::InsightCardData::from_json(&json.to_string()).unwrap();

        let layout = render(&card, &RenderContext::today());
        assert!(!layout.to_svg().unwrap().contains('\u{1}'));

        let rasterizer = ResvgRasterizer::with_fontdb(fontdb::Database::new(), 1.0);
        assert!(rasterizer.rasterize(&layout).is_ok());
    }

    #[test]
    fn test_png_and_data_uri() {
        let bitmap = Bitmap::blank(4, 3).unwrap();
        let png = bitmap.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let uri = bitmap.data_uri().unwrap();
        assert!(uri.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_zero_canvas_rejected() {
        assert!(matches!(
            Bitmap::blank(0, 10),
            Err(RasterError::Canvas { width: 0, height: 10 })
        ));
    }
}
