use base64::Engine;
use std::io::Cursor;
use std::path::Path;
use stitch_grid::Rgb;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::error::RenderError;

/// Prefix of an inline PNG data URL
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Largest width or height a surface may have
pub const MAX_SURFACE_DIMENSION: u32 = 16_384;

/// RGBA drawing target that previews and legends are painted on.
///
/// Starts out empty; the first [`Surface::resize`] allocates the pixmap.
#[derive(Debug, Default)]
pub struct Surface {
    pixmap: Option<Pixmap>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pixmap.is_none()
    }

    pub fn width(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, Pixmap::width)
    }

    pub fn height(&self) -> u32 {
        self.pixmap.as_ref().map_or(0, Pixmap::height)
    }

    /// Resize to `width` x `height` and clear every pixel.
    ///
    /// The new pixmap is allocated before the old one is dropped, so a
    /// failed allocation leaves the current content in place.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        match &mut self.pixmap {
            Some(pixmap) if pixmap.width() == width && pixmap.height() == height => {
                pixmap.fill(Color::TRANSPARENT);
            }
            _ => {
                if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
                    return Err(RenderError::PixmapAllocation { width, height });
                }
                let pixmap = Pixmap::new(width, height)
                    .ok_or(RenderError::PixmapAllocation { width, height })?;
                self.pixmap = Some(pixmap);
            }
        }
        Ok(())
    }

    /// Make every pixel transparent, keeping the size.
    pub fn clear(&mut self) {
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill(Color::TRANSPARENT);
        }
    }

    /// Drop the pixmap entirely.
    pub fn reset(&mut self) {
        self.pixmap = None;
    }

    pub fn fill(&mut self, rgb: Rgb) {
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill(Color::from_rgba8(rgb.r, rgb.g, rgb.b, 255));
        }
    }

    /// Fill an axis-aligned rectangle with a solid color, no anti-aliasing.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rgb: Rgb) {
        let (Some(pixmap), Some(rect)) = (&mut self.pixmap, Rect::from_xywh(x, y, w, h)) else {
            return;
        };
        let paint = solid_paint(rgb, false);
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Outline a rectangle with a line of the given width.
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rgb: Rgb, width: f32) {
        let (Some(pixmap), Some(rect)) = (&mut self.pixmap, Rect::from_xywh(x, y, w, h)) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let paint = solid_paint(rgb, true);
        let stroke = Stroke {
            width,
            ..Default::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Demultiplied RGBA value at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let color = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some([color.red(), color.green(), color.blue(), color.alpha()])
    }

    /// Demultiplied RGBA bytes, row-major.
    pub fn rgba_data(&self) -> Result<Vec<u8>, RenderError> {
        let pixmap = self.pixmap.as_ref().ok_or(RenderError::EmptySurface)?;
        Ok(pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect())
    }

    /// Encode the surface as an RGBA8 PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, RenderError> {
        let data = self.rgba_data()?;
        encode_rgba_png(self.width(), self.height(), &data)
    }

    /// PNG as a `data:image/png;base64,` URL.
    pub fn to_data_url(&self) -> Result<String, RenderError> {
        let png = self.encode_png()?;
        Ok(format!(
            "{PNG_DATA_URL_PREFIX}{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }

    pub fn save_png(&self, path: &Path) -> Result<(), RenderError> {
        let png = self.encode_png()?;
        std::fs::write(path, png)?;
        tracing::debug!(path = %path.display(), width = self.width(), height = self.height(), "Wrote PNG");
        Ok(())
    }
}

fn solid_paint(rgb: Rgb, anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgb.r, rgb.g, rgb.b, 255);
    paint.anti_alias = anti_alias;
    paint
}

fn encode_rgba_png(width: u32, height: u32, data: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(data)
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}
