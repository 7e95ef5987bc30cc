//! Outline-font rasterization and metrics via `ab_glyph`.

use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};

use crate::color::Rgba;
use crate::error::{StampError, StampResult};
use crate::surface::Surface;

/// A glyph-outline font loaded from disk for the duration of one text draw.
#[derive(Debug)]
pub(crate) struct OutlineFont {
    font: FontVec,
}

impl OutlineFont {
    /// Unreadable paths map to [`StampError::FontNotFound`]; readable but
    /// unparsable data is a render error.
    pub(crate) fn load(path: &Path) -> StampResult<Self> {
        let bytes =
            std::fs::read(path).map_err(|_| StampError::FontNotFound(path.to_path_buf()))?;
        let font = FontVec::try_from_vec(bytes).map_err(|_| {
            StampError::render(format!("failed to parse font file {}", path.display()))
        })?;
        Ok(Self { font })
    }

    /// Advance width and line height of `text` at `size`, kerning included.
    pub(crate) fn measure(&self, text: &str, size: f32) -> (f32, f32) {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut width = 0.0f32;
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        (width, scaled.height())
    }

    pub(crate) fn ascent(&self, size: f32) -> f32 {
        self.font.as_scaled(PxScale::from(size)).ascent()
    }

    /// Rasterize `text` into a minimally-sized transparent surface. The color
    /// is allocated here; per-pixel alpha is the allocated alpha weighted by
    /// glyph coverage.
    pub(crate) fn raster(&self, text: &str, size: f32, color: Rgba) -> Surface {
        let color = color.allocate();
        let scale = PxScale::from(size);
        let scaled = self.font.as_scaled(scale);

        let (width, height) = self.measure(text, size);
        let pad = 2u32;
        let mut surface = Surface::blank(width.ceil() as u32 + pad, height.ceil() as u32 + pad);

        let baseline = scaled.ascent();
        let mut cursor = 0.0f32;
        let mut prev = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = prev {
                cursor += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, ab_glyph::point(cursor, baseline));
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    let x = px as i32 + bounds.min.x as i32;
                    let y = py as i32 + bounds.min.y as i32;
                    let a = (coverage.clamp(0.0, 1.0) * color.a as f32) as u8;
                    if a > 0 {
                        surface.blend_pixel(x, y, Rgba::new(color.r, color.g, color.b, a));
                    }
                });
            }
            cursor += scaled.h_advance(id);
            prev = Some(id);
        }
        surface
    }
}
