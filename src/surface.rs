use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;
use image::{Rgba as ImgRgba, RgbaImage};

use crate::color::Rgba;
use crate::error::{StampError, StampResult};
use crate::format::ImageKind;

/// An owned raster surface: the in-memory pixel buffer every layer draws
/// into. Exclusively owned by the render call that creates it and dropped on
/// every exit path.
#[derive(Debug)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Decode a source image strictly by its filename extension. An
    /// unreadable path is [`StampError::SourceNotFound`]; an extension other
    /// than jpg/jpeg/png/gif is [`StampError::UnsupportedFormat`]. Content is
    /// never sniffed.
    pub fn decode(path: &Path) -> StampResult<Self> {
        let bytes =
            std::fs::read(path).map_err(|_| StampError::SourceNotFound(path.to_path_buf()))?;
        let kind = ImageKind::from_path(path)?;
        let decoded = image::load_from_memory_with_format(&bytes, kind.to_image_format())
            .with_context(|| format!("decode {}", path.display()))?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
        })
    }

    /// Fully transparent surface.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    /// Transparent surface with `color` alpha-blended over the whole area.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let mut surface = Self::blank(width, height);
        surface.fill_rect(0, 0, surface.width() as i32 - 1, surface.height() as i32 - 1, color);
        surface
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let p = self.pixels.get_pixel(x, y);
        Rgba::new(p[0], p[1], p[2], p[3])
    }

    /// Filled rectangle from `(x1, y1)` to `(x2, y2)` inclusive, clipped to
    /// the surface. The color is allocated here, so its alpha goes through
    /// the 0-127 transparency remap exactly once.
    pub fn fill_rect(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Rgba) {
        let color = color.allocate();
        let (x1, x2) = (x1.min(x2), x1.max(x2));
        let (y1, y2) = (y1.min(y2), y1.max(y2));
        let x1 = x1.max(0);
        let y1 = y1.max(0);
        let x2 = x2.min(self.width() as i32 - 1);
        let y2 = y2.min(self.height() as i32 - 1);
        for y in y1..=y2 {
            for x in x1..=x2 {
                self.blend_pixel(x, y, color);
            }
        }
    }

    /// Source-over blend of one pixel; out-of-bounds coordinates are ignored.
    /// Callers are responsible for having allocated the color already.
    pub(crate) fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return;
        }
        let dst = self.pixels.get_pixel(x as u32, y as u32);
        let blended = over(Rgba::new(dst[0], dst[1], dst[2], dst[3]), color);
        self.pixels.put_pixel(
            x as u32,
            y as u32,
            ImgRgba([blended.r, blended.g, blended.b, blended.a]),
        );
    }

    /// Source-over composite of a whole surface with its top-left corner at
    /// `(x, y)`; pixels landing outside the destination are dropped.
    pub fn composite(&mut self, src: &Surface, x: i32, y: i32) {
        for sy in 0..src.height() {
            for sx in 0..src.width() {
                let p = src.pixel(sx, sy);
                if p.a == 0 {
                    continue;
                }
                self.blend_pixel(x + sx as i32, y + sy as i32, p);
            }
        }
    }

    /// Rotate around the surface center by `degrees` (positive = clockwise),
    /// expanding the bounds so nothing is clipped. Bilinear sampling; pixels
    /// with no source fall out transparent.
    pub fn rotated(&self, degrees: f32) -> Surface {
        self.rotated_with_anchor(degrees, (0.0, 0.0)).0
    }

    /// Like [`Surface::rotated`], but also reports where `anchor` (a point in
    /// source coordinates) lands in the rotated surface. Compositing so that
    /// point stays put makes the rotation pivot around the anchor instead of
    /// the expanded box's top-left.
    pub(crate) fn rotated_with_anchor(
        &self,
        degrees: f32,
        anchor: (f32, f32),
    ) -> (Surface, (f32, f32)) {
        let radians = -degrees.to_radians();
        let cos = radians.cos();
        let sin = radians.sin();

        let src_w = self.width() as f32;
        let src_h = self.height() as f32;
        let cx = src_w / 2.0;
        let cy = src_h / 2.0;

        let corners = [
            (-cx, -cy),
            (src_w - cx, -cy),
            (-cx, src_h - cy),
            (src_w - cx, src_h - cy),
        ];
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for (x, y) in corners {
            let rx = x * cos - y * sin;
            let ry = x * sin + y * cos;
            min_x = min_x.min(rx);
            max_x = max_x.max(rx);
            min_y = min_y.min(ry);
            max_y = max_y.max(ry);
        }

        // Shave a hair before ceiling so exact right angles do not pick up a
        // stray row/column from float error in sin/cos.
        let dst_w = (((max_x - min_x) - 1e-3).ceil() as u32).max(1);
        let dst_h = (((max_y - min_y) - 1e-3).ceil() as u32).max(1);
        let mut out = Surface::blank(dst_w, dst_h);

        let dst_cx = dst_w as f32 / 2.0;
        let dst_cy = dst_h as f32 / 2.0;
        let inv_cos = (-radians).cos();
        let inv_sin = (-radians).sin();

        for dy in 0..dst_h {
            for dx in 0..dst_w {
                let rx = dx as f32 - dst_cx;
                let ry = dy as f32 - dst_cy;
                let sx = rx * inv_cos - ry * inv_sin + cx;
                let sy = rx * inv_sin + ry * inv_cos + cy;

                if sx < 0.0 || sy < 0.0 || sx >= src_w - 1.0 || sy >= src_h - 1.0 {
                    continue;
                }
                let x0 = sx.floor() as u32;
                let y0 = sy.floor() as u32;
                let fx = sx - x0 as f32;
                let fy = sy - y0 as f32;

                let p00 = self.pixel(x0, y0);
                let p10 = self.pixel(x0 + 1, y0);
                let p01 = self.pixel(x0, y0 + 1);
                let p11 = self.pixel(x0 + 1, y0 + 1);

                let lerp2 = |c: fn(Rgba) -> u8| -> u8 {
                    let v = c(p00) as f32 * (1.0 - fx) * (1.0 - fy)
                        + c(p10) as f32 * fx * (1.0 - fy)
                        + c(p01) as f32 * (1.0 - fx) * fy
                        + c(p11) as f32 * fx * fy;
                    v.clamp(0.0, 255.0) as u8
                };

                out.pixels.put_pixel(
                    dx,
                    dy,
                    ImgRgba([
                        lerp2(|p| p.r),
                        lerp2(|p| p.g),
                        lerp2(|p| p.b),
                        lerp2(|p| p.a),
                    ]),
                );
            }
        }

        let ax = (anchor.0 - cx) * cos - (anchor.1 - cy) * sin + dst_cx;
        let ay = (anchor.0 - cx) * sin + (anchor.1 - cy) * cos + dst_cy;
        (out, (ax, ay))
    }

    /// Encode to the given format. PNG and GIF keep the alpha channel; JPEG
    /// cannot carry one, so pixels are flattened to RGB.
    pub fn encode(&self, kind: ImageKind) -> StampResult<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        match kind {
            ImageKind::Jpeg => image::DynamicImage::ImageRgba8(self.pixels.clone())
                .to_rgb8()
                .write_to(&mut buf, kind.to_image_format()),
            ImageKind::Png | ImageKind::Gif => image::DynamicImage::ImageRgba8(
                self.pixels.clone(),
            )
            .write_to(&mut buf, kind.to_image_format()),
        }
        .with_context(|| format!("encode {kind:?}"))?;
        Ok(buf.into_inner())
    }
}

/// Straight-alpha source-over.
fn over(dst: Rgba, src: Rgba) -> Rgba {
    let sa = src.a as f32 / 255.0;
    let da = dst.a as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a < f32::EPSILON {
        return Rgba::new(0, 0, 0, 0);
    }
    let ch = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        (((s * sa + d * da * (1.0 - sa)) / out_a) * 255.0).round() as u8
    };
    Rgba::new(
        ch(src.r, dst.r),
        ch(src.g, dst.g),
        ch(src.b, dst.b),
        (out_a * 255.0).round() as u8,
    )
}
