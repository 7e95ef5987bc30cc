use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::{debug, trace};

use crate::bitmap_font;
use crate::color::Rgba;
use crate::error::{StampError, StampResult};
use crate::format::ImageKind;
use crate::glyphs::OutlineFont;
use crate::model::{BackgroundLayer, RenderContext, Text};
use crate::surface::Surface;

/// Dimensions used when synthesizing a base surface and none were given.
pub const DEFAULT_DIMENSIONS: (u32, u32) = (200, 200);

/// The render engine: owns the base-surface description and the ordered
/// background and text layers, and turns them into an encoded image.
///
/// Accumulators are append-only and insertion order is render order; later
/// entries draw on top of earlier ones. A `Canvas` is not meant for shared
/// mutation across threads; render independent instances instead.
pub struct Canvas {
    source: Option<PathBuf>,
    dimensions: Option<(u32, u32)>,
    background: Rgba,
    format: Option<ImageKind>,
    layers: Vec<BackgroundLayer>,
    texts: Vec<Text>,
}

impl Canvas {
    /// A canvas that synthesizes its base surface at render time.
    pub fn new() -> Self {
        Self {
            source: None,
            dimensions: None,
            background: Rgba::WHITE,
            format: None,
            layers: Vec::new(),
            texts: Vec::new(),
        }
    }

    /// A canvas whose base surface is decoded from `path`. When a source is
    /// set, synthesized dimensions and background color are ignored entirely.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(path.into()),
            ..Self::new()
        }
    }

    /// Dimensions for the synthesized base surface (default 200x200).
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    /// Fill color for the synthesized base surface.
    pub fn background(mut self, color: Rgba) -> Self {
        self.background = color;
        self
    }

    /// Output format hint. A save path's extension still takes precedence.
    pub fn format(mut self, kind: ImageKind) -> Self {
        self.format = Some(kind);
        self
    }

    pub fn layer(mut self, layer: BackgroundLayer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn text(mut self, text: Text) -> Self {
        self.texts.push(text);
        self
    }

    /// Render to encoded bytes in memory.
    ///
    /// Format: explicit hint, else the source file's extension, else PNG.
    /// Rendering twice with unchanged inputs reproduces the same bytes.
    #[tracing::instrument(skip(self))]
    pub fn render(&mut self) -> StampResult<Vec<u8>> {
        let format = self.resolve_format()?;
        self.render_encoded(format)
    }

    /// Render and write to `path`, returning the path actually written.
    ///
    /// The path's extension picks the encoder; a path without extension gets
    /// the resolved format's canonical extension appended (historical
    /// `save_path.ext` behavior). The written bytes are identical to what
    /// [`Canvas::render`] returns for the same format.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn render_to_file(&mut self, path: impl AsRef<Path>) -> StampResult<PathBuf> {
        let path = path.as_ref();
        let (format, out_path) = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let kind = ImageKind::from_extension(ext)
                    .ok_or_else(|| StampError::UnsupportedFormat(ext.to_string()))?;
                (kind, path.to_path_buf())
            }
            None => {
                let kind = self.resolve_format()?;
                (kind, path.with_extension(kind.extension()))
            }
        };
        let bytes = self.render_encoded(format)?;
        std::fs::write(&out_path, &bytes)
            .with_context(|| format!("write {}", out_path.display()))?;
        debug!(bytes = bytes.len(), "wrote rendered image");
        Ok(out_path)
    }

    fn resolve_format(&self) -> StampResult<ImageKind> {
        if let Some(kind) = self.format {
            return Ok(kind);
        }
        match &self.source {
            Some(src) => ImageKind::from_path(src),
            None => Ok(ImageKind::Png),
        }
    }

    fn render_encoded(&mut self, format: ImageKind) -> StampResult<Vec<u8>> {
        let mut surface = match &self.source {
            Some(path) => Surface::decode(path)?,
            None => {
                let (w, h) = self.dimensions.unwrap_or(DEFAULT_DIMENSIONS);
                Surface::filled(w, h, self.background)
            }
        };
        let ctx = RenderContext {
            width: surface.width(),
            height: surface.height(),
        };
        debug!(
            width = ctx.width,
            height = ctx.height,
            layers = self.layers.len(),
            texts = self.texts.len(),
            "base surface resolved"
        );

        for layer in &self.layers {
            let (x1, y1) = layer.corner1;
            let x2 = layer.corner2.0.unwrap_or(ctx.width as i32);
            let y2 = layer.corner2.1.unwrap_or(ctx.height as i32);
            trace!(x1, y1, x2, y2, "background layer");
            surface.fill_rect(x1, y1, x2, y2, layer.color);
        }

        for entry in &mut self.texts {
            draw_entry(&mut surface, &ctx, entry)?;
        }

        surface.encode(format)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw one text entry: font check, pre-render hook, shadow copy, primary
/// copy, in that order.
fn draw_entry(surface: &mut Surface, ctx: &RenderContext, entry: &mut Text) -> StampResult<()> {
    // Empty font paths behave like an absent font (bitmap fallback). The
    // readability check happens per entry, not up front.
    let font_path = entry
        .font
        .clone()
        .filter(|p| !p.as_os_str().is_empty());
    let mut font = match &font_path {
        Some(path) => Some(OutlineFont::load(path)?),
        None => None,
    };

    if let Some(mut hook) = entry.update.take() {
        hook(ctx, entry);
        entry.update = Some(hook);
        // The hook may have swapped the font; pick up the change.
        let hooked_path = entry.font.clone().filter(|p| !p.as_os_str().is_empty());
        if hooked_path != font_path {
            font = match &hooked_path {
                Some(path) => Some(OutlineFont::load(path)?),
                None => None,
            };
        }
    }

    let size = effective_size(entry, font.as_ref(), ctx.width);
    trace!(
        content = %entry.content,
        size,
        rotation = entry.rotation,
        "text entry"
    );

    if let Some(shadow) = entry.shadow {
        let (x, y) = entry.position;
        let pos = (x + shadow.offset.0, y + shadow.offset.1);
        draw_copy(surface, entry, font.as_ref(), size, pos, shadow.color);
    }
    draw_copy(
        surface,
        entry,
        font.as_ref(),
        size,
        entry.position,
        entry.color,
    );
    Ok(())
}

/// Draw one copy of the label (shadow or primary) at `pos` in `color`.
///
/// Outline fonts anchor at the baseline; the bitmap font anchors at the
/// top-left. Rotation goes through an intermediate surface, with the angle
/// negated on the way into the rotation primitive: positive degrees on the
/// entry mean counter-clockwise.
fn draw_copy(
    surface: &mut Surface,
    entry: &Text,
    font: Option<&OutlineFont>,
    size: f32,
    pos: (i32, i32),
    color: Rgba,
) {
    let (x, y) = pos;
    match font {
        Some(font) => {
            let label = font.raster(&entry.content, size, color);
            let ascent = font.ascent(size);
            if entry.rotation != 0.0 {
                // The (x, y) anchor is the baseline start, so the rotation
                // pivots there rather than at the expanded box's top-left.
                let (rotated, (ax, ay)) =
                    label.rotated_with_anchor(-entry.rotation, (0.0, ascent));
                surface.composite(&rotated, x - ax.round() as i32, y - ay.round() as i32);
            } else {
                surface.composite(&label, x, y - ascent as i32);
            }
        }
        None => {
            let bucket = bitmap_font::clamp_bucket(size);
            let label = bitmap_font::render(&entry.content, bucket, color);
            if entry.rotation > 0.0 {
                let rotated = label.rotated(-entry.rotation);
                surface.composite(&rotated, x, y);
            } else {
                surface.composite(&label, x, y);
            }
        }
    }
}

/// The font size actually used for this entry. With `scale_to_fit`, the size
/// shrinks so the (rotation-aware) bounding-box width fits the image width
/// with a 5% margin; it never grows.
fn effective_size(entry: &Text, font: Option<&OutlineFont>, image_width: u32) -> f32 {
    if !entry.scale_to_fit {
        return entry.font_size;
    }
    match font {
        Some(font) => {
            let (w, h) = font.measure(&entry.content, entry.font_size);
            let bbox_w = rotated_bbox_width(w, h, entry.rotation);
            fit_size(entry.font_size, bbox_w, image_width)
        }
        None => {
            // Bitmap sizes are discrete; step the bucket down until the
            // label fits (or the smallest bucket is reached).
            let mut bucket = bitmap_font::clamp_bucket(entry.font_size);
            while bucket > 1 {
                let w = bitmap_font::text_width(&entry.content, bucket) as f32;
                if rotated_bbox_width(w, bitmap_font::text_height(bucket) as f32, entry.rotation)
                    <= image_width as f32
                {
                    break;
                }
                bucket -= 1;
            }
            bucket as f32
        }
    }
}

fn rotated_bbox_width(w: f32, h: f32, degrees: f32) -> f32 {
    let radians = degrees.to_radians();
    w * radians.cos().abs() + h * radians.sin().abs()
}

fn fit_size(configured: f32, bbox_w: f32, image_w: u32) -> f32 {
    if bbox_w > image_w as f32 {
        configured * (image_w as f32 / bbox_w) * 0.95
    } else {
        configured
    }
}
