use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::color::Rgba;

/// Resolved canvas dimensions handed to pre-render hooks once the base
/// surface exists (decoded or synthesized).
#[derive(Clone, Copy, Debug)]
pub struct RenderContext {
    pub width: u32,
    pub height: u32,
}

/// A drop shadow for one text entry: a second copy of the text drawn at
/// `position + offset` in `color`, always before the primary copy so the
/// primary ink wins at exact overlap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shadow {
    pub offset: (i32, i32),
    pub color: Rgba,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            offset: (0, 0),
            color: Rgba::BLACK,
        }
    }
}

/// Hook invoked immediately before a text entry is drawn. Runs in-line in the
/// single render pass and may mutate the entry (typically its position) based
/// on the final canvas dimensions.
pub type UpdateFn = Box<dyn FnMut(&RenderContext, &mut Text)>;

/// One piece of text to place on the canvas.
///
/// Setters chain by value and perform no validation; out-of-range values are
/// deferred to render time. With no font file the embedded bitmap font is
/// used and `font_size` is read as a size bucket (1-5, GD style); with a font
/// file it is the pixel size.
pub struct Text {
    pub content: String,
    pub position: (i32, i32),
    pub font: Option<PathBuf>,
    pub font_size: f32,
    pub color: Rgba,
    pub shadow: Option<Shadow>,
    pub rotation: f32,
    pub scale_to_fit: bool,
    pub(crate) update: Option<UpdateFn>,
}

impl Text {
    pub fn from(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            position: (0, 0),
            font: None,
            font_size: 5.0,
            color: Rgba::WHITE,
            shadow: None,
            rotation: 0.0,
            scale_to_fit: false,
            update: None,
        }
    }

    pub fn position(mut self, x: i32, y: i32) -> Self {
        self.position = (x, y);
        self
    }

    /// Outline font file and pixel size.
    pub fn font(mut self, size: f32, path: impl Into<PathBuf>) -> Self {
        self.font_size = size;
        self.font = Some(path.into());
        self
    }

    /// Embedded bitmap font at the given size bucket (clamped to 1-5 at
    /// render time).
    pub fn bitmap_font(mut self, bucket: u8) -> Self {
        self.font_size = bucket as f32;
        self.font = None;
        self
    }

    pub fn color(mut self, r: u8, g: u8, b: u8, a: u8) -> Self {
        self.color = Rgba::new(r, g, b, a);
        self
    }

    /// Replaces the whole shadow (offset and color) as one unit.
    pub fn shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    /// Counter-clockwise rotation in degrees.
    pub fn rotate(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    /// Recompute the font size at render time so the text fits the image
    /// width (down-scaling only, with a 5% margin).
    pub fn scale_to_fit(mut self, enabled: bool) -> Self {
        self.scale_to_fit = enabled;
        self
    }

    /// Pre-render hook; see [`UpdateFn`].
    pub fn update(mut self, hook: impl FnMut(&RenderContext, &mut Text) + 'static) -> Self {
        self.update = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Text")
            .field("content", &self.content)
            .field("position", &self.position)
            .field("font", &self.font)
            .field("font_size", &self.font_size)
            .field("color", &self.color)
            .field("shadow", &self.shadow)
            .field("rotation", &self.rotation)
            .field("scale_to_fit", &self.scale_to_fit)
            .field("update", &self.update.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

/// A flat-colored rectangular fill painted onto the base surface before any
/// text. An unset `corner2` component extends to the image's width or height
/// once dimensions are known; the sentinel is a real `Option`, so corner
/// coordinates of zero stay legitimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundLayer {
    pub corner1: (i32, i32),
    pub corner2: (Option<i32>, Option<i32>),
    pub color: Rgba,
}

impl BackgroundLayer {
    pub fn new() -> Self {
        Self {
            corner1: (0, 0),
            corner2: (None, None),
            color: Rgba::WHITE,
        }
    }

    pub fn position(mut self, x1: i32, y1: i32, x2: Option<i32>, y2: Option<i32>) -> Self {
        self.corner1 = (x1, y1);
        self.corner2 = (x2, y2);
        self
    }

    pub fn color(mut self, r: u8, g: u8, b: u8, a: u8) -> Self {
        self.color = Rgba::new(r, g, b, a);
        self
    }
}

impl Default for BackgroundLayer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_defaults() {
        let t = Text::from("hi");
        assert_eq!(t.content, "hi");
        assert_eq!(t.position, (0, 0));
        assert!(t.font.is_none());
        assert_eq!(t.font_size, 5.0);
        assert_eq!(t.color, Rgba::WHITE);
        assert!(t.shadow.is_none());
        assert_eq!(t.rotation, 0.0);
        assert!(!t.scale_to_fit);
    }

    #[test]
    fn text_setters_chain_and_replace_whole_units() {
        let t = Text::from("x")
            .position(3, 4)
            .font(24.0, "fonts/a.ttf")
            .color(1, 2, 3, 4)
            .shadow(Shadow {
                offset: (2, 2),
                color: Rgba::new(9, 9, 9, 200),
            })
            .rotate(45.0)
            .scale_to_fit(true);
        assert_eq!(t.position, (3, 4));
        assert_eq!(t.font.as_deref(), Some(std::path::Path::new("fonts/a.ttf")));
        assert_eq!(t.color, Rgba::new(1, 2, 3, 4));
        assert_eq!(t.shadow.unwrap().offset, (2, 2));
        assert_eq!(t.rotation, 45.0);
        assert!(t.scale_to_fit);

        // A second shadow call replaces offset and color together.
        let t = t.shadow(Shadow::default());
        assert_eq!(t.shadow.unwrap(), Shadow::default());
    }

    #[test]
    fn bitmap_font_clears_font_path() {
        let t = Text::from("x").font(24.0, "a.ttf").bitmap_font(3);
        assert!(t.font.is_none());
        assert_eq!(t.font_size, 3.0);
    }

    #[test]
    fn shadow_default_is_black_at_origin() {
        assert_eq!(
            Shadow::default(),
            Shadow {
                offset: (0, 0),
                color: Rgba::BLACK
            }
        );
    }

    #[test]
    fn background_layer_unset_corner_is_distinct_from_zero() {
        let unset = BackgroundLayer::new().position(0, 0, None, None);
        let zero = BackgroundLayer::new().position(0, 0, Some(0), Some(0));
        assert_ne!(unset, zero);
    }

    #[test]
    fn background_layer_serde_round_trip() {
        let layer = BackgroundLayer::new()
            .position(1, 2, Some(3), None)
            .color(255, 0, 0, 128);
        let s = serde_json::to_string(&layer).unwrap();
        assert_eq!(serde_json::from_str::<BackgroundLayer>(&s).unwrap(), layer);
    }

    #[test]
    fn debug_elides_hook_body() {
        let t = Text::from("x").update(|ctx, t| {
            t.position = (ctx.width as i32 / 2, ctx.height as i32 / 2);
        });
        let dbg = format!("{t:?}");
        assert!(dbg.contains("<hook>"));
    }
}
