use serde::{Deserialize, Serialize};

/// An 8-bit RGBA color in the 0-255 "opacity" convention: `a == 255` is fully
/// opaque, `a == 0` fully transparent. Partial colors at the API boundary are
/// expanded to all four channels at construction time, never at use time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque color; the missing alpha channel defaults to 255.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// The color as handed to the drawing primitives.
    ///
    /// The drawing layer speaks the GD-style 0-127 "transparency" convention,
    /// so every allocated draw color round-trips its alpha through
    /// `127 - (a >> 1)`. The quantization this applies (alpha resolution drops
    /// to 7 bits) is part of the output contract and must be identical for
    /// base fills, background layers, text and shadows.
    pub fn allocate(self) -> Self {
        Self {
            a: blend_alpha(transparency(self.a)),
            ..self
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// 0-255 opacity to the drawing layer's 0-127 transparency.
pub(crate) fn transparency(alpha: u8) -> u8 {
    127 - (alpha >> 1)
}

/// 0-127 transparency back to an effective 0-255 blend alpha.
pub(crate) fn blend_alpha(t: u8) -> u8 {
    (((127 - t.min(127)) as u16 * 255 + 63) / 127) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transparency_fixed_points() {
        assert_eq!(transparency(255), 0);
        assert_eq!(transparency(0), 127);
        assert_eq!(transparency(254), 0);
        assert_eq!(transparency(1), 127);
    }

    #[test]
    fn blend_alpha_round_trips_extremes() {
        assert_eq!(blend_alpha(transparency(255)), 255);
        assert_eq!(blend_alpha(transparency(0)), 0);
    }

    #[test]
    fn allocate_quantizes_to_seven_bits() {
        // 254 and 255 collapse to the same transparency level.
        assert_eq!(Rgba::new(1, 2, 3, 254).allocate(), Rgba::new(1, 2, 3, 255));
        let mid = Rgba::new(0, 0, 0, 128).allocate().a;
        assert!((127..=129).contains(&mid), "mid alpha was {mid}");
    }

    #[test]
    fn defaults_are_opaque_white() {
        assert_eq!(Rgba::default(), Rgba::new(255, 255, 255, 255));
        assert_eq!(Rgba::rgb(9, 9, 9).a, 255);
    }

    #[test]
    fn serde_round_trip() {
        let c = Rgba::new(10, 20, 30, 40);
        let s = serde_json::to_string(&c).unwrap();
        assert_eq!(serde_json::from_str::<Rgba>(&s).unwrap(), c);
    }
}
