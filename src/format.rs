use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StampError, StampResult};

/// The image formats this crate decodes and encodes. Selection is strictly by
/// filename extension (case-insensitive) or explicit hint; content is never
/// sniffed, so a mismatched extension is the codec's problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Resolve from a path's extension; a missing extension is reported as
    /// unsupported under its display form so the error names the path.
    pub fn from_path(path: &Path) -> StampResult<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => Self::from_extension(ext)
                .ok_or_else(|| StampError::UnsupportedFormat(ext.to_string())),
            None => Err(StampError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Canonical extension used when a save path has none.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    pub(crate) fn to_image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Gif => image::ImageFormat::Gif,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extension_table() {
        assert_eq!(ImageKind::from_extension("jpg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("JPEG"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("Png"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_extension("gif"), Some(ImageKind::Gif));
        assert_eq!(ImageKind::from_extension("webp"), None);
        assert_eq!(ImageKind::from_extension(""), None);
    }

    #[test]
    fn from_path_rejects_unknown_extension() {
        let err = ImageKind::from_path(&PathBuf::from("pic.bmp")).unwrap_err();
        assert!(matches!(err, StampError::UnsupportedFormat(e) if e == "bmp"));
    }

    #[test]
    fn from_path_rejects_missing_extension_naming_the_path() {
        let err = ImageKind::from_path(&PathBuf::from("photos/noext")).unwrap_err();
        assert!(matches!(err, StampError::UnsupportedFormat(e) if e == "photos/noext"));
    }

    #[test]
    fn canonical_extensions() {
        assert_eq!(ImageKind::Jpeg.extension(), "jpg");
        assert_eq!(ImageKind::Png.extension(), "png");
        assert_eq!(ImageKind::Gif.extension(), "gif");
    }
}
