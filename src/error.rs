use std::path::PathBuf;

pub type StampResult<T> = Result<T, StampError>;

/// Errors surfaced by [`Canvas::render`](crate::Canvas::render).
///
/// All of these are fatal to the render call; no partial output is ever
/// emitted and nothing is retried.
#[derive(thiserror::Error, Debug)]
pub enum StampError {
    #[error("source image not found or unreadable: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("font not found or unreadable: {}", .0.display())]
    FontNotFound(PathBuf),

    #[error("unsupported image format \"{0}\" (expected jpg, jpeg, png or gif)")]
    UnsupportedFormat(String),

    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StampError {
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            StampError::render("x").to_string().contains("render error:")
        );
        assert!(
            StampError::SourceNotFound(PathBuf::from("a.png"))
                .to_string()
                .contains("source image not found")
        );
        assert!(
            StampError::UnsupportedFormat("bmp".into())
                .to_string()
                .contains("unsupported image format")
        );
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = StampError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
