//! Fluent text-overlay composition for raster images.
//!
//! Build [`Text`] and [`BackgroundLayer`] descriptors, attach them to a
//! [`Canvas`] (decoded from a JPEG/PNG/GIF file or synthesized blank), and
//! render to encoded bytes or straight to disk:
//!
//! ```no_run
//! use inkstamp::{Canvas, Rgba, Text};
//!
//! let path = Canvas::new()
//!     .dimensions(500, 200)
//!     .background(Rgba::rgb(20, 20, 20))
//!     .text(Text::from("Hey FooBar").position(10, 40).color(255, 255, 255, 255))
//!     .render_to_file("out.png")?;
//! # Ok::<(), inkstamp::StampError>(())
//! ```
#![forbid(unsafe_code)]

mod bitmap_font;
pub mod canvas;
pub mod color;
pub mod error;
pub mod format;
mod glyphs;
pub mod model;
pub mod surface;

pub use canvas::{Canvas, DEFAULT_DIMENSIONS};
pub use color::Rgba;
pub use error::{StampError, StampResult};
pub use format::ImageKind;
pub use model::{BackgroundLayer, RenderContext, Shadow, Text, UpdateFn};
pub use surface::Surface;
