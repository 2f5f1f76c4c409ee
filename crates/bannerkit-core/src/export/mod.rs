//! PNG export of a rendered banner.
//!
//! The exporter rasterizes the same [`VisualTree`](crate::render::VisualTree)
//! the preview shows, so the exported bitmap cannot drift from the preview.
//!
//! # Examples
//!
//! ```ignore
//! use bannerkit_core::export::{Exporter, FontSet, PixelMultiplier};
//! use bannerkit_core::render::render_preview;
//! use std::path::Path;
//!
//! let mut fonts = FontSet::empty();
//! fonts.load_dir(Path::new("assets/fonts"))?;
//! fonts.settle_generic_families();
//!
//! let tree = render_preview(&banner, 1.0)?;
//! let artifact = Exporter::new(fonts).export(&tree, PixelMultiplier::X2)?;
//! assert_eq!((artifact.width, artifact.height), (1280, 336));
//! std::fs::write(&artifact.file_name, &artifact.bytes)?;
//! ```

mod fonts;
mod png;

pub use fonts::FontSet;
#[cfg(test)]
pub(crate) use fonts::TEST_FONT;
pub use png::Exporter;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::render::RenderError;

/// Export resolution relative to the logical banner size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum PixelMultiplier {
    #[default]
    X1,
    X2,
}

impl PixelMultiplier {
    pub fn factor(self) -> u32 {
        match self {
            PixelMultiplier::X1 => 1,
            PixelMultiplier::X2 => 2,
        }
    }

    /// File name of an export at this multiplier.
    pub fn file_name(self) -> String {
        format!("banner-{}x.png", self.factor())
    }
}

impl TryFrom<u32> for PixelMultiplier {
    type Error = ExportError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PixelMultiplier::X1),
            2 => Ok(PixelMultiplier::X2),
            other => Err(ExportError::InvalidMultiplier(other)),
        }
    }
}

impl From<PixelMultiplier> for u32 {
    fn from(value: PixelMultiplier) -> Self {
        value.factor()
    }
}

/// A finished export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// Encoded PNG.
    pub bytes: Vec<u8>,
}

/// Errors that can occur during export.
#[derive(Debug, Error, PartialEq)]
pub enum ExportError {
    /// Only 1x and 2x exports exist
    #[error("Invalid pixel multiplier: {0} (expected 1 or 2)")]
    InvalidMultiplier(u32),

    /// The tree references an image that is not embedded
    #[error("Image is not embedded and cannot be exported: {0}")]
    UnembeddedImage(String),

    /// An embedded image cannot be decoded
    #[error("Embedded image cannot be decoded: {0}")]
    UndecodableImage(String),

    /// The banner could not be rendered
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The generated SVG was rejected by the rasterizer
    #[error("Failed to parse banner SVG: {0}")]
    Svg(String),

    /// Output dimensions are zero or too large
    #[error("Failed to allocate {width}x{height} pixmap")]
    PixmapAllocation { width: u32, height: u32 },

    /// Output dimensions do not fit in a pixmap
    #[error("Output of {width}x{height} px is too large to export")]
    TooLarge { width: f64, height: f64 },

    /// The banner has text but no font faces are loaded
    #[error("No fonts loaded; load a font before exporting text")]
    NoFonts,

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    Encoding(String),

    /// A font directory could not be read
    #[error("Failed to load fonts from {path}: {message}")]
    Fonts { path: String, message: String },
}
