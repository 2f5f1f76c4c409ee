//! Core types for image decoding.

use image::DynamicImage;
use thiserror::Error;

/// Error types for image decoding operations.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// The string is not a `data:` URL.
    #[error("Not a data URL")]
    NotDataUrl,

    /// The data URL is not base64 encoded or the payload is invalid.
    #[error("Invalid data URL payload: {0}")]
    InvalidPayload(String),

    /// The file format is not recognized or supported.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image file is corrupted or incomplete.
    #[error("Corrupted or incomplete image file: {0}")]
    CorruptedFile(String),

    /// The image has a zero dimension.
    #[error("Image has empty dimensions ({width}x{height})")]
    EmptyDimensions { width: u32, height: u32 },

    /// Re-encoding an oriented upload failed.
    #[error("Failed to re-encode image: {0}")]
    EncodingFailed(String),
}

/// How a camera stored an upload relative to upright, from the EXIF
/// `Orientation` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Normal,
    Mirrored,
    UpsideDown,
    MirroredUpsideDown,
    /// Mirrored, then a quarter turn clockwise.
    MirroredQuarterCw,
    QuarterCw,
    /// Mirrored, then a quarter turn counter-clockwise.
    MirroredQuarterCcw,
    QuarterCcw,
}

impl Orientation {
    /// Map an EXIF tag value; anything outside 1-8 is treated as upright.
    pub fn from_exif(value: u32) -> Self {
        match value {
            2 => Orientation::Mirrored,
            3 => Orientation::UpsideDown,
            4 => Orientation::MirroredUpsideDown,
            5 => Orientation::MirroredQuarterCw,
            6 => Orientation::QuarterCw,
            7 => Orientation::MirroredQuarterCcw,
            8 => Orientation::QuarterCcw,
            _ => Orientation::Normal,
        }
    }

    /// Upright width and height are the stored height and width.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::MirroredQuarterCw
                | Orientation::QuarterCw
                | Orientation::MirroredQuarterCcw
                | Orientation::QuarterCcw
        )
    }

    /// Turn stored pixels upright.
    pub fn apply(self, img: DynamicImage) -> DynamicImage {
        match self {
            Orientation::Normal => img,
            Orientation::Mirrored => img.fliph(),
            Orientation::UpsideDown => img.rotate180(),
            Orientation::MirroredUpsideDown => img.flipv(),
            Orientation::MirroredQuarterCw => img.rotate90().fliph(),
            Orientation::QuarterCw => img.rotate90(),
            Orientation::MirroredQuarterCcw => img.rotate270().fliph(),
            Orientation::QuarterCcw => img.rotate270(),
        }
    }
}

/// Decoded `data:` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
