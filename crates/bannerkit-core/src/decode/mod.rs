//! Image intake for the editor.
//!
//! This module provides functionality for:
//! - Building and parsing base64 `data:` URLs
//! - Turning uploaded files into embedded images with EXIF orientation applied
//! - Probing the natural size of images returned by the generation services
//!
//! Every image the composition holds is embedded as a data URL, so the
//! export pipeline never has to fetch anything.
//!
//! # Examples
//!
//! ```ignore
//! use bannerkit_core::decode::load_upload;
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = load_upload(&bytes).unwrap();
//! println!("Uploaded {}x{} image", image.natural_width, image.natural_height);
//! ```

mod data_url;
mod types;
mod upload;

pub use data_url::{encode_data_url, parse_data_url};
pub use types::{DataUrl, DecodeError, Orientation};
pub use upload::{extract_orientation, load_upload, read_image_ref};
