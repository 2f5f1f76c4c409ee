//! BannerKit Core - Banner composition and export library
//!
//! This crate provides the core of the banner editor: the image geometry
//! model, the banner composition, the preview renderer, PNG export,
//! persistence and the editor session that ties them together.

pub mod composition;
pub mod config;
pub mod decode;
pub mod editor;
pub mod export;
pub mod geometry;
pub mod layout;
pub mod render;
pub mod services;
pub mod storage;
pub mod template;

pub use composition::{BannerComposition, ImageRef, SlotKind, TextAlignment, ThemeId};
pub use config::EditorConfig;
pub use editor::{BannerEditor, EditorError, Operation, Outcome, RequestToken};
pub use export::{ExportArtifact, ExportError, Exporter, FontSet, PixelMultiplier};
pub use geometry::{image_placement, AnchorMode, ImagePlacement, ImageTransform};
pub use render::{render_preview, VisualTree};

/// Library version, as reported to the host application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
