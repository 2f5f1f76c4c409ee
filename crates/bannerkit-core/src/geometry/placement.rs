//! Mapping an [`ImageTransform`] onto the banner.
//!
//! The same [`ImagePlacement`] feeds the preview tree and the exported
//! bitmap. The matrix is built as
//!
//! ```text
//! translate(anchor + pan) · rotate(θ) · scale(s) · flipX · translate(-w/2, -h/2)
//! ```
//!
//! and maps image-local pixels (origin top-left, natural size) onto logical
//! banner pixels. Mirroring is innermost so pan direction never flips.

use super::affine::{fmt_num, Affine};
use super::transform::ImageTransform;
use crate::layout::{self, Rect, CANVAS_HEIGHT};
use serde::{Deserialize, Serialize};

/// How the image is anchored in the image area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorMode {
    /// `object-fit: contain` inside the image area. The user scale acts as a
    /// zoom relative to the auto-scale, so a freshly attached image is
    /// exactly contained.
    #[default]
    Contain,
    /// Drawn at `natural * scale`, centered on the image area, free to
    /// extend past it.
    CenterOverlay,
}

/// Resolved geometry for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// Image-local to logical banner pixels.
    pub matrix: Affine,
    /// Equivalent CSS `transform` for an element centered on the anchor.
    pub css: String,
    /// Effective scale from natural pixels to logical pixels.
    pub effective_scale: f64,
    /// Size of the drawn image before rotation.
    pub drawn_width: f64,
    pub drawn_height: f64,
    /// Axis-aligned bounds of the drawn image after rotation.
    pub bounds: Rect,
}

impl ImagePlacement {
    /// Whether the rotated image reaches outside `area`.
    pub fn overflows(&self, area: &Rect) -> bool {
        const SLACK: f64 = 1e-6;
        self.bounds.x < area.x - SLACK
            || self.bounds.y < area.y - SLACK
            || self.bounds.x + self.bounds.width > area.x + area.width + SLACK
            || self.bounds.y + self.bounds.height > area.y + area.height + SLACK
    }
}

/// Scale that makes an image of `natural_height` fill the banner height.
///
/// Zero-height images have no meaningful fill; they get 1.
pub fn auto_scale(natural_height: u32) -> f64 {
    if natural_height == 0 {
        return 1.0;
    }
    CANVAS_HEIGHT / natural_height as f64
}

/// Scale that fits `natural` into `area` preserving aspect ratio.
pub fn contain_fit(natural_width: u32, natural_height: u32, area: &Rect) -> f64 {
    if natural_width == 0 || natural_height == 0 {
        return 1.0;
    }
    (area.width / natural_width as f64).min(area.height / natural_height as f64)
}

/// Bounding box size of a `width` x `height` rectangle rotated by
/// `angle_degrees`.
pub fn rotated_bounds(width: f64, height: f64, angle_degrees: f64) -> (f64, f64) {
    let angle_normalized = angle_degrees % 360.0;

    if angle_normalized.abs() < 0.001 || (360.0 - angle_normalized.abs()).abs() < 0.001 {
        return (width, height);
    }

    let abs_angle = angle_normalized.abs();
    if (abs_angle - 90.0).abs() < 0.001 || (abs_angle - 270.0).abs() < 0.001 {
        return (height, width);
    }
    if (abs_angle - 180.0).abs() < 0.001 {
        return (width, height);
    }

    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    (width * cos + height * sin, width * sin + height * cos)
}

/// Resolve the placement of an image with the given natural size.
pub fn image_placement(
    transform: &ImageTransform,
    natural_width: u32,
    natural_height: u32,
    mode: AnchorMode,
) -> ImagePlacement {
    let area = layout::image_area_rect();
    let (anchor_x, anchor_y) = area.center();

    // Scale of the element relative to its base size, and natural to
    // logical pixels overall.
    let (zoom, effective_scale) = match mode {
        AnchorMode::Contain => {
            let zoom = transform.scale / auto_scale(natural_height);
            (zoom, contain_fit(natural_width, natural_height, &area) * zoom)
        }
        AnchorMode::CenterOverlay => (transform.scale, transform.scale),
    };

    let (w, h) = (natural_width as f64, natural_height as f64);
    let center_x = anchor_x + transform.pan_x as f64;
    let center_y = anchor_y + transform.pan_y as f64;
    let mirror = if transform.flip_horizontal { -1.0 } else { 1.0 };

    let matrix = Affine::translate(center_x, center_y)
        .then_apply(&Affine::rotate(transform.rotation_degrees))
        .then_apply(&Affine::scale(effective_scale, effective_scale))
        .then_apply(&Affine::scale(mirror, 1.0))
        .then_apply(&Affine::translate(-w / 2.0, -h / 2.0));

    let drawn_width = w * effective_scale;
    let drawn_height = h * effective_scale;
    let (bounds_w, bounds_h) =
        rotated_bounds(drawn_width, drawn_height, transform.rotation_degrees);
    let bounds = Rect::new(
        center_x - bounds_w / 2.0,
        center_y - bounds_h / 2.0,
        bounds_w,
        bounds_h,
    );

    ImagePlacement {
        matrix,
        css: css_transform(transform, zoom),
        effective_scale,
        drawn_width,
        drawn_height,
        bounds,
    }
}

/// CSS transform list for the same placement.
///
/// The element is assumed to be centered on the anchor at its base size
/// (natural size for overlay, the contained size for contain mode), with
/// `transform-origin: center`. The flip is always last.
fn css_transform(transform: &ImageTransform, zoom: f64) -> String {
    let mut css = format!(
        "translate({}px, {}px) rotate({}deg) scale({})",
        transform.pan_x,
        transform.pan_y,
        fmt_num(transform.rotation_degrees),
        fmt_num(zoom)
    );
    if transform.flip_horizontal {
        css.push_str(" scaleX(-1)");
    }
    css
}
