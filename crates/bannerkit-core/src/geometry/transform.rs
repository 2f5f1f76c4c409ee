//! User-adjustable image transform and its valid ranges.

use serde::{Deserialize, Serialize};

/// Lower bound for a user-set scale.
pub const SCALE_MIN: f64 = 0.05;
/// Upper bound for a user-set scale.
pub const SCALE_MAX: f64 = 3.0;
/// Pan limit per axis, in logical pixels.
pub const PAN_LIMIT: i32 = 200;
/// Rotation limit in degrees, applied symmetrically.
pub const ROTATION_LIMIT: f64 = 180.0;

/// Placement of an image inside the banner.
///
/// `scale` is always strictly positive. User-facing setters clamp into the
/// ranges above; [`ImageTransform::auto_scaled`] deliberately bypasses the
/// scale clamp so a freshly attached image fills the banner height exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageTransform {
    pub scale: f64,
    pub pan_x: i32,
    pub pan_y: i32,
    pub rotation_degrees: f64,
    pub flip_horizontal: bool,
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            pan_x: 0,
            pan_y: 0,
            rotation_degrees: 0.0,
            flip_horizontal: false,
        }
    }
}

impl ImageTransform {
    /// Transform for a newly attached image: auto-scale, pan at origin.
    ///
    /// Rotation and flip are carried over from `previous`, they are
    /// independent of the image itself.
    pub fn auto_scaled(previous: &ImageTransform, natural_height: u32) -> Self {
        Self {
            scale: super::auto_scale(natural_height),
            pan_x: 0,
            pan_y: 0,
            rotation_degrees: previous.rotation_degrees,
            flip_horizontal: previous.flip_horizontal,
        }
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = clamp_scale(scale);
    }

    pub fn set_pan(&mut self, pan_x: i32, pan_y: i32) {
        self.pan_x = clamp_pan(pan_x);
        self.pan_y = clamp_pan(pan_y);
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation_degrees = clamp_rotation(degrees);
    }

    pub fn toggle_flip(&mut self) {
        self.flip_horizontal = !self.flip_horizontal;
    }

    /// Re-apply every invariant, e.g. after deserializing.
    ///
    /// A scale outside the user range is kept when positive and finite,
    /// since auto-scaled values may legitimately fall outside it.
    pub fn sanitized(&self) -> Self {
        let scale = if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            ImageTransform::default().scale
        };
        Self {
            scale,
            pan_x: clamp_pan(self.pan_x),
            pan_y: clamp_pan(self.pan_y),
            rotation_degrees: clamp_rotation(self.rotation_degrees),
            flip_horizontal: self.flip_horizontal,
        }
    }
}

/// Clamp a scale into `[SCALE_MIN, SCALE_MAX]`; NaN falls back to 1.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return ImageTransform::default().scale;
    }
    scale.clamp(SCALE_MIN, SCALE_MAX)
}

pub fn clamp_pan(pan: i32) -> i32 {
    pan.clamp(-PAN_LIMIT, PAN_LIMIT)
}

/// Clamp a rotation into `[-180, 180]`; NaN falls back to 0.
pub fn clamp_rotation(degrees: f64) -> f64 {
    if degrees.is_nan() {
        return 0.0;
    }
    degrees.clamp(-ROTATION_LIMIT, ROTATION_LIMIT)
}
