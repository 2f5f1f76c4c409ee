//! Image geometry shared by the preview renderer and the export pipeline.
//!
//! # Transform Order
//!
//! An image placement is one affine transform applied in this fixed order:
//! 1. Translate to the image-area center plus pan
//! 2. Rotate
//! 3. Uniform scale
//! 4. Horizontal mirror (in local space)
//!
//! # Coordinate System
//!
//! - Logical banner pixels, 640x168, origin top-left, y down
//! - Rotation angles are in degrees, positive = clockwise on screen
//! - The display scale is applied on top, uniformly, by the renderer

mod affine;
mod gradient;
mod placement;
mod transform;

pub use affine::Affine;
pub(crate) use affine::fmt_num;
pub use gradient::{gradient_line, GradientLine, BANNER_GRADIENT_ANGLE};
pub use placement::{
    auto_scale, contain_fit, image_placement, rotated_bounds, AnchorMode, ImagePlacement,
};
pub use transform::{
    clamp_pan, clamp_rotation, clamp_scale, ImageTransform, PAN_LIMIT, ROTATION_LIMIT,
    SCALE_MAX, SCALE_MIN,
};
