//! Fixed banner layout, in logical pixels at display scale 1.
//!
//! Every dimension the renderer emits is one of these constants multiplied
//! by the display scale, so preview and export stay proportional.

/// Width of the banner canvas.
pub const CANVAS_WIDTH: f64 = 640.0;
/// Height of the banner canvas.
pub const CANVAS_HEIGHT: f64 = 168.0;
/// Width of the right-aligned image area.
pub const IMAGE_AREA_WIDTH: f64 = 194.0;
/// Corner radius of the banner outline.
pub const CORNER_RADIUS: f64 = 24.0;

/// Left padding of the text block.
pub const TEXT_PADDING_LEFT: f64 = 24.0;
/// Top padding of the text block.
pub const TEXT_PADDING_TOP: f64 = 20.0;
/// Bottom padding of the text block.
pub const TEXT_PADDING_BOTTOM: f64 = 20.0;

/// Horizontal padding inside the subtitle badge.
pub const BADGE_PADDING_X: f64 = 12.0;
/// Vertical padding inside the subtitle badge.
pub const BADGE_PADDING_Y: f64 = 4.0;
/// Corner radius of the subtitle badge.
pub const BADGE_RADIUS: f64 = 8.0;

/// Font size of the empty image-area label.
pub const PLACEHOLDER_FONT_SIZE: f64 = 12.0;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Multiply every component by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(
            self.x * factor,
            self.y * factor,
            self.width * factor,
            self.height * factor,
        )
    }
}

/// The whole banner canvas.
pub fn canvas_rect() -> Rect {
    Rect::new(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT)
}

/// The reserved image area at the right edge of the canvas.
pub fn image_area_rect() -> Rect {
    Rect::new(
        CANVAS_WIDTH - IMAGE_AREA_WIDTH,
        0.0,
        IMAGE_AREA_WIDTH,
        CANVAS_HEIGHT,
    )
}

/// The content box the text block is laid out in.
///
/// The right padding equals the image-area width, so text never runs under
/// the image.
pub fn text_content_rect() -> Rect {
    Rect::new(
        TEXT_PADDING_LEFT,
        TEXT_PADDING_TOP,
        CANVAS_WIDTH - TEXT_PADDING_LEFT - IMAGE_AREA_WIDTH,
        CANVAS_HEIGHT - TEXT_PADDING_TOP - TEXT_PADDING_BOTTOM,
    )
}
