//! CSS `linear-gradient(<angle>, ...)` endpoints.
//!
//! CSS measures the angle clockwise from "to top" and sizes the gradient
//! line so the corners get the pure start and end colors:
//!
//! ```text
//! length = |w * sin(θ)| + |h * cos(θ)|
//! ```

/// Angle of the banner background gradient.
pub const BANNER_GRADIENT_ANGLE: f64 = 135.0;

/// Start and end points of a gradient line, in the box's coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Gradient line for a `width` x `height` box at `angle_degrees`.
pub fn gradient_line(width: f64, height: f64, angle_degrees: f64) -> GradientLine {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let (dx, dy) = (sin, -cos);
    let half = ((width * sin).abs() + (height * cos).abs()) / 2.0;
    let (cx, cy) = (width / 2.0, height / 2.0);
    GradientLine {
        x1: cx - dx * half,
        y1: cy - dy * half,
        x2: cx + dx * half,
        y2: cy + dy * half,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_to_bottom() {
        let g = gradient_line(640.0, 168.0, 180.0);
        assert!((g.x1 - 320.0).abs() < TOL && g.y1.abs() < TOL);
        assert!((g.x2 - 320.0).abs() < TOL && (g.y2 - 168.0).abs() < TOL);
    }

    #[test]
    fn test_diagonal_on_square_hits_corners() {
        let g = gradient_line(100.0, 100.0, 135.0);
        assert!(g.x1.abs() < TOL && g.y1.abs() < TOL);
        assert!((g.x2 - 100.0).abs() < TOL && (g.y2 - 100.0).abs() < TOL);
    }

    #[test]
    fn test_diagonal_on_banner_runs_top_left_to_bottom_right() {
        let g = gradient_line(640.0, 168.0, BANNER_GRADIENT_ANGLE);
        assert!(g.x1 < g.x2);
        assert!(g.y1 < g.y2);
        // Symmetric about the center.
        assert!((g.x1 + g.x2 - 640.0).abs() < TOL);
        assert!((g.y1 + g.y2 - 168.0).abs() < TOL);
    }
}
