//! 2D affine matrices in SVG `matrix(a b c d e f)` layout.
//!
//! A point maps as:
//! ```text
//! x' = a * x + c * y + e
//! y' = b * x + d * y + f
//! ```
//!
//! Angles follow CSS/SVG screen conventions: positive degrees rotate
//! clockwise because the y axis points down.

/// Tolerance used by [`Affine::approx_eq`].
pub const EPSILON: f64 = 1e-9;

/// A 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// Rotation about the origin.
    pub fn rotate(degrees: f64) -> Self {
        // Reduce first so 360-degree multiples come out bit-exact.
        let rad = (degrees % 360.0).to_radians();
        let (sin, cos) = rad.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// `self · other`: the result applies `other` first, then `self`.
    pub fn then_apply(&self, other: &Affine) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Map a point through the transform.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Affine, tolerance: f64) -> bool {
        [
            self.a - other.a,
            self.b - other.b,
            self.c - other.c,
            self.d - other.d,
            self.e - other.e,
            self.f - other.f,
        ]
        .iter()
        .all(|delta| delta.abs() <= tolerance)
    }

    pub fn is_identity(&self) -> bool {
        self.approx_eq(&Self::IDENTITY, EPSILON)
    }

    /// Format as an SVG `matrix(...)` attribute value.
    pub fn to_svg(&self) -> String {
        format!(
            "matrix({} {} {} {} {} {})",
            fmt_coefficient(self.a),
            fmt_coefficient(self.b),
            fmt_coefficient(self.c),
            fmt_coefficient(self.d),
            fmt_coefficient(self.e),
            fmt_coefficient(self.f)
        )
    }
}

/// Format a number compactly, trimming float noise.
pub(crate) fn fmt_num(value: f64) -> String {
    fmt_rounded(value, 10_000.0)
}

/// Matrix entries multiply natural image sizes, so they keep more digits.
fn fmt_coefficient(value: f64) -> String {
    fmt_rounded(value, 1e9)
}

fn fmt_rounded(value: f64, factor: f64) -> String {
    let rounded = (value * factor).round() / factor;
    // Avoid "-0" in output.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{}", rounded)
}
