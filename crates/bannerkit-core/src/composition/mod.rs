//! The banner composition: every visual parameter the preview and the
//! export are rendered from.
//!
//! There is exactly one record; the renderer and the exporter both read it,
//! so there is no export-only state that could drift from the preview.
//! Mutators validate by clamping or truncating and never fail.

mod slots;
mod text;
mod theme;

pub use slots::{ImageRef, ImageSlot, ImageSlots, SlotKind};
pub use text::{split_lines, truncate_chars, TextContent, MAX_TEXT_CHARS};
pub use theme::{ThemeConfig, ThemeId};

use serde::{Deserialize, Serialize};

use crate::geometry::ImageTransform;

/// Vertical placement of the text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Start,
    Center,
    End,
}

/// Rotation presets of the subtitle badge, in degrees.
///
/// Unrelated to the image rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub enum BadgeRotation {
    TiltLeft,
    #[default]
    Level,
    TiltRight,
}

impl BadgeRotation {
    pub const PRESETS: [BadgeRotation; 3] = [
        BadgeRotation::TiltLeft,
        BadgeRotation::Level,
        BadgeRotation::TiltRight,
    ];

    pub fn degrees(self) -> f64 {
        match self {
            BadgeRotation::TiltLeft => -2.0,
            BadgeRotation::Level => 0.0,
            BadgeRotation::TiltRight => 2.0,
        }
    }

    /// Nearest preset to an arbitrary angle; NaN maps to level.
    pub fn nearest(degrees: f64) -> Self {
        if degrees.is_nan() {
            return BadgeRotation::Level;
        }
        if degrees <= -1.0 {
            BadgeRotation::TiltLeft
        } else if degrees >= 1.0 {
            BadgeRotation::TiltRight
        } else {
            BadgeRotation::Level
        }
    }
}

impl From<f64> for BadgeRotation {
    fn from(degrees: f64) -> Self {
        BadgeRotation::nearest(degrees)
    }
}

impl From<BadgeRotation> for f64 {
    fn from(rotation: BadgeRotation) -> Self {
        rotation.degrees()
    }
}

/// Subtitle background ("badge") settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Badge {
    pub enabled: bool,
    pub rotation: BadgeRotation,
}

/// Font sizes and spacing, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    pub title_font_size: f64,
    pub title_line_height: f64,
    pub subtitle_font_size: f64,
    pub subtitle_line_height: f64,
    pub subtitle_bold: bool,
    /// Gap between the title block and the subtitle block.
    pub text_gap: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            title_font_size: 34.0,
            title_line_height: 32.0,
            subtitle_font_size: 24.0,
            subtitle_line_height: 28.0,
            subtitle_bold: false,
            text_gap: 8.0,
        }
    }
}

impl Typography {
    /// Bounds for any size or spacing value.
    pub const MIN_SIZE: f64 = 1.0;
    pub const MAX_SIZE: f64 = 120.0;

    pub fn sanitized(&self) -> Self {
        let defaults = Typography::default();
        let size = |value: f64, fallback: f64| {
            if value.is_finite() {
                value.clamp(Self::MIN_SIZE, Self::MAX_SIZE)
            } else {
                fallback
            }
        };
        Self {
            title_font_size: size(self.title_font_size, defaults.title_font_size),
            title_line_height: size(self.title_line_height, defaults.title_line_height),
            subtitle_font_size: size(self.subtitle_font_size, defaults.subtitle_font_size),
            subtitle_line_height: size(self.subtitle_line_height, defaults.subtitle_line_height),
            subtitle_bold: self.subtitle_bold,
            text_gap: if self.text_gap.is_finite() {
                self.text_gap.clamp(0.0, Self::MAX_SIZE)
            } else {
                defaults.text_gap
            },
        }
    }
}

/// Every editable parameter of one banner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BannerComposition {
    pub text: TextContent,
    pub theme: ThemeId,
    pub typography: Typography,
    pub alignment: TextAlignment,
    pub badge: Badge,
    pub image_prompt: String,
    pub slots: ImageSlots,
    /// Selects both the displayed slot and its anchor mode.
    pub active_slot: SlotKind,
}

impl BannerComposition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme_config(&self) -> &'static ThemeConfig {
        self.theme.config()
    }

    pub fn set_title(&mut self, title: &str) {
        self.text.set_title(title);
    }

    pub fn set_subtitle(&mut self, subtitle: &str) {
        self.text.set_subtitle(subtitle);
    }

    pub fn set_theme(&mut self, theme: ThemeId) {
        self.theme = theme;
    }

    pub fn set_alignment(&mut self, alignment: TextAlignment) {
        self.alignment = alignment;
    }

    pub fn set_typography(&mut self, typography: Typography) {
        self.typography = typography.sanitized();
    }

    pub fn set_badge_enabled(&mut self, enabled: bool) {
        self.badge.enabled = enabled;
    }

    pub fn set_badge_rotation(&mut self, degrees: f64) {
        self.badge.rotation = BadgeRotation::nearest(degrees);
    }

    pub fn set_image_prompt(&mut self, prompt: &str) {
        self.image_prompt = prompt.to_string();
    }

    pub fn active(&self) -> &ImageSlot {
        &self.slots[self.active_slot]
    }

    pub fn active_transform_mut(&mut self) -> &mut ImageTransform {
        &mut self.slots[self.active_slot].transform
    }

    pub fn set_active_slot(&mut self, kind: SlotKind) {
        self.active_slot = kind;
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.active_transform_mut().set_scale(scale);
    }

    pub fn set_pan(&mut self, pan_x: i32, pan_y: i32) {
        self.active_transform_mut().set_pan(pan_x, pan_y);
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.active_transform_mut().set_rotation(degrees);
    }

    pub fn toggle_flip(&mut self) {
        self.active_transform_mut().toggle_flip();
    }

    pub fn set_flip(&mut self, flip_horizontal: bool) {
        self.active_transform_mut().flip_horizontal = flip_horizontal;
    }

    pub fn attach_image(&mut self, kind: SlotKind, image: ImageRef) {
        self.slots[kind].attach(image);
    }

    pub fn clear_slot(&mut self, kind: SlotKind) {
        self.slots[kind].clear();
    }

    /// Restore defaults for everything except the image slots.
    pub fn reset_keeping_images(&mut self) {
        let slots = std::mem::take(&mut self.slots);
        let active_slot = self.active_slot;
        *self = Self {
            slots,
            active_slot,
            ..Self::default()
        };
    }

    /// Re-apply every invariant, e.g. after loading from storage.
    pub fn sanitized(&self) -> Self {
        Self {
            text: self.text.sanitized(),
            theme: self.theme,
            typography: self.typography.sanitized(),
            alignment: self.alignment,
            badge: self.badge,
            image_prompt: self.image_prompt.clone(),
            slots: self.slots.sanitized(),
            active_slot: self.active_slot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = BannerComposition::new();
        assert_eq!(c.theme, ThemeId::Blue);
        assert_eq!(c.alignment, TextAlignment::Start);
        assert_eq!(c.active_slot, SlotKind::Generated);
        assert!(c.active().is_empty());
        assert_eq!(c.typography.title_font_size, 34.0);
    }

    #[test]
    fn test_mutators_clamp() {
        let mut c = BannerComposition::new();
        c.set_scale(10.0);
        assert_eq!(c.active().transform.scale, 3.0);
        c.set_scale(0.0);
        assert_eq!(c.active().transform.scale, 0.05);
        c.set_pan(500, -500);
        assert_eq!(c.active().transform.pan_x, 200);
        assert_eq!(c.active().transform.pan_y, -200);
    }

    #[test]
    fn test_title_truncation() {
        let mut c = BannerComposition::new();
        c.set_title(&"t".repeat(250));
        assert_eq!(c.text.title.chars().count(), MAX_TEXT_CHARS);
    }

    #[test]
    fn test_slot_switch_preserves_transforms() {
        let mut c = BannerComposition::new();
        c.set_active_slot(SlotKind::Uploaded);
        c.attach_image(SlotKind::Uploaded, ImageRef::new("up", 1000, 500));
        c.set_pan(50, -20);

        c.set_active_slot(SlotKind::Generated);
        c.set_rotation(12.0);
        c.set_active_slot(SlotKind::Uploaded);

        let t = c.active().transform;
        assert_eq!((t.pan_x, t.pan_y), (50, -20));
        assert!((t.scale - 0.336).abs() < 1e-12);
        assert_eq!(t.rotation_degrees, 0.0);
        assert_eq!(c.slots[SlotKind::Generated].transform.rotation_degrees, 12.0);
    }

    #[test]
    fn test_badge_rotation_snaps() {
        let mut c = BannerComposition::new();
        c.set_badge_rotation(1.7);
        assert_eq!(c.badge.rotation, BadgeRotation::TiltRight);
        c.set_badge_rotation(-5.0);
        assert_eq!(c.badge.rotation, BadgeRotation::TiltLeft);
        c.set_badge_rotation(0.4);
        assert_eq!(c.badge.rotation, BadgeRotation::Level);
    }

    #[test]
    fn test_badge_rotation_serializes_as_degrees() {
        let badge = Badge {
            enabled: true,
            rotation: BadgeRotation::TiltLeft,
        };
        let json = serde_json::to_value(badge).unwrap();
        assert_eq!(json["rotation"], -2.0);
        let back: Badge = serde_json::from_str(r#"{"rotation": 2}"#).unwrap();
        assert_eq!(back.rotation, BadgeRotation::TiltRight);
    }

    #[test]
    fn test_reset_keeps_images() {
        let mut c = BannerComposition::new();
        c.set_title("Hello");
        c.set_theme(ThemeId::Black);
        c.attach_image(SlotKind::Generated, ImageRef::new("g", 100, 100));
        c.reset_keeping_images();
        assert_eq!(c.text.title, "");
        assert_eq!(c.theme, ThemeId::Blue);
        assert!(!c.slots[SlotKind::Generated].is_empty());
    }

    #[test]
    fn test_typography_sanitized() {
        let mut c = BannerComposition::new();
        c.set_typography(Typography {
            title_font_size: 500.0,
            subtitle_line_height: f64::NAN,
            text_gap: -3.0,
            ..Typography::default()
        });
        assert_eq!(c.typography.title_font_size, Typography::MAX_SIZE);
        assert_eq!(c.typography.subtitle_line_height, 28.0);
        assert_eq!(c.typography.text_gap, 0.0);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut c = BannerComposition::new();
        c.attach_image(SlotKind::Generated, ImageRef::new("g", 100, 100));
        let snapshot = c.clone();
        c.set_pan(10, 10);
        c.set_title("changed");
        assert_eq!(snapshot.active().transform.pan_x, 0);
        assert_eq!(snapshot.text.title, "");
    }
}
