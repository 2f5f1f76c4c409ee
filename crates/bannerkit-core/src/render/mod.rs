//! Preview renderer: composition → visual tree → SVG.
//!
//! Rendering is a pure function of the composition and a display scale.
//! The display scale is a zoom for the on-screen box and multiplies every
//! dimension uniformly; it is unrelated to the image transform's scale.
//!
//! # Examples
//!
//! ```ignore
//! use bannerkit_core::{composition::BannerComposition, render::render_preview};
//!
//! let mut banner = BannerComposition::new();
//! banner.set_title("Hello\nWorld");
//! let tree = render_preview(&banner, 1.0).unwrap();
//! let svg = tree.to_svg();
//! ```

mod svg;
mod tree;

pub use tree::{
    Background, BadgeNode, ImageArea, ImageAreaContent, ImageClip, ImageNode, LineSpan,
    PlaceholderNode, SubtitleNode, TextNode, VisualTree, FONT_FAMILY, IMAGE_PLACEHOLDER_LABEL,
    SUBTITLE_PLACEHOLDER, TITLE_PLACEHOLDER,
};

use thiserror::Error;
use tracing::debug;

use crate::composition::BannerComposition;

/// Errors that can occur while rendering the preview.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    /// Display scale is zero, negative or not finite
    #[error("Invalid display scale: {0} (must be finite and > 0)")]
    InvalidDisplayScale(f64),
}

/// Render `composition` at `display_scale`.
pub fn render_preview(
    composition: &BannerComposition,
    display_scale: f64,
) -> Result<VisualTree, RenderError> {
    if !display_scale.is_finite() || display_scale <= 0.0 {
        return Err(RenderError::InvalidDisplayScale(display_scale));
    }
    let tree = tree::build(composition, display_scale);
    debug!(
        display_scale,
        slot = composition.active_slot.as_str(),
        has_image = !composition.active().is_empty(),
        "Rendered banner preview"
    );
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{ImageRef, SlotKind, TextAlignment, ThemeId};

    fn hello_world() -> BannerComposition {
        let mut c = BannerComposition::new();
        c.set_title("Hello\nWorld");
        c.set_subtitle("Sub");
        c.set_theme(ThemeId::Blue);
        c
    }

    #[test]
    fn test_end_to_end_text_only() {
        let tree = render_preview(&hello_world(), 1.0).unwrap();

        let title: Vec<_> = tree.title.lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(title, vec!["Hello", "World"]);
        assert_eq!(tree.subtitle.text.lines.len(), 1);
        assert_eq!(tree.subtitle.text.lines[0].text, "Sub");

        assert_eq!(tree.background.start_color, "#0065FF");
        assert_eq!(tree.background.end_color, "#61A4FF");
        let line = tree.background.line;
        assert!(line.x1 < line.x2 && line.y1 < line.y2, "diagonal top-left to bottom-right");

        match &tree.image_area.content {
            ImageAreaContent::Placeholder(p) => assert_eq!(p.label, IMAGE_PLACEHOLDER_LABEL),
            other => panic!("expected placeholder, got {:?}", other),
        }
        assert!(tree.image_hrefs().is_empty());
    }

    #[test]
    fn test_line_spans_match_newlines() {
        let mut c = BannerComposition::new();
        for text in ["one", "one\ntwo", "a\nb\nc", "trailing\n", "\n\n"] {
            c.set_title(text);
            c.set_subtitle(text);
            let tree = render_preview(&c, 1.0).unwrap();
            assert_eq!(tree.title.lines.len(), text.split('\n').count());
            assert_eq!(tree.subtitle.text.lines.len(), text.split('\n').count());
        }
    }

    #[test]
    fn test_empty_text_uses_placeholder() {
        let tree = render_preview(&BannerComposition::new(), 1.0).unwrap();
        assert!(tree.title.is_placeholder);
        assert!(tree.subtitle.text.is_placeholder);
        assert_eq!(tree.title.lines.len(), 2);
        assert_eq!(tree.title.lines[0].text, "Заголовок вашего баннера");
        assert_eq!(tree.subtitle.text.lines[1].text, "дополнительной в пару строк");
    }

    #[test]
    fn test_display_scale_multiplies_everything() {
        let c = hello_world();
        let one = render_preview(&c, 1.0).unwrap();
        let two = render_preview(&c, 2.0).unwrap();

        assert_eq!((one.width, one.height), (640.0, 168.0));
        assert_eq!((two.width, two.height), (1280.0, 336.0));
        assert_eq!(two.corner_radius, 48.0);
        assert_eq!(two.title.font_size, one.title.font_size * 2.0);
        assert_eq!(two.title.lines[1].baseline, one.title.lines[1].baseline * 2.0);
        assert_eq!(two.image_area.rect.width, 388.0);
    }

    #[test]
    fn test_invalid_display_scale() {
        let c = BannerComposition::new();
        assert!(matches!(
            render_preview(&c, 0.0),
            Err(RenderError::InvalidDisplayScale(_))
        ));
        assert!(render_preview(&c, f64::NAN).is_err());
        assert!(render_preview(&c, -1.0).is_err());
    }

    #[test]
    fn test_alignment() {
        let mut c = hello_world();
        // Block: 2 * 32 + 8 + 1 * 28 = 100 px inside a 128 px box at y = 20.
        let top_of = |c: &BannerComposition| render_preview(c, 1.0).unwrap().title.lines[0].top;

        c.set_alignment(TextAlignment::Start);
        assert_eq!(top_of(&c), 20.0);
        c.set_alignment(TextAlignment::Center);
        assert_eq!(top_of(&c), 34.0);
        c.set_alignment(TextAlignment::End);
        assert_eq!(top_of(&c), 48.0);
    }

    #[test]
    fn test_badge_is_independent_of_image_rotation() {
        let mut c = hello_world();
        c.set_badge_enabled(true);
        c.set_badge_rotation(2.0);
        c.attach_image(SlotKind::Generated, ImageRef::new("data:image/png;base64,AA==", 100, 100));
        c.set_rotation(45.0);

        let tree = render_preview(&c, 1.0).unwrap();
        let badge = tree.subtitle.badge.as_ref().unwrap();
        assert_eq!(badge.rotation_degrees, 2.0);
        assert_eq!(badge.color, "#BFFF44");
        assert_eq!(tree.subtitle.text.color, "#000000");
        assert_eq!(tree.title.color, "#000000");

        // Badge center is a fixed point of its rotation.
        let (cx, cy) = badge.rect.center();
        let (x, y) = badge.transform.apply(cx, cy);
        assert!((x - cx).abs() < 1e-9 && (y - cy).abs() < 1e-9);

        c.set_rotation(-90.0);
        let again = render_preview(&c, 1.0).unwrap();
        assert_eq!(again.subtitle.badge, tree.subtitle.badge);
    }

    #[test]
    fn test_badge_pads_subtitle() {
        let mut c = hello_world();
        c.set_badge_enabled(true);
        let tree = render_preview(&c, 1.0).unwrap();
        let badge = tree.subtitle.badge.as_ref().unwrap();
        let line = &tree.subtitle.text.lines[0];
        assert_eq!(line.x, badge.rect.x + 12.0);
        assert_eq!(line.top, badge.rect.y + 4.0);
        assert_eq!(badge.rect.height, 28.0 + 8.0);
    }

    #[test]
    fn test_clip_follows_active_slot() {
        let mut c = hello_world();
        c.attach_image(SlotKind::Generated, ImageRef::new("data:g", 1024, 1024));
        c.attach_image(SlotKind::Uploaded, ImageRef::new("data:u", 1000, 500));

        let tree = render_preview(&c, 1.0).unwrap();
        let ImageAreaContent::Image(image) = &tree.image_area.content else {
            panic!("expected image");
        };
        assert_eq!(image.clip, ImageClip::ImageArea);
        assert_eq!(image.href, "data:g");

        c.set_active_slot(SlotKind::Uploaded);
        let tree = render_preview(&c, 1.0).unwrap();
        let ImageAreaContent::Image(image) = &tree.image_area.content else {
            panic!("expected image");
        };
        assert_eq!(image.clip, ImageClip::Banner);
        // 336 px wide upload spills out of the 194 px area.
        assert!(image.overflows_area);
    }

    #[test]
    fn test_image_matrix_includes_display_scale() {
        let mut c = hello_world();
        c.set_active_slot(SlotKind::Uploaded);
        c.attach_image(SlotKind::Uploaded, ImageRef::new("data:u", 1000, 500));
        let tree = render_preview(&c, 2.0).unwrap();
        let ImageAreaContent::Image(image) = &tree.image_area.content else {
            panic!("expected image");
        };
        let (cx, cy) = image.matrix.apply(500.0, 250.0);
        assert!((cx - 1086.0).abs() < 1e-9);
        assert!((cy - 168.0).abs() < 1e-9);
    }

    #[test]
    fn test_svg_document() {
        let mut c = hello_world();
        c.set_subtitle("Tom & <Jerry>");
        let svg = render_preview(&c, 1.0).unwrap().to_svg();

        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"width="640" height="168""#));
        assert!(svg.contains(r##"stop-color="#0065FF""##));
        assert!(svg.contains(r##"stop-color="#61A4FF""##));
        assert_eq!(svg.matches("<tspan").count(), 3);
        assert!(svg.contains("Tom &amp; &lt;Jerry&gt;"));
        assert!(svg.contains(IMAGE_PLACEHOLDER_LABEL));
    }

    #[test]
    fn test_svg_is_deterministic() {
        let c = hello_world();
        let a = render_preview(&c, 1.5).unwrap().to_svg();
        let b = render_preview(&c, 1.5).unwrap().to_svg();
        assert_eq!(a, b);
    }

    #[test]
    fn test_svg_image_element() {
        let mut c = hello_world();
        c.attach_image(SlotKind::Generated, ImageRef::new("data:image/png;base64,AA==", 100, 50));
        let svg = render_preview(&c, 1.0).unwrap().to_svg();
        assert!(svg.contains(r#"xlink:href="data:image/png;base64,AA==""#));
        assert!(svg.contains(r#"width="100" height="50" preserveAspectRatio="none""#));
        assert!(svg.contains("bk-image-area-clip"));
    }
}
