//! Visual tree produced from a composition.
//!
//! All coordinates in the tree are final: the display scale has already
//! been applied to every dimension (canvas, fonts, paddings, radii and the
//! image matrix), so serializers only have to write them out.

use crate::composition::{split_lines, BannerComposition, ImageRef, TextAlignment};
use crate::geometry::{
    gradient_line, image_placement, Affine, AnchorMode, GradientLine, BANNER_GRADIENT_ANGLE,
};
use crate::layout::{self, Rect};

/// Font stack for all banner text.
pub const FONT_FAMILY: &str = "'Euclid Circular A', 'Inter', sans-serif";

/// Copy shown while the title is empty.
pub const TITLE_PLACEHOLDER: &str = "Заголовок вашего баннера\nнаписаный в пару строк";
/// Copy shown while the subtitle is empty.
pub const SUBTITLE_PLACEHOLDER: &str = "Подзаголовок для информации\nдополнительной в пару строк";
/// Label of the empty image area.
pub const IMAGE_PLACEHOLDER_LABEL: &str = "AI Image";

// Ascent and descent of the font stack, as fractions of the font size.
const ASCENT: f64 = 0.95;
const DESCENT: f64 = 0.25;
// Mean advance per character, used to size the badge.
const MEAN_ADVANCE: f64 = 0.56;
const MEAN_ADVANCE_BOLD: f64 = 0.6;

/// Root of the rendered banner.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualTree {
    pub display_scale: f64,
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    pub background: Background,
    pub title: TextNode,
    pub subtitle: SubtitleNode,
    pub image_area: ImageArea,
}

impl VisualTree {
    /// Whether rasterizing the tree draws any glyphs.
    pub fn has_text(&self) -> bool {
        let has_glyphs = |node: &TextNode| node.lines.iter().any(|l| !l.text.trim().is_empty());
        let placeholder_label = match &self.image_area.content {
            ImageAreaContent::Placeholder(p) => !p.label.trim().is_empty(),
            ImageAreaContent::Image(_) => false,
        };
        has_glyphs(&self.title) || has_glyphs(&self.subtitle.text) || placeholder_label
    }

    /// Every image href referenced by the tree.
    pub fn image_hrefs(&self) -> Vec<&str> {
        match &self.image_area.content {
            ImageAreaContent::Image(image) => vec![image.href.as_str()],
            ImageAreaContent::Placeholder(_) => Vec::new(),
        }
    }
}

/// Diagonal background gradient.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub start_color: String,
    pub end_color: String,
    pub line: GradientLine,
}

/// One forced line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSpan {
    pub text: String,
    pub x: f64,
    /// Top of the line box.
    pub top: f64,
    /// Alphabetic baseline.
    pub baseline: f64,
}

/// A run of lines sharing one style.
#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub lines: Vec<LineSpan>,
    pub font_size: f64,
    pub line_height: f64,
    pub font_weight: u16,
    pub color: String,
    /// The source text was empty and placeholder copy is shown.
    pub is_placeholder: bool,
}

/// Subtitle, optionally wrapped in a badge.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleNode {
    pub text: TextNode,
    pub badge: Option<BadgeNode>,
}

/// Rounded, padded, optionally rotated subtitle background.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeNode {
    pub rect: Rect,
    pub radius: f64,
    pub color: String,
    pub rotation_degrees: f64,
    /// Rotation about the badge center; applies to the badge and its text.
    pub transform: Affine,
}

/// The reserved area at the right edge.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageArea {
    pub rect: Rect,
    pub content: ImageAreaContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageAreaContent {
    Placeholder(PlaceholderNode),
    Image(ImageNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderNode {
    pub fill_color: String,
    pub fill_opacity: f64,
    pub label: String,
    pub label_font_size: f64,
    pub label_opacity: f64,
}

/// Region an image is clipped to, inside the banner outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageClip {
    /// Clipped to the image area (contain mode).
    ImageArea,
    /// Clipped only by the rounded banner outline (overlay mode).
    Banner,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageNode {
    pub href: String,
    pub natural_width: u32,
    pub natural_height: u32,
    /// Image-local pixels to tree pixels, display scale included.
    pub matrix: Affine,
    /// CSS transform describing the same placement at display scale 1.
    pub css_transform: String,
    pub clip: ImageClip,
    /// The image extends past the image area.
    pub overflows_area: bool,
}

/// Build the visual tree for `composition` at `display_scale`.
///
/// `display_scale` must be finite and positive; the caller validates it.
pub(crate) fn build(composition: &BannerComposition, display_scale: f64) -> VisualTree {
    let s = display_scale;
    let theme = composition.theme_config();
    let typo = &composition.typography;
    let badge_enabled = composition.badge.enabled;

    let canvas = layout::canvas_rect();
    let content = layout::text_content_rect();

    let (title_src, title_placeholder) = or_placeholder(&composition.text.title, TITLE_PLACEHOLDER);
    let (subtitle_src, subtitle_placeholder) =
        or_placeholder(&composition.text.subtitle, SUBTITLE_PLACEHOLDER);
    let title_lines = split_lines(title_src);
    let subtitle_lines = split_lines(subtitle_src);

    // Block height in logical pixels, then justify within the content box.
    let badge_padding_y = if badge_enabled {
        layout::BADGE_PADDING_Y
    } else {
        0.0
    };
    let title_height = title_lines.len() as f64 * typo.title_line_height;
    let subtitle_height =
        subtitle_lines.len() as f64 * typo.subtitle_line_height + 2.0 * badge_padding_y;
    let block_height = title_height + typo.text_gap + subtitle_height;
    let block_top = match composition.alignment {
        TextAlignment::Start => content.y,
        TextAlignment::Center => content.y + (content.height - block_height) / 2.0,
        TextAlignment::End => content.y + content.height - block_height,
    };

    let title_color = if badge_enabled {
        theme.title_color_on_subtitle_background
    } else {
        theme.title_color
    };
    let title = TextNode {
        lines: lay_out_lines(
            &title_lines,
            content.x,
            block_top,
            typo.title_font_size,
            typo.title_line_height,
            s,
        ),
        font_size: typo.title_font_size * s,
        line_height: typo.title_line_height * s,
        font_weight: 700,
        color: title_color.to_string(),
        is_placeholder: title_placeholder,
    };

    let subtitle_top = block_top + title_height + typo.text_gap;
    let subtitle_weight = if typo.subtitle_bold { 700 } else { 400 };
    let text_x = if badge_enabled {
        content.x + layout::BADGE_PADDING_X
    } else {
        content.x
    };
    let subtitle_text = TextNode {
        lines: lay_out_lines(
            &subtitle_lines,
            text_x,
            subtitle_top + badge_padding_y,
            typo.subtitle_font_size,
            typo.subtitle_line_height,
            s,
        ),
        font_size: typo.subtitle_font_size * s,
        line_height: typo.subtitle_line_height * s,
        font_weight: subtitle_weight,
        color: if badge_enabled {
            theme.subtitle_color_on_background
        } else {
            theme.subtitle_color
        }
        .to_string(),
        is_placeholder: subtitle_placeholder,
    };

    let badge = badge_enabled.then(|| {
        let advance = if typo.subtitle_bold {
            MEAN_ADVANCE_BOLD
        } else {
            MEAN_ADVANCE
        };
        let widest = subtitle_lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0) as f64;
        let width = (widest * typo.subtitle_font_size * advance + 2.0 * layout::BADGE_PADDING_X)
            .min(content.width);
        let rect = Rect::new(content.x, subtitle_top, width, subtitle_height).scaled(s);
        let rotation_degrees = composition.badge.rotation.degrees();
        let (cx, cy) = rect.center();
        BadgeNode {
            rect,
            radius: layout::BADGE_RADIUS * s,
            color: theme.subtitle_background_color.to_string(),
            rotation_degrees,
            transform: Affine::translate(cx, cy)
                .then_apply(&Affine::rotate(rotation_degrees))
                .then_apply(&Affine::translate(-cx, -cy)),
        }
    });

    let area = layout::image_area_rect();
    let active = composition.active();
    let area_content = match &active.image {
        Some(image) => ImageAreaContent::Image(image_node(image, composition, s)),
        None => ImageAreaContent::Placeholder(PlaceholderNode {
            fill_color: theme.title_color.to_string(),
            fill_opacity: 0.1,
            label: IMAGE_PLACEHOLDER_LABEL.to_string(),
            label_font_size: layout::PLACEHOLDER_FONT_SIZE * s,
            label_opacity: 0.4,
        }),
    };

    let width = canvas.width * s;
    let height = canvas.height * s;
    VisualTree {
        display_scale: s,
        width,
        height,
        corner_radius: layout::CORNER_RADIUS * s,
        background: Background {
            start_color: theme.background_start.to_string(),
            end_color: theme.background_end.to_string(),
            line: gradient_line(width, height, BANNER_GRADIENT_ANGLE),
        },
        title,
        subtitle: SubtitleNode {
            text: subtitle_text,
            badge,
        },
        image_area: ImageArea {
            rect: area.scaled(s),
            content: area_content,
        },
    }
}

fn image_node(image: &ImageRef, composition: &BannerComposition, s: f64) -> ImageNode {
    let mode = composition.active_slot.anchor_mode();
    let placement = image_placement(
        &composition.active().transform,
        image.natural_width,
        image.natural_height,
        mode,
    );
    let clip = match mode {
        AnchorMode::Contain => ImageClip::ImageArea,
        AnchorMode::CenterOverlay => ImageClip::Banner,
    };
    let overflows_area = placement.overflows(&layout::image_area_rect());
    ImageNode {
        href: image.source_url.clone(),
        natural_width: image.natural_width,
        natural_height: image.natural_height,
        matrix: Affine::scale(s, s).then_apply(&placement.matrix),
        css_transform: placement.css,
        clip,
        overflows_area,
    }
}

fn or_placeholder<'a>(text: &'a str, placeholder: &'static str) -> (&'a str, bool) {
    if text.is_empty() {
        (placeholder, true)
    } else {
        (text, false)
    }
}

/// Position lines top-down starting at `top` (logical px), output scaled.
fn lay_out_lines(
    lines: &[&str],
    x: f64,
    top: f64,
    font_size: f64,
    line_height: f64,
    s: f64,
) -> Vec<LineSpan> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let line_top = top + i as f64 * line_height;
            // Center the font's content area in the line box (CSS half-leading).
            let baseline = line_top + line_height / 2.0 + (ASCENT - DESCENT) / 2.0 * font_size;
            LineSpan {
                text: (*line).to_string(),
                x: x * s,
                top: line_top * s,
                baseline: baseline * s,
            }
        })
        .collect()
}
