//! SVG serialization of a [`VisualTree`].
//!
//! The output is a standalone document; the same string is shown as the
//! live preview and handed to the rasterizer on export. Numbers are written
//! with at most four decimals so the output is deterministic.

use std::fmt::Write;

use super::tree::{
    ImageAreaContent, ImageClip, ImageNode, PlaceholderNode, TextNode, VisualTree, FONT_FAMILY,
};
use crate::geometry::fmt_num;
use crate::layout::Rect;

const BACKGROUND_ID: &str = "bk-background";
const BANNER_CLIP_ID: &str = "bk-banner-clip";
const IMAGE_AREA_CLIP_ID: &str = "bk-image-area-clip";

impl VisualTree {
    /// Serialize the tree as an SVG document.
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(2048);
        let (w, h) = (fmt_num(self.width), fmt_num(self.height));

        // Writing into a String cannot fail.
        let _ = write!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        );

        out.push_str("<defs>");
        let line = &self.background.line;
        let _ = write!(
            out,
            r#"<linearGradient id="{BACKGROUND_ID}" gradientUnits="userSpaceOnUse" x1="{}" y1="{}" x2="{}" y2="{}"><stop offset="0" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient>"#,
            fmt_num(line.x1),
            fmt_num(line.y1),
            fmt_num(line.x2),
            fmt_num(line.y2),
            escape(&self.background.start_color),
            escape(&self.background.end_color),
        );
        let _ = write!(out, r#"<clipPath id="{BANNER_CLIP_ID}">"#);
        write_rect(
            &mut out,
            &Rect::new(0.0, 0.0, self.width, self.height),
            self.corner_radius,
            "",
        );
        out.push_str("</clipPath>");
        let _ = write!(out, r#"<clipPath id="{IMAGE_AREA_CLIP_ID}">"#);
        write_rect(&mut out, &self.image_area.rect, 0.0, "");
        out.push_str("</clipPath>");
        out.push_str("</defs>");

        let _ = write!(out, r#"<g clip-path="url(#{BANNER_CLIP_ID})">"#);
        write_rect(
            &mut out,
            &Rect::new(0.0, 0.0, self.width, self.height),
            0.0,
            &format!(r#" fill="url(#{BACKGROUND_ID})""#),
        );

        write_text(&mut out, &self.title);

        match &self.subtitle.badge {
            Some(badge) => {
                let _ = write!(out, r#"<g transform="{}">"#, badge.transform.to_svg());
                write_rect(
                    &mut out,
                    &badge.rect,
                    badge.radius,
                    &format!(r#" fill="{}""#, escape(&badge.color)),
                );
                write_text(&mut out, &self.subtitle.text);
                out.push_str("</g>");
            }
            None => write_text(&mut out, &self.subtitle.text),
        }

        match &self.image_area.content {
            ImageAreaContent::Placeholder(placeholder) => {
                write_placeholder(&mut out, &self.image_area.rect, placeholder)
            }
            ImageAreaContent::Image(image) => write_image(&mut out, image),
        }

        out.push_str("</g></svg>");
        out
    }
}

fn write_rect(out: &mut String, rect: &Rect, radius: f64, extra: &str) {
    let _ = write!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}""#,
        fmt_num(rect.x),
        fmt_num(rect.y),
        fmt_num(rect.width),
        fmt_num(rect.height)
    );
    if radius > 0.0 {
        let r = fmt_num(radius);
        let _ = write!(out, r#" rx="{r}" ry="{r}""#);
    }
    out.push_str(extra);
    out.push_str("/>");
}

fn write_text(out: &mut String, node: &TextNode) {
    let _ = write!(
        out,
        r#"<text xml:space="preserve" font-family="{}" font-size="{}" font-weight="{}" fill="{}">"#,
        escape(FONT_FAMILY),
        fmt_num(node.font_size),
        node.font_weight,
        escape(&node.color)
    );
    for line in &node.lines {
        let _ = write!(
            out,
            r#"<tspan x="{}" y="{}">{}</tspan>"#,
            fmt_num(line.x),
            fmt_num(line.baseline),
            escape(&line.text)
        );
    }
    out.push_str("</text>");
}

fn write_placeholder(out: &mut String, area: &Rect, node: &PlaceholderNode) {
    write_rect(
        out,
        area,
        0.0,
        &format!(
            r#" fill="{}" fill-opacity="{}""#,
            escape(&node.fill_color),
            fmt_num(node.fill_opacity)
        ),
    );
    let (cx, cy) = area.center();
    let _ = write!(
        out,
        r#"<text x="{}" y="{}" text-anchor="middle" font-family="{}" font-size="{}" fill="{}" fill-opacity="{}">{}</text>"#,
        fmt_num(cx),
        // Optical vertical centering of a single line.
        fmt_num(cy + node.label_font_size * 0.35),
        escape(FONT_FAMILY),
        fmt_num(node.label_font_size),
        escape(&node.fill_color),
        fmt_num(node.label_opacity),
        escape(&node.label)
    );
}

fn write_image(out: &mut String, image: &ImageNode) {
    if image.clip == ImageClip::ImageArea {
        let _ = write!(out, r#"<g clip-path="url(#{IMAGE_AREA_CLIP_ID})">"#);
    }
    let _ = write!(
        out,
        r#"<image x="0" y="0" width="{}" height="{}" preserveAspectRatio="none" transform="{}" xlink:href="{}"/>"#,
        image.natural_width,
        image.natural_height,
        image.matrix.to_svg(),
        escape(&image.href)
    );
    if image.clip == ImageClip::ImageArea {
        out.push_str("</g>");
    }
}

/// Escape text for use in XML content and attribute values.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
        assert_eq!(escape("plain"), "plain");
    }
}
