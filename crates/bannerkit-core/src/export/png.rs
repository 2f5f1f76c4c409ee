//! SVG to PNG rasterization.

use std::time::Duration;

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use tracing::{debug, info};

use super::{ExportArtifact, ExportError, FontSet, PixelMultiplier};
use crate::composition::BannerComposition;
use crate::config::ExportConfig;
use crate::decode::read_image_ref;
use crate::render::{render_preview, VisualTree};

/// Rasterizes visual trees to PNG.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    fonts: FontSet,
    settle_delay: Duration,
}

impl Exporter {
    pub fn new(fonts: FontSet) -> Self {
        Self {
            fonts,
            settle_delay: Duration::ZERO,
        }
    }

    /// Load fonts and the settle delay from `config`.
    pub fn from_config(config: &ExportConfig) -> Result<Self, ExportError> {
        Ok(Self::new(FontSet::from_config(config)?).with_settle_delay(config.settle_delay()))
    }

    /// Wait this long before each capture.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontSet {
        &mut self.fonts
    }

    /// Render `composition` at display scale 1 and export it.
    pub fn export_composition(
        &self,
        composition: &BannerComposition,
        multiplier: PixelMultiplier,
    ) -> Result<ExportArtifact, ExportError> {
        let tree = render_preview(composition, 1.0)?;
        self.export(&tree, multiplier)
    }

    /// Rasterize `tree` at `multiplier` times its size and encode it as PNG.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::UnembeddedImage` or `ExportError::UndecodableImage`
    /// when an image in the tree would come out blank, `ExportError::NoFonts`
    /// when its text would, and the rasterizer errors otherwise. Nothing is
    /// returned on failure.
    pub fn export(
        &self,
        tree: &VisualTree,
        multiplier: PixelMultiplier,
    ) -> Result<ExportArtifact, ExportError> {
        validate_images(tree)?;
        if tree.has_text() && self.fonts.is_empty() {
            return Err(ExportError::NoFonts);
        }
        let factor = multiplier.factor();
        let (width, height) = output_size(tree, factor)?;
        self.settle();

        let svg = tree.to_svg();
        let mut options = usvg::Options::default();
        options.fontdb = self.fonts.database();
        let svg_tree =
            usvg::Tree::from_str(&svg, &options).map_err(|e| ExportError::Svg(e.to_string()))?;

        let mut pixmap =
            Pixmap::new(width, height).ok_or(ExportError::PixmapAllocation { width, height })?;
        let scale = factor as f32;
        resvg::render(
            &svg_tree,
            Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        let bytes = pixmap
            .encode_png()
            .map_err(|e| ExportError::Encoding(e.to_string()))?;

        info!(
            width,
            height,
            multiplier = factor,
            bytes = bytes.len(),
            "Exported banner"
        );
        Ok(ExportArtifact {
            file_name: multiplier.file_name(),
            width,
            height,
            bytes,
        })
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn settle(&self) {
        if !self.settle_delay.is_zero() {
            debug!(delay_ms = self.settle_delay.as_millis() as u64, "Settling before capture");
            std::thread::sleep(self.settle_delay);
        }
    }

    // The browser thread cannot block; the caller waits before exporting.
    #[cfg(target_arch = "wasm32")]
    fn settle(&self) {}
}

/// Tree size times `factor`, rounded to whole pixels.
fn output_size(tree: &VisualTree, factor: u32) -> Result<(u32, u32), ExportError> {
    let width = (tree.width * f64::from(factor)).round();
    let height = (tree.height * f64::from(factor)).round();
    let max = f64::from(u32::MAX);
    if !(width >= 0.0 && width <= max && height >= 0.0 && height <= max) {
        return Err(ExportError::TooLarge { width, height });
    }
    Ok((width as u32, height as u32))
}

/// Every image must be an embedded, decodable data URL.
fn validate_images(tree: &VisualTree) -> Result<(), ExportError> {
    for href in tree.image_hrefs() {
        if !href.starts_with("data:") {
            return Err(ExportError::UnembeddedImage(short(href)));
        }
        read_image_ref(href)
            .map_err(|e| ExportError::UndecodableImage(format!("{}: {}", short(href), e)))?;
    }
    Ok(())
}

fn short(href: &str) -> String {
    const MAX: usize = 64;
    if href.chars().count() <= MAX {
        href.to_string()
    } else {
        let head: String = href.chars().take(MAX).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{ImageRef, SlotKind, ThemeId};
    use crate::decode::encode_data_url;
    use std::io::Cursor;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn png_data_url(width: u32, height: u32, rgba: [u8; 4]) -> String {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        encode_data_url("image/png", &bytes)
    }

    fn exporter() -> Exporter {
        Exporter::new(FontSet::for_tests())
    }

    fn banner() -> BannerComposition {
        let mut c = BannerComposition::new();
        c.set_title("Hello\nWorld");
        c.set_subtitle("Sub");
        c.set_theme(ThemeId::Blue);
        c
    }

    #[test]
    fn test_export_2x_size() {
        let artifact = exporter()
            .export_composition(&banner(), PixelMultiplier::X2)
            .unwrap();
        assert_eq!((artifact.width, artifact.height), (1280, 336));
        assert_eq!(artifact.file_name, "banner-2x.png");
        assert_eq!(&artifact.bytes[..8], &PNG_MAGIC);

        let decoded = image::load_from_memory(&artifact.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1280, 336));
    }

    #[test]
    fn test_export_1x_pixels() {
        let artifact = exporter()
            .export_composition(&banner(), PixelMultiplier::X1)
            .unwrap();
        let img = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
        assert_eq!(img.dimensions(), (640, 168));

        // Outside the rounded corner.
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
        // Blue gradient under the text box, clear of any glyphs.
        let px = img.get_pixel(300, 162).0;
        assert_eq!(px[3], 255);
        assert!(px[2] > px[0], "expected a blue pixel, got {:?}", px);
    }

    #[test]
    fn test_export_with_embedded_image() {
        let mut c = banner();
        c.set_active_slot(SlotKind::Uploaded);
        let red = png_data_url(16, 16, [255, 0, 0, 255]);
        c.attach_image(SlotKind::Uploaded, ImageRef::new(red, 16, 16));

        let artifact = exporter()
            .export_composition(&c, PixelMultiplier::X1)
            .unwrap();
        let img = image::load_from_memory(&artifact.bytes).unwrap().to_rgba8();
        // Scaled to 168 px tall and centered on the image area.
        let (cx, cy) = (543, 84);
        let px = img.get_pixel(cx, cy).0;
        assert_eq!(px, [255, 0, 0, 255]);
    }

    #[test]
    fn test_export_rejects_remote_image() {
        let mut c = banner();
        let remote = ImageRef::new("https://example.com/a.png", 100, 100);
        c.attach_image(SlotKind::Generated, remote);
        let err = exporter()
            .export_composition(&c, PixelMultiplier::X1)
            .unwrap_err();
        assert!(matches!(err, ExportError::UnembeddedImage(_)));
    }

    #[test]
    fn test_export_rejects_undecodable_image() {
        let mut c = banner();
        c.attach_image(
            SlotKind::Generated,
            ImageRef::new(encode_data_url("image/png", b"nope"), 100, 100),
        );
        let err = exporter()
            .export_composition(&c, PixelMultiplier::X2)
            .unwrap_err();
        assert!(matches!(err, ExportError::UndecodableImage(_)));
    }

    #[test]
    fn test_export_leaves_composition_untouched() {
        let c = banner();
        let before = c.clone();
        let _ = exporter().export_composition(&c, PixelMultiplier::X2);
        assert_eq!(c, before);
    }

    #[test]
    fn test_export_without_fonts_fails() {
        let err = Exporter::default()
            .export_composition(&banner(), PixelMultiplier::X1)
            .unwrap_err();
        assert_eq!(err, ExportError::NoFonts);
    }

    #[test]
    fn test_export_huge_scale_fails() {
        let tree = render_preview(&banner(), 1e8).unwrap();
        let err = exporter().export(&tree, PixelMultiplier::X2).unwrap_err();
        assert!(matches!(err, ExportError::TooLarge { .. }), "got {:?}", err);
    }

    #[test]
    fn test_output_size_rounds_scaled_size() {
        let tree = render_preview(&banner(), 1.5).unwrap();
        assert_eq!(output_size(&tree, 2).unwrap(), (1920, 504));
    }

    #[test]
    fn test_short_href() {
        assert_eq!(short("data:x"), "data:x");
        let long = "a".repeat(100);
        assert_eq!(short(&long).len(), 67);
    }
}
