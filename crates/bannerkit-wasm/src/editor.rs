//! Editor session bindings.
//!
//! The browser owns every asynchronous call: it starts a request on the
//! editor, performs the fetch or file read, and hands the result back with
//! the request token. Late results for superseded requests come back as
//! `"stale"` and change nothing.
//!
//! # Example
//!
//! ```typescript
//! import init, { JsBannerEditor } from '@bannerkit/wasm';
//!
//! await init();
//! const editor = new JsBannerEditor();
//! editor.add_font(new Uint8Array(await (await fetch('/fonts/Inter.ttf')).arrayBuffer()));
//! editor.set_title('Hello\nWorld');
//!
//! const request = editor.begin_generate('a rocket');
//! const response = await fetch('/api/generate', { method: 'POST', body: request.prompt });
//! editor.finish_generate_response(request.token, await response.text());
//!
//! const png = editor.export_png(2);
//! download(new Blob([png.bytes()], { type: 'image/png' }), png.file_name);
//! ```

use bannerkit_core::decode::read_image_ref;
use bannerkit_core::editor::Outcome;
use bannerkit_core::services::{
    parse_generation_response, parse_removal_response, removal_bytes_to_image, ServiceError,
};
use bannerkit_core::storage::{KeyValueStore, MemoryStore};
use bannerkit_core::{
    BannerComposition, BannerEditor, EditorConfig, ImageRef, PixelMultiplier, SlotKind,
};
use wasm_bindgen::prelude::*;

use crate::storage::LocalStorageStore;
use crate::types::{
    outcome_name, parse_name, JsExportArtifact, JsGenerationRequest, JsRequestToken,
};
use crate::{console_warn, to_js_error};

type SessionEditor = BannerEditor<Box<dyn KeyValueStore>>;

const SLOT: &str = "slot";

/// A banner editing session persisted to `localStorage`.
#[wasm_bindgen]
pub struct JsBannerEditor {
    editor: SessionEditor,
}

#[wasm_bindgen]
impl JsBannerEditor {
    /// Restore the session from `localStorage`.
    ///
    /// `config` is an optional `EditorConfig` object (camelCase keys, every
    /// field optional). Without `localStorage` the session is kept in
    /// memory only.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsBannerEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        let store: Box<dyn KeyValueStore> = match LocalStorageStore::from_window() {
            Ok(store) => Box::new(store),
            Err(e) => {
                console_warn(&format!("{}; changes will not be saved", e));
                Box::new(MemoryStore::new())
            }
        };
        Ok(Self {
            editor: BannerEditor::new(store, config),
        })
    }

    // -- State -------------------------------------------------------------

    /// The current composition as a plain object.
    pub fn composition(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.editor.composition()).map_err(to_js_error)
    }

    /// The saved templates, newest first.
    pub fn templates(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.editor.templates()).map_err(to_js_error)
    }

    /// Preview markup at `display_scale` (1 = 640×168 CSS pixels).
    pub fn render_svg(&self, display_scale: f64) -> Result<String, JsValue> {
        self.editor.render_svg(display_scale).map_err(to_js_error)
    }

    /// Whether `operation` (`generate`, `removeBackground`, `upload`,
    /// `export`) is pending for `slot`.
    pub fn is_busy(&self, slot: &str, operation: &str) -> Result<bool, JsValue> {
        let slot = parse_name(SLOT, slot).map_err(to_js_error)?;
        let operation = parse_name("operation", operation).map_err(to_js_error)?;
        Ok(self.editor.is_busy(slot, operation))
    }

    // -- Text and theme ----------------------------------------------------

    pub fn set_title(&mut self, title: &str) {
        self.editor.set_title(title);
    }

    pub fn set_subtitle(&mut self, subtitle: &str) {
        self.editor.set_subtitle(subtitle);
    }

    /// `white`, `blue` or `black`.
    pub fn set_theme(&mut self, theme: &str) -> Result<(), JsValue> {
        let theme = parse_name("theme", theme).map_err(to_js_error)?;
        self.editor.set_theme(theme);
        Ok(())
    }

    /// `start`, `center` or `end`.
    pub fn set_alignment(&mut self, alignment: &str) -> Result<(), JsValue> {
        let alignment = parse_name("alignment", alignment).map_err(to_js_error)?;
        self.editor.set_alignment(alignment);
        Ok(())
    }

    /// Replace the typography with a `Typography` object.
    pub fn set_typography(&mut self, typography: JsValue) -> Result<(), JsValue> {
        let typography = serde_wasm_bindgen::from_value(typography).map_err(to_js_error)?;
        self.editor.set_typography(typography);
        Ok(())
    }

    pub fn set_badge_enabled(&mut self, enabled: bool) {
        self.editor.set_badge_enabled(enabled);
    }

    pub fn set_badge_rotation(&mut self, degrees: f64) {
        self.editor.set_badge_rotation(degrees);
    }

    pub fn set_image_prompt(&mut self, prompt: &str) {
        self.editor.set_image_prompt(prompt);
    }

    // -- Image geometry ----------------------------------------------------

    /// `generated` or `uploaded`.
    pub fn set_active_slot(&mut self, slot: &str) -> Result<(), JsValue> {
        let slot = parse_name(SLOT, slot).map_err(to_js_error)?;
        self.editor.set_active_slot(slot);
        Ok(())
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.editor.set_scale(scale);
    }

    pub fn set_pan(&mut self, pan_x: i32, pan_y: i32) {
        self.editor.set_pan(pan_x, pan_y);
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.editor.set_rotation(degrees);
    }

    pub fn toggle_flip(&mut self) {
        self.editor.toggle_flip();
    }

    pub fn set_flip(&mut self, flip_horizontal: bool) {
        self.editor.set_flip(flip_horizontal);
    }

    pub fn clear_slot(&mut self, slot: &str) -> Result<(), JsValue> {
        let slot = parse_name(SLOT, slot).map_err(to_js_error)?;
        self.editor.clear_slot(slot);
        Ok(())
    }

    /// Restore the default text, theme, typography, alignment, badge and
    /// prompt. The slots keep their images and transforms, and the active
    /// slot stays selected.
    pub fn reset(&mut self) {
        self.editor.reset();
    }

    // -- Generation --------------------------------------------------------

    pub fn begin_generate(&mut self, user_text: &str) -> Result<JsGenerationRequest, JsValue> {
        self.editor
            .begin_generate(user_text)
            .map(JsGenerationRequest::from)
            .map_err(to_js_error)
    }

    /// Finish a generation with the image's data URL.
    pub fn finish_generate(
        &mut self,
        token: &JsRequestToken,
        data_url: &str,
    ) -> Result<String, JsValue> {
        let response = read_image_ref(data_url)
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()));
        self.apply_generation(token, response)
    }

    /// Finish a generation with the service's raw JSON response body.
    pub fn finish_generate_response(
        &mut self,
        token: &JsRequestToken,
        body: &str,
    ) -> Result<String, JsValue> {
        self.apply_generation(token, parse_generation_response(body))
    }

    /// Finish a generation that failed with `message`.
    pub fn fail_generate(&mut self, token: &JsRequestToken, message: &str) -> Result<String, JsValue> {
        self.apply_generation(token, Err(ServiceError::from_remote_message(message)))
    }

    // -- Background removal ------------------------------------------------

    /// Start removing the background of the image in `slot`.
    ///
    /// Send the returned token's image (see `slot_image_url`) to the
    /// removal service.
    pub fn begin_remove_background(&mut self, slot: &str) -> Result<JsRequestToken, JsValue> {
        let slot = parse_name(SLOT, slot).map_err(to_js_error)?;
        self.editor
            .begin_remove_background(slot)
            .map(|(token, _)| token.into())
            .map_err(to_js_error)
    }

    /// Source URL of the image in `slot`, if any.
    pub fn slot_image_url(&self, slot: &str) -> Result<Option<String>, JsValue> {
        let slot: SlotKind = parse_name(SLOT, slot).map_err(to_js_error)?;
        Ok(self.editor.composition().slots[slot]
            .image
            .as_ref()
            .map(|image| image.source_url.clone()))
    }

    /// Finish with the cut-out image's data URL.
    pub fn finish_remove_background(&mut self, token: &JsRequestToken, data_url: &str) -> String {
        let response = read_image_ref(data_url)
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()));
        self.apply_removal(token, response)
    }

    /// Finish with the service's raw JSON response body.
    pub fn finish_remove_background_response(
        &mut self,
        token: &JsRequestToken,
        body: &str,
    ) -> String {
        self.apply_removal(token, parse_removal_response(body))
    }

    /// Finish with the cut-out image's file bytes.
    pub fn finish_remove_background_bytes(&mut self, token: &JsRequestToken, bytes: &[u8]) -> String {
        self.apply_removal(token, removal_bytes_to_image(bytes))
    }

    /// Finish a removal that failed with `message`; the original is kept.
    pub fn fail_remove_background(&mut self, token: &JsRequestToken, message: &str) -> String {
        self.apply_removal(token, Err(ServiceError::from_remote_message(message)))
    }

    // -- Upload ------------------------------------------------------------

    /// Start an upload. A newer upload makes older ones stale.
    pub fn begin_upload(&mut self) -> JsRequestToken {
        self.editor.begin_upload().into()
    }

    /// Finish an upload with the file's bytes.
    pub fn finish_upload(&mut self, token: &JsRequestToken, bytes: &[u8]) -> Result<String, JsValue> {
        self.editor
            .finish_upload(token.token(), bytes)
            .map(|outcome| outcome_name(&outcome).to_string())
            .map_err(to_js_error)
    }

    /// Give up on a started request.
    pub fn cancel(&mut self, token: &JsRequestToken) -> bool {
        self.editor.cancel(token.token())
    }

    // -- Export ------------------------------------------------------------

    /// Load a font (TTF, OTF or collection) for export.
    ///
    /// A session starts without fonts and refuses to export text until
    /// one is loaded.
    pub fn add_font(&mut self, bytes: Vec<u8>) {
        let fonts = self.editor.exporter_mut().fonts_mut();
        fonts.load_bytes(bytes);
        fonts.settle_generic_families();
    }

    /// Number of font faces available to export.
    pub fn font_count(&self) -> usize {
        self.editor.exporter().fonts().len()
    }

    /// Start an export. Only one export runs at a time.
    ///
    /// Wait for fonts and images to settle, then call `finish_export`.
    pub fn begin_export(&mut self) -> Result<JsRequestToken, JsValue> {
        self.editor
            .begin_export()
            .map(JsRequestToken::from)
            .map_err(to_js_error)
    }

    /// Rasterize the composition at `multiplier` (1 or 2).
    pub fn finish_export(
        &mut self,
        token: &JsRequestToken,
        multiplier: u32,
    ) -> Result<JsExportArtifact, JsValue> {
        let multiplier = match PixelMultiplier::try_from(multiplier) {
            Ok(multiplier) => multiplier,
            Err(e) => {
                self.editor.cancel(token.token());
                return Err(to_js_error(e));
            }
        };
        self.editor
            .finish_export(token.token(), multiplier)
            .map(JsExportArtifact::from)
            .map_err(to_js_error)
    }

    /// Export in one step, without a settle wait.
    pub fn export_png(&mut self, multiplier: u32) -> Result<JsExportArtifact, JsValue> {
        let multiplier = PixelMultiplier::try_from(multiplier).map_err(to_js_error)?;
        self.editor
            .export(multiplier)
            .map(JsExportArtifact::from)
            .map_err(to_js_error)
    }

    // -- Templates ---------------------------------------------------------

    /// Save the current composition; returns the new template.
    pub fn save_template(&mut self, name: &str) -> Result<JsValue, JsValue> {
        let template = self.editor.save_template(name).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&template).map_err(to_js_error)
    }

    pub fn load_template(&mut self, id: &str) -> Result<(), JsValue> {
        self.editor.load_template(id).map_err(to_js_error)
    }

    pub fn delete_template(&mut self, id: &str) -> Result<(), JsValue> {
        self.editor.delete_template(id).map_err(to_js_error)
    }
}

impl JsBannerEditor {
    /// Open a session over any store.
    pub fn with_store(store: impl KeyValueStore + 'static, config: EditorConfig) -> Self {
        let store: Box<dyn KeyValueStore> = Box::new(store);
        Self {
            editor: BannerEditor::new(store, config),
        }
    }

    pub fn editor(&self) -> &SessionEditor {
        &self.editor
    }

    pub fn current(&self) -> &BannerComposition {
        self.editor.composition()
    }

    fn apply_generation(
        &mut self,
        token: &JsRequestToken,
        response: Result<ImageRef, ServiceError>,
    ) -> Result<String, JsValue> {
        self.editor
            .finish_generate(token.token(), response)
            .map(|outcome| outcome_name(&outcome).to_string())
            .map_err(to_js_error)
    }

    fn apply_removal(
        &mut self,
        token: &JsRequestToken,
        response: Result<ImageRef, ServiceError>,
    ) -> String {
        let outcome = self.editor.finish_remove_background(token.token(), response);
        if let Outcome::Fallback(e) = &outcome {
            console_warn(&format!("Background removal failed, keeping original: {}", e));
        }
        outcome_name(&outcome).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bannerkit_core::decode::encode_data_url;
    use bannerkit_core::ThemeId;
    use std::io::Cursor;

    fn session() -> JsBannerEditor {
        JsBannerEditor::with_store(MemoryStore::new(), EditorConfig::default())
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([0, 200, 0, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_setters_reach_the_composition() {
        let mut session = session();
        session.set_title("Hello\nWorld");
        session.set_theme("black").unwrap();
        session.set_alignment("end").unwrap();
        session.set_pan(500, -10);

        let c = session.current();
        assert_eq!(c.text.title, "Hello\nWorld");
        assert_eq!(c.theme, ThemeId::Black);
        assert_eq!(c.active().transform.pan_x, 200);
        assert_eq!(c.active().transform.pan_y, -10);
    }

    #[test]
    fn test_generation_round_trip() {
        let mut session = session();
        let request = session.begin_generate("a rocket").unwrap();
        assert!(request.prompt().contains("a rocket"));
        assert_eq!(request.token().operation(), "generate");

        let url = encode_data_url("image/png", &png(100, 336));
        let outcome = session.finish_generate(&request.token(), &url).unwrap();
        assert_eq!(outcome, "applied");
        assert_eq!(session.current().active_slot, SlotKind::Generated);
        assert!((session.current().active().transform.scale - 0.5).abs() < 1e-12);

        // The same token again is stale.
        assert_eq!(session.finish_generate(&request.token(), &url).unwrap(), "stale");
    }

    #[test]
    fn test_upload_supersedes() {
        let mut session = session();
        let older = session.begin_upload();
        let newer = session.begin_upload();
        assert_eq!(session.finish_upload(&newer, &png(100, 50)).unwrap(), "applied");
        assert_eq!(session.finish_upload(&older, &png(10, 10)).unwrap(), "stale");

        let image = session.current().slots[SlotKind::Uploaded]
            .image
            .clone()
            .unwrap();
        assert_eq!((image.natural_width, image.natural_height), (100, 50));
        assert!(session.slot_image_url("uploaded").unwrap().is_some());
    }

    #[test]
    fn test_remove_background_fallback_keeps_original() {
        let mut session = session();
        let token = session.begin_upload();
        session.finish_upload(&token, &png(40, 20)).unwrap();
        let original = session.current().slots[SlotKind::Uploaded].image.clone();

        let token = session.begin_remove_background("uploaded").unwrap();
        assert_eq!(token.slot(), Some("uploaded".to_string()));
        assert_eq!(session.fail_remove_background(&token, "Rate limit"), "fallback");
        assert_eq!(session.current().slots[SlotKind::Uploaded].image, original);
    }

    #[test]
    fn test_remove_background_bytes() {
        let mut session = session();
        let token = session.begin_upload();
        session.finish_upload(&token, &png(40, 20)).unwrap();
        session.set_scale(1.5);

        let token = session.begin_remove_background("uploaded").unwrap();
        assert_eq!(session.finish_remove_background_bytes(&token, &png(40, 20)), "applied");
        // Same dimensions, so the transform is kept.
        assert!((session.current().active().transform.scale - 1.5).abs() < 1e-12);
    }

    const TEST_FONT: &[u8] = include_bytes!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../bannerkit-core/tests/fixtures/DejaVuSans.ttf"
    ));

    #[test]
    fn test_export_png() {
        let mut session = session();
        session.add_font(TEST_FONT.to_vec());
        assert!(session.font_count() >= 1);
        session.set_title("Hello");
        let artifact = session.export_png(2).unwrap();
        assert_eq!((artifact.width(), artifact.height()), (1280, 336));
        assert_eq!(artifact.file_name(), "banner-2x.png");

        let token = session.begin_export().unwrap();
        let artifact = session.finish_export(&token, 1).unwrap();
        assert_eq!((artifact.width(), artifact.height()), (640, 168));
        assert!(session.begin_export().is_ok());
    }

    #[test]
    fn test_cancel() {
        let mut session = session();
        let request = session.begin_generate("cat").unwrap();
        assert!(session.cancel(&request.token()));
        assert!(session.begin_generate("dog").is_ok());
    }

    #[test]
    fn test_templates() {
        let mut session = session();
        session.set_title("Saved");
        session.editor.save_template("launch").unwrap();
        let id = session.editor().templates()[0].id.clone();

        session.set_title("Changed");
        session.load_template(&id).unwrap();
        assert_eq!(session.current().text.title, "Saved");
        session.delete_template(&id).unwrap();
        assert!(session.editor().templates().is_empty());
    }

    #[test]
    fn test_render_svg() {
        let session = session();
        let svg = session.render_svg(1.0).unwrap();
        assert!(svg.contains("<svg"));
    }
}
