//! Editor session: the composition, its persistence and in-flight requests.
//!
//! [`BannerEditor`] is the single owner of the [`BannerComposition`]. Every
//! mutation goes through it and is written to the store right away; a
//! failed write is logged and otherwise ignored.
//!
//! # Examples
//!
//! ```ignore
//! use bannerkit_core::editor::BannerEditor;
//! use bannerkit_core::storage::MemoryStore;
//!
//! let mut editor = BannerEditor::new(MemoryStore::new(), Default::default());
//! editor.set_title("Hello\nWorld");
//!
//! let request = editor.begin_generate("a rocket")?;
//! let response = call_service(&request.prompt);
//! editor.finish_generate(request.token, response)?;
//! ```

mod requests;

pub use requests::{Busy, Operation, Outcome, RequestToken, RequestTracker};

use thiserror::Error;
use tracing::{debug, warn};

use crate::composition::{
    BannerComposition, ImageRef, SlotKind, TextAlignment, ThemeId, Typography,
};
use crate::config::EditorConfig;
use crate::decode::{load_upload, DecodeError};
use crate::export::{ExportArtifact, ExportError, Exporter, FontSet, PixelMultiplier};
use crate::render::{render_preview, RenderError, VisualTree};
use crate::services::{render_prompt, ServiceError};
use crate::storage::{load_composition, save_composition, KeyValueStore};
use crate::template::{Template, TemplateError, TemplateLibrary};

/// Errors surfaced by the editor session.
#[derive(Debug, Error, PartialEq)]
pub enum EditorError {
    /// The same request is still pending
    #[error("{} is already in progress", .operation.as_str())]
    Busy {
        operation: Operation,
        slot: Option<SlotKind>,
    },

    /// The token was cancelled, superseded or already finished
    #[error("{} request is no longer current", .0.as_str())]
    StaleRequest(Operation),

    /// The operation needs an image in the slot
    #[error("No image in the {} slot", .0.as_str())]
    NoImage(SlotKind),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl From<Busy> for EditorError {
    fn from(busy: Busy) -> Self {
        EditorError::Busy {
            operation: busy.operation,
            slot: busy.slot,
        }
    }
}

/// A started generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub token: RequestToken,
    /// Full prompt for the generation service.
    pub prompt: String,
}

/// An editing session over a [`KeyValueStore`].
pub struct BannerEditor<S: KeyValueStore> {
    composition: BannerComposition,
    templates: TemplateLibrary,
    requests: RequestTracker,
    store: S,
    config: EditorConfig,
    exporter: Exporter,
}

impl<S: KeyValueStore> std::fmt::Debug for BannerEditor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BannerEditor")
            .field("composition", &self.composition)
            .field("templates", &self.templates.len())
            .field("requests", &self.requests)
            .field("config", &self.config)
            .finish()
    }
}

impl<S: KeyValueStore> BannerEditor<S> {
    /// Restore the session from `store`.
    ///
    /// No fonts are loaded, so exports fail with `ExportError::NoFonts`
    /// until fonts are added through [`exporter_mut`](Self::exporter_mut)
    /// or the session is built with [`open`](Self::open) or
    /// [`with_exporter`](Self::with_exporter).
    pub fn new(store: S, config: EditorConfig) -> Self {
        let composition = load_composition(&store, &config.storage.state_key);
        let templates = match store.get(&config.storage.templates_key) {
            Ok(Some(json)) => TemplateLibrary::from_json_str(&json),
            Ok(None) => TemplateLibrary::new(),
            Err(e) => {
                debug!(error = %e, "Failed to read stored templates, starting empty");
                TemplateLibrary::new()
            }
        };
        let exporter =
            Exporter::new(FontSet::empty()).with_settle_delay(config.export.settle_delay());
        Self {
            composition,
            templates,
            requests: RequestTracker::new(),
            store,
            config,
            exporter,
        }
    }

    /// Restore the session and load the export fonts named in `config`.
    pub fn open(store: S, config: EditorConfig) -> Result<Self, EditorError> {
        let exporter = Exporter::from_config(&config.export)?;
        Ok(Self::new(store, config).with_exporter(exporter))
    }

    pub fn with_exporter(mut self, exporter: Exporter) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn composition(&self) -> &BannerComposition {
        &self.composition
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }

    pub fn exporter_mut(&mut self) -> &mut Exporter {
        &mut self.exporter
    }

    pub fn into_store(self) -> S {
        self.store
    }

    // -- Mutations ---------------------------------------------------------

    fn mutate(&mut self, f: impl FnOnce(&mut BannerComposition)) {
        f(&mut self.composition);
        self.persist();
    }

    fn persist(&mut self) {
        let key = &self.config.storage.state_key;
        if let Err(e) = save_composition(&mut self.store, key, &self.composition) {
            warn!(key = %key, error = %e, "Failed to persist banner state");
        }
    }

    fn persist_templates(&mut self) {
        let key = &self.config.storage.templates_key;
        let result = self
            .templates
            .to_json_string()
            .map_err(crate::storage::StorageError::from)
            .and_then(|json| self.store.set(key, &json));
        if let Err(e) = result {
            warn!(key = %key, error = %e, "Failed to persist templates");
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.mutate(|c| c.set_title(title));
    }

    pub fn set_subtitle(&mut self, subtitle: &str) {
        self.mutate(|c| c.set_subtitle(subtitle));
    }

    pub fn set_theme(&mut self, theme: ThemeId) {
        self.mutate(|c| c.set_theme(theme));
    }

    pub fn set_alignment(&mut self, alignment: TextAlignment) {
        self.mutate(|c| c.set_alignment(alignment));
    }

    pub fn set_typography(&mut self, typography: Typography) {
        self.mutate(|c| c.set_typography(typography));
    }

    pub fn set_badge_enabled(&mut self, enabled: bool) {
        self.mutate(|c| c.set_badge_enabled(enabled));
    }

    pub fn set_badge_rotation(&mut self, degrees: f64) {
        self.mutate(|c| c.set_badge_rotation(degrees));
    }

    pub fn set_image_prompt(&mut self, prompt: &str) {
        self.mutate(|c| c.set_image_prompt(prompt));
    }

    pub fn set_active_slot(&mut self, slot: SlotKind) {
        self.mutate(|c| c.set_active_slot(slot));
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.mutate(|c| c.set_scale(scale));
    }

    pub fn set_pan(&mut self, pan_x: i32, pan_y: i32) {
        self.mutate(|c| c.set_pan(pan_x, pan_y));
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.mutate(|c| c.set_rotation(degrees));
    }

    pub fn toggle_flip(&mut self) {
        self.mutate(|c| c.toggle_flip());
    }

    pub fn set_flip(&mut self, flip_horizontal: bool) {
        self.mutate(|c| c.set_flip(flip_horizontal));
    }

    /// Put `image` into `slot`. Pending requests on the slot become stale.
    pub fn attach_image(&mut self, slot: SlotKind, image: ImageRef) {
        self.requests.invalidate_slot(slot);
        self.mutate(|c| c.attach_image(slot, image));
    }

    /// Empty `slot`. Pending requests on the slot become stale.
    pub fn clear_slot(&mut self, slot: SlotKind) {
        self.requests.invalidate_slot(slot);
        self.mutate(|c| c.clear_slot(slot));
    }

    /// Restore defaults for everything but the image slots.
    pub fn reset(&mut self) {
        self.mutate(|c| c.reset_keeping_images());
    }

    // -- Rendering ---------------------------------------------------------

    pub fn render(&self, display_scale: f64) -> Result<VisualTree, EditorError> {
        Ok(render_preview(&self.composition, display_scale)?)
    }

    pub fn render_svg(&self, display_scale: f64) -> Result<String, EditorError> {
        Ok(self.render(display_scale)?.to_svg())
    }

    // -- Requests ----------------------------------------------------------

    pub fn is_busy(&self, slot: SlotKind, operation: Operation) -> bool {
        self.requests.is_busy(slot, operation)
    }

    /// Abandon a started request without applying anything.
    ///
    /// Returns `false` if the token was already stale.
    pub fn cancel(&mut self, token: RequestToken) -> bool {
        let current = self.requests.finish(token);
        if current {
            debug!(
                operation = token.operation().as_str(),
                sequence = token.sequence(),
                "Cancelled request"
            );
        }
        current
    }

    /// Start generating an image for the generated slot.
    ///
    /// The user text is remembered as the image prompt and rendered into
    /// the current theme's template.
    pub fn begin_generate(&mut self, user_text: &str) -> Result<GenerationRequest, EditorError> {
        let prompt = render_prompt(self.composition.theme_config().prompt_template, user_text)?;
        let token = self
            .requests
            .try_begin(SlotKind::Generated, Operation::Generate)?;
        self.set_image_prompt(user_text);
        debug!(sequence = token.sequence(), "Started image generation");
        Ok(GenerationRequest { token, prompt })
    }

    /// Apply a generation response.
    ///
    /// A stale token discards the response whatever it holds. A failure
    /// leaves the composition unchanged. A new image makes pending
    /// background removals on the generated slot stale.
    pub fn finish_generate(
        &mut self,
        token: RequestToken,
        response: Result<ImageRef, ServiceError>,
    ) -> Result<Outcome, EditorError> {
        if !self.requests.finish(token) {
            debug!(sequence = token.sequence(), "Discarding stale generation response");
            return Ok(Outcome::Stale);
        }
        let image = response?;
        self.requests.invalidate_slot(SlotKind::Generated);
        self.mutate(|c| {
            c.attach_image(SlotKind::Generated, image);
            c.set_active_slot(SlotKind::Generated);
        });
        Ok(Outcome::Applied)
    }

    /// Start removing the background of the image in `slot`.
    pub fn begin_remove_background(
        &mut self,
        slot: SlotKind,
    ) -> Result<(RequestToken, ImageRef), EditorError> {
        let image = self.composition.slots[slot]
            .image
            .clone()
            .ok_or(EditorError::NoImage(slot))?;
        let token = self.requests.try_begin(slot, Operation::RemoveBackground)?;
        Ok((token, image))
    }

    /// Apply a background-removal response, keeping the original image if
    /// the service failed.
    pub fn finish_remove_background(
        &mut self,
        token: RequestToken,
        response: Result<ImageRef, ServiceError>,
    ) -> Outcome {
        let Some(slot) = token.slot() else {
            return Outcome::Stale;
        };
        if !self.requests.finish(token) {
            debug!(sequence = token.sequence(), "Discarding stale background removal");
            return Outcome::Stale;
        }
        match response {
            Ok(image) => {
                self.mutate(|c| c.slots[slot].replace_content(image));
                Outcome::Applied
            }
            Err(e) => {
                warn!(
                    error = %e,
                    slot = slot.as_str(),
                    "Background removal failed, keeping original image"
                );
                Outcome::Fallback(e)
            }
        }
    }

    /// Start an upload. A newer upload supersedes an older one.
    pub fn begin_upload(&mut self) -> RequestToken {
        self.requests.begin(SlotKind::Uploaded, Operation::Upload)
    }

    /// Decode uploaded file bytes and attach them to the upload slot.
    ///
    /// Pending background removals on the upload slot become stale.
    pub fn finish_upload(
        &mut self,
        token: RequestToken,
        bytes: &[u8],
    ) -> Result<Outcome, EditorError> {
        if !self.requests.finish(token) {
            debug!(sequence = token.sequence(), "Discarding stale upload");
            return Ok(Outcome::Stale);
        }
        let image = load_upload(bytes)?;
        self.requests.invalidate_slot(SlotKind::Uploaded);
        self.mutate(|c| {
            c.attach_image(SlotKind::Uploaded, image);
            c.set_active_slot(SlotKind::Uploaded);
        });
        Ok(Outcome::Applied)
    }

    /// Start an export. Only one export runs at a time.
    pub fn begin_export(&mut self) -> Result<RequestToken, EditorError> {
        Ok(self
            .requests
            .try_begin(self.composition.active_slot, Operation::Export)?)
    }

    /// Capture the current composition for a started export.
    ///
    /// The token is retired whether or not the capture succeeds. A token
    /// that is no longer current captures nothing.
    pub fn finish_export(
        &mut self,
        token: RequestToken,
        multiplier: PixelMultiplier,
    ) -> Result<ExportArtifact, EditorError> {
        if !self.requests.is_current(token) {
            debug!(sequence = token.sequence(), "Refusing export for stale token");
            return Err(EditorError::StaleRequest(token.operation()));
        }
        let result = self
            .exporter
            .export_composition(&self.composition, multiplier);
        self.requests.finish(token);
        Ok(result?)
    }

    /// Export the current composition as PNG.
    pub fn export(&mut self, multiplier: PixelMultiplier) -> Result<ExportArtifact, EditorError> {
        let token = self.begin_export()?;
        self.finish_export(token, multiplier)
    }

    // -- Templates ---------------------------------------------------------

    pub fn templates(&self) -> &[Template] {
        self.templates.templates()
    }

    /// Save the current composition as a named template.
    pub fn save_template(&mut self, name: &str) -> Result<Template, EditorError> {
        let template = self
            .templates
            .save(
                name,
                &self.composition,
                self.config.templates.inline_image_warn_bytes,
            )?
            .clone();
        self.persist_templates();
        Ok(template)
    }

    /// Replace the current composition with a template's snapshot.
    pub fn load_template(&mut self, id: &str) -> Result<(), EditorError> {
        let composition = self.templates.load(id)?;
        self.requests.invalidate_slot(SlotKind::Generated);
        self.requests.invalidate_slot(SlotKind::Uploaded);
        self.mutate(|c| *c = composition);
        Ok(())
    }

    pub fn delete_template(&mut self, id: &str) -> Result<(), EditorError> {
        self.templates.delete(id)?;
        self.persist_templates();
        Ok(())
    }
}
