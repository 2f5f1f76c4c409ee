//! WASM-compatible wrapper types for editor values.
//!
//! Request tokens and export artifacts cross the JS boundary as opaque
//! classes; enums cross it as the same lowercase / camelCase names used in
//! the persisted JSON.

use bannerkit_core::editor::{GenerationRequest, Outcome};
use bannerkit_core::{ExportArtifact, RequestToken};
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;

/// A started request, handed back to `finish_*` when the work completes.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsRequestToken {
    inner: RequestToken,
}

#[wasm_bindgen]
impl JsRequestToken {
    /// Monotonic sequence number of the request.
    #[wasm_bindgen(getter)]
    pub fn sequence(&self) -> f64 {
        self.inner.sequence() as f64
    }

    /// `generate`, `removeBackground`, `upload` or `export`.
    #[wasm_bindgen(getter)]
    pub fn operation(&self) -> String {
        self.inner.operation().as_str().to_string()
    }

    /// Target slot, or `undefined` for session-wide requests.
    #[wasm_bindgen(getter)]
    pub fn slot(&self) -> Option<String> {
        self.inner.slot().map(|slot| slot.as_str().to_string())
    }
}

impl JsRequestToken {
    pub(crate) fn token(&self) -> RequestToken {
        self.inner
    }
}

impl From<RequestToken> for JsRequestToken {
    fn from(inner: RequestToken) -> Self {
        Self { inner }
    }
}

/// A started generation: the token plus the full prompt to send.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsGenerationRequest {
    token: JsRequestToken,
    prompt: String,
}

#[wasm_bindgen]
impl JsGenerationRequest {
    #[wasm_bindgen(getter)]
    pub fn token(&self) -> JsRequestToken {
        self.token
    }

    #[wasm_bindgen(getter)]
    pub fn prompt(&self) -> String {
        self.prompt.clone()
    }
}

impl From<GenerationRequest> for JsGenerationRequest {
    fn from(request: GenerationRequest) -> Self {
        Self {
            token: request.token.into(),
            prompt: request.prompt,
        }
    }
}

/// An exported PNG file.
///
/// # Memory Management
///
/// The encoded bytes live in WASM memory until `bytes()` copies them out
/// as a `Uint8Array`.
#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct JsExportArtifact {
    inner: ExportArtifact,
}

#[wasm_bindgen]
impl JsExportArtifact {
    /// Suggested download name, `banner-1x.png` or `banner-2x.png`.
    #[wasm_bindgen(getter)]
    pub fn file_name(&self) -> String {
        self.inner.file_name.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.bytes.len()
    }

    /// Returns the PNG bytes as a Uint8Array (copied).
    pub fn bytes(&self) -> Vec<u8> {
        self.inner.bytes.clone()
    }
}

impl From<ExportArtifact> for JsExportArtifact {
    fn from(inner: ExportArtifact) -> Self {
        Self { inner }
    }
}

/// Name of an outcome as seen by the UI.
pub(crate) fn outcome_name(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Applied => "applied",
        Outcome::Fallback(_) => "fallback",
        Outcome::Stale => "stale",
    }
}

/// Parse a unit enum from its serialized name, e.g. `"blue"` as a theme.
pub(crate) fn parse_name<T: DeserializeOwned>(kind: &str, name: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| format!("Unknown {}: {}", kind, name))
}
