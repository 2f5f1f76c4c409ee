//! BannerKit WASM - WebAssembly bindings for BannerKit
//!
//! This crate exposes the bannerkit-core editor session to a browser UI,
//! persisting it to `localStorage`.
//!
//! # Module Structure
//!
//! - `editor` - The `JsBannerEditor` session (text, theme, geometry,
//!   requests, export, templates)
//! - `storage` - `localStorage`-backed key-value store
//! - `types` - WASM-compatible wrapper types for tokens and export artifacts
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsBannerEditor } from '@bannerkit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const editor = new JsBannerEditor({ export: { settleDelayMs: 100 } });
//! editor.set_title('Hello\nWorld');
//! preview.innerHTML = editor.render_svg(1);
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod storage;
mod types;

// Re-export public types
pub use editor::JsBannerEditor;
pub use storage::LocalStorageStore;
pub use types::{JsExportArtifact, JsGenerationRequest, JsRequestToken};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    bannerkit_core::VERSION.to_string()
}

/// Convert an error into a JS exception value.
pub(crate) fn to_js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Warn on the browser console, where no tracing subscriber listens.
#[cfg(target_arch = "wasm32")]
pub(crate) fn console_warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn console_warn(message: &str) {
    tracing::warn!("{}", message);
}
