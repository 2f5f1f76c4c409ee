//! Editor configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration of an editor session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Storage keys.
    pub storage: StorageConfig,

    /// Export settings.
    pub export: ExportConfig,

    /// Template settings.
    pub templates: TemplateConfig,
}

/// Keys under which the session persists its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfig {
    /// Key of the current composition.
    pub state_key: String,

    /// Key of the template list.
    pub templates_key: String,
}

/// Export pipeline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportConfig {
    /// Delay before capture, in milliseconds.
    pub settle_delay_ms: u64,

    /// Directories scanned for `.ttf`/`.otf`/`.ttc` files.
    pub font_dirs: Vec<PathBuf>,

    /// Whether to load the system fonts (needs the `system-fonts` feature).
    pub load_system_fonts: bool,
}

/// Template settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TemplateConfig {
    /// Saving a template whose embedded images exceed this many bytes logs
    /// a warning. Browser storage quotas are a few megabytes.
    pub inline_image_warn_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_key: "banner-state".to_string(),
            templates_key: "banner-templates".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 100,
            font_dirs: Vec::new(),
            load_system_fonts: true,
        }
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            inline_image_warn_bytes: 2 * 1024 * 1024,
        }
    }
}

impl ExportConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl EditorConfig {
    /// Parse a configuration; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
