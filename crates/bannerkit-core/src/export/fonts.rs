//! Fonts available to the rasterizer.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use resvg::usvg::fontdb::Database;
use tracing::{debug, warn};

use super::ExportError;
use crate::config::ExportConfig;

const FONT_EXTENSIONS: [&str; 4] = ["ttf", "otf", "ttc", "otc"];

/// A loaded font database.
///
/// Building a `FontSet` is the point where fonts are settled: everything is
/// read and parsed up front, so a capture never races a late font load.
#[derive(Clone, Default)]
pub struct FontSet {
    db: Arc<Database>,
}

impl std::fmt::Debug for FontSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontSet")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl FontSet {
    /// A font set without any faces. Exports with text fail until one is loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the fonts described by `config`.
    pub fn from_config(config: &ExportConfig) -> Result<Self, ExportError> {
        let mut fonts = Self::empty();
        if config.load_system_fonts {
            fonts.load_system_fonts();
        }
        for dir in &config.font_dirs {
            fonts.load_dir(dir)?;
        }
        fonts.settle_generic_families();
        debug!(faces = fonts.len(), "Loaded export fonts");
        Ok(fonts)
    }

    /// Load the fonts installed on the system.
    #[cfg(feature = "system-fonts")]
    pub fn load_system_fonts(&mut self) {
        Arc::make_mut(&mut self.db).load_system_fonts();
    }

    /// Load the fonts installed on the system.
    #[cfg(not(feature = "system-fonts"))]
    pub fn load_system_fonts(&mut self) {
        warn!("System fonts requested but the system-fonts feature is disabled");
    }

    /// Load every font file directly inside `dir`. Returns the number of new faces.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, ExportError> {
        let entries = fs::read_dir(dir).map_err(|e| ExportError::Fonts {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;

        let before = self.len();
        for entry in entries.flatten() {
            let path = entry.path();
            let is_font = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| FONT_EXTENSIONS.iter().any(|f| ext.eq_ignore_ascii_case(f)));
            if !is_font {
                continue;
            }
            match fs::read(&path) {
                Ok(bytes) => self.load_bytes(bytes),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable font"),
            }
        }
        Ok(self.len() - before)
    }

    /// Load a font from its file contents.
    pub fn load_bytes(&mut self, bytes: Vec<u8>) {
        Arc::make_mut(&mut self.db).load_font_data(bytes);
    }

    /// Point the generic `sans-serif` family at a loaded face when the
    /// default one is missing.
    pub fn settle_generic_families(&mut self) {
        let has_default = self.db.faces().any(|face| {
            face.families
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("Arial"))
        });
        if has_default {
            return;
        }
        let first = self
            .db
            .faces()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
        if let Some(family) = first {
            debug!(family = %family, "Using fallback sans-serif family");
            Arc::make_mut(&mut self.db).set_sans_serif_family(family);
        }
    }

    /// Number of loaded faces.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.len() == 0
    }

    pub(crate) fn database(&self) -> Arc<Database> {
        Arc::clone(&self.db)
    }
}

/// DejaVu Sans, bundled for exports in tests.
#[cfg(test)]
pub(crate) const TEST_FONT: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/DejaVuSans.ttf"
));

#[cfg(test)]
impl FontSet {
    pub(crate) fn for_tests() -> Self {
        let mut fonts = Self::empty();
        fonts.load_bytes(TEST_FONT.to_vec());
        fonts.settle_generic_families();
        fonts
    }
}
