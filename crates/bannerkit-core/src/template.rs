//! Named snapshots of a composition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::composition::BannerComposition;

/// Errors that can occur when managing templates.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Template names must contain something besides whitespace
    #[error("Template name is empty")]
    EmptyName,

    #[error("Template not found: {0}")]
    NotFound(String),
}

/// A saved composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    pub state: BannerComposition,
}

impl Template {
    /// Bytes of embedded image data held by the snapshot.
    pub fn inline_image_bytes(&self) -> usize {
        self.state
            .slots
            .iter()
            .filter_map(|(_, slot)| slot.image.as_ref())
            .filter(|image| image.is_embedded())
            .map(|image| image.source_url.len())
            .sum()
    }
}

/// Templates, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateLibrary {
    templates: Vec<Template>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored library. Entries that fail to parse are dropped.
    pub fn from_json_str(json: &str) -> Self {
        let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(json) else {
            debug!("Stored templates are unparsable, starting empty");
            return Self::default();
        };
        let total = values.len();
        let templates: Vec<Template> = values
            .into_iter()
            .filter_map(|value| serde_json::from_value::<Template>(value).ok())
            .map(|mut template| {
                template.state = template.state.sanitized();
                template
            })
            .collect();
        if templates.len() != total {
            debug!(
                dropped = total - templates.len(),
                "Dropped unparsable stored templates"
            );
        }
        Self { templates }
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Snapshot `composition` under `name`, stamped with the current time.
    pub fn save(
        &mut self,
        name: &str,
        composition: &BannerComposition,
        inline_image_warn_bytes: usize,
    ) -> Result<&Template, TemplateError> {
        self.save_at(name, composition, Utc::now(), inline_image_warn_bytes)
    }

    /// Snapshot `composition` under `name` with an explicit timestamp.
    pub fn save_at(
        &mut self,
        name: &str,
        composition: &BannerComposition,
        created_at: DateTime<Utc>,
        inline_image_warn_bytes: usize,
    ) -> Result<&Template, TemplateError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TemplateError::EmptyName);
        }

        let template = Template {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            created_at,
            state: composition.clone(),
        };
        let inline_bytes = template.inline_image_bytes();
        if inline_bytes > inline_image_warn_bytes {
            warn!(
                name,
                inline_bytes,
                limit = inline_image_warn_bytes,
                "Template holds large embedded images and may exceed storage quota"
            );
        }
        info!(id = %template.id, name, "Saved template");

        self.templates.insert(0, template);
        Ok(&self.templates[0])
    }

    /// A copy of the stored composition, ready to become the current one.
    pub fn load(&self, id: &str) -> Result<BannerComposition, TemplateError> {
        self.get(id)
            .map(|template| template.state.sanitized())
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    pub fn delete(&mut self, id: &str) -> Result<Template, TemplateError> {
        let index = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        Ok(self.templates.remove(index))
    }
}
