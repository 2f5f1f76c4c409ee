//! Persisted composition.

use serde_json::Value;
use tracing::debug;

use super::{KeyValueStore, StorageResult};
use crate::composition::BannerComposition;

/// Parse a saved composition, merging its fields over the defaults.
///
/// Unknown fields are ignored, and missing fields or fields with the wrong
/// shape keep their default. The result is re-validated. Returns `None` if
/// the document is not a JSON object.
pub fn parse_composition(json: &str) -> Option<BannerComposition> {
    let saved: Value = serde_json::from_str(json).ok()?;
    let Value::Object(saved) = saved else {
        return None;
    };

    let Ok(Value::Object(mut merged)) = serde_json::to_value(BannerComposition::default()) else {
        return None;
    };
    for (key, value) in saved {
        if value.is_null() {
            continue;
        }
        let Some(previous) = merged.get(&key).cloned() else {
            continue;
        };
        merged.insert(key.clone(), value);
        if serde_json::from_value::<BannerComposition>(Value::Object(merged.clone())).is_err() {
            debug!(field = %key, "Ignoring unparsable stored field");
            merged.insert(key, previous);
        }
    }

    serde_json::from_value::<BannerComposition>(Value::Object(merged))
        .ok()
        .map(|composition| composition.sanitized())
}

/// Load the composition stored under `key`, falling back to the defaults.
///
/// A missing, unreadable or corrupted entry is not an error.
pub fn load_composition<S>(store: &S, key: &str) -> BannerComposition
where
    S: KeyValueStore + ?Sized,
{
    match store.get(key) {
        Ok(Some(json)) => parse_composition(&json).unwrap_or_else(|| {
            debug!(key, "Stored composition is unparsable, using defaults");
            BannerComposition::default()
        }),
        Ok(None) => {
            debug!(key, "No stored composition, using defaults");
            BannerComposition::default()
        }
        Err(e) => {
            debug!(key, error = %e, "Failed to read stored composition, using defaults");
            BannerComposition::default()
        }
    }
}

/// Store `composition` under `key`.
pub fn save_composition<S>(
    store: &mut S,
    key: &str,
    composition: &BannerComposition,
) -> StorageResult<()>
where
    S: KeyValueStore + ?Sized,
{
    let json = serde_json::to_string(composition)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::{ImageRef, SlotKind, TextAlignment, ThemeId, MAX_TEXT_CHARS};
    use crate::storage::MemoryStore;

    const KEY: &str = "banner-state";

    #[test]
    fn test_round_trip() {
        let mut c = BannerComposition::new();
        c.set_title("Hello\nWorld");
        c.set_theme(ThemeId::Black);
        c.set_alignment(TextAlignment::Center);
        c.set_badge_enabled(true);
        c.set_badge_rotation(-2.0);
        c.set_active_slot(SlotKind::Uploaded);
        c.attach_image(SlotKind::Uploaded, ImageRef::new("data:u", 1000, 500));
        c.set_pan(50, -20);

        let mut store = MemoryStore::new();
        save_composition(&mut store, KEY, &c).unwrap();
        assert_eq!(load_composition(&store, KEY), c);
    }

    #[test]
    fn test_partial_document_merges_over_defaults() {
        let c = parse_composition(r#"{"theme":"white","unknown":42}"#).unwrap();
        assert_eq!(c.theme, ThemeId::White);
        assert_eq!(c.text, BannerComposition::default().text);
        assert_eq!(c.typography, BannerComposition::default().typography);
    }

    #[test]
    fn test_loaded_state_is_revalidated() {
        let long = "x".repeat(250);
        let json = format!(
            r#"{{"text":{{"title":"{long}"}},"slots":{{"generated":{{"image":null,"transform":{{"scale":-1,"panX":500,"panY":-500,"rotationDegrees":720}}}}}}}}"#
        );
        let c = parse_composition(&json).unwrap();
        assert_eq!(c.text.title.chars().count(), MAX_TEXT_CHARS);
        let t = c.slots[SlotKind::Generated].transform;
        assert_eq!(t.scale, 1.0);
        assert_eq!((t.pan_x, t.pan_y), (200, -200));
        assert_eq!(t.rotation_degrees, 180.0);
    }

    #[test]
    fn test_corrupted_state_falls_back_to_defaults() {
        let mut store = MemoryStore::new();
        for garbage in ["{not json", "[1,2,3]", "\"text\""] {
            store.set(KEY, garbage).unwrap();
            assert_eq!(load_composition(&store, KEY), BannerComposition::default());
        }
    }

    #[test]
    fn test_bad_field_keeps_the_other_fields() {
        let c = parse_composition(
            r#"{"text":{"title":"keep me"},"theme":"purple","alignment":"end"}"#,
        )
        .unwrap();
        assert_eq!(c.text.title, "keep me");
        assert_eq!(c.theme, BannerComposition::default().theme);
        assert_eq!(c.alignment, TextAlignment::End);
    }

    #[test]
    fn test_missing_state() {
        let store = MemoryStore::new();
        assert_eq!(load_composition(&store, KEY), BannerComposition::default());
    }
}
