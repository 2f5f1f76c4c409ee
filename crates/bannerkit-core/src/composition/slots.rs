//! Image slots: one for generated images, one for uploads.
//!
//! Both slots share one record type so they cannot drift apart, and
//! switching the active slot never touches the other one.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::geometry::{AnchorMode, ImageTransform};

/// Which image source a slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    #[default]
    Generated,
    Uploaded,
}

impl SlotKind {
    pub const ALL: [SlotKind; 2] = [SlotKind::Generated, SlotKind::Uploaded];

    /// Generated images are contained in the image area; uploads are free
    /// to move around it.
    pub fn anchor_mode(self) -> AnchorMode {
        match self {
            SlotKind::Generated => AnchorMode::Contain,
            SlotKind::Uploaded => AnchorMode::CenterOverlay,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SlotKind::Generated => "generated",
            SlotKind::Uploaded => "uploaded",
        }
    }
}

/// A reference to an image plus its intrinsic size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    /// URL or `data:` URL of the image.
    pub source_url: String,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl ImageRef {
    pub fn new(source_url: impl Into<String>, natural_width: u32, natural_height: u32) -> Self {
        Self {
            source_url: source_url.into(),
            natural_width,
            natural_height,
        }
    }

    pub fn is_embedded(&self) -> bool {
        self.source_url.starts_with("data:")
    }

    pub fn has_size(&self) -> bool {
        self.natural_width > 0 && self.natural_height > 0
    }
}

/// One slot: an optional image and its own transform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSlot {
    pub image: Option<ImageRef>,
    pub transform: ImageTransform,
}

impl ImageSlot {
    pub fn is_empty(&self) -> bool {
        self.image.is_none()
    }

    /// Attach a new image, auto-scaling it to the banner height and
    /// resetting pan.
    pub fn attach(&mut self, image: ImageRef) {
        self.transform = ImageTransform::auto_scaled(&self.transform, image.natural_height);
        self.image = Some(image);
    }

    /// Swap in an image with the same content, e.g. after background
    /// removal. The user's adjustments survive unless the size changed.
    pub fn replace_content(&mut self, image: ImageRef) {
        let same_size = self.image.as_ref().is_some_and(|current| {
            current.natural_width == image.natural_width
                && current.natural_height == image.natural_height
        });
        if same_size {
            self.image = Some(image);
        } else {
            self.attach(image);
        }
    }

    pub fn clear(&mut self) {
        self.image = None;
    }

    pub fn sanitized(&self) -> Self {
        Self {
            // An image without a usable size cannot be placed.
            image: self.image.clone().filter(ImageRef::has_size),
            transform: self.transform.sanitized(),
        }
    }
}

/// Both slots, addressed by [`SlotKind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSlots {
    generated: ImageSlot,
    uploaded: ImageSlot,
}

impl ImageSlots {
    pub fn get(&self, kind: SlotKind) -> &ImageSlot {
        match kind {
            SlotKind::Generated => &self.generated,
            SlotKind::Uploaded => &self.uploaded,
        }
    }

    pub fn get_mut(&mut self, kind: SlotKind) -> &mut ImageSlot {
        match kind {
            SlotKind::Generated => &mut self.generated,
            SlotKind::Uploaded => &mut self.uploaded,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKind, &ImageSlot)> {
        SlotKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }

    pub fn sanitized(&self) -> Self {
        Self {
            generated: self.generated.sanitized(),
            uploaded: self.uploaded.sanitized(),
        }
    }
}

impl Index<SlotKind> for ImageSlots {
    type Output = ImageSlot;

    fn index(&self, kind: SlotKind) -> &ImageSlot {
        self.get(kind)
    }
}

impl IndexMut<SlotKind> for ImageSlots {
    fn index_mut(&mut self, kind: SlotKind) -> &mut ImageSlot {
        self.get_mut(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_auto_scales() {
        let mut slot = ImageSlot::default();
        slot.transform.set_pan(30, 30);
        slot.attach(ImageRef::new("data:image/png;base64,AA==", 1000, 500));
        assert!((slot.transform.scale - 0.336).abs() < 1e-12);
        assert_eq!((slot.transform.pan_x, slot.transform.pan_y), (0, 0));
    }

    #[test]
    fn test_replace_same_size_keeps_adjustments() {
        let mut slot = ImageSlot::default();
        slot.attach(ImageRef::new("a", 400, 400));
        slot.transform.set_pan(10, 20);
        slot.replace_content(ImageRef::new("b", 400, 400));
        assert_eq!(slot.transform.pan_x, 10);
        assert_eq!(slot.image.as_ref().unwrap().source_url, "b");

        slot.replace_content(ImageRef::new("c", 800, 200));
        assert_eq!(slot.transform.pan_x, 0);
        assert!((slot.transform.scale - 0.84).abs() < 1e-12);
    }

    #[test]
    fn test_clear() {
        let mut slot = ImageSlot::default();
        slot.attach(ImageRef::new("a", 10, 10));
        slot.clear();
        assert!(slot.is_empty());
    }

    #[test]
    fn test_slots_are_independent() {
        let mut slots = ImageSlots::default();
        slots[SlotKind::Uploaded].transform.set_pan(50, -20);
        assert_eq!(slots[SlotKind::Generated].transform.pan_x, 0);
        assert_eq!(slots[SlotKind::Uploaded].transform.pan_y, -20);
    }

    #[test]
    fn test_anchor_mode_per_slot() {
        assert_eq!(SlotKind::Generated.anchor_mode(), AnchorMode::Contain);
        assert_eq!(SlotKind::Uploaded.anchor_mode(), AnchorMode::CenterOverlay);
    }

    #[test]
    fn test_sanitized_drops_sizeless_image() {
        let slot = ImageSlot {
            image: Some(ImageRef::new("a", 0, 10)),
            transform: ImageTransform::default(),
        };
        assert!(slot.sanitized().is_empty());
    }

    #[test]
    fn test_serde_shape() {
        let mut slots = ImageSlots::default();
        slots[SlotKind::Generated].attach(ImageRef::new("x", 10, 20));
        let json = serde_json::to_value(&slots).unwrap();
        assert_eq!(json["generated"]["image"]["naturalHeight"], 20);
        assert!(json["uploaded"]["image"].is_null());
    }
}
