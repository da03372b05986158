use std::sync::Arc;

use crate::foundation::core::{MAX_SLOTS, Shape, SlotIndex};
use crate::foundation::error::{MixerError, MixerResult};
use crate::imaging::store::ImageStore;

/// Slot-indexed set of loaded images plus the shape they currently share.
///
/// Stores are handed out as `Arc` so a background mix can hold a snapshot while the control
/// thread keeps serving uploads.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    slots: [Option<Arc<ImageStore>>; MAX_SLOTS],
    common_shape: Option<Shape>,
}

impl SessionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `image` into `slot`, returning the store it displaced.
    ///
    /// The common shape is not touched; run
    /// [`enforce_unified_size`](crate::enforce_unified_size) afterwards.
    pub fn store(
        &mut self,
        slot: SlotIndex,
        image: ImageStore,
    ) -> MixerResult<Option<Arc<ImageStore>>> {
        check_slot(slot)?;
        if !image.is_loaded() {
            return Err(MixerError::NoImageLoaded);
        }
        Ok(self.slots[slot].replace(Arc::new(image)))
    }

    /// Image in `slot`, if any. Out-of-range slots hold nothing.
    pub fn get(&self, slot: SlotIndex) -> Option<Arc<ImageStore>> {
        self.slots.get(slot).cloned().flatten()
    }

    /// Take the image out of `slot`. Clears the common shape once the last image is gone.
    pub fn remove(&mut self, slot: SlotIndex) -> MixerResult<Option<Arc<ImageStore>>> {
        check_slot(slot)?;
        let removed = self.slots[slot].take();
        if self.is_empty() {
            self.common_shape = None;
        }
        Ok(removed)
    }

    /// Populated slots in slot order.
    pub fn slots(&self) -> impl Iterator<Item = (SlotIndex, &Arc<ImageStore>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|img| (i, img)))
    }

    /// Handles to every stored image, in slot order.
    pub fn images(&self) -> Vec<Arc<ImageStore>> {
        self.slots().map(|(_, img)| Arc::clone(img)).collect()
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no slot is populated.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape every stored image currently shares, `None` when empty.
    pub fn common_shape(&self) -> Option<Shape> {
        self.common_shape
    }

    pub(crate) fn set_common_shape(&mut self, shape: Option<Shape>) {
        self.common_shape = shape;
    }

    /// Drop every image and the common shape.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub(crate) fn check_slot(slot: SlotIndex) -> MixerResult<()> {
    if slot >= MAX_SLOTS {
        return Err(MixerError::validation(format!(
            "slot {slot} out of range (0..{MAX_SLOTS})"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/registry.rs"]
mod tests;
