use crate::foundation::core::Shape;
use crate::foundation::error::MixerResult;
use crate::session::registry::SessionRegistry;

/// Bring every stored image to one shape: the per-axis minimum of their *original* shapes.
///
/// Working from originals rather than from the last enforced shape lets the common shape grow
/// back when a small image is removed or replaced. Returns the enforced shape, `None` when the
/// registry is empty.
#[tracing::instrument(skip(registry), fields(images = registry.len()))]
pub fn enforce_unified_size(registry: &mut SessionRegistry) -> MixerResult<Option<Shape>> {
    let Some(common) = min_original_shape(registry) else {
        registry.set_common_shape(None);
        return Ok(None);
    };
    registry.set_common_shape(Some(common));

    for (slot, image) in registry.slots() {
        if image.shape() != Some(common) {
            tracing::debug!(slot, to = %common, "unifying image size");
            image.resize(common)?;
        }
    }
    Ok(Some(common))
}

fn min_original_shape(registry: &SessionRegistry) -> Option<Shape> {
    registry
        .slots()
        .filter_map(|(_, image)| image.original_shape())
        .reduce(Shape::min_axes)
}

#[cfg(test)]
#[path = "../../tests/unit/session/unify.rs"]
mod tests;
