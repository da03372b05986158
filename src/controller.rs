use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::foundation::config::MixerConfig;
use crate::foundation::core::{ComponentKind, Matrix, Shape, SlotIndex};
use crate::foundation::error::{MixerError, MixerResult};
use crate::imaging::codec;
use crate::imaging::store::ImageStore;
use crate::jobs::runner::{JobRunner, JobStatus};
use crate::mixing::engine::{MixInputs, MixMode, MixWeights};
use crate::mixing::mask::{Rect, RegionSelection};
use crate::session::registry::{SessionRegistry, check_slot};
use crate::session::unify::enforce_unified_size;

/// Which of the mode's two component groups a slot's weight feeds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightGroup {
    /// Magnitude in `MagPhase`, real part in `RealImag`.
    First,
    /// Phase in `MagPhase`, imaginary part in `RealImag`.
    Second,
}

impl fmt::Display for WeightGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WeightGroup::First => "first",
            WeightGroup::Second => "second",
        })
    }
}

impl FromStr for WeightGroup {
    type Err = MixerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "1" => Ok(WeightGroup::First),
            "second" | "2" => Ok(WeightGroup::Second),
            other => Err(MixerError::validation(format!(
                "unknown weight group '{other}'"
            ))),
        }
    }
}

/// Everything a caller needs to refresh its views after an upload.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadReport {
    /// Display view of the uploaded pixels at the common shape.
    pub raw_display: Matrix,
    /// Display view of `spectrum_kind`.
    pub spectrum_display: Matrix,
    /// Spectral component shown in `spectrum_display`.
    pub spectrum_kind: ComponentKind,
    /// Shape of the uploaded image after unification.
    pub image_shape: Shape,
    /// Shape shared by every image in the session.
    pub common_shape: Shape,
}

/// One mixing session: up to four images, per-group weights, mode, region and a job runner.
///
/// The registry sits behind an `Arc<RwLock<..>>` so other threads can read it through
/// [`registry`](Self::registry); background mixes only ever see `Arc` snapshots of the
/// stores, taken when [`start_mix`](Self::start_mix) runs.
#[derive(Debug)]
pub struct MixerSession {
    config: MixerConfig,
    registry: Arc<RwLock<SessionRegistry>>,
    weights1: MixWeights,
    weights2: MixWeights,
    mode: MixMode,
    region: RegionSelection,
    runner: JobRunner,
}

impl Default for MixerSession {
    fn default() -> Self {
        Self::new(MixerConfig::default())
    }
}

impl MixerSession {
    /// Empty session.
    pub fn new(config: MixerConfig) -> Self {
        let runner = JobRunner::new(&config);
        Self {
            config,
            registry: Arc::new(RwLock::new(SessionRegistry::new())),
            weights1: MixWeights::new(),
            weights2: MixWeights::new(),
            mode: MixMode::default(),
            region: RegionSelection::new(),
            runner,
        }
    }

    /// Settings the session was built with.
    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    /// Shared handle to the image registry.
    pub fn registry(&self) -> Arc<RwLock<SessionRegistry>> {
        Arc::clone(&self.registry)
    }

    /// Store `raw` in `slot`, re-unify sizes, and return fresh display views.
    #[tracing::instrument(skip(self, raw), fields(shape = %raw.shape()))]
    pub fn upload(
        &self,
        slot: SlotIndex,
        raw: Matrix,
        spectrum_kind: ComponentKind,
    ) -> MixerResult<UploadReport> {
        if !spectrum_kind.is_spectral() {
            return Err(MixerError::validation(format!(
                "'{spectrum_kind}' is not a spectral component"
            )));
        }
        let store = ImageStore::with_matrix(raw, &self.config)?;

        let (image, common_shape) = {
            let mut registry = self.write_registry();
            registry.store(slot, store)?;
            let common = enforce_unified_size(&mut registry)?;
            let image = registry.get(slot).ok_or(MixerError::NoImageLoaded)?;
            (image, common.ok_or(MixerError::NoImageLoaded)?)
        };

        let report = UploadReport {
            raw_display: image.get_display_component(ComponentKind::Raw)?,
            spectrum_display: image.get_display_component(spectrum_kind)?,
            spectrum_kind,
            image_shape: image.shape().ok_or(MixerError::NoImageLoaded)?,
            common_shape,
        };
        tracing::info!(slot, common = %common_shape, "image uploaded");
        Ok(report)
    }

    /// Decode `bytes` and [`upload`](Self::upload) the result.
    pub fn upload_encoded(
        &self,
        slot: SlotIndex,
        bytes: &[u8],
        spectrum_kind: ComponentKind,
    ) -> MixerResult<UploadReport> {
        let raw = codec::decode_grayscale(bytes)?;
        self.upload(slot, raw, spectrum_kind)
    }

    /// Empty `slot` and re-unify the rest. Returns the new common shape.
    pub fn remove(&self, slot: SlotIndex) -> MixerResult<Option<Shape>> {
        let mut registry = self.write_registry();
        if registry.remove(slot)?.is_some() {
            tracing::info!(slot, "image removed");
        }
        enforce_unified_size(&mut registry)
    }

    /// Display view of `kind` for the image in `slot`; `None` for an empty slot.
    pub fn select_display(
        &self,
        slot: SlotIndex,
        kind: ComponentKind,
    ) -> MixerResult<Option<Matrix>> {
        let image = self.read_registry().get(slot);
        image
            .map(|img| img.get_display_component(kind))
            .transpose()
    }

    /// Assign `weight` (in `[0, 1]`) for `slot` to `group`, removing the slot from the other
    /// group.
    pub fn set_weight(
        &mut self,
        slot: SlotIndex,
        weight: f64,
        group: WeightGroup,
    ) -> MixerResult<()> {
        check_slot(slot)?;
        if !(0.0..=1.0).contains(&weight) {
            return Err(MixerError::validation(format!(
                "weight must be within [0, 1], got {weight}"
            )));
        }
        let (target, other) = match group {
            WeightGroup::First => (&mut self.weights1, &mut self.weights2),
            WeightGroup::Second => (&mut self.weights2, &mut self.weights1),
        };
        other.remove(slot);
        target.set(slot, weight)
    }

    /// Current weights of `group`, keyed by slot.
    pub fn weights(&self, group: WeightGroup) -> &MixWeights {
        match group {
            WeightGroup::First => &self.weights1,
            WeightGroup::Second => &self.weights2,
        }
    }

    /// Select the component pair the next mix blends.
    pub fn set_mode(&mut self, mode: MixMode) {
        self.mode = mode;
    }

    /// Current mix mode.
    pub fn mode(&self) -> MixMode {
        self.mode
    }

    /// Set or clear the region rectangle and its polarity.
    pub fn set_region(&mut self, rect: Option<Rect>, is_inner: bool) {
        match rect {
            Some(rect) => self.region.set_rectangle(rect),
            None => self.region.clear_rectangle(),
        }
        self.region.set_inner(is_inner);
    }

    /// Current region selection.
    pub fn region(&self) -> &RegionSelection {
        &self.region
    }

    /// Snapshot the images, weights, mode and mask, and hand them to the job runner.
    ///
    /// Weights are keyed by slot here but by position in the image list inside the engine,
    /// so they are re-indexed against the populated slots. Failures inside the mix itself
    /// surface through [`poll_progress`](Self::poll_progress).
    #[tracing::instrument(skip(self), fields(mode = %self.mode))]
    pub fn start_mix(&mut self) -> MixerResult<()> {
        let (slots, images, common_shape) = {
            let registry = self.read_registry();
            let (slots, images): (Vec<SlotIndex>, Vec<Arc<ImageStore>>) = registry
                .slots()
                .map(|(slot, img)| (slot, Arc::clone(img)))
                .unzip();
            (slots, images, registry.common_shape())
        };

        let reindex = |weights: &MixWeights| -> MixerResult<MixWeights> {
            MixWeights::from_pairs(weights.iter().filter_map(|(slot, w)| {
                slots.iter().position(|&s| s == slot).map(|pos| (pos, w))
            }))
        };
        let mask = common_shape
            .filter(|_| self.region.has_rectangle())
            .map(|shape| self.region.mask_for(shape));

        let inputs = MixInputs {
            mode: self.mode,
            component1: reindex(&self.weights1)?,
            component2: reindex(&self.weights2)?,
            images,
            mask,
        };
        self.runner.submit(inputs)
    }

    /// Cancel the running mix, if any.
    pub fn cancel_mix(&mut self) {
        self.runner.cancel_running();
    }

    /// Progress of the latest mix; `-1.0` after a failure.
    pub fn poll_progress(&self) -> f64 {
        self.runner.poll_progress()
    }

    /// Result of the latest mix, once published.
    pub fn poll_result(&self) -> Option<Matrix> {
        self.runner.poll_result()
    }

    /// Whether a mix is still computing.
    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    /// Snapshot of the latest mix.
    pub fn status(&self) -> JobStatus {
        self.runner.status()
    }

    /// Cancel any mix and drop every image, weight and region setting.
    pub fn reset(&mut self) {
        self.runner.cancel_running();
        self.write_registry().reset();
        self.weights1 = MixWeights::new();
        self.weights2 = MixWeights::new();
        self.mode = MixMode::default();
        self.region = RegionSelection::new();
        tracing::info!("session reset");
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, SessionRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, SessionRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../tests/unit/controller.rs"]
mod tests;
