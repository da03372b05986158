use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::foundation::config::MixerConfig;
use crate::foundation::core::{ComplexMatrix, ComponentKind, Matrix, Shape};
use crate::foundation::error::{MixerError, MixerResult};
use crate::imaging::store::ImageStore;
use crate::spectrum::fft;

/// Which pair of spectral components a mix blends.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MixMode {
    /// Magnitude and phase; a mask gates magnitude only.
    #[default]
    MagPhase,
    /// Real and imaginary parts; a mask gates both.
    RealImag,
}

impl MixMode {
    /// The `(first, second)` component kinds this mode blends.
    pub fn components(self) -> (ComponentKind, ComponentKind) {
        match self {
            MixMode::MagPhase => (ComponentKind::Magnitude, ComponentKind::Phase),
            MixMode::RealImag => (ComponentKind::Real, ComponentKind::Imag),
        }
    }

    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            MixMode::MagPhase => "mag_phase",
            MixMode::RealImag => "real_imag",
        }
    }
}

impl fmt::Display for MixMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MixMode {
    type Err = MixerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "mag_phase" => Ok(MixMode::MagPhase),
            "real_imag" => Ok(MixMode::RealImag),
            other => Err(MixerError::validation(format!("unknown mix mode '{other}'"))),
        }
    }
}

/// Sparse image-index -> weight map for one component group.
///
/// Indices past the end of the image set are kept but ignored at mix time.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "BTreeMap<usize, f64>")]
pub struct MixWeights(BTreeMap<usize, f64>);

impl TryFrom<BTreeMap<usize, f64>> for MixWeights {
    type Error = MixerError;

    fn try_from(map: BTreeMap<usize, f64>) -> MixerResult<Self> {
        Self::from_pairs(map)
    }
}

impl MixWeights {
    /// No weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(index, weight)` pairs; later duplicates win.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, f64)>) -> MixerResult<Self> {
        let mut out = Self::new();
        for (index, weight) in pairs {
            out.set(index, weight)?;
        }
        Ok(out)
    }

    /// Set the weight of `index`. Weights must be finite and non-negative.
    pub fn set(&mut self, index: usize, weight: f64) -> MixerResult<()> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(MixerError::validation(format!(
                "weight for image {index} must be finite and >= 0, got {weight}"
            )));
        }
        self.0.insert(index, weight);
        Ok(())
    }

    /// Drop `index` from the map.
    pub fn remove(&mut self, index: usize) -> Option<f64> {
        self.0.remove(&index)
    }

    /// Weight of `index`, if set.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(&index).copied()
    }

    /// `(index, weight)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0.iter().map(|(&i, &w)| (i, w))
    }

    /// Whether no index carries a weight.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything one mixing run needs.
#[derive(Clone, Debug)]
pub struct MixInputs {
    /// Component pair to blend.
    pub mode: MixMode,
    /// Weights for the mode's first component (magnitude or real).
    pub component1: MixWeights,
    /// Weights for the mode's second component (phase or imaginary).
    pub component2: MixWeights,
    /// Source images; weight indices refer to positions in this list.
    pub images: Vec<Arc<ImageStore>>,
    /// Optional frequency gate, same shape as the images.
    pub mask: Option<Matrix>,
}

/// The two blended components right before reconstruction, mask already applied.
#[derive(Clone, Debug, PartialEq)]
pub struct MixedComponents {
    /// Mode the components belong to.
    pub mode: MixMode,
    /// Magnitude or real part.
    pub first: Matrix,
    /// Phase or imaginary part.
    pub second: Matrix,
}

/// Blends spectral components across images and inverts the result.
///
/// Stateless apart from FFT settings; it only reads the component caches of the images it
/// is given.
#[derive(Clone, Debug)]
pub struct MixingEngine {
    parallel_fft: bool,
}

impl Default for MixingEngine {
    fn default() -> Self {
        Self::new(&MixerConfig::default())
    }
}

impl MixingEngine {
    /// Engine using the FFT settings from `config`.
    pub fn new(config: &MixerConfig) -> Self {
        Self {
            parallel_fft: config.parallel_fft,
        }
    }

    /// Run the mix described by `inputs`.
    #[tracing::instrument(skip(self, inputs), fields(mode = %inputs.mode, images = inputs.images.len()))]
    pub fn mix(&self, inputs: &MixInputs) -> MixerResult<Matrix> {
        let mixed = self.mix_components(
            inputs.mode,
            &inputs.component1,
            &inputs.component2,
            &inputs.images,
            inputs.mask.as_ref(),
        )?;
        self.reconstruct(&mixed)
    }

    /// Blend magnitudes and phases, gating magnitude with `mask`.
    pub fn mix_mag_phase(
        &self,
        magnitude: &MixWeights,
        phase: &MixWeights,
        images: &[Arc<ImageStore>],
        mask: Option<&Matrix>,
    ) -> MixerResult<Matrix> {
        let mixed = self.mix_components(MixMode::MagPhase, magnitude, phase, images, mask)?;
        self.reconstruct(&mixed)
    }

    /// Blend real and imaginary parts, gating both with `mask`.
    pub fn mix_real_imag(
        &self,
        real: &MixWeights,
        imag: &MixWeights,
        images: &[Arc<ImageStore>],
        mask: Option<&Matrix>,
    ) -> MixerResult<Matrix> {
        let mixed = self.mix_components(MixMode::RealImag, real, imag, images, mask)?;
        self.reconstruct(&mixed)
    }

    /// Weighted blend of both components of `mode`, with the mask applied.
    ///
    /// A group whose in-range weights sum to zero falls back to the first image's component
    /// unchanged. In `MagPhase` only magnitude is masked; phase passes through. In
    /// `RealImag` both parts are masked.
    pub fn mix_components(
        &self,
        mode: MixMode,
        weights1: &MixWeights,
        weights2: &MixWeights,
        images: &[Arc<ImageStore>],
        mask: Option<&Matrix>,
    ) -> MixerResult<MixedComponents> {
        let reference = images.first().ok_or(MixerError::EmptyImageSet)?;
        let shape = reference.shape().ok_or(MixerError::NoImageLoaded)?;
        if let Some(mask) = mask.filter(|m| m.shape() != shape) {
            return Err(MixerError::shape_mismatch(shape, mask.shape()));
        }

        let (kind1, kind2) = mode.components();
        let mut first = blend(kind1, weights1, images, shape)?;
        let mut second = blend(kind2, weights2, images, shape)?;

        if let Some(mask) = mask {
            match mode {
                // Phase is left ungated in this mode.
                MixMode::MagPhase => first.mul_assign(mask)?,
                MixMode::RealImag => {
                    first.mul_assign(mask)?;
                    second.mul_assign(mask)?;
                }
            }
        }
        Ok(MixedComponents {
            mode,
            first,
            second,
        })
    }

    /// Rebuild the centered spectrum from `mixed`, invert it, and clip to `[0, 255]`.
    pub fn reconstruct(&self, mixed: &MixedComponents) -> MixerResult<Matrix> {
        let spectrum = match mixed.mode {
            MixMode::MagPhase => ComplexMatrix::from_polar(&mixed.first, &mixed.second)?,
            MixMode::RealImag => ComplexMatrix::from_parts(&mixed.first, &mixed.second)?,
        };
        let spatial = fft::ifft2_centered(&spectrum, self.parallel_fft);
        Ok(spatial.project(|z| z.re.clamp(0.0, 255.0)))
    }
}

fn blend(
    kind: ComponentKind,
    weights: &MixWeights,
    images: &[Arc<ImageStore>],
    shape: Shape,
) -> MixerResult<Matrix> {
    let weighted: Vec<(&Arc<ImageStore>, f64)> = weights
        .iter()
        .filter_map(|(index, w)| images.get(index).map(|img| (img, w)))
        .collect();
    let total: f64 = weighted.iter().map(|(_, w)| w).sum();

    if total <= 0.0 {
        tracing::debug!(component = %kind, "no weights configured, using first image as-is");
        return images[0].get_component(kind);
    }

    let mut acc = Matrix::zeros(shape);
    for (image, w) in weighted {
        if w == 0.0 {
            continue;
        }
        acc.add_scaled(&image.get_component(kind)?, w / total)?;
    }
    Ok(acc)
}

#[cfg(test)]
#[path = "../../tests/unit/mixing/engine.rs"]
mod tests;
