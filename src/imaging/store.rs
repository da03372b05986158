use std::sync::{Mutex, MutexGuard, PoisonError};

use rustfft::num_complex::Complex64;

use crate::foundation::config::{MixerConfig, ResampleFilter};
use crate::foundation::core::{ComplexMatrix, ComponentKind, Matrix, Shape};
use crate::foundation::error::{MixerError, MixerResult};
use crate::imaging::{codec, display, resample};
use crate::spectrum::fft;

/// Observable cache phase of an [`ImageStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// No pixels loaded.
    Empty,
    /// Pixels loaded, spectrum not yet computed.
    RawOnly,
    /// Centered spectrum computed; derived views fill lazily.
    TransformComputed,
}

#[derive(Clone, Debug)]
struct Pixels {
    /// Matrix as loaded; resizes always resample from here.
    original: Matrix,
    /// Working matrix at the current shape.
    raw: Matrix,
}

#[derive(Clone, Debug)]
struct Spectrum {
    transform: ComplexMatrix,
    magnitude: Option<Matrix>,
    phase: Option<Matrix>,
    real: Option<Matrix>,
    imag: Option<Matrix>,
}

impl Spectrum {
    fn new(transform: ComplexMatrix) -> Self {
        Self {
            transform,
            magnitude: None,
            phase: None,
            real: None,
            imag: None,
        }
    }

    /// Cached derived view for a spectral `kind`; `None` for [`ComponentKind::Raw`].
    fn component(&mut self, kind: ComponentKind) -> Option<&Matrix> {
        let Spectrum {
            transform,
            magnitude,
            phase,
            real,
            imag,
        } = self;
        let (slot, project): (&mut Option<Matrix>, fn(Complex64) -> f64) = match kind {
            ComponentKind::Raw => return None,
            ComponentKind::Magnitude => (magnitude, Complex64::norm),
            ComponentKind::Phase => (phase, Complex64::arg),
            ComponentKind::Real => (real, real_part),
            ComponentKind::Imag => (imag, imag_part),
        };
        Some(slot.get_or_insert_with(|| {
            tracing::debug!(component = %kind, "filling derived component cache");
            transform.project(project)
        }))
    }
}

fn real_part(z: Complex64) -> f64 {
    z.re
}

fn imag_part(z: Complex64) -> f64 {
    z.im
}

#[derive(Debug, Default)]
enum ImageState {
    #[default]
    Empty,
    RawOnly(Pixels),
    TransformComputed(Pixels, Spectrum),
}

impl ImageState {
    fn pixels(&self) -> Option<&Pixels> {
        match self {
            ImageState::Empty => None,
            ImageState::RawOnly(p) | ImageState::TransformComputed(p, _) => Some(p),
        }
    }

    fn cache_state(&self) -> CacheState {
        match self {
            ImageState::Empty => CacheState::Empty,
            ImageState::RawOnly(_) => CacheState::RawOnly,
            ImageState::TransformComputed(..) => CacheState::TransformComputed,
        }
    }
}

/// One image's pixels plus its lazily computed centered spectrum and derived views.
///
/// Every mutation and every cache fill runs under one per-instance lock, so a reader on
/// another thread either sees the previous fully-formed state or the new one. Changing the
/// pixels (`load`, `resize`) drops the spectrum and all four derived views together.
#[derive(Debug)]
pub struct ImageStore {
    state: Mutex<ImageState>,
    filter: ResampleFilter,
    parallel_fft: bool,
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new(&MixerConfig::default())
    }
}

impl ImageStore {
    /// Empty store using the resampling and FFT settings from `config`.
    pub fn new(config: &MixerConfig) -> Self {
        Self {
            state: Mutex::new(ImageState::Empty),
            filter: config.resample_filter,
            parallel_fft: config.parallel_fft,
        }
    }

    /// Store already holding `raw`.
    pub fn with_matrix(raw: Matrix, config: &MixerConfig) -> MixerResult<Self> {
        let store = Self::new(config);
        store.load(raw)?;
        Ok(store)
    }

    /// Replace the pixels, resetting the original shape and invalidating every cache.
    pub fn load(&self, raw: Matrix) -> MixerResult<()> {
        if raw.as_slice().iter().any(|v| !v.is_finite()) {
            return Err(MixerError::validation("image intensities must be finite"));
        }
        let mut state = self.lock();
        tracing::debug!(shape = %raw.shape(), "loading image, caches invalidated");
        *state = ImageState::RawOnly(Pixels {
            original: raw.clone(),
            raw,
        });
        Ok(())
    }

    /// Decode `bytes` and [`load`](Self::load) the result. Decode failures leave the store
    /// untouched.
    pub fn load_encoded(&self, bytes: &[u8]) -> MixerResult<()> {
        let raw = codec::decode_grayscale(bytes)?;
        self.load(raw)
    }

    /// Resample the original pixels to `target`. No-op when nothing is loaded.
    pub fn resize(&self, target: Shape) -> MixerResult<()> {
        let mut state = self.lock();
        let Some(pixels) = state.pixels() else {
            return Ok(());
        };
        let raw = resample::resample(&pixels.original, target, self.filter)?;
        let original = pixels.original.clone();
        tracing::debug!(from = %pixels.raw.shape(), to = %target, "resized image, caches invalidated");
        *state = ImageState::RawOnly(Pixels { original, raw });
        Ok(())
    }

    /// Copy of the requested component.
    ///
    /// Spectral kinds compute the centered transform on first use and cache both it and the
    /// requested derived view until the next pixel change.
    pub fn get_component(&self, kind: ComponentKind) -> MixerResult<Matrix> {
        let mut state = self.lock();
        if kind == ComponentKind::Raw {
            return state
                .pixels()
                .map(|p| p.raw.clone())
                .ok_or(MixerError::NoImageLoaded);
        }
        let spectrum = self.ensure_transform(&mut state)?;
        spectrum
            .component(kind)
            .cloned()
            .ok_or_else(|| MixerError::validation(format!("'{kind}' is not a spectral component")))
    }

    /// Component scaled for display: `log(1 + |x|)` for magnitude/real/imag, then min-max
    /// normalized into `[0, 1]`.
    pub fn get_display_component(&self, kind: ComponentKind) -> MixerResult<Matrix> {
        let data = self.get_component(kind)?;
        Ok(display::to_display(data, kind))
    }

    /// Copy of the centered complex spectrum.
    pub fn transform(&self) -> MixerResult<ComplexMatrix> {
        let mut state = self.lock();
        let spectrum = self.ensure_transform(&mut state)?;
        Ok(spectrum.transform.clone())
    }

    /// Current shape, `None` when empty.
    pub fn shape(&self) -> Option<Shape> {
        self.lock().pixels().map(|p| p.raw.shape())
    }

    /// Shape of the matrix as loaded, before any resize.
    pub fn original_shape(&self) -> Option<Shape> {
        self.lock().pixels().map(|p| p.original.shape())
    }

    /// Whether pixels are loaded.
    pub fn is_loaded(&self) -> bool {
        self.lock().pixels().is_some()
    }

    /// Current cache phase.
    pub fn cache_state(&self) -> CacheState {
        self.lock().cache_state()
    }

    fn ensure_transform<'a>(&self, state: &'a mut ImageState) -> MixerResult<&'a mut Spectrum> {
        let parallel = self.parallel_fft;
        fill_transform(state, |raw| fft::fft2_centered(raw, parallel))
    }

    fn lock(&self) -> MutexGuard<'_, ImageState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Promote `RawOnly` to `TransformComputed` with `compute`, leaving `state` untouched if it
/// unwinds.
fn fill_transform<'a>(
    state: &'a mut ImageState,
    compute: impl FnOnce(&Matrix) -> ComplexMatrix,
) -> MixerResult<&'a mut Spectrum> {
    if let ImageState::RawOnly(pixels) = &*state {
        tracing::debug!(shape = %pixels.raw.shape(), "computing centered transform");
        let spectrum = Spectrum::new(compute(&pixels.raw));
        if let ImageState::RawOnly(pixels) = std::mem::take(state) {
            *state = ImageState::TransformComputed(pixels, spectrum);
        }
    }
    match state {
        ImageState::TransformComputed(_, spectrum) => Ok(spectrum),
        _ => Err(MixerError::NoImageLoaded),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/imaging/store.rs"]
mod tests;
