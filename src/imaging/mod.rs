//! Per-image pixel storage with cached spectra, plus codec and resampling helpers.

/// Grayscale decode and PNG encode.
pub mod codec;
pub(crate) mod display;
pub(crate) mod resample;
/// Image store with lazy transform caching.
pub mod store;
