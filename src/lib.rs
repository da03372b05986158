//! Frequency-domain mixing of up to four grayscale images.
//!
//! Each image lives in an [`ImageStore`] that lazily caches its DC-centered spectrum and the
//! magnitude, phase, real and imaginary views derived from it. A [`SessionRegistry`] holds up
//! to four stores at one common shape; [`MixingEngine`] blends one component pair across them,
//! optionally gated by a rectangular frequency mask, and inverts the result. [`JobRunner`]
//! runs that blend on a background thread with polled progress, and [`MixerSession`] ties
//! everything together behind an upload / weight / mix / poll interface:
//!
//! - Upload images with [`MixerSession::upload`] or [`MixerSession::upload_encoded`]
//! - Assign weights per slot and group with [`MixerSession::set_weight`]
//! - Start a mix with [`MixerSession::start_mix`] and poll it with
//!   [`MixerSession::poll_progress`] / [`MixerSession::poll_result`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Session facade over registry, weights, region and job runner.
pub mod controller;
/// Shared primitives.
pub mod foundation;
/// Image storage and codecs.
pub mod imaging;
/// Background jobs.
pub mod jobs;
/// Blending and masks.
pub mod mixing;
/// Registry and size unification.
pub mod session;
/// Centered FFTs.
pub mod spectrum;

pub use crate::controller::{MixerSession, UploadReport, WeightGroup};
pub use crate::foundation::config::{MixerConfig, ResampleFilter};
pub use crate::foundation::core::{
    ComplexMatrix, ComponentKind, MAX_SLOTS, Matrix, Shape, SlotIndex,
};
pub use crate::foundation::error::{MixerError, MixerResult};
pub use crate::imaging::codec;
pub use crate::imaging::store::{CacheState, ImageStore};
pub use crate::jobs::runner::{
    JobRunner, JobStatus, PROGRESS_DONE, PROGRESS_ERROR, PROGRESS_STARTED,
};
pub use crate::mixing::engine::{MixInputs, MixMode, MixWeights, MixedComponents, MixingEngine};
pub use crate::mixing::mask::{Rect, RegionSelection, create_mask};
pub use crate::session::registry::SessionRegistry;
pub use crate::session::unify::enforce_unified_size;
pub use crate::spectrum::fft::{fft2_centered, ifft2_centered};
