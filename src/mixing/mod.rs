//! Frequency-domain blending and region masks.

/// Weighted component blending and reconstruction.
pub mod engine;
/// Rectangular frequency masks.
pub mod mask;
