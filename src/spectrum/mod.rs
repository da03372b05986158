//! Centered 2-D Fourier transforms.

/// Forward and inverse DC-centered FFTs.
pub mod fft;
