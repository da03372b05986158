//! Shared primitives: matrices and shapes, the error taxonomy, and runtime configuration.

/// Mixer tunables loaded from JSON.
pub mod config;
/// Matrix, shape and component-kind types.
pub mod core;
/// Crate-wide error type.
pub mod error;
