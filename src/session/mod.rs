//! Slot registry and size unification.

/// Slot-indexed image collection.
pub mod registry;
/// Common-shape enforcement.
pub mod unify;
