use crate::foundation::core::Shape;

/// Convenience result type used across the mixer.
pub type MixerResult<T> = Result<T, MixerError>;

/// Top-level error taxonomy used by mixer APIs.
#[derive(thiserror::Error, Debug)]
pub enum MixerError {
    /// Encoded image bytes could not be turned into an intensity matrix.
    #[error("decode error: {0}")]
    Decode(String),

    /// A component was requested from a store that holds no image.
    #[error("no image loaded")]
    NoImageLoaded,

    /// Mixing was requested without any source image.
    #[error("empty image set: at least one image is required to mix")]
    EmptyImageSet,

    /// Two matrices that must agree in shape do not.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Shape required by the operation.
        expected: Shape,
        /// Shape that was supplied.
        actual: Shape,
    },

    /// Opaque failure inside a background mixing job.
    #[error("job error: {0}")]
    Job(String),

    /// Invalid user-provided values (weights, slots, shapes, config).
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MixerError {
    /// Build a [`MixerError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`MixerError::Job`] value.
    pub fn job(msg: impl Into<String>) -> Self {
        Self::Job(msg.into())
    }

    /// Build a [`MixerError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MixerError::ShapeMismatch`] value.
    pub fn shape_mismatch(expected: Shape, actual: Shape) -> Self {
        Self::ShapeMismatch { expected, actual }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
